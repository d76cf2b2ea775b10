use crate::rules::builtin;
use crate::rules::types::{Finding, Location, Rule, ScanFile};
use tracing::{trace, warn};

/// In-process pattern scanner.
///
/// `scan` is pure: the same input files always yield the same findings, and
/// nothing outside the given text is touched. Running time is linear in the
/// total input size: each rule pattern is matched by a linear-time engine
/// against each line exactly once.
pub struct PatternEngine {
    rules: &'static [Rule],
}

impl PatternEngine {
    pub fn new() -> Self {
        Self {
            rules: builtin::all_rules(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        self.rules
    }

    pub fn scan(&self, files: &[ScanFile]) -> Vec<Finding> {
        let mut findings = Vec::new();
        for file in files {
            if !Self::is_scannable(&file.text) {
                warn!(file = %file.path, "skipping binary or malformed content");
                continue;
            }
            self.scan_file(file, &mut findings);
        }
        findings
    }

    /// Binary payloads that survived the validator's extension filter are
    /// skipped per file; one bad file must never abort the whole scan.
    fn is_scannable(text: &str) -> bool {
        !text.contains('\0')
    }

    fn scan_file(&self, file: &ScanFile, findings: &mut Vec<Finding>) {
        trace!(
            file = %file.path,
            rules = self.rules.len(),
            "scanning file against rule catalog"
        );

        for (line_idx, line) in file.text.lines().enumerate() {
            for rule in self.rules {
                if let Some(finding) = Self::check_line(rule, line, &file.path, line_idx + 1) {
                    findings.push(finding);
                }
            }
        }
    }

    fn check_line(rule: &Rule, line: &str, path: &str, line_num: usize) -> Option<Finding> {
        let matched = rule.patterns.iter().find_map(|p| p.find(line))?;

        if rule.exclusions.iter().any(|e| e.is_match(line)) {
            return None;
        }

        let location = Location {
            file: path.to_string(),
            line: Some(line_num as u32),
            column: Some(matched.start() as u32 + 1),
        };

        Some(Finding::from_rule(rule, location))
    }
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::new()
    }
}
