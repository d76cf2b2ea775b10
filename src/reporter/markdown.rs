use crate::reporter::{Reporter, SkillReport};

pub struct MarkdownReporter;

impl MarkdownReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for MarkdownReporter {
    fn report(&self, report: &SkillReport) -> String {
        let mut lines = vec![
            format!("# Skill Report: {}", report.skill_name),
            String::new(),
            format!("Generated: {}", report.generated_at),
            format!("Path: {}", report.skill_path),
            String::new(),
            "## Security".to_string(),
            String::new(),
            format!("Score: **{}/100**", report.security.score),
            format!(
                "Sources: {} succeeded, {} failed",
                report.security.sources_succeeded.len(),
                report.security.sources_failed.len()
            ),
            String::new(),
        ];

        if report.security.reconciled_findings.is_empty() {
            lines.push("No findings.".to_string());
        } else {
            lines.push("| Severity | Confidence | Category | Location | Sources | Message |".to_string());
            lines.push("|----------|------------|----------|----------|---------|---------|".to_string());
            for finding in &report.security.reconciled_findings {
                let lead = &finding.members[0];
                let location = match lead.location.line {
                    Some(line) => format!("{}:{}", lead.location.file, line),
                    None => lead.location.file.clone(),
                };
                let review = if finding.requires_review {
                    " (needs review)"
                } else {
                    ""
                };
                lines.push(format!(
                    "| {} | {} | {} | {} | {} | {}{} |",
                    finding.effective_severity,
                    finding.effective_confidence,
                    finding.category,
                    location,
                    finding.sources().join(", "),
                    lead.message,
                    review,
                ));
            }
        }

        if !report.security.sources_failed.is_empty() {
            lines.push(String::new());
            lines.push("### Failed sources".to_string());
            lines.push(String::new());
            for failure in &report.security.sources_failed {
                lines.push(format!("- `{}`: {}", failure.source, failure.reason));
            }
        }

        lines.push(String::new());
        lines.push("## Validation".to_string());
        lines.push(String::new());
        lines.push(format!(
            "{}/{} checks passed ({:.0}%)",
            report.validation.passed(),
            report.validation.checks.len(),
            report.validation.pass_rate() * 100.0,
        ));
        for check in report.validation.checks.iter().filter(|c| !c.passed) {
            lines.push(format!("- ✗ {}: {}", check.name, check.message));
        }

        lines.push(String::new());
        lines.push("## Benchmark".to_string());
        lines.push(String::new());
        lines.push(format!(
            "{} tasks, {:.0}% success, avg {:.1}ms",
            report.benchmark.results.len(),
            report.benchmark.success_rate() * 100.0,
            report.benchmark.avg_duration_ms(),
        ));

        lines.push(String::new());
        lines.push("## Recommendations".to_string());
        lines.push(String::new());
        for rec in &report.recommendations {
            lines.push(format!("- {rec}"));
        }
        lines.push(String::new());

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::fixtures;
    use crate::rules::{Category, Severity};

    #[test]
    fn test_markdown_clean_report() {
        let output = MarkdownReporter::new().report(&fixtures::report(vec![], 100, true));
        assert!(output.contains("# Skill Report: demo-skill"));
        assert!(output.contains("Score: **100/100**"));
        assert!(output.contains("No findings."));
        assert!(output.contains("## Validation"));
        assert!(output.contains("## Benchmark"));
    }

    #[test]
    fn test_markdown_findings_table() {
        let report = fixtures::report(
            vec![fixtures::reconciled(
                Severity::Critical,
                Category::SecretExposure,
            )],
            40,
            true,
        );
        let output = MarkdownReporter::new().report(&report);
        assert!(output.contains("| CRITICAL |"));
        assert!(output.contains("secret-exposure"));
        assert!(output.contains("scripts/run.py:10"));
    }

    #[test]
    fn test_markdown_lists_failed_checks() {
        let output = MarkdownReporter::new().report(&fixtures::report(vec![], 100, false));
        assert!(output.contains("✗ skill_md_frontmatter"));
    }
}
