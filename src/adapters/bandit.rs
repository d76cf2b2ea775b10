//! Bandit SAST adapter (Python code).

use crate::adapters::process::{ProcessRegistry, run_tool};
use crate::adapters::{ToolAdapter, normalize_path, truncate_raw};
use crate::aggregate::normalize::{UNMAPPED, VocabularyMap};
use crate::error::SourceError;
use crate::rules::{Confidence, Finding, Location, Severity};
use crate::rules::Category;
use std::path::Path;
use std::time::Duration;

/// Vocabulary pinned against bandit 1.7. Bandit reports per-check test ids;
/// checks not listed here normalize to the conservative fallback triple.
static VOCAB: VocabularyMap = VocabularyMap::new(
    "bandit",
    "1.7",
    &[
        ("LOW", Severity::Low),
        ("MEDIUM", Severity::Medium),
        ("HIGH", Severity::High),
    ],
    &[
        ("LOW", Confidence::Low),
        ("MEDIUM", Confidence::Medium),
        ("HIGH", Confidence::High),
    ],
    &[
        // hardcoded_password_*
        ("B105", Category::SecretExposure),
        ("B106", Category::SecretExposure),
        ("B107", Category::SecretExposure),
        // exec_used / eval
        ("B102", Category::CodeInjection),
        ("B307", Category::CodeInjection),
        // pickle / marshal deserialization
        ("B301", Category::CodeInjection),
        ("B302", Category::CodeInjection),
        // weak hashes and ciphers
        ("B303", Category::WeakCrypto),
        ("B304", Category::WeakCrypto),
        ("B305", Category::WeakCrypto),
        ("B324", Category::WeakCrypto),
        // urllib calls
        ("B310", Category::UnsafeNetworkAccess),
        // request without timeout / unverified TLS
        ("B113", Category::UnsafeNetworkAccess),
        ("B501", Category::UnsafeNetworkAccess),
        // subprocess / shell execution family
        ("B602", Category::CodeInjection),
        ("B603", Category::CodeInjection),
        ("B604", Category::CodeInjection),
        ("B605", Category::CodeInjection),
        ("B606", Category::CodeInjection),
        ("B607", Category::CodeInjection),
        // tempfile / permissive file modes
        ("B108", Category::UnsafeFilesystemAccess),
        ("B103", Category::UnsafeFilesystemAccess),
    ],
);

pub struct BanditAdapter;

impl ToolAdapter for BanditAdapter {
    fn name(&self) -> &'static str {
        "bandit"
    }

    fn is_available(&self) -> bool {
        crate::adapters::process::probe("bandit", &["--version"])
    }

    fn invoke(
        &self,
        skill_root: &Path,
        timeout: Duration,
        procs: &ProcessRegistry,
    ) -> Result<String, SourceError> {
        let out = run_tool(
            self.name(),
            "bandit",
            &["-r", "-f", "json", "-q", "."],
            skill_root,
            timeout,
            procs,
        )?;

        // Bandit exits 1 when it found issues; that is a successful scan.
        if !matches!(out.status, 0 | 1) {
            return Err(SourceError::NonZeroExit {
                code: out.status,
                stderr: truncate_raw(&out.stderr),
            });
        }
        Ok(out.stdout)
    }

    fn parse(&self, raw: &str) -> Result<Vec<Finding>, SourceError> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|_| SourceError::UnparseableOutput {
                raw: truncate_raw(raw),
            })?;

        let results = value
            .get("results")
            .and_then(|r| r.as_array())
            .ok_or_else(|| SourceError::UnparseableOutput {
                raw: truncate_raw(raw),
            })?;

        let mut findings = Vec::with_capacity(results.len());
        for issue in results {
            let test_id = issue
                .get("test_id")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            let file = issue
                .get("filename")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            let line = issue
                .get("line_number")
                .and_then(|v| v.as_u64())
                .map(|l| l as u32);
            let message = issue
                .get("issue_text")
                .and_then(|v| v.as_str())
                .unwrap_or("bandit issue")
                .to_string();

            let (category, severity, confidence) = match VOCAB.category(test_id) {
                Some(category) => (
                    category,
                    VOCAB.severity(
                        issue
                            .get("issue_severity")
                            .and_then(|v| v.as_str())
                            .unwrap_or(""),
                    ),
                    VOCAB.confidence(
                        issue
                            .get("issue_confidence")
                            .and_then(|v| v.as_str())
                            .unwrap_or(""),
                    ),
                ),
                None => UNMAPPED,
            };

            findings.push(Finding {
                rule_id: test_id.to_string(),
                source: self.source(),
                location: Location::new(normalize_path(file, Path::new(".")), line),
                category,
                severity,
                confidence,
                message,
                raw: Some(issue.clone()),
            });
        }
        Ok(findings)
    }
}
