//! Gitleaks secret-scanner adapter.

use crate::adapters::process::{ProcessRegistry, run_tool};
use crate::adapters::{ToolAdapter, normalize_path, truncate_raw};
use crate::error::SourceError;
use crate::rules::{Category, Confidence, Finding, Location, Severity};
use std::path::Path;
use std::time::Duration;

/// Gitleaks has a single output category (a detected secret), so its whole
/// vocabulary maps to one canonical triple. Pinned against gitleaks 8.x;
/// the leak's own rule id is preserved as the finding's `rule_id`.
pub const MAPPING_VERSION: &str = "8.x";
const SECRET_SEVERITY: Severity = Severity::Critical;
const SECRET_CONFIDENCE: Confidence = Confidence::High;

pub struct GitleaksAdapter;

impl ToolAdapter for GitleaksAdapter {
    fn name(&self) -> &'static str {
        "gitleaks"
    }

    fn is_available(&self) -> bool {
        crate::adapters::process::probe("gitleaks", &["version"])
    }

    fn invoke(
        &self,
        skill_root: &Path,
        timeout: Duration,
        procs: &ProcessRegistry,
    ) -> Result<String, SourceError> {
        let out = run_tool(
            self.name(),
            "gitleaks",
            &[
                "detect",
                "-s",
                ".",
                "--no-git",
                "-f",
                "json",
                "-r",
                "/dev/stdout",
            ],
            skill_root,
            timeout,
            procs,
        )?;

        // Exit 1 means leaks were found, which is a successful detection.
        if !matches!(out.status, 0 | 1) {
            return Err(SourceError::NonZeroExit {
                code: out.status,
                stderr: truncate_raw(&out.stderr),
            });
        }
        Ok(out.stdout)
    }

    fn parse(&self, raw: &str) -> Result<Vec<Finding>, SourceError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        // Current releases report a JSON array; older ones emitted one
        // object per line. Accept both.
        let entries: Vec<serde_json::Value> =
            match serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
                Ok(entries) => entries,
                Err(_) => {
                    let mut entries = Vec::new();
                    for line in trimmed.lines().filter(|l| !l.trim().is_empty()) {
                        let entry = serde_json::from_str(line).map_err(|_| {
                            SourceError::UnparseableOutput {
                                raw: truncate_raw(raw),
                            }
                        })?;
                        entries.push(entry);
                    }
                    entries
                }
            };

        let findings = entries
            .into_iter()
            .map(|leak| {
                let rule_id = leak
                    .get("RuleID")
                    .and_then(|v| v.as_str())
                    .unwrap_or("gitleaks")
                    .to_string();
                let file = leak.get("File").and_then(|v| v.as_str()).unwrap_or("unknown");
                let line = leak
                    .get("StartLine")
                    .and_then(|v| v.as_u64())
                    .map(|l| l as u32);
                let description = leak
                    .get("Description")
                    .and_then(|v| v.as_str())
                    .unwrap_or("secret detected");

                Finding {
                    rule_id,
                    source: self.source(),
                    location: Location::new(normalize_path(file, Path::new(".")), line),
                    category: Category::SecretExposure,
                    severity: SECRET_SEVERITY,
                    confidence: SECRET_CONFIDENCE,
                    message: format!("Potential secret: {description}"),
                    raw: Some(leak),
                }
            })
            .collect();
        Ok(findings)
    }
}
