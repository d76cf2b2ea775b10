//! Safety dependency-vulnerability adapter (Python manifests).

use crate::adapters::process::{ProcessRegistry, run_tool};
use crate::adapters::{ToolAdapter, truncate_raw};
use crate::aggregate::normalize::cvss_severity;
use crate::error::SourceError;
use crate::rules::{Category, Confidence, Finding, Location};
use serde_json::json;
use std::path::Path;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// CVSS band mapping pinned against safety 3.x JSON output. Vulnerability
/// reports carry no confidence of their own; a database hit on a pinned
/// version is treated as a firm medium.
pub const MAPPING_VERSION: &str = "3.x";
const VULN_CONFIDENCE: Confidence = Confidence::Medium;

const MANIFEST_NAMES: &[&str] = &["pyproject.toml", "poetry.lock", "Pipfile"];

pub struct SafetyAdapter;

impl SafetyAdapter {
    fn find_manifests(skill_root: &Path) -> Vec<String> {
        let mut manifests: Vec<String> = WalkDir::new(skill_root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy();
                let matches = MANIFEST_NAMES.contains(&name.as_ref())
                    || (name.starts_with("requirements") && name.ends_with(".txt"));
                if !matches {
                    return None;
                }
                entry
                    .path()
                    .strip_prefix(skill_root)
                    .ok()
                    .map(|p| p.to_string_lossy().to_string())
            })
            .collect();
        manifests.sort();
        manifests
    }
}

impl ToolAdapter for SafetyAdapter {
    fn name(&self) -> &'static str {
        "safety"
    }

    fn is_available(&self) -> bool {
        crate::adapters::process::probe("safety", &["--version"])
    }

    /// Runs one check per discovered manifest, all within the single
    /// adapter deadline, and wraps the per-manifest outputs into one JSON
    /// envelope so `parse` sees a single raw payload.
    fn invoke(
        &self,
        skill_root: &Path,
        timeout: Duration,
        procs: &ProcessRegistry,
    ) -> Result<String, SourceError> {
        let manifests = Self::find_manifests(skill_root);
        if manifests.is_empty() {
            return Ok(String::new());
        }

        let deadline = Instant::now() + timeout;
        let mut reports = Vec::with_capacity(manifests.len());
        for manifest in manifests {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(SourceError::TimedOut {
                    secs: timeout.as_secs(),
                });
            }

            let out = run_tool(
                self.name(),
                "safety",
                &["check", "--file", manifest.as_str(), "--json"],
                skill_root,
                remaining,
                procs,
            )?;

            // Safety exits non-zero when vulnerabilities are found; only an
            // undecodable report with a failing exit counts as a tool error.
            if serde_json::from_str::<serde_json::Value>(&out.stdout).is_err() && out.status != 0 {
                return Err(SourceError::NonZeroExit {
                    code: out.status,
                    stderr: truncate_raw(&out.stderr),
                });
            }

            reports.push(json!({ "file": manifest, "output": out.stdout }));
        }

        serde_json::to_string(&json!({ "manifests": reports })).map_err(|_| {
            SourceError::UnparseableOutput {
                raw: String::new(),
            }
        })
    }

    fn parse(&self, raw: &str) -> Result<Vec<Finding>, SourceError> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let envelope: serde_json::Value =
            serde_json::from_str(raw).map_err(|_| SourceError::UnparseableOutput {
                raw: truncate_raw(raw),
            })?;
        let manifests = envelope
            .get("manifests")
            .and_then(|m| m.as_array())
            .ok_or_else(|| SourceError::UnparseableOutput {
                raw: truncate_raw(raw),
            })?;

        let mut findings = Vec::new();
        for report in manifests {
            let file = report
                .get("file")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            let output = report.get("output").and_then(|v| v.as_str()).unwrap_or("");
            let Ok(parsed) = serde_json::from_str::<serde_json::Value>(output) else {
                continue;
            };
            let Some(vulns) = parsed.get("vulnerabilities").and_then(|v| v.as_array()) else {
                continue;
            };

            for vuln in vulns {
                let id = vuln
                    .get("vulnerability_id")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");
                let advisory = vuln
                    .get("advisory")
                    .and_then(|v| v.as_str())
                    .unwrap_or("no details");
                let package = vuln
                    .get("package_name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");
                let cvss = vuln.get("cvssv3_score").and_then(|v| v.as_f64());

                findings.push(Finding {
                    rule_id: id.to_string(),
                    source: self.source(),
                    // Vulnerability reports have no line; they merge only
                    // with other line-less findings on the same manifest.
                    location: Location::new(file, None),
                    category: Category::DependencyVulnerability,
                    severity: cvss_severity(cvss),
                    confidence: VULN_CONFIDENCE,
                    message: format!("{id}: {advisory} ({package})"),
                    raw: Some(vuln.clone()),
                });
            }
        }
        Ok(findings)
    }
}
