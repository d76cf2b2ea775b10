//! Report composition and rendering.
//!
//! A `SkillReport` composes the three independent evaluations (security
//! assessment, structural validation, benchmark) into one document. The
//! renderers only read it; the assessment is never mutated after the scan.

pub mod json;
pub mod markdown;
pub mod terminal;

pub use json::JsonReporter;
pub use markdown::MarkdownReporter;
pub use terminal::TerminalReporter;

use crate::aggregate::SecurityAssessment;
use crate::benchmark::BenchmarkReport;
use crate::validation::ValidationReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillReport {
    pub skill_name: String,
    pub skill_path: String,
    pub generated_at: String,
    pub security: SecurityAssessment,
    pub validation: ValidationReport,
    pub benchmark: BenchmarkReport,
    pub recommendations: Vec<String>,
}

impl SkillReport {
    pub fn new(
        skill_name: String,
        skill_path: String,
        security: SecurityAssessment,
        validation: ValidationReport,
        benchmark: BenchmarkReport,
    ) -> Self {
        let recommendations = recommendations(&security, &validation, &benchmark);
        Self {
            skill_name,
            skill_path,
            generated_at: chrono::Utc::now().to_rfc3339(),
            security,
            validation,
            benchmark,
            recommendations,
        }
    }

    /// Process exit class: bit 0 = security-critical, bit 1 = validation
    /// failure. Yields 0, 1, 2, or 3.
    pub fn exit_class(&self) -> u8 {
        let mut class = 0;
        if self.security.has_critical() {
            class |= 1;
        }
        if !self.validation.passed_all() {
            class |= 2;
        }
        class
    }
}

pub trait Reporter {
    fn report(&self, report: &SkillReport) -> String;
}

fn recommendations(
    security: &SecurityAssessment,
    validation: &ValidationReport,
    benchmark: &BenchmarkReport,
) -> Vec<String> {
    let mut recs = Vec::new();

    if security.severity_counts.critical > 0 {
        recs.push("CRITICAL: remove hardcoded secrets and other critical issues immediately".to_string());
    }
    if security.severity_counts.high > 0 {
        recs.push("HIGH: review dynamic execution and shell invocation for injection risk".to_string());
    }
    if security
        .reconciled_findings
        .iter()
        .any(|f| f.requires_review)
    {
        recs.push("Some low-confidence findings lack corroboration and need manual review".to_string());
    }
    if security.partial {
        recs.push("External scanners were unavailable; install them for corroborated results".to_string());
    }

    let rate = validation.pass_rate();
    if rate < 0.5 {
        recs.push("Add missing required files or metadata fields".to_string());
    } else if rate < 0.8 {
        recs.push("Improve SKILL.md quality and completeness".to_string());
    }

    if benchmark.success_rate() < 0.5 {
        recs.push("Fix failing load/parse tasks".to_string());
    }

    if recs.is_empty() {
        recs.push("No issues found — skill is well-structured".to_string());
    }
    recs
}

/// Comparative Markdown report over several skills, best score first.
pub fn comparative_markdown(reports: &[SkillReport]) -> String {
    if reports.is_empty() {
        return "No reports to compare.\n".to_string();
    }

    let mut sorted: Vec<&SkillReport> = reports.iter().collect();
    sorted.sort_by(|a, b| {
        b.security
            .score
            .cmp(&a.security.score)
            .then(a.skill_name.cmp(&b.skill_name))
    });

    let mut lines = vec![
        "# Comparative Skill Report".to_string(),
        String::new(),
        format!("Skills compared: {}", sorted.len()),
        String::new(),
        "| Skill | Security Score | Critical | Validation | Benchmark |".to_string(),
        "|-------|---------------:|---------:|-----------:|----------:|".to_string(),
    ];

    for report in &sorted {
        lines.push(format!(
            "| {} | {}/100 | {} | {:.0}% | {:.0}% |",
            report.skill_name,
            report.security.score,
            report.security.severity_counts.critical,
            report.validation.pass_rate() * 100.0,
            report.benchmark.success_rate() * 100.0,
        ));
    }

    lines.push(String::new());
    let renderer = MarkdownReporter::new();
    for report in &sorted {
        lines.push(renderer.report(report));
        lines.push("---".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::aggregate::SeverityCounts;
    use crate::aggregate::dedupe::ReconciledFinding;
    use crate::benchmark::BenchmarkResult;
    use crate::rules::{Category, Confidence, Finding, Location, Severity, Source};
    use crate::validation::CheckResult;

    pub fn reconciled(severity: Severity, category: Category) -> ReconciledFinding {
        let member = Finding {
            rule_id: "T-001".to_string(),
            source: Source::PatternEngine,
            location: Location::new("scripts/run.py", Some(10)),
            category,
            severity,
            confidence: Confidence::Medium,
            message: "test finding".to_string(),
            raw: None,
        };
        ReconciledFinding {
            fingerprint: format!("scripts/run.py:{}:2", category.as_str()),
            members: vec![member],
            effective_severity: severity,
            effective_confidence: Confidence::Medium,
            category,
            requires_review: false,
        }
    }

    pub fn assessment(findings: Vec<ReconciledFinding>, score: u8) -> SecurityAssessment {
        let severity_counts = SeverityCounts::from_findings(&findings);
        SecurityAssessment {
            skill_id: "demo-skill".to_string(),
            scanned_at: "2026-01-01T00:00:00Z".to_string(),
            sources_attempted: vec!["pattern-engine".to_string()],
            sources_succeeded: vec!["pattern-engine".to_string()],
            sources_failed: vec![],
            reconciled_findings: findings,
            severity_counts,
            score,
            partial: false,
        }
    }

    pub fn validation(all_pass: bool) -> ValidationReport {
        ValidationReport {
            checks: vec![
                CheckResult {
                    name: "required_file_skill_md".to_string(),
                    passed: true,
                    message: "SKILL.md exists".to_string(),
                },
                CheckResult {
                    name: "skill_md_frontmatter".to_string(),
                    passed: all_pass,
                    message: "frontmatter check".to_string(),
                },
            ],
        }
    }

    pub fn benchmark() -> BenchmarkReport {
        BenchmarkReport {
            results: vec![BenchmarkResult {
                task: "skill_load_time".to_string(),
                success: true,
                duration_ms: 0.4,
                error: None,
            }],
        }
    }

    pub fn report(findings: Vec<ReconciledFinding>, score: u8, all_pass: bool) -> SkillReport {
        SkillReport::new(
            "demo-skill".to_string(),
            "./demo-skill".to_string(),
            assessment(findings, score),
            validation(all_pass),
            benchmark(),
        )
    }
}
