use crate::reporter::{Reporter, SkillReport};
use crate::rules::Severity;
use colored::Colorize;

pub struct TerminalReporter;

impl TerminalReporter {
    pub fn new() -> Self {
        Self
    }

    fn severity_label(severity: Severity) -> String {
        let label = severity.to_string();
        match severity {
            Severity::Critical => label.red().bold().to_string(),
            Severity::High => label.red().to_string(),
            Severity::Medium => label.yellow().to_string(),
            Severity::Low => label.dimmed().to_string(),
        }
    }

    fn score_label(score: u8) -> String {
        let label = format!("{score}/100");
        match score {
            80..=100 => label.green().to_string(),
            50..=79 => label.yellow().to_string(),
            _ => label.red().bold().to_string(),
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &SkillReport) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "\n{} {}\n",
            "Skill:".bold(),
            report.skill_name
        ));
        out.push_str(&format!(
            "{} {}\n",
            "Security score:".bold(),
            Self::score_label(report.security.score)
        ));
        out.push_str(&format!(
            "Sources: {} succeeded, {} failed\n",
            report.security.sources_succeeded.len(),
            report.security.sources_failed.len()
        ));

        if report.security.reconciled_findings.is_empty() {
            out.push_str(&format!("{}\n", "✓ No security findings".green()));
        } else {
            out.push('\n');
            for finding in &report.security.reconciled_findings {
                let lead = &finding.members[0];
                let location = match lead.location.line {
                    Some(line) => format!("{}:{}", lead.location.file, line),
                    None => lead.location.file.clone(),
                };
                out.push_str(&format!(
                    "  [{}] {} {} — {}",
                    Self::severity_label(finding.effective_severity),
                    location.cyan(),
                    format!("({})", finding.category).dimmed(),
                    lead.message,
                ));
                if finding.requires_review {
                    out.push_str(&format!(" {}", "[needs review]".yellow()));
                }
                out.push('\n');
            }
        }

        for failure in &report.security.sources_failed {
            out.push_str(&format!(
                "  {} {}: {}\n",
                "!".yellow(),
                failure.source,
                failure.reason
            ));
        }

        let validation_label = format!(
            "{}/{} checks passed",
            report.validation.passed(),
            report.validation.checks.len()
        );
        out.push_str(&format!(
            "\n{} {}\n",
            "Validation:".bold(),
            if report.validation.passed_all() {
                validation_label.green().to_string()
            } else {
                validation_label.red().to_string()
            }
        ));
        for check in report.validation.checks.iter().filter(|c| !c.passed) {
            out.push_str(&format!("  {} {}\n", "✗".red(), check.message));
        }

        out.push_str(&format!(
            "{} {:.0}% success, avg {:.1}ms\n",
            "Benchmark:".bold(),
            report.benchmark.success_rate() * 100.0,
            report.benchmark.avg_duration_ms()
        ));

        out.push('\n');
        for rec in &report.recommendations {
            out.push_str(&format!("  → {rec}\n"));
        }

        out
    }
}
