//! Top-level drivers: evaluate skills and render the combined report.

use crate::aggregate::Orchestrator;
use crate::benchmark::BenchmarkRunner;
use crate::cli::{Cli, OutputFormat};
use crate::config::ScanConfig;
use crate::error::Result;
use crate::reporter::{
    JsonReporter, MarkdownReporter, Reporter, SkillReport, TerminalReporter, comparative_markdown,
};
use crate::validation::{SkillValidator, collect_files};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};

/// Run the three evaluations for one skill and compose the report.
pub fn evaluate_skill(skill_root: &Path, config: &ScanConfig) -> Result<SkillReport> {
    let skill_name = skill_root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| skill_root.display().to_string());
    info!(skill = %skill_name, "evaluating skill");

    let validation = SkillValidator::new(skill_root).validate()?;
    let files = collect_files(skill_root)?;

    let orchestrator = Orchestrator::new(config.clone())?;
    let security = orchestrator.scan(&skill_name, skill_root, &files);

    let benchmark = BenchmarkRunner::new(skill_root).run();

    Ok(SkillReport::new(
        skill_name,
        skill_root.display().to_string(),
        security,
        validation,
        benchmark,
    ))
}

pub fn run(cli: &Cli) -> ExitCode {
    let config = match cli.scan_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            eprintln!("skillvet: {e}");
            return ExitCode::from(4);
        }
    };

    let mut reports = Vec::with_capacity(cli.paths.len());
    for path in &cli.paths {
        match evaluate_skill(path, &config) {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(path = %path.display(), "{e}");
                eprintln!("skillvet: {}: {e}", path.display());
                return ExitCode::from(4);
            }
        }
    }

    let rendered = render(cli, &reports);
    if let Some(output_path) = &cli.output {
        if let Err(e) = std::fs::write(output_path, &rendered) {
            eprintln!("skillvet: failed to write {}: {e}", output_path.display());
            return ExitCode::from(4);
        }
        println!("Report written to {}", output_path.display());
    } else {
        println!("{rendered}");
    }

    let class = reports.iter().map(|r| r.exit_class()).fold(0, |a, b| a | b);
    ExitCode::from(class)
}

fn render(cli: &Cli, reports: &[SkillReport]) -> String {
    match cli.format {
        OutputFormat::Json => {
            if reports.len() == 1 {
                JsonReporter::new().report(&reports[0])
            } else {
                serde_json::to_string_pretty(reports)
                    .unwrap_or_else(|e| format!(r#"{{"error": "{e}"}}"#))
            }
        }
        OutputFormat::Markdown => {
            if reports.len() == 1 {
                MarkdownReporter::new().report(&reports[0])
            } else {
                comparative_markdown(reports)
            }
        }
        OutputFormat::Terminal => {
            let renderer = TerminalReporter::new();
            reports
                .iter()
                .map(|r| renderer.report(r))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}
