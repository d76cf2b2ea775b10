use crate::config::{ScanConfig, ToolsConfig};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToolKind {
    Bandit,
    Gitleaks,
    Safety,
}

#[derive(Parser, Debug)]
#[command(
    name = "skillvet",
    version,
    about = "Security, structure, and performance vetting for skill packages",
    long_about = "skillvet evaluates third-party skill packages before installation: \
                  a pattern scan plus any installed external scanners, structural \
                  validation, and load benchmarks, combined into one report."
)]
pub struct Cli {
    /// Skill directories to evaluate (two or more produce a comparative report)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,

    /// Disable all external tool adapters (pattern engine only)
    #[arg(long)]
    pub no_external: bool,

    /// Enable only the given external tool (repeatable)
    #[arg(long = "tool", value_enum)]
    pub tools: Vec<ToolKind>,

    /// Per-tool timeout in seconds
    #[arg(long)]
    pub tool_timeout: Option<u64>,

    /// Scan-level timeout in seconds
    #[arg(long)]
    pub global_timeout: Option<u64>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the effective scan configuration: config file first, then
    /// command-line overrides, validated as a whole.
    pub fn scan_config(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::from_file(path)?,
            None => ScanConfig::default(),
        };

        if self.no_external {
            config.tools = ToolsConfig::none();
        } else if !self.tools.is_empty() {
            config.tools = ToolsConfig {
                bandit: self.tools.contains(&ToolKind::Bandit),
                gitleaks: self.tools.contains(&ToolKind::Gitleaks),
                safety: self.tools.contains(&ToolKind::Safety),
            };
        }
        if let Some(secs) = self.tool_timeout {
            config.tool_timeout_secs = secs;
        }
        if let Some(secs) = self.global_timeout {
            config.global_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }
}
