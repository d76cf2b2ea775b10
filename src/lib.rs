pub mod adapters;
pub mod aggregate;
pub mod benchmark;
pub mod cli;
pub mod config;
pub mod error;
pub mod reporter;
pub mod rules;
pub mod run;
pub mod validation;

pub use adapters::{BanditAdapter, GitleaksAdapter, SafetyAdapter, ToolAdapter};
pub use aggregate::{Orchestrator, ReconciledFinding, SecurityAssessment};
pub use cli::{Cli, OutputFormat};
pub use config::ScanConfig;
pub use error::{Result, SourceError, VetError};
pub use reporter::{
    JsonReporter, MarkdownReporter, Reporter, SkillReport, TerminalReporter,
};
pub use rules::{Category, Confidence, Finding, PatternEngine, ScanFile, Severity, Source};
pub use validation::{SkillValidator, ValidationReport, collect_files};
