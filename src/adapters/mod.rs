//! External tool adapters.
//!
//! One adapter per external scanner, each independently optional: a missing
//! or failing tool reduces `sources_succeeded` on the assessment but never
//! changes its shape. Each adapter is the isolation boundary around one
//! external process and is testable from recorded raw output alone, with no
//! live binary required.

pub mod bandit;
pub mod gitleaks;
pub mod process;
pub mod safety;

pub use bandit::BanditAdapter;
pub use gitleaks::GitleaksAdapter;
pub use process::{CommandOutput, ProcessRegistry};
pub use safety::SafetyAdapter;

use crate::config::ToolsConfig;
use crate::error::SourceError;
use crate::rules::{Finding, Source};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Capability set every external tool integration must provide.
pub trait ToolAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap local check (binary present and answering), never a scan.
    fn is_available(&self) -> bool;

    /// Run the tool against the skill tree and return its raw output.
    /// Enforces `timeout` itself as a hard wall-clock limit and registers
    /// the child with `procs` so the orchestrator can cancel it.
    fn invoke(
        &self,
        skill_root: &Path,
        timeout: Duration,
        procs: &ProcessRegistry,
    ) -> Result<String, SourceError>;

    /// Translate raw tool output into canonical findings via the adapter's
    /// versioned vocabulary map. Unmapped categories normalize to
    /// `(other, medium, low)`; only undecodable output is an error.
    fn parse(&self, raw: &str) -> Result<Vec<Finding>, SourceError>;

    fn source(&self) -> Source {
        Source::Tool(self.name().to_string())
    }
}

/// Build the adapter set enabled by configuration. Shared ownership so
/// dispatch threads can outlive a scan that timed out and walked away.
pub fn registered_adapters(tools: &ToolsConfig) -> Vec<Arc<dyn ToolAdapter>> {
    let mut adapters: Vec<Arc<dyn ToolAdapter>> = Vec::new();
    if tools.bandit {
        adapters.push(Arc::new(BanditAdapter));
    }
    if tools.gitleaks {
        adapters.push(Arc::new(GitleaksAdapter));
    }
    if tools.safety {
        adapters.push(Arc::new(SafetyAdapter));
    }
    adapters
}

/// Keep enough raw output to diagnose, not enough to bloat the report.
pub(crate) fn truncate_raw(raw: &str) -> String {
    const LIMIT: usize = 2000;
    if raw.len() <= LIMIT {
        return raw.to_string();
    }
    let mut end = LIMIT;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &raw[..end])
}

/// Tool file paths come back in assorted shapes; report them relative and
/// without the leading `./` so they line up with pattern-engine paths.
pub(crate) fn normalize_path(path: &str, skill_root: &Path) -> String {
    let p = Path::new(path);
    let stripped = p.strip_prefix(skill_root).unwrap_or(p);
    let s = stripped.to_string_lossy();
    s.strip_prefix("./").unwrap_or(&s).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_adapters_respect_flags() {
        let all = registered_adapters(&ToolsConfig::default());
        assert_eq!(all.len(), 3);

        let none = registered_adapters(&ToolsConfig::none());
        assert!(none.is_empty());

        let only_bandit = registered_adapters(&ToolsConfig {
            bandit: true,
            gitleaks: false,
            safety: false,
        });
        assert_eq!(only_bandit.len(), 1);
        assert_eq!(only_bandit[0].name(), "bandit");
    }

    #[test]
    fn test_truncate_raw_short_passthrough() {
        assert_eq!(truncate_raw("short"), "short");
    }

    #[test]
    fn test_truncate_raw_long() {
        let long = "x".repeat(5000);
        let truncated = truncate_raw(&long);
        assert!(truncated.len() < 2100);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn test_normalize_path() {
        let root = Path::new("/tmp/skill");
        assert_eq!(normalize_path("/tmp/skill/scripts/a.py", root), "scripts/a.py");
        assert_eq!(normalize_path("./scripts/a.py", root), "scripts/a.py");
        assert_eq!(normalize_path("scripts/a.py", root), "scripts/a.py");
    }
}
