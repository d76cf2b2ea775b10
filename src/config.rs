//! Scan configuration.
//!
//! Read once at scan start and treated as immutable for the duration of
//! that scan. Validation happens before any work is dispatched; an invalid
//! configuration is the only error that aborts without producing an
//! assessment.

use crate::aggregate::score::PenaltyTable;
use crate::error::{Result, VetError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Per-tool enable flags. All external tools are opt-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub bandit: bool,
    pub gitleaks: bool,
    pub safety: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            bandit: true,
            gitleaks: true,
            safety: true,
        }
    }
}

impl ToolsConfig {
    pub fn none() -> Self {
        Self {
            bandit: false,
            gitleaks: false,
            safety: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub tools: ToolsConfig,
    /// Hard wall-clock limit for a single external tool invocation.
    pub tool_timeout_secs: u64,
    /// Scan-level deadline; sources still running when it fires are
    /// recorded as timed out and killed, not awaited.
    pub global_timeout_secs: u64,
    /// Findings within this many lines of each other may describe the same
    /// issue. Calibrated against observed tool line-counting disagreement.
    pub line_tolerance: u32,
    pub penalties: PenaltyTable,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tools: ToolsConfig::default(),
            tool_timeout_secs: 60,
            global_timeout_secs: 120,
            line_tolerance: 2,
            penalties: PenaltyTable::default(),
        }
    }
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| VetError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: ScanConfig =
            serde_yaml::from_str(&text).map_err(|source| VetError::YamlParse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tool_timeout_secs == 0 {
            return Err(VetError::Config("tool timeout must be non-zero".to_string()));
        }
        if self.global_timeout_secs == 0 {
            return Err(VetError::Config(
                "global timeout must be non-zero".to_string(),
            ));
        }
        if self.line_tolerance > 100 {
            return Err(VetError::Config(format!(
                "line tolerance {} is implausibly large",
                self.line_tolerance
            )));
        }
        self.penalties.validate()
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn global_timeout(&self) -> Duration {
        Duration::from_secs(self.global_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ScanConfig {
            tool_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ScanConfig {
            global_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_tolerance_rejected() {
        let config = ScanConfig {
            line_tolerance: 500,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip_with_overrides() {
        let yaml = r#"
tools:
  bandit: false
tool_timeout_secs: 30
line_tolerance: 4
penalties:
  critical: [70, 80, 95]
"#;
        let config: ScanConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.tools.bandit);
        assert!(config.tools.gitleaks);
        assert_eq!(config.tool_timeout_secs, 30);
        assert_eq!(config.line_tolerance, 4);
        assert_eq!(config.penalties.critical, [70, 80, 95]);
        // Unspecified rows keep their defaults
        assert_eq!(config.penalties.high, [30, 40, 50]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_rejects_invalid_penalties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skillvet.yaml");
        std::fs::write(&path, "penalties:\n  critical: [1, 1, 1]\n").unwrap();
        let err = ScanConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }
}
