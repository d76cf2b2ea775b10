//! Error types for skillvet.
//!
//! Two layers: `VetError` covers failures that abort an operation before a
//! scan produces an assessment (bad configuration, unreadable skill input),
//! while `SourceError` is the per-source failure taxonomy that degrades
//! gracefully into `sources_failed` entries on the assessment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VetError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file: {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path is not a directory: {0}")]
    NotADirectory(String),

    #[error("Failed to parse YAML: {path}")]
    YamlParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex compilation error: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, VetError>;

/// Why a signal source contributed nothing to a scan.
///
/// Every variant is recorded on the assessment and none of them aborts the
/// scan. Raw output is retained on `UnparseableOutput` so the report can
/// show what the tool actually said.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceError {
    #[error("tool is not installed")]
    NotInstalled,

    #[error("timed out after {secs}s")]
    TimedOut { secs: u64 },

    #[error("exited with status {code}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("output could not be parsed")]
    UnparseableOutput { raw: String },
}
