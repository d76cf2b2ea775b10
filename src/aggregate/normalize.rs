//! Canonical vocabulary mapping for external tool output.
//!
//! Each adapter translates its tool's severity/confidence/category
//! vocabulary through an explicit, versioned table. A tool upgrade that
//! renames a category therefore surfaces as a lookup miss (normalized to
//! the conservative `other`/medium/low triple) instead of silently
//! mis-scoring, and the miss is logged.

use crate::rules::{Category, Confidence, Severity};
use tracing::debug;

/// One tool's vocabulary, pinned to the tool version the table was written
/// against.
pub struct VocabularyMap {
    pub tool: &'static str,
    pub version: &'static str,
    severities: &'static [(&'static str, Severity)],
    confidences: &'static [(&'static str, Confidence)],
    categories: &'static [(&'static str, Category)],
}

/// Fallback triple for a tool category missing from the mapping table.
/// Unmapped findings are kept, never dropped.
pub const UNMAPPED: (Category, Severity, Confidence) =
    (Category::Other, Severity::Medium, Confidence::Low);

impl VocabularyMap {
    pub const fn new(
        tool: &'static str,
        version: &'static str,
        severities: &'static [(&'static str, Severity)],
        confidences: &'static [(&'static str, Confidence)],
        categories: &'static [(&'static str, Category)],
    ) -> Self {
        Self {
            tool,
            version,
            severities,
            confidences,
            categories,
        }
    }

    pub fn severity(&self, raw: &str) -> Severity {
        lookup(self.severities, raw).unwrap_or_else(|| {
            debug!(tool = self.tool, raw, "unmapped severity");
            Severity::Medium
        })
    }

    pub fn confidence(&self, raw: &str) -> Confidence {
        lookup(self.confidences, raw).unwrap_or_else(|| {
            debug!(tool = self.tool, raw, "unmapped confidence");
            Confidence::Low
        })
    }

    pub fn category(&self, raw: &str) -> Option<Category> {
        let found = lookup(self.categories, raw);
        if found.is_none() {
            debug!(tool = self.tool, raw, "unmapped category");
        }
        found
    }
}

fn lookup<T: Copy>(table: &[(&str, T)], raw: &str) -> Option<T> {
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(raw))
        .map(|(_, value)| *value)
}

/// CVSS v3 base score bands, as published by FIRST.
pub fn cvss_severity(score: Option<f64>) -> Severity {
    match score {
        None => Severity::Medium,
        Some(s) if s >= 9.0 => Severity::Critical,
        Some(s) if s >= 7.0 => Severity::High,
        Some(s) if s >= 4.0 => Severity::Medium,
        Some(_) => Severity::Low,
    }
}
