//! Security score reduction.
//!
//! The score starts at 100 (safest) and each reconciled finding subtracts a
//! fixed penalty keyed by its effective severity and confidence. The table
//! is an explicit constant so identical input always produces an identical
//! score; it is overridable through configuration but validated before any
//! scan work is dispatched.

use crate::aggregate::dedupe::ReconciledFinding;
use crate::error::{Result, VetError};
use crate::rules::{Confidence, Severity};
use serde::{Deserialize, Serialize};

pub const MAX_SCORE: u32 = 100;

/// Penalty per reconciled finding, rows by severity, columns by confidence
/// (low / medium / high).
///
/// The default table:
///
/// | severity | low | medium | high |
/// |----------|----:|-------:|-----:|
/// | low      |   1 |      2 |    3 |
/// | medium   |   4 |      6 |    8 |
/// | high     |  30 |     40 |   50 |
/// | critical |  60 |     75 |   90 |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyTable {
    pub low: [u32; 3],
    pub medium: [u32; 3],
    pub high: [u32; 3],
    pub critical: [u32; 3],
}

impl Default for PenaltyTable {
    fn default() -> Self {
        Self {
            low: [1, 2, 3],
            medium: [4, 6, 8],
            high: [30, 40, 50],
            critical: [60, 75, 90],
        }
    }
}

impl PenaltyTable {
    pub fn penalty(&self, severity: Severity, confidence: Confidence) -> u32 {
        let row = match severity {
            Severity::Low => &self.low,
            Severity::Medium => &self.medium,
            Severity::High => &self.high,
            Severity::Critical => &self.critical,
        };
        row[confidence as usize]
    }

    /// Rejects tables that would produce incoherent scores: penalties must
    /// not decrease as severity or confidence rises, and a single high or
    /// critical finding must outweigh any single low/medium finding by a
    /// wide margin (3x) so that severe findings dominate the score.
    pub fn validate(&self) -> Result<()> {
        let rows = [&self.low, &self.medium, &self.high, &self.critical];

        for row in rows {
            if row[0] > row[1] || row[1] > row[2] {
                return Err(VetError::Config(
                    "penalty table must be non-decreasing in confidence".to_string(),
                ));
            }
        }
        for pair in rows.windows(2) {
            for col in 0..3 {
                if pair[0][col] > pair[1][col] {
                    return Err(VetError::Config(
                        "penalty table must be non-decreasing in severity".to_string(),
                    ));
                }
            }
        }

        let max_minor = self.medium[2].max(self.low[2]);
        if self.high[0] < max_minor.saturating_mul(3) {
            return Err(VetError::Config(
                "high/critical penalties must dominate low/medium penalties".to_string(),
            ));
        }
        Ok(())
    }
}

/// Severity histogram over reconciled findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn from_findings(findings: &[ReconciledFinding]) -> Self {
        findings.iter().fold(Self::default(), |mut acc, f| {
            match f.effective_severity {
                Severity::Critical => acc.critical += 1,
                Severity::High => acc.high += 1,
                Severity::Medium => acc.medium += 1,
                Severity::Low => acc.low += 1,
            }
            acc
        })
    }
}

/// Reduce reconciled findings to a score in `[0, 100]`, higher = safer.
pub fn score(findings: &[ReconciledFinding], table: &PenaltyTable) -> u8 {
    let total: u32 = findings
        .iter()
        .map(|f| table.penalty(f.effective_severity, f.effective_confidence))
        .sum();
    MAX_SCORE.saturating_sub(total) as u8
}
