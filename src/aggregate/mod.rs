//! Finding aggregation and scoring.
//!
//! Raw per-source findings flow through normalization into one canonical
//! shape, duplicates describing the same underlying issue are reconciled,
//! and the result is reduced to a severity-ranked assessment with a single
//! score. The orchestrator drives the whole pipeline under a time budget.

pub mod dedupe;
pub mod normalize;
pub mod orchestrator;
pub mod score;

pub use dedupe::{ReconciledFinding, Reconciler};
pub use orchestrator::{Orchestrator, ScanPhase, SecurityAssessment, SourceFailure};
pub use score::{PenaltyTable, SeverityCounts};
