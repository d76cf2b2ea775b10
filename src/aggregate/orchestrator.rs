//! Aggregation orchestrator.
//!
//! Drives the pattern engine and all available tool adapters under a
//! scan-level time budget, tolerating any individual source being absent,
//! slow, or crashing, and reduces whatever completed into one
//! `SecurityAssessment`.

use crate::adapters::{ProcessRegistry, ToolAdapter, registered_adapters};
use crate::aggregate::dedupe::{ReconciledFinding, Reconciler};
use crate::aggregate::score::{self, SeverityCounts};
use crate::config::ScanConfig;
use crate::error::{Result, SourceError};
use crate::rules::{Finding, PatternEngine, ScanFile, Severity, Source};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Instant;
use tracing::{debug, warn};

/// Scan lifecycle. `Done { partial: true }` means every external source
/// failed and only the pattern engine contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Dispatching,
    Collecting,
    Reconciling,
    Done { partial: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    pub reason: SourceError,
}

/// Scan result for one skill at one point in time. Created fresh per scan
/// invocation and immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityAssessment {
    pub skill_id: String,
    pub scanned_at: String,
    pub sources_attempted: Vec<String>,
    pub sources_succeeded: Vec<String>,
    pub sources_failed: Vec<SourceFailure>,
    pub reconciled_findings: Vec<ReconciledFinding>,
    pub severity_counts: SeverityCounts,
    pub score: u8,
    pub partial: bool,
}

impl SecurityAssessment {
    pub fn has_critical(&self) -> bool {
        self.reconciled_findings
            .iter()
            .any(|f| f.effective_severity == Severity::Critical)
    }
}

pub struct Orchestrator {
    config: ScanConfig,
    engine: PatternEngine,
    adapters: Vec<Arc<dyn ToolAdapter>>,
    procs: Arc<ProcessRegistry>,
}

impl Orchestrator {
    /// Fails fast on invalid configuration, the only error that prevents a
    /// scan from producing an assessment.
    pub fn new(config: ScanConfig) -> Result<Self> {
        let adapters = registered_adapters(&config.tools);
        Self::with_adapters(config, adapters)
    }

    /// Test seam: adapters driven from recorded fixtures instead of live
    /// binaries.
    pub fn with_adapters(
        config: ScanConfig,
        adapters: Vec<Arc<dyn ToolAdapter>>,
    ) -> Result<Self> {
        config.validate()?;
        crate::rules::builtin::validate_catalog()?;
        Ok(Self {
            config,
            engine: PatternEngine::new(),
            adapters,
            procs: Arc::new(ProcessRegistry::new()),
        })
    }

    /// Kill every still-running adapter process. Safe to call from another
    /// thread while `scan` is in flight.
    pub fn cancel(&self) {
        self.procs.kill_all();
    }

    pub fn scan(&self, skill_id: &str, skill_root: &Path, files: &[ScanFile]) -> SecurityAssessment {
        let mut phase = ScanPhase::Idle;
        let scanned_at = chrono::Utc::now().to_rfc3339();

        // Availability is a value computed once per scan; a tool installed
        // or removed mid-scan is next scan's news.
        let available: Vec<Arc<dyn ToolAdapter>> = self
            .adapters
            .iter()
            .filter(|a| a.is_available())
            .cloned()
            .collect();

        let mut sources_attempted: Vec<String> = vec![Source::PatternEngine.label()];
        sources_attempted.extend(self.adapters.iter().map(|a| a.source().label()));

        let mut failures: Vec<SourceFailure> = self
            .adapters
            .iter()
            .filter(|a| !available.iter().any(|b| b.name() == a.name()))
            .map(|a| SourceFailure {
                source: a.source().label(),
                reason: SourceError::NotInstalled,
            })
            .collect();

        self.advance(&mut phase, ScanPhase::Dispatching);
        let (tx, rx) = mpsc::channel::<(String, std::result::Result<Vec<Finding>, SourceError>)>();
        for adapter in &available {
            let adapter = Arc::clone(adapter);
            let tx = tx.clone();
            let procs = Arc::clone(&self.procs);
            let root = skill_root.to_path_buf();
            let timeout = self.config.tool_timeout();
            // Detached worker: if the global deadline fires first, the scan
            // walks away and the worker's result is simply never received.
            std::thread::spawn(move || {
                let result = adapter
                    .invoke(&root, timeout, &procs)
                    .and_then(|raw| adapter.parse(&raw));
                let _ = tx.send((adapter.source().label(), result));
            });
        }
        drop(tx);

        // The pattern engine is in-process and synchronous; it runs while
        // the adapters do their work in parallel.
        let mut findings = self.engine.scan(files);

        self.advance(&mut phase, ScanPhase::Collecting);
        let deadline = Instant::now() + self.config.global_timeout();
        let mut pending: Vec<String> = available.iter().map(|a| a.source().label()).collect();
        let mut succeeded: Vec<String> = vec![Source::PatternEngine.label()];

        while !pending.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((source, Ok(tool_findings))) => {
                    debug!(source = %source, count = tool_findings.len(), "source completed");
                    pending.retain(|s| s != &source);
                    succeeded.push(source);
                    findings.extend(tool_findings);
                }
                Ok((source, Err(reason))) => {
                    warn!(source = %source, reason = %reason, "source failed");
                    pending.retain(|s| s != &source);
                    failures.push(SourceFailure { source, reason });
                }
                Err(mpsc::RecvTimeoutError::Timeout) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                    break;
                }
            }
        }

        if !pending.is_empty() {
            // Global deadline: record the stragglers as timed out and kill
            // their processes; their results are not awaited further.
            for source in pending.drain(..) {
                warn!(source = %source, "source exceeded the scan deadline");
                failures.push(SourceFailure {
                    source,
                    reason: SourceError::TimedOut {
                        secs: self.config.global_timeout_secs,
                    },
                });
            }
            self.procs.kill_all();
        }

        self.advance(&mut phase, ScanPhase::Reconciling);
        let reconciled = Reconciler::new(self.config.line_tolerance).reconcile(findings);
        let severity_counts = SeverityCounts::from_findings(&reconciled);
        let skill_score = score::score(&reconciled, &self.config.penalties);

        succeeded.sort();
        failures.sort_by(|a, b| a.source.cmp(&b.source));

        let external_attempted = self.adapters.len();
        let external_succeeded = succeeded
            .iter()
            .filter(|s| s.as_str() != "pattern-engine")
            .count();
        let partial = external_attempted > 0 && external_succeeded == 0;
        self.advance(&mut phase, ScanPhase::Done { partial });

        SecurityAssessment {
            skill_id: skill_id.to_string(),
            scanned_at,
            sources_attempted,
            sources_succeeded: succeeded,
            sources_failed: failures,
            reconciled_findings: reconciled,
            severity_counts,
            score: skill_score,
            partial,
        }
    }

    fn advance(&self, phase: &mut ScanPhase, next: ScanPhase) {
        debug!(from = ?phase, to = ?next, "scan phase");
        *phase = next;
    }
}
