//! Deduplication and reconciliation of raw findings.
//!
//! Two raw findings are merge candidates iff they sit in the same file and
//! the same line bucket (or both lack line information), and their
//! categories match or one of them is `other`. Reconciliation is a pure
//! function of the finding set: findings are canonically sorted before
//! grouping, so the order in which sources completed can never leak into
//! which duplicate "wins" or into output ordering.

use crate::rules::{Category, Confidence, Finding, Severity, Source};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// The merged unit of truth: all raw findings believed to describe one real
/// issue, plus the reconciled severity and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledFinding {
    /// Derived identity: `<file>:<category>:<line-bucket>`.
    pub fingerprint: String,
    pub members: Vec<Finding>,
    pub effective_severity: Severity,
    pub effective_confidence: Confidence,
    pub category: Category,
    /// Set when a finding has no corroboration, low confidence, and only
    /// the pattern engine behind it. Retained in the report rather than
    /// silently dropped.
    pub requires_review: bool,
}

impl ReconciledFinding {
    pub fn sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = self.members.iter().map(|m| m.source.label()).collect();
        sources.sort();
        sources.dedup();
        sources
    }
}

pub struct Reconciler {
    tolerance: u32,
}

impl Reconciler {
    pub fn new(tolerance: u32) -> Self {
        Self { tolerance }
    }

    /// Width of a line bucket. Two reports of the same issue that disagree
    /// by up to `tolerance` lines usually land in the same bucket.
    fn bucket_width(&self) -> u32 {
        2 * self.tolerance + 1
    }

    fn line_bucket(&self, line: Option<u32>) -> Option<u32> {
        line.map(|l| l / self.bucket_width())
    }

    pub fn reconcile(&self, mut findings: Vec<Finding>) -> Vec<ReconciledFinding> {
        // Canonical order first; everything downstream is order-independent.
        findings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut buckets: FxHashMap<(String, Option<u32>), Vec<Finding>> = FxHashMap::default();
        let mut bucket_keys: Vec<(String, Option<u32>)> = Vec::new();
        for finding in findings {
            let key = (
                finding.location.file.clone(),
                self.line_bucket(finding.location.line),
            );
            if !buckets.contains_key(&key) {
                bucket_keys.push(key.clone());
            }
            buckets.entry(key).or_default().push(finding);
        }
        bucket_keys.sort();

        let mut reconciled = Vec::new();
        for key in bucket_keys {
            let members = buckets.remove(&key).unwrap_or_default();
            self.cluster_bucket(&key, members, &mut reconciled);
        }

        // Deterministic report ordering: severity desc, confidence desc,
        // fingerprint asc.
        reconciled.sort_by(|a, b| {
            b.effective_severity
                .cmp(&a.effective_severity)
                .then(b.effective_confidence.cmp(&a.effective_confidence))
                .then(a.fingerprint.cmp(&b.fingerprint))
        });
        reconciled
    }

    /// Split one `(file, line-bucket)` group into clusters by category.
    /// `other` is a wildcard: an `other` finding joins the concrete cluster
    /// ranked highest by severity then confidence (category declaration
    /// order breaks exact ties), and only forms its own cluster when no
    /// concrete category is present.
    fn cluster_bucket(
        &self,
        key: &(String, Option<u32>),
        members: Vec<Finding>,
        out: &mut Vec<ReconciledFinding>,
    ) {
        let mut concrete: Vec<(Category, Vec<Finding>)> = Vec::new();
        let mut others: Vec<Finding> = Vec::new();

        for finding in members {
            if finding.category == Category::Other {
                others.push(finding);
                continue;
            }
            match concrete.iter().position(|(c, _)| *c == finding.category) {
                Some(i) => concrete[i].1.push(finding),
                None => concrete.push((finding.category, vec![finding])),
            }
        }

        if concrete.is_empty() {
            if !others.is_empty() {
                out.push(self.build(key, Category::Other, others));
            }
            return;
        }

        if !others.is_empty() {
            let target = concrete
                .iter()
                .enumerate()
                .max_by_key(|(idx, (_, cluster))| {
                    let severity = cluster.iter().map(|f| f.severity).max();
                    let confidence = cluster.iter().map(|f| f.confidence).max();
                    (severity, confidence, std::cmp::Reverse(*idx))
                })
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            concrete[target].1.append(&mut others);
        }

        for (category, mut cluster) in concrete {
            cluster.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
            out.push(self.build(key, category, cluster));
        }
    }

    fn build(
        &self,
        key: &(String, Option<u32>),
        cluster_category: Category,
        members: Vec<Finding>,
    ) -> ReconciledFinding {
        let effective_severity = members
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Low);
        // The maximum over members; with a single contributing source this
        // is that source's own confidence, unchanged. Only corroboration by
        // a second source can surface a higher value.
        let effective_confidence = members
            .iter()
            .map(|f| f.confidence)
            .max()
            .unwrap_or(Confidence::Low);

        let category = members
            .iter()
            .max_by(|a, b| {
                a.confidence
                    .cmp(&b.confidence)
                    .then(a.severity.cmp(&b.severity))
            })
            .map(|f| f.category)
            .unwrap_or(cluster_category);

        let mut distinct_sources: Vec<&Source> = members.iter().map(|f| &f.source).collect();
        distinct_sources.sort();
        distinct_sources.dedup();
        let requires_review = distinct_sources.len() == 1
            && matches!(distinct_sources[0], Source::PatternEngine)
            && effective_confidence == Confidence::Low;

        let bucket_label = key
            .1
            .map(|b| b.to_string())
            .unwrap_or_else(|| "-".to_string());
        let fingerprint = format!("{}:{}:{}", key.0, cluster_category.as_str(), bucket_label);

        ReconciledFinding {
            fingerprint,
            members,
            effective_severity,
            effective_confidence,
            category,
            requires_review,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::raw;
    use super::*;

    fn bandit() -> Source {
        Source::Tool("bandit".to_string())
    }

    #[test]
    fn test_identical_triple_from_two_sources_merges() {
        let findings = vec![
            raw(
                "CI-004",
                Source::PatternEngine,
                "run.py",
                Some(10),
                Category::CodeInjection,
                Severity::High,
                Confidence::Medium,
            ),
            raw(
                "B605",
                bandit(),
                "run.py",
                Some(10),
                Category::CodeInjection,
                Severity::High,
                Confidence::Low,
            ),
        ];
        let merged = Reconciler::new(2).reconcile(findings);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].members.len(), 2);
        assert!(merged[0].effective_confidence >= Confidence::Medium);
        assert!(merged[0].effective_confidence >= Confidence::Low);
    }

    #[test]
    fn test_nearby_lines_within_tolerance_merge() {
        // Pattern engine says line 10, SAST says line 11. Same issue.
        let findings = vec![
            raw(
                "CI-004",
                Source::PatternEngine,
                "run.py",
                Some(10),
                Category::CodeInjection,
                Severity::High,
                Confidence::Medium,
            ),
            raw(
                "B605",
                bandit(),
                "run.py",
                Some(11),
                Category::CodeInjection,
                Severity::Critical,
                Confidence::High,
            ),
        ];
        let merged = Reconciler::new(2).reconcile(findings);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].effective_severity, Severity::Critical);
        assert_eq!(merged[0].effective_confidence, Confidence::High);
    }

    #[test]
    fn test_severity_is_max_never_average() {
        let findings = vec![
            raw(
                "A",
                Source::PatternEngine,
                "x.py",
                Some(5),
                Category::SecretExposure,
                Severity::Critical,
                Confidence::High,
            ),
            raw(
                "B",
                bandit(),
                "x.py",
                Some(5),
                Category::SecretExposure,
                Severity::Low,
                Confidence::Low,
            ),
        ];
        let merged = Reconciler::new(2).reconcile(findings);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].effective_severity, Severity::Critical);
    }

    #[test]
    fn test_different_files_never_merge() {
        let findings = vec![
            raw(
                "A",
                Source::PatternEngine,
                "a.py",
                Some(1),
                Category::CodeInjection,
                Severity::High,
                Confidence::Medium,
            ),
            raw(
                "B",
                bandit(),
                "b.py",
                Some(1),
                Category::CodeInjection,
                Severity::High,
                Confidence::Medium,
            ),
        ];
        assert_eq!(Reconciler::new(2).reconcile(findings).len(), 2);
    }

    #[test]
    fn test_different_categories_never_merge() {
        let findings = vec![
            raw(
                "A",
                Source::PatternEngine,
                "a.py",
                Some(1),
                Category::CodeInjection,
                Severity::High,
                Confidence::Medium,
            ),
            raw(
                "B",
                bandit(),
                "a.py",
                Some(1),
                Category::SecretExposure,
                Severity::High,
                Confidence::Medium,
            ),
        ];
        assert_eq!(Reconciler::new(2).reconcile(findings).len(), 2);
    }

    #[test]
    fn test_other_category_joins_concrete_cluster() {
        let findings = vec![
            raw(
                "A",
                Source::PatternEngine,
                "a.py",
                Some(1),
                Category::CodeInjection,
                Severity::High,
                Confidence::High,
            ),
            raw(
                "X-404",
                bandit(),
                "a.py",
                Some(1),
                Category::Other,
                Severity::Medium,
                Confidence::Low,
            ),
        ];
        let merged = Reconciler::new(2).reconcile(findings);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].members.len(), 2);
        // Highest-confidence member carries the category
        assert_eq!(merged[0].category, Category::CodeInjection);
    }

    #[test]
    fn test_only_other_findings_form_other_cluster() {
        let findings = vec![raw(
            "X-404",
            bandit(),
            "a.py",
            Some(1),
            Category::Other,
            Severity::Medium,
            Confidence::Low,
        )];
        let merged = Reconciler::new(2).reconcile(findings);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].category, Category::Other);
    }

    #[test]
    fn test_lineless_findings_merge_together_not_with_lined() {
        let findings = vec![
            raw(
                "DEP-1",
                Source::Tool("safety".to_string()),
                "requirements.txt",
                None,
                Category::DependencyVulnerability,
                Severity::High,
                Confidence::Medium,
            ),
            raw(
                "DEP-2",
                Source::Tool("safety".to_string()),
                "requirements.txt",
                Some(3),
                Category::DependencyVulnerability,
                Severity::Low,
                Confidence::Medium,
            ),
        ];
        let merged = Reconciler::new(2).reconcile(findings);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_requires_review_flag() {
        // Single-source, low-confidence, pattern engine only
        let flagged = Reconciler::new(2).reconcile(vec![raw(
            "FS-001",
            Source::PatternEngine,
            "a.py",
            Some(1),
            Category::UnsafeFilesystemAccess,
            Severity::Low,
            Confidence::Low,
        )]);
        assert!(flagged[0].requires_review);

        // Corroborated: no flag
        let corroborated = Reconciler::new(2).reconcile(vec![
            raw(
                "FS-001",
                Source::PatternEngine,
                "a.py",
                Some(1),
                Category::UnsafeFilesystemAccess,
                Severity::Low,
                Confidence::Low,
            ),
            raw(
                "B-100",
                bandit(),
                "a.py",
                Some(1),
                Category::UnsafeFilesystemAccess,
                Severity::Low,
                Confidence::Low,
            ),
        ]);
        assert_eq!(corroborated.len(), 1);
        assert!(!corroborated[0].requires_review);

        // Tool-only low confidence: no flag either
        let tool_only = Reconciler::new(2).reconcile(vec![raw(
            "B-100",
            bandit(),
            "a.py",
            Some(1),
            Category::UnsafeFilesystemAccess,
            Severity::Low,
            Confidence::Low,
        )]);
        assert!(!tool_only[0].requires_review);
    }

    #[test]
    fn test_reconcile_is_order_independent() {
        let a = raw(
            "CI-004",
            Source::PatternEngine,
            "run.py",
            Some(10),
            Category::CodeInjection,
            Severity::High,
            Confidence::Medium,
        );
        let b = raw(
            "B605",
            bandit(),
            "run.py",
            Some(11),
            Category::CodeInjection,
            Severity::Critical,
            Confidence::High,
        );
        let c = raw(
            "SE-001",
            Source::PatternEngine,
            "conf.py",
            Some(2),
            Category::SecretExposure,
            Severity::Critical,
            Confidence::Medium,
        );

        let reconciler = Reconciler::new(2);
        let forward = reconciler.reconcile(vec![a.clone(), b.clone(), c.clone()]);
        let backward = reconciler.reconcile(vec![c, b, a]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_output_sorted_by_severity_then_confidence_then_fingerprint() {
        let findings = vec![
            raw(
                "L",
                Source::PatternEngine,
                "a.py",
                Some(1),
                Category::UnsafeFilesystemAccess,
                Severity::Low,
                Confidence::Medium,
            ),
            raw(
                "C",
                Source::PatternEngine,
                "b.py",
                Some(1),
                Category::SecretExposure,
                Severity::Critical,
                Confidence::High,
            ),
            raw(
                "H",
                Source::PatternEngine,
                "c.py",
                Some(1),
                Category::CodeInjection,
                Severity::High,
                Confidence::Medium,
            ),
        ];
        let merged = Reconciler::new(2).reconcile(findings);
        let severities: Vec<Severity> = merged.iter().map(|m| m.effective_severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Critical, Severity::High, Severity::Low]
        );
    }

    #[test]
    fn test_zero_tolerance_requires_exact_line() {
        let findings = vec![
            raw(
                "A",
                Source::PatternEngine,
                "a.py",
                Some(10),
                Category::CodeInjection,
                Severity::High,
                Confidence::Medium,
            ),
            raw(
                "B",
                bandit(),
                "a.py",
                Some(11),
                Category::CodeInjection,
                Severity::High,
                Confidence::Medium,
            ),
        ];
        assert_eq!(Reconciler::new(0).reconcile(findings).len(), 2);
    }

    #[test]
    fn test_fingerprint_format() {
        let merged = Reconciler::new(2).reconcile(vec![raw(
            "A",
            Source::PatternEngine,
            "scripts/run.py",
            Some(10),
            Category::CodeInjection,
            Severity::High,
            Confidence::Medium,
        )]);
        assert_eq!(merged[0].fingerprint, "scripts/run.py:code-injection:2");
    }
}
