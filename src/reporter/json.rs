use crate::reporter::{Reporter, SkillReport};

pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn report(&self, report: &SkillReport) -> String {
        serde_json::to_string_pretty(report)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize report: {}"}}"#, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::fixtures;
    use crate::rules::{Category, Severity};

    #[test]
    fn test_json_output_structure() {
        let reporter = JsonReporter::new();
        let output = reporter.report(&fixtures::report(vec![], 100, true));

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["skill_name"], "demo-skill");
        assert_eq!(parsed["security"]["score"], 100);
        assert_eq!(parsed["security"]["sources_succeeded"][0], "pattern-engine");
    }

    #[test]
    fn test_json_output_with_findings() {
        let reporter = JsonReporter::new();
        let report = fixtures::report(
            vec![fixtures::reconciled(
                Severity::Critical,
                Category::SecretExposure,
            )],
            40,
            true,
        );
        let output = reporter.report(&report);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let finding = &parsed["security"]["reconciled_findings"][0];
        assert_eq!(finding["effective_severity"], "critical");
        assert_eq!(finding["category"], "secret-exposure");
        assert_eq!(finding["members"][0]["source"], "pattern-engine");
        assert_eq!(parsed["security"]["severity_counts"]["critical"], 1);
    }

    #[test]
    fn test_json_roundtrip() {
        let reporter = JsonReporter::new();
        let report = fixtures::report(vec![], 100, true);
        let output = reporter.report(&report);
        let back: SkillReport = serde_json::from_str(&output).unwrap();
        assert_eq!(back.skill_name, report.skill_name);
        assert_eq!(back.security.score, report.security.score);
    }
}
