use crate::rules::types::{Category, Confidence, Rule, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![na_001(), na_002(), na_003()]
}

fn na_001() -> Rule {
    Rule {
        id: "NA-001",
        name: "Raw urllib/http.client request",
        category: Category::UnsafeNetworkAccess,
        severity: Severity::Medium,
        confidence: Confidence::Medium,
        patterns: vec![
            Regex::new(r"urllib\.request\.urlopen").expect("NA-001: invalid regex"),
            Regex::new(r"http\.client\.HTTPS?Connection").expect("NA-001: invalid regex"),
        ],
        exclusions: vec![
            Regex::new(r"localhost|127\.0\.0\.1|\[::1\]").expect("NA-001: invalid regex"),
        ],
        message: "Unrestricted outbound network call",
    }
}

fn na_002() -> Rule {
    Rule {
        id: "NA-002",
        name: "requests library call",
        category: Category::UnsafeNetworkAccess,
        severity: Severity::Medium,
        confidence: Confidence::Medium,
        patterns: vec![
            Regex::new(r"requests\.(?:get|post|put|delete|patch|head)\s*\(")
                .expect("NA-002: invalid regex"),
        ],
        exclusions: vec![
            Regex::new(r"localhost|127\.0\.0\.1|\[::1\]").expect("NA-002: invalid regex"),
        ],
        message: "Unrestricted outbound network call",
    }
}

fn na_003() -> Rule {
    Rule {
        id: "NA-003",
        name: "Remote script piped to shell",
        category: Category::UnsafeNetworkAccess,
        severity: Severity::High,
        confidence: Confidence::High,
        patterns: vec![
            Regex::new(r"(?:curl|wget)\s+[^|;]*\|\s*(?:ba|z|da)?sh\b")
                .expect("NA-003: invalid regex"),
        ],
        exclusions: vec![],
        message: "Remote content downloaded and piped directly into a shell",
    }
}
