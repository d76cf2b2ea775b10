use crate::rules::types::{Category, Confidence, Rule, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![fs_001(), fs_002(), fs_003()]
}

fn fs_001() -> Rule {
    Rule {
        id: "FS-001",
        name: "Write-mode file open",
        category: Category::UnsafeFilesystemAccess,
        severity: Severity::Low,
        confidence: Confidence::Low,
        patterns: vec![
            Regex::new(r#"open\s*\([^)]*,\s*["']w"#).expect("FS-001: invalid regex"),
        ],
        exclusions: vec![],
        message: "File opened for writing",
    }
}

fn fs_002() -> Rule {
    Rule {
        id: "FS-002",
        name: "Destructive filesystem operation",
        category: Category::UnsafeFilesystemAccess,
        severity: Severity::Low,
        confidence: Confidence::Medium,
        patterns: vec![
            Regex::new(r"shutil\.(?:rmtree|move)\s*\(").expect("FS-002: invalid regex"),
            Regex::new(r"os\.(?:remove|unlink|rmdir)\s*\(").expect("FS-002: invalid regex"),
        ],
        exclusions: vec![],
        message: "Destructive filesystem operation",
    }
}

fn fs_003() -> Rule {
    Rule {
        id: "FS-003",
        name: "Recursive force delete",
        category: Category::UnsafeFilesystemAccess,
        severity: Severity::Medium,
        confidence: Confidence::Medium,
        patterns: vec![
            Regex::new(r"\brm\s+-(?:rf|fr)\b").expect("FS-003: invalid regex"),
        ],
        exclusions: vec![],
        message: "Recursive force delete in shell command",
    }
}
