use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// How certain a source is that a finding is a true positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    SecretExposure,
    CodeInjection,
    UnsafeNetworkAccess,
    UnsafeFilesystemAccess,
    DependencyVulnerability,
    WeakCrypto,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::SecretExposure => "secret-exposure",
            Category::CodeInjection => "code-injection",
            Category::UnsafeNetworkAccess => "unsafe-network-access",
            Category::UnsafeFilesystemAccess => "unsafe-filesystem-access",
            Category::DependencyVulnerability => "dependency-vulnerability",
            Category::WeakCrypto => "weak-crypto",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which signal source reported a finding.
///
/// Serializes as `"pattern-engine"` or `"tool:<name>"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    PatternEngine,
    Tool(String),
}

impl Source {
    pub fn label(&self) -> String {
        match self {
            Source::PatternEngine => "pattern-engine".to_string(),
            Source::Tool(name) => format!("tool:{name}"),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Source {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Source {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == "pattern-engine" {
            Ok(Source::PatternEngine)
        } else if let Some(name) = s.strip_prefix("tool:") {
            Ok(Source::Tool(name.to_string()))
        } else {
            Err(D::Error::custom(format!("unknown source: {s}")))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            file: file.into(),
            line,
            column: None,
        }
    }
}

/// One raw detected issue from a single source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub source: Source,
    pub location: Location,
    pub category: Category,
    pub severity: Severity,
    pub confidence: Confidence,
    pub message: String,
    /// Opaque source payload, kept for report detail only. Matching logic
    /// never reads it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl Finding {
    pub fn from_rule(rule: &Rule, location: Location) -> Self {
        Self {
            rule_id: rule.id.to_string(),
            source: Source::PatternEngine,
            location,
            category: rule.category,
            severity: rule.severity,
            confidence: rule.confidence,
            message: rule.message.to_string(),
            raw: None,
        }
    }

    /// Canonical ordering key. Output ordering and merge behaviour derive
    /// from this, never from the order sources happened to complete in.
    pub fn sort_key(&self) -> (String, Option<u32>, Category, String, String) {
        (
            self.location.file.clone(),
            self.location.line,
            self.category,
            self.source.label(),
            self.rule_id.clone(),
        )
    }
}

/// A detection rule in the builtin catalog.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub confidence: Confidence,
    pub patterns: Vec<regex::Regex>,
    pub exclusions: Vec<regex::Regex>,
    pub message: &'static str,
}

/// One file of a skill as supplied by the structural validator. The engine
/// never does its own filesystem traversal.
#[derive(Debug, Clone)]
pub struct ScanFile {
    pub path: String,
    pub text: String,
}

impl ScanFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}
