use crate::rules::types::{Category, Confidence, Rule, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![wc_001(), wc_002()]
}

fn wc_001() -> Rule {
    Rule {
        id: "WC-001",
        name: "Broken hash algorithm",
        category: Category::WeakCrypto,
        severity: Severity::Medium,
        confidence: Confidence::Medium,
        patterns: vec![
            Regex::new(r"hashlib\.(?:md5|sha1)\s*\(").expect("WC-001: invalid regex"),
            Regex::new(r"Crypto\.Hash\.(?:MD5|SHA1?)\b").expect("WC-001: invalid regex"),
        ],
        exclusions: vec![
            // Non-security uses (cache keys, checksums) routinely set this
            Regex::new(r"usedforsecurity\s*=\s*False").expect("WC-001: invalid regex"),
        ],
        message: "MD5/SHA-1 are broken for security purposes",
    }
}

fn wc_002() -> Rule {
    Rule {
        id: "WC-002",
        name: "Weak cipher or mode",
        category: Category::WeakCrypto,
        severity: Severity::High,
        confidence: Confidence::Medium,
        patterns: vec![
            Regex::new(r"\bMODE_ECB\b").expect("WC-002: invalid regex"),
            Regex::new(r"\bDES3?\.new\s*\(").expect("WC-002: invalid regex"),
        ],
        exclusions: vec![],
        message: "Weak cipher or block mode (DES/ECB)",
    }
}
