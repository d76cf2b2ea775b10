mod crypto;
mod filesystem;
mod injection;
mod network;
mod secrets;

use crate::error::{Result, VetError};
use crate::rules::types::Rule;
use std::collections::HashSet;
use std::sync::LazyLock;

static ALL_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let mut rules = Vec::with_capacity(16);
    rules.extend(secrets::rules());
    rules.extend(injection::rules());
    rules.extend(network::rules());
    rules.extend(filesystem::rules());
    rules.extend(crypto::rules());
    rules
});

pub fn all_rules() -> &'static [Rule] {
    &ALL_RULES
}

/// Structural validation of the rule catalog, run once at scan start.
///
/// The regex engine guarantees matching time linear in the haystack, so
/// pathological backtracking cannot be introduced by a pattern; what can go
/// wrong structurally is duplicate ids or a rule with nothing to match.
pub fn validate_catalog() -> Result<()> {
    let mut seen = HashSet::new();
    for rule in all_rules() {
        if !seen.insert(rule.id) {
            return Err(VetError::Config(format!("duplicate rule id: {}", rule.id)));
        }
        if rule.patterns.is_empty() {
            return Err(VetError::Config(format!(
                "rule {} has no patterns",
                rule.id
            )));
        }
    }
    Ok(())
}
