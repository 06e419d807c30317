//! Cache key builders.
//!
//! Centralising key construction keeps the decorator and any bulk
//! invalidation in agreement about the key layout.

use uuid::Uuid;

use sample_core::traits::entity::Entity;

/// Prefix applied to repository entries.
const REPOSITORY_PREFIX: &str = "repo";

/// Cache key for one entity by ID: `repo_{Type}_{id}`.
pub fn repository_key<T: Entity>(id: Uuid) -> String {
    format!("{REPOSITORY_PREFIX}_{}_{id}", T::NAME)
}

/// Pattern matching every cached entity of type `T`: `repo_{Type}_*`.
pub fn repository_pattern<T: Entity>() -> String {
    format!("{REPOSITORY_PREFIX}_{}_*", T::NAME)
}

/// Shorten long keys for log output: `first10...last10`.
pub fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 20 {
        return key.to_string();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 10..].iter().collect();
    format!("{head}...{tail}")
}

/// Simple glob match: `*` matches anything, literal segments must appear in
/// order (case-insensitive).
pub fn matches_pattern(key: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    let key = key.to_lowercase();
    let mut rest = key.as_str();
    for part in pattern.split('*').filter(|p| !p.is_empty()) {
        let part = part.to_lowercase();
        match rest.find(&part) {
            Some(index) => rest = &rest[index + part.len()..],
            None => return false,
        }
    }
    true
}
