//! Deduplicating merge of suggested items into an existing collection.
//!
//! Items are compared after trimming and lowercasing. Accepted candidates keep
//! their own casing (only surrounding whitespace is removed), and a candidate
//! that repeats an earlier one from the same batch is skipped.

use serde::Serialize;
use std::collections::HashSet;

/// Outcome of merging one batch of candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeResult {
    /// Candidates to persist, trimmed, in batch order.
    pub accepted: Vec<String>,
    /// Number of accepted candidates.
    pub added: usize,
    /// Number of candidates skipped as blank or duplicate.
    pub skipped: usize,
}

impl MergeResult {
    /// Whether nothing was accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Comparison key for an item.
#[must_use]
pub fn normalize(item: &str) -> String {
    item.trim().to_lowercase()
}

/// Merge `candidates` into `existing`, returning the candidates to add.
pub fn merge_suggestions<E, C>(existing: &[E], candidates: &[C]) -> MergeResult
where
    E: AsRef<str>,
    C: AsRef<str>,
{
    let mut seen: HashSet<String> = existing.iter().map(|item| normalize(item.as_ref())).collect();
    let mut result = MergeResult::default();

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let key = normalize(candidate);
        if key.is_empty() || !seen.insert(key) {
            result.skipped += 1;
            continue;
        }
        result.accepted.push(candidate.trim().to_string());
    }

    result.added = result.accepted.len();
    result
}
