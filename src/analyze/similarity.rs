//! Title similarity: token sets + Jaccard index.
//!
//! Used only within a single ranking run; nothing here is persisted.

use std::collections::HashSet;

/// Tokens of this many chars or fewer are dropped ("a", "of", "js").
const MIN_TOKEN_EXCLUSIVE: usize = 2;

/// Lower-case, strip everything outside `[a-z0-9]`/whitespace, split on whitespace,
/// drop short tokens.
pub fn tokenize(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    let cleaned: String = lower
        .chars()
        // BOM separates words, same as in title fingerprints.
        .map(|c| if c == '\u{feff}' { ' ' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    cleaned
        .split_whitespace()
        .filter(|t| t.len() > MIN_TOKEN_EXCLUSIVE)
        .map(str::to_string)
        .collect()
}

/// Jaccard index |a ∩ b| / |a ∪ b| in [0, 1]; 0 when both sets are empty.
pub fn similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}
