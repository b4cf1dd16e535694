//! Cross-source near-duplicate collapse.
//!
//! Goal: the same story reported by several feeds (different URLs, reworded titles)
//! should reach the briefing once.
//!
//! - Configure with `DedupParams { similarity_threshold }`
//! - Call `should_drop(title)` per item in incoming order: returns `true` if the title is a
//!   near-duplicate of an already accepted one, otherwise `false` (and the title is remembered)
//! - Or call `filter_batch(items)` to keep only accepted items in one pass.
//!
//! Similarity metric: Jaccard index over title token sets (see `similarity`).
//! An item is a duplicate if any accepted title has similarity strictly above the threshold.
//! First-seen wins; there is no score-based tie-break here because scoring runs later.
//!
//! Cost is O(n²) in batch size, fine for the low hundreds of items a briefing sees.

use std::collections::HashSet;

use super::similarity::{similarity, tokenize};
use crate::item::CandidateItem;

/// Configuration for near-duplicate collapse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DedupParams {
    /// Similarity in [0.0, 1.0]. Titles strictly above this are duplicates.
    pub similarity_threshold: f64,
}

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

impl Default for DedupParams {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Remembers the token sets of titles accepted so far in this batch.
#[derive(Debug)]
pub struct NearDuplicates {
    params: DedupParams,
    accepted: Vec<HashSet<String>>,
}

impl NearDuplicates {
    pub fn new(mut params: DedupParams) -> Self {
        // NaN would make every comparison false; treat it as the default.
        if params.similarity_threshold.is_nan() {
            params.similarity_threshold = DEFAULT_SIMILARITY_THRESHOLD;
        }
        params.similarity_threshold = params.similarity_threshold.clamp(0.0, 1.0);
        Self {
            params,
            accepted: Vec::new(),
        }
    }

    pub fn params(&self) -> &DedupParams {
        &self.params
    }

    /// Decide whether to drop `title`; remembers it when accepted.
    pub fn should_drop(&mut self, title: &str) -> bool {
        let tokens = tokenize(title);
        let dup = self
            .accepted
            .iter()
            .any(|seen| similarity(&tokens, seen) > self.params.similarity_threshold);
        if !dup {
            self.accepted.push(tokens);
        }
        dup
    }

    /// Batch helper: keeps only accepted items, in order.
    pub fn filter_batch<I>(&mut self, items: I) -> Vec<CandidateItem>
    where
        I: IntoIterator<Item = CandidateItem>,
    {
        let mut out = Vec::new();
        for it in items {
            if self.should_drop(&it.title) {
                tracing::debug!(
                    target: "pipeline",
                    source = %it.source,
                    title = %it.title,
                    "near-duplicate dropped"
                );
                continue;
            }
            out.push(it);
        }
        out
    }
}
