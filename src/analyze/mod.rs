// src/analyze/mod.rs
//! Dedup/scoring core: similarity, near-duplicate collapse, priority scoring and the
//! pipeline that chains them. Pure computation over an in-memory batch; no I/O, no async.

pub mod dedup;
pub mod pipeline;
pub mod scoring;
pub mod similarity;

// Re-export convenient types.
pub use crate::analyze::dedup::{DedupParams, NearDuplicates, DEFAULT_SIMILARITY_THRESHOLD};
pub use crate::analyze::pipeline::{
    collapse_near_duplicates, filter_seen, partition_skip_topics, rank_by_priority, Pipeline,
    PipelineResult, PipelineStats, ScoredItem,
};
pub use crate::analyze::scoring::{
    ScoreWeights, Scorer, ScoringConfig, SubstringMatcher, TopicMatcher,
};
pub use crate::analyze::similarity::{similarity, tokenize};

use crate::item::CandidateItem;
use crate::store::SeenStore;

/// One-shot entry with the default substring matcher and wall-clock "now".
pub fn process_items(
    items: Vec<CandidateItem>,
    store: &SeenStore,
    scoring: &ScoringConfig,
    dedup: DedupParams,
) -> PipelineResult {
    Pipeline::new(scoring, dedup).run(items, store)
}
