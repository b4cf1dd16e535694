// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod briefing;
pub mod config;
pub mod item;
pub mod store;

// Dedup/scoring core (similarity, near-duplicate collapse, scoring, pipeline)
pub mod analyze;

// Feed providers and concurrent fetch
pub mod ingest;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{
    process_items, DedupParams, Pipeline, PipelineResult, ScoredItem, ScoringConfig,
};
pub use crate::config::FeedbagConfig;
pub use crate::item::{CandidateItem, Category};
pub use crate::store::{SeenStats, SeenStore};
