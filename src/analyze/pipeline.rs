//! Dedup/rank pipeline.
//!
//! Stages run in a fixed order (swapping them changes results):
//! 1) seen filter: drop items whose link or title fingerprint is already in the store
//! 2) near-duplicate collapse across sources (first in batch wins)
//! 3) skip-topic partition: matching items become "source: title" skip lines
//! 4) priority sort: score with one `now`, stable sort by descending score
//!
//! The pipeline never mutates the seen store. Marking delivered items is the caller's job,
//! which is what makes preview runs possible.

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;

use super::dedup::{DedupParams, NearDuplicates};
use super::scoring::{Scorer, ScoringConfig, SubstringMatcher, TopicMatcher};
use crate::item::CandidateItem;
use crate::store::SeenStore;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_input_total", "Candidate items entering the pipeline.");
        describe_counter!(
            "pipeline_seen_dropped_total",
            "Items dropped because link or title was already delivered."
        );
        describe_counter!(
            "pipeline_duplicates_total",
            "Items collapsed as near-duplicates of an earlier item."
        );
        describe_counter!("pipeline_skipped_total", "Items routed to the skip list.");
        describe_counter!("pipeline_kept_total", "Items ranked for presentation.");
    });
}

/// A candidate plus its priority score; lives for one ranking pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: CandidateItem,
    pub score: i32,
}

/// Per-stage counts for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub input: usize,
    pub seen: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub kept: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    pub items: Vec<ScoredItem>,
    pub skipped: Vec<String>,
    pub stats: PipelineStats,
}

/// Stage 1: exact link / title-fingerprint lookup against the store.
pub fn filter_seen(items: Vec<CandidateItem>, store: &SeenStore) -> Vec<CandidateItem> {
    items
        .into_iter()
        .filter(|it| !store.is_link_seen(&it.link) && !store.is_title_seen(&it.title))
        .collect()
}

/// Stage 2: cross-source near-duplicate collapse.
pub fn collapse_near_duplicates(
    items: Vec<CandidateItem>,
    params: DedupParams,
) -> Vec<CandidateItem> {
    NearDuplicates::new(params).filter_batch(items)
}

/// Stage 3: split into (kept, skipped) on skip-topic hits.
pub fn partition_skip_topics<M: TopicMatcher>(
    items: Vec<CandidateItem>,
    skip_topics: &[String],
    matcher: &M,
) -> (Vec<CandidateItem>, Vec<CandidateItem>) {
    items
        .into_iter()
        .partition(|it| !matcher.matches(&it.topic_text(), skip_topics))
}

/// Stage 4: score and sort descending; ties keep their incoming order.
pub fn rank_by_priority<M: TopicMatcher>(
    items: Vec<CandidateItem>,
    scorer: &Scorer<'_, M>,
) -> Vec<ScoredItem> {
    let mut scored: Vec<ScoredItem> = items
        .into_iter()
        .map(|item| {
            let score = scorer.score(&item);
            ScoredItem { item, score }
        })
        .collect();
    // `sort_by` is stable.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Owns the configuration for a run; borrowing it keeps the entry point free of globals.
pub struct Pipeline<'a, M: TopicMatcher = SubstringMatcher> {
    scoring: &'a ScoringConfig,
    dedup: DedupParams,
    matcher: M,
}

impl<'a> Pipeline<'a, SubstringMatcher> {
    pub fn new(scoring: &'a ScoringConfig, dedup: DedupParams) -> Self {
        Self::with_matcher(scoring, dedup, SubstringMatcher)
    }
}

impl<'a, M: TopicMatcher + Clone> Pipeline<'a, M> {
    pub fn with_matcher(scoring: &'a ScoringConfig, dedup: DedupParams, matcher: M) -> Self {
        Self {
            scoring,
            dedup,
            matcher,
        }
    }

    /// Run all stages with the current wall-clock as scoring "now".
    pub fn run(&self, items: Vec<CandidateItem>, store: &SeenStore) -> PipelineResult {
        self.run_at(items, store, Utc::now())
    }

    pub fn run_at(
        &self,
        items: Vec<CandidateItem>,
        store: &SeenStore,
        now: DateTime<Utc>,
    ) -> PipelineResult {
        ensure_metrics_described();
        let mut stats = PipelineStats {
            input: items.len(),
            ..PipelineStats::default()
        };

        let fresh = filter_seen(items, store);
        stats.seen = stats.input - fresh.len();

        let before = fresh.len();
        let unique = collapse_near_duplicates(fresh, self.dedup);
        stats.duplicates = before - unique.len();

        let (kept, skipped) =
            partition_skip_topics(unique, &self.scoring.skip_topics, &self.matcher);
        stats.skipped = skipped.len();

        let scorer = Scorer::with_matcher(self.scoring, self.matcher.clone(), now);
        let ranked = rank_by_priority(kept, &scorer);
        stats.kept = ranked.len();

        counter!("pipeline_input_total").increment(stats.input as u64);
        counter!("pipeline_seen_dropped_total").increment(stats.seen as u64);
        counter!("pipeline_duplicates_total").increment(stats.duplicates as u64);
        counter!("pipeline_skipped_total").increment(stats.skipped as u64);
        counter!("pipeline_kept_total").increment(stats.kept as u64);

        tracing::info!(
            target: "pipeline",
            input = stats.input,
            seen = stats.seen,
            duplicates = stats.duplicates,
            skipped = stats.skipped,
            kept = stats.kept,
            "dedup/rank pass finished"
        );

        PipelineResult {
            items: ranked,
            skipped: skipped.iter().map(CandidateItem::skip_label).collect(),
            stats,
        }
    }
}
