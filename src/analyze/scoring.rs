//! Priority scoring.
//!
//! Score = sum of independent contributions:
//! - priority topic hit   (+10 by default)
//! - interest topic hit   (+5)
//! - skip topic hit       (−20)
//! - category weight      (essential +3, professional +1, personal 0)
//! - recency              (+2 under 24h, +3 more under 6h)
//!
//! All weights and topic lists come from [`ScoringConfig`]; "now" is fixed once per
//! [`Scorer`] so every item in a pass is aged against the same instant.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::item::{CandidateItem, Category};

/// Decides whether a text mentions any of the given topics.
pub trait TopicMatcher {
    fn matches(&self, text: &str, topics: &[String]) -> bool;
}

/// Case-insensitive contiguous-substring matching ("core web vitals" must appear as-is).
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl TopicMatcher for SubstringMatcher {
    fn matches(&self, text: &str, topics: &[String]) -> bool {
        if topics.is_empty() {
            return false;
        }
        let lower = text.to_lowercase();
        topics
            .iter()
            .any(|t| !t.is_empty() && lower.contains(&t.to_lowercase()))
    }
}

/// Additive score contributions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub priority: i32,
    pub interest: i32,
    pub skip: i32,
    pub essential: i32,
    pub professional: i32,
    pub personal: i32,
    pub fresh_24h: i32,
    pub fresh_6h: i32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            priority: 10,
            interest: 5,
            skip: -20,
            essential: 3,
            professional: 1,
            personal: 0,
            fresh_24h: 2,
            fresh_6h: 3,
        }
    }
}

impl ScoreWeights {
    pub fn category(&self, c: Category) -> i32 {
        match c {
            Category::Essential => self.essential,
            Category::Professional => self.professional,
            Category::Personal => self.personal,
        }
    }
}

/// Topic lists + weights. Passed explicitly into the scorer and pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub priority_topics: Vec<String>,
    #[serde(default)]
    pub interest_topics: Vec<String>,
    #[serde(default)]
    pub skip_topics: Vec<String>,
    #[serde(default)]
    pub weights: ScoreWeights,
}

/// Scores items against one config and one `now` snapshot.
pub struct Scorer<'a, M: TopicMatcher = SubstringMatcher> {
    config: &'a ScoringConfig,
    matcher: M,
    now: DateTime<Utc>,
}

impl<'a> Scorer<'a, SubstringMatcher> {
    pub fn new(config: &'a ScoringConfig, now: DateTime<Utc>) -> Self {
        Self::with_matcher(config, SubstringMatcher, now)
    }
}

impl<'a, M: TopicMatcher> Scorer<'a, M> {
    pub fn with_matcher(config: &'a ScoringConfig, matcher: M, now: DateTime<Utc>) -> Self {
        Self {
            config,
            matcher,
            now,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn score(&self, item: &CandidateItem) -> i32 {
        let w = &self.config.weights;
        let text = item.topic_text();
        let mut score = 0;

        if self.matcher.matches(&text, &self.config.priority_topics) {
            score += w.priority;
        }
        if self.matcher.matches(&text, &self.config.interest_topics) {
            score += w.interest;
        }
        if self.matcher.matches(&text, &self.config.skip_topics) {
            score += w.skip;
        }

        score += w.category(item.category);

        // Future-dated items have negative age and count as fresh.
        let age = self.now.signed_duration_since(item.published);
        if age < Duration::hours(24) {
            score += w.fresh_24h;
        }
        if age < Duration::hours(6) {
            score += w.fresh_6h;
        }

        score
    }

    /// True when the item's text hits a skip topic.
    pub fn is_skipped(&self, item: &CandidateItem) -> bool {
        self.matcher
            .matches(&item.topic_text(), &self.config.skip_topics)
    }
}
