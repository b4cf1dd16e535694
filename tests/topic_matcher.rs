// tests/topic_matcher.rs
// A word-boundary matcher plugged into the pipeline in place of substring matching.
use chrono::{Duration, Utc};
use feedbag::analyze::{DedupParams, Pipeline, ScoringConfig, Scorer, TopicMatcher};
use feedbag::{CandidateItem, Category, SeenStore};
use regex::RegexBuilder;

#[derive(Clone, Copy)]
struct WholeWord;

impl TopicMatcher for WholeWord {
    fn matches(&self, text: &str, topics: &[String]) -> bool {
        topics.iter().any(|t| {
            RegexBuilder::new(&format!(r"\b{}\b", regex::escape(t)))
                .case_insensitive(true)
                .build()
                .map(|re| re.is_match(text))
                .unwrap_or(false)
        })
    }
}

fn item(title: &str) -> CandidateItem {
    CandidateItem {
        id: title.into(),
        title: title.into(),
        link: format!("https://example.test/{}", title.len()),
        published: Utc::now() - Duration::days(2),
        source: "Feed".into(),
        category: Category::Personal,
        snippet: None,
    }
}

fn cfg() -> ScoringConfig {
    ScoringConfig {
        priority_topics: vec!["ai".into()],
        skip_topics: vec!["war".into()],
        ..ScoringConfig::default()
    }
}

#[test]
fn substring_and_whole_word_disagree_on_embedded_topics() {
    let c = cfg();
    let now = Utc::now();
    let substring = Scorer::new(&c, now);
    let whole = Scorer::with_matcher(&c, WholeWord, now);

    // "ai" inside "maintainers"
    let it = item("Open source maintainers meet");
    assert_eq!(substring.score(&it), 10);
    assert_eq!(whole.score(&it), 0);
}

#[test]
fn pipeline_uses_the_supplied_matcher_for_skips() {
    let c = cfg();
    let dedup = DedupParams {
        similarity_threshold: 0.6,
    };
    let items = vec![item("Software warranty law update"), item("War games")];

    let default_run = Pipeline::new(&c, dedup).run(items.clone(), &SeenStore::in_memory());
    assert_eq!(default_run.skipped.len(), 2);

    let whole_run =
        Pipeline::with_matcher(&c, dedup, WholeWord).run(items, &SeenStore::in_memory());
    assert_eq!(whole_run.skipped, vec!["Feed: War games".to_string()]);
    assert_eq!(whole_run.items.len(), 1);
}
