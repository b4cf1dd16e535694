// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::config::{FeedConfig, FeedKind};
use crate::ingest::providers::{rss::RssProvider, snackpack::SnackPackScraper};
use crate::ingest::types::SourceProvider;
use crate::item::CandidateItem;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::time::Duration;

pub const USER_AGENT: &str = "feedbag/0.1.0 (personal news aggregator)";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Snippets are cut to this many chars.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_items_total", "Candidate items parsed from providers.");
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!("ingest_fetch_ms", "Provider fetch+parse time in milliseconds.");
    });
}

/// Shared HTTP client with the feed timeout and user agent.
pub fn http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(anyhow::Error::from)
}

/// Normalize text: decode entities, strip tags, ASCII quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Plain-text snippet from HTML-ish feed content; `None` when nothing is left.
pub fn snippet_from(raw: &str) -> Option<String> {
    let text = normalize_text(raw);
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(SNIPPET_MAX_CHARS).collect())
}

/// Build the provider for a configured feed. Unknown scrape targets yield `None`.
pub fn provider_for(
    feed: &FeedConfig,
    client: &reqwest::Client,
) -> Option<Box<dyn SourceProvider>> {
    match feed.kind {
        FeedKind::Rss => Some(Box::new(RssProvider::from_url(feed, client.clone()))),
        FeedKind::Scrape if SnackPackScraper::handles(feed) => {
            Some(Box::new(SnackPackScraper::from_url(feed, client.clone())))
        }
        FeedKind::Scrape => {
            tracing::warn!(target: "ingest", feed = %feed.name, "unknown scrape target");
            None
        }
    }
}

pub fn providers_for(
    feeds: &[FeedConfig],
    client: &reqwest::Client,
) -> Vec<Box<dyn SourceProvider>> {
    feeds.iter().filter_map(|f| provider_for(f, client)).collect()
}

/// Fetch every provider concurrently. A failing provider contributes zero items.
/// Result is sorted newest first.
pub async fn fetch_all(providers: &[Box<dyn SourceProvider>]) -> Vec<CandidateItem> {
    ensure_metrics_described();

    let results = futures::future::join_all(providers.iter().map(|p| async move {
        let t0 = std::time::Instant::now();
        let res = p.fetch_latest().await;
        histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        (p.name(), res)
    }))
    .await;

    let mut items = Vec::new();
    for (name, res) in results {
        match res {
            Ok(mut v) => {
                tracing::debug!(target: "ingest", provider = name, count = v.len(), "provider ok");
                counter!("ingest_items_total").increment(v.len() as u64);
                items.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = name, "provider error");
                counter!("ingest_provider_errors_total").increment(1);
            }
        }
    }

    items.sort_by(|a, b| b.published.cmp(&a.published));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_strips_tags_and_entities() {
        let s = "<p>Hello,&nbsp;&nbsp;<b>world</b>!</p>\n\n&ldquo;ok&rdquo;";
        assert_eq!(normalize_text(s), r#"Hello, world ! "ok""#);
    }

    #[test]
    fn snippet_is_capped() {
        let long = "x".repeat(500);
        assert_eq!(snippet_from(&long).unwrap().chars().count(), SNIPPET_MAX_CHARS);
        assert_eq!(snippet_from("<br/>  "), None);
    }
}
