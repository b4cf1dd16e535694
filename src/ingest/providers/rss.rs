// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::config::FeedConfig;
use crate::ingest::snippet_from;
use crate::ingest::types::SourceProvider;
use crate::item::{CandidateItem, Category};

// --- RSS 2.0 ---

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    guid: Option<TextNode>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

// --- Atom ---

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: Option<String>,
    title: Option<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<TextNode>,
    content: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Element text, ignoring attributes (`<guid isPermaLink="false">`, `<title type="html">`).
#[derive(Debug, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: String,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(ts.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_rfc3339(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an RSS 2.0 or Atom document into candidate items.
///
/// Per entry: id = guid | link | title; title defaults to "Untitled"; a missing or
/// unparsable date becomes `fetched_at`.
pub fn parse_feed(
    xml: &str,
    source: &str,
    category: Category,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<CandidateItem>> {
    let xml_clean = scrub_html_entities_for_xml(xml);

    let rss_err = match from_str::<Rss>(&xml_clean) {
        Ok(rss) => return Ok(rss_items(rss, source, category, fetched_at)),
        Err(e) => e,
    };
    match from_str::<AtomFeed>(&xml_clean) {
        Ok(feed) if !feed.entry.is_empty() || xml_clean.contains("<feed") => {
            Ok(atom_items(feed, source, category, fetched_at))
        }
        _ => Err(rss_err).with_context(|| format!("parsing {source} feed xml")),
    }
}

fn rss_items(
    rss: Rss,
    source: &str,
    category: Category,
    fetched_at: DateTime<Utc>,
) -> Vec<CandidateItem> {
    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let title = non_empty(it.title);
        let link = non_empty(it.link);
        let guid = non_empty(it.guid.map(|g| g.value));
        let id = guid
            .or_else(|| link.clone())
            .or_else(|| title.clone())
            .unwrap_or_default();
        out.push(CandidateItem {
            id,
            title: title.unwrap_or_else(|| "Untitled".to_string()),
            link: link.unwrap_or_default(),
            published: it
                .pub_date
                .as_deref()
                .and_then(parse_rfc2822)
                .unwrap_or(fetched_at),
            source: source.to_string(),
            category,
            snippet: it.description.as_deref().and_then(snippet_from),
        });
    }
    out
}

fn atom_items(
    feed: AtomFeed,
    source: &str,
    category: Category,
    fetched_at: DateTime<Utc>,
) -> Vec<CandidateItem> {
    let mut out = Vec::with_capacity(feed.entry.len());
    for e in feed.entry {
        let title = non_empty(e.title.map(|t| crate::ingest::normalize_text(&t.value)));
        // Prefer rel="alternate" (or no rel), else the first href.
        let link = e
            .links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| e.links.first())
            .and_then(|l| non_empty(l.href.clone()));
        let id = non_empty(e.id)
            .or_else(|| link.clone())
            .or_else(|| title.clone())
            .unwrap_or_default();
        let published = e
            .published
            .as_deref()
            .or(e.updated.as_deref())
            .and_then(parse_rfc3339)
            .unwrap_or(fetched_at);
        let snippet = e
            .summary
            .or(e.content)
            .and_then(|t| snippet_from(&t.value));
        out.push(CandidateItem {
            id,
            title: title.unwrap_or_else(|| "Untitled".to_string()),
            link: link.unwrap_or_default(),
            published,
            source: source.to_string(),
            category,
            snippet,
        });
    }
    out
}

pub struct RssProvider {
    name: String,
    category: Category,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssProvider {
    /// Parse the given XML instead of fetching (tests, offline runs).
    pub fn from_fixture(name: &str, category: Category, xml: &str) -> Self {
        Self {
            name: name.to_string(),
            category,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(feed: &FeedConfig, client: reqwest::Client) -> Self {
        Self {
            name: feed.name.clone(),
            category: feed.category,
            mode: Mode::Http {
                url: feed.url.clone(),
                client,
            },
        }
    }
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>> {
        let now = Utc::now();
        match &self.mode {
            Mode::Fixture(s) => parse_feed(s, &self.name, self.category, now),
            Mode::Http { url, client } => {
                let body = client
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .with_context(|| format!("{} http get()", self.name))?
                    .text()
                    .await
                    .with_context(|| format!("{} http .text()", self.name))?;
                parse_feed(&body, &self.name, self.category, now)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Demo</title>
  <item>
    <title>React Compiler goes stable</title>
    <link>https://example.test/react</link>
    <guid isPermaLink="false">abc-1</guid>
    <pubDate>Tue, 10 Jun 2025 08:00:00 GMT</pubDate>
    <description><![CDATA[<p>The <b>compiler</b>&nbsp;ships.</p>]]></description>
  </item>
  <item>
    <link>https://example.test/untitled</link>
  </item>
</channel></rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Demo</title>
  <entry>
    <id>tag:example.test,2025:1</id>
    <title type="html">VS Code 1.100 &amp; agents</title>
    <link rel="alternate" href="https://example.test/vscode"/>
    <updated>2025-06-10T08:00:00Z</updated>
    <summary>Agent mode everywhere.</summary>
  </entry>
</feed>"#;

    fn fetched() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap()
    }

    #[test]
    fn parses_rss_items() {
        let items = parse_feed(RSS, "Demo", Category::Essential, fetched()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "abc-1");
        assert_eq!(items[0].title, "React Compiler goes stable");
        assert_eq!(
            items[0].published,
            Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap()
        );
        assert_eq!(items[0].snippet.as_deref(), Some("The compiler ships."));
        assert_eq!(items[1].title, "Untitled");
        assert_eq!(items[1].id, "https://example.test/untitled");
        assert_eq!(items[1].published, fetched());
    }

    #[test]
    fn parses_atom_entries() {
        let items = parse_feed(ATOM, "VSCode.Email", Category::Professional, fetched()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "VS Code 1.100 & agents");
        assert_eq!(items[0].link, "https://example.test/vscode");
        assert_eq!(items[0].category, Category::Professional);
        assert_eq!(items[0].snippet.as_deref(), Some("Agent mode everywhere."));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_feed("<html><body>nope", "X", Category::Personal, fetched()).is_err());
    }
}
