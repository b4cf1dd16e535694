//! # Briefing
//!
//! Renders a ranked pipeline result as markdown, JSON or plain text.
//! Pure string building; writing to stdout/files is the CLI's job.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::analyze::ScoredItem;
use crate::config::BriefingLimits;
use crate::item::{CandidateItem, Category};

/// Personal items shown at most.
const MAX_PERSONAL: usize = 2;
/// Skip lines listed before "...and N more".
const MAX_SKIP_LINES: usize = 5;
/// Items in the plain-text digest.
const MAX_PLAIN_ITEMS: usize = 10;
const SNIPPET_PREVIEW_CHARS: usize = 150;

const RULE: &str = "═══════════════════════════════════════════════════════";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Markdown,
    Json,
    Plain,
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Format::Markdown),
            "json" => Ok(Format::Json),
            "plain" | "text" => Ok(Format::Plain),
            other => anyhow::bail!("unknown format: {other}"),
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Markdown => "markdown",
            Format::Json => "json",
            Format::Plain => "plain",
        })
    }
}

/// File name for a saved briefing: the UTC calendar date, `YYYY-MM-DD.md`.
pub fn archive_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    format!("{}.md", now.with_timezone(&Utc).format("%Y-%m-%d"))
}

/// Render in the requested format.
pub fn render<Tz>(
    format: Format,
    items: &[ScoredItem],
    skipped: &[String],
    limits: BriefingLimits,
    now: &DateTime<Tz>,
) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match format {
        Format::Markdown => Ok(markdown(items, skipped, limits, now)),
        Format::Json => json(items, skipped, now),
        Format::Plain => Ok(plain(items, skipped, now)),
    }
}

fn long_date<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("%A, %B %-d, %Y").to_string()
}

fn format_item(item: &CandidateItem, index: usize) -> Vec<String> {
    let mut lines = vec![
        format!("{index}. **{}**", item.title),
        format!("   Source: {}", item.source),
        format!("   {}", item.link),
    ];
    if let Some(snippet) = item.snippet.as_deref() {
        let preview: String = snippet.chars().take(SNIPPET_PREVIEW_CHARS).collect();
        lines.push(format!("   > {preview}..."));
    }
    lines
}

fn in_category(items: &[ScoredItem], c: Category, max: usize) -> Vec<&CandidateItem> {
    items
        .iter()
        .map(|s| &s.item)
        .filter(|i| i.category == c)
        .take(max)
        .collect()
}

fn push_section(lines: &mut Vec<String>, heading: &str, items: &[&CandidateItem]) {
    lines.push(format!("## {heading}"));
    lines.push(String::new());
    for (i, item) in items.iter().enumerate() {
        lines.extend(format_item(item, i + 1));
        lines.push(String::new());
    }
    lines.push("---".into());
    lines.push(String::new());
}

/// Sectioned daily briefing.
pub fn markdown<Tz>(
    items: &[ScoredItem],
    skipped: &[String],
    limits: BriefingLimits,
    now: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let essential = in_category(items, Category::Essential, limits.max_essential);
    let professional = in_category(items, Category::Professional, limits.max_professional);
    let personal = in_category(items, Category::Personal, MAX_PERSONAL);

    // One good thing: a personal item, else a professional one that isn't security news.
    let good_thing = personal.first().copied().or_else(|| {
        professional
            .iter()
            .copied()
            .find(|p| !p.title.to_lowercase().contains("security"))
    });

    let mut lines = vec![format!("📅 {} BRIEFING", long_date(now)), String::new()];

    if essential.is_empty() {
        lines.extend([
            "## TODAY'S ESSENTIALS".to_string(),
            String::new(),
            "_No new essential items today._".to_string(),
            String::new(),
            "---".to_string(),
            String::new(),
        ]);
    } else {
        push_section(&mut lines, "TODAY'S ESSENTIALS", &essential);
    }

    if !professional.is_empty() {
        push_section(&mut lines, "PROFESSIONAL PULSE", &professional);
    }

    if let Some(g) = good_thing {
        lines.extend([
            "## ONE GOOD THING".to_string(),
            String::new(),
            format!("**{}**", g.title),
            g.link.clone(),
            String::new(),
            "---".to_string(),
            String::new(),
        ]);
    }

    if !skipped.is_empty() {
        lines.push("## SKIPPING TODAY".into());
        lines.push(String::new());
        for s in skipped.iter().take(MAX_SKIP_LINES) {
            lines.push(format!("- {s}"));
        }
        if skipped.len() > MAX_SKIP_LINES {
            lines.push(format!(
                "- _...and {} more_",
                skipped.len() - MAX_SKIP_LINES
            ));
        }
        lines.push(String::new());
    }

    lines.push(RULE.to_string());
    lines.join("\n")
}

#[derive(Serialize)]
struct JsonItem<'a> {
    title: &'a str,
    link: &'a str,
    source: &'a str,
    category: Category,
    #[serde(rename = "pubDate")]
    pub_date: String,
    score: i32,
}

#[derive(Serialize)]
struct JsonBriefing<'a> {
    date: String,
    items: Vec<JsonItem<'a>>,
    skipped: &'a [String],
}

fn iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Machine-readable briefing (pretty-printed).
pub fn json<Tz: TimeZone>(
    items: &[ScoredItem],
    skipped: &[String],
    now: &DateTime<Tz>,
) -> Result<String> {
    let doc = JsonBriefing {
        date: iso(&now.with_timezone(&Utc)),
        items: items
            .iter()
            .map(|s| JsonItem {
                title: &s.item.title,
                link: &s.item.link,
                source: &s.item.source,
                category: s.item.category,
                pub_date: iso(&s.item.published),
                score: s.score,
            })
            .collect(),
        skipped,
    };
    serde_json::to_string_pretty(&doc).context("serializing briefing json")
}

/// Terse digest for terminals and notifications.
pub fn plain<Tz>(items: &[ScoredItem], skipped: &[String], now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut lines = vec![format!("=== FEEDBAG {} ===", long_date(now)), String::new()];
    for s in items.iter().take(MAX_PLAIN_ITEMS) {
        lines.push(format!("[{}] {}", s.item.source, s.item.title));
        lines.push(format!("  {}", s.item.link));
        lines.push(String::new());
    }
    if !skipped.is_empty() {
        lines.push(format!("Skipped {} items (politics, etc.)", skipped.len()));
    }
    lines.join("\n")
}
