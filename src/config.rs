// src/config.rs
//! Runtime configuration: topic lists, score weights, dedup threshold, briefing limits and
//! the feed list. Loaded from TOML or JSON, falling back to a built-in seed.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::{DedupParams, ScoreWeights, ScoringConfig, DEFAULT_SIMILARITY_THRESHOLD};
use crate::item::Category;

pub const ENV_CONFIG_PATH: &str = "FEEDBAG_CONFIG";
pub const ENV_DATA_DIR: &str = "FEEDBAG_DATA";

const DEFAULT_TOML_PATH: &str = "config/feedbag.toml";
const DEFAULT_JSON_PATH: &str = "config/feedbag.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Rss,
    Scrape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    pub kind: FeedKind,
    pub category: Category,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicsConfig {
    #[serde(default)]
    pub priority: Vec<String>,
    #[serde(default)]
    pub interest: Vec<String>,
    #[serde(default)]
    pub skip: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BriefingLimits {
    pub max_essential: usize,
    pub max_professional: usize,
}

impl Default for BriefingLimits {
    fn default() -> Self {
        Self {
            max_essential: 5,
            max_professional: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbagConfig {
    #[serde(default)]
    pub topics: TopicsConfig,
    #[serde(default)]
    pub weights: ScoreWeights,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub briefing: BriefingLimits,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

impl FeedbagConfig {
    pub fn scoring(&self) -> ScoringConfig {
        ScoringConfig {
            priority_topics: self.topics.priority.clone(),
            interest_topics: self.topics.interest.clone(),
            skip_topics: self.topics.skip.clone(),
            weights: self.weights,
        }
    }

    pub fn dedup_params(&self) -> DedupParams {
        DedupParams {
            similarity_threshold: self.dedup.threshold,
        }
    }

    /// Feeds whose name contains `needle` (case-insensitive).
    pub fn feeds_matching(&self, needle: &str) -> Vec<FeedConfig> {
        let n = needle.to_lowercase();
        self.feeds
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&n))
            .cloned()
            .collect()
    }

    /// Built-in feeds and topics, used when no config file is present.
    pub fn default_seed() -> Self {
        fn feed(
            name: &str,
            url: &str,
            kind: FeedKind,
            category: Category,
            topics: &[&str],
        ) -> FeedConfig {
            FeedConfig {
                name: name.to_string(),
                url: url.to_string(),
                kind,
                category,
                topics: strings(topics),
            }
        }

        let feeds = vec![
            feed(
                "JavaScript Weekly",
                "https://javascriptweekly.com/rss/",
                FeedKind::Rss,
                Category::Essential,
                &["nextjs", "react", "typescript", "node", "performance"],
            ),
            feed(
                "Smashing Magazine",
                "https://www.smashingmagazine.com/feed/",
                FeedKind::Rss,
                Category::Essential,
                &["performance", "seo", "css", "accessibility", "ux"],
            ),
            feed(
                "Syntax Snack Pack",
                "https://syntax.fm/snackpack",
                FeedKind::Scrape,
                Category::Essential,
                &["nextjs", "react", "css", "typescript", "webdev"],
            ),
            feed(
                "Web Tools Weekly",
                "https://webtoolsweekly.com/feed.xml",
                FeedKind::Rss,
                Category::Professional,
                &["react", "css", "build", "testing", "git"],
            ),
            feed(
                "VSCode.Email",
                "https://vscode.email/feed.xml",
                FeedKind::Rss,
                Category::Professional,
                &["vscode", "copilot", "claude", "agents", "extensions"],
            ),
        ];

        let topics = TopicsConfig {
            priority: strings(&[
                "nextjs",
                "next.js",
                "react",
                "pagespeed",
                "core web vitals",
                "cwv",
                "seo",
                "jobposting",
                "schema",
                "structured data",
                "lighthouse",
                "performance",
            ]),
            interest: strings(&[
                "claude",
                "claude code",
                "anthropic",
                "agentic",
                "unit test",
                "caniuse",
                "css",
                "eso",
                "elder scrolls",
            ]),
            skip: strings(&["politics", "election", "layoffs"]),
        };

        Self {
            topics,
            weights: ScoreWeights::default(),
            dedup: DedupConfig::default(),
            briefing: BriefingLimits::default(),
            feeds,
        }
    }

    fn cleaned(mut self) -> Self {
        self.topics.priority = clean_list(self.topics.priority);
        self.topics.interest = clean_list(self.topics.interest);
        self.topics.skip = clean_list(self.topics.skip);
        self
    }
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_from(path: &Path) -> Result<FeedbagConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing config {}", path.display()))
}

/// Load config using env var + fallbacks:
/// 1) $FEEDBAG_CONFIG
/// 2) config/feedbag.toml
/// 3) config/feedbag.json
/// 4) built-in seed
pub fn load_default() -> Result<FeedbagConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        } else {
            return Err(anyhow!("FEEDBAG_CONFIG points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from(DEFAULT_TOML_PATH);
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let json_p = PathBuf::from(DEFAULT_JSON_PATH);
    if json_p.exists() {
        return load_from(&json_p);
    }
    Ok(FeedbagConfig::default_seed())
}

/// `$FEEDBAG_DATA`, else `$HOME/.feedbag`, else `./.feedbag`.
pub fn data_dir() -> PathBuf {
    if let Ok(p) = std::env::var(ENV_DATA_DIR) {
        if !p.trim().is_empty() {
            return PathBuf::from(p);
        }
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".feedbag")
}

fn parse_config(s: &str, hint_ext: &str) -> Result<FeedbagConfig> {
    if hint_ext == "json" {
        return Ok(serde_json::from_str::<FeedbagConfig>(s)?.cleaned());
    }
    if hint_ext == "toml" {
        return Ok(toml::from_str::<FeedbagConfig>(s)?.cleaned());
    }
    // No usable extension: try TOML, then JSON.
    if let Ok(v) = toml::from_str::<FeedbagConfig>(s) {
        return Ok(v.cleaned());
    }
    serde_json::from_str::<FeedbagConfig>(s)
        .map(FeedbagConfig::cleaned)
        .map_err(|_| anyhow!("unsupported config format"))
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_and_defaults_mix() {
        let toml = r#"
[topics]
priority = [" rust ", "", "rust", "wasm"]
skip = ["crypto"]

[weights]
priority = 7

[[feeds]]
name = "This Week in Rust"
url = "https://this-week-in-rust.org/rss.xml"
kind = "rss"
category = "professional"
"#;
        let cfg = parse_config(toml, "toml").unwrap();
        assert_eq!(cfg.topics.priority, vec!["rust".to_string(), "wasm".to_string()]);
        assert!(cfg.topics.interest.is_empty());
        assert_eq!(cfg.weights.priority, 7);
        assert_eq!(cfg.weights.interest, 5);
        assert_eq!(cfg.dedup.threshold, 0.6);
        assert_eq!(cfg.briefing.max_essential, 5);
        assert_eq!(cfg.feeds[0].category, Category::Professional);
        assert!(cfg.feeds[0].topics.is_empty());
    }

    #[test]
    fn json_is_accepted() {
        let json = r#"{"topics":{"skip":["politics"]},"dedup":{"threshold":0.75}}"#;
        let cfg = parse_config(json, "json").unwrap();
        assert_eq!(cfg.scoring().skip_topics, vec!["politics".to_string()]);
        assert_eq!(cfg.dedup_params().similarity_threshold, 0.75);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_config("{{ nope", "").is_err());
    }

    #[test]
    fn seed_has_feeds_in_every_used_category() {
        let seed = FeedbagConfig::default_seed();
        assert_eq!(seed.feeds.len(), 5);
        assert!(seed.topics.skip.contains(&"election".to_string()));
        assert_eq!(seed.feeds_matching("smash").len(), 1);
    }
}
