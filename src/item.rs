// src/item.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Feed category; drives both scoring weight and briefing section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Essential,
    Professional,
    Personal,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Essential,
        Category::Professional,
        Category::Personal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Essential => "essential",
            Category::Professional => "professional",
            Category::Personal => "personal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "essential" => Ok(Category::Essential),
            "professional" => Ok(Category::Professional),
            "personal" => Ok(Category::Personal),
            other => anyhow::bail!("unknown category: {other}"),
        }
    }
}

/// A single feed entry as produced by a provider, before dedup/scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: String,
    pub title: String,
    pub link: String,
    #[serde(rename = "pubDate")]
    pub published: DateTime<Utc>,
    pub source: String, // feed name, e.g. "Smashing Magazine"
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl CandidateItem {
    /// Title and snippet joined by a space; the text topic matching runs over.
    pub fn topic_text(&self) -> String {
        format!("{} {}", self.title, self.snippet.as_deref().unwrap_or_default())
    }

    /// Human-readable skip line: "source: title".
    pub fn skip_label(&self) -> String {
        format!("{}: {}", self.source, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Essential".parse::<Category>().unwrap(), Category::Essential);
        assert_eq!(" personal ".parse::<Category>().unwrap(), Category::Personal);
        assert!("urgent".parse::<Category>().is_err());
    }

    #[test]
    fn topic_text_tolerates_missing_snippet() {
        let it = CandidateItem {
            id: "1".into(),
            title: "React 20 released".into(),
            link: "https://example.test/r".into(),
            published: Utc::now(),
            source: "JS Weekly".into(),
            category: Category::Essential,
            snippet: None,
        };
        assert_eq!(it.topic_text(), "React 20 released ");
        assert_eq!(it.skip_label(), "JS Weekly: React 20 released");
    }
}
