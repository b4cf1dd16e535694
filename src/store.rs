//! # Seen-Item Store
//!
//! Persistent record of items already delivered to the user, keyed two ways:
//! - by raw link string,
//! - by a fingerprint of the normalized title (catches the same story under another URL).
//!
//! Each key maps to the Unix-millisecond timestamp it was last marked. Entries older than
//! [`RETENTION_DAYS`] are pruned on every mutating call; lookups never prune.
//!
//! The store is an explicit handle: [`SeenStore::open`] loads the backing JSON file once,
//! and every mutation flushes it back synchronously. Missing or corrupted state loads as
//! empty; a briefing is never blocked by the store.
//!
//! On-disk shape (kept compatible with earlier `seen.json` files):
//! ```json
//! { "urls": { "https://...": 1700000000000 }, "titleHashes": { "-1x2k3": 1700000000000 } }
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Entries older than this are forgotten.
pub const RETENTION_DAYS: i64 = 30;

pub const SEEN_FILE_NAME: &str = "seen.json";

/// Raw persisted record: key → last-seen Unix milliseconds, per keyspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRecord {
    #[serde(rename = "urls", default)]
    pub links: HashMap<String, i64>,
    #[serde(rename = "titleHashes", default)]
    pub titles: HashMap<String, i64>,
}

impl SeenRecord {
    /// Drop entries with `ts <= now - RETENTION_DAYS`. An entry exactly at the cutoff is pruned.
    fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = (now - Duration::days(RETENTION_DAYS)).timestamp_millis();
        let before = self.links.len() + self.titles.len();
        self.links.retain(|_, ts| *ts > cutoff);
        self.titles.retain(|_, ts| *ts > cutoff);
        before - (self.links.len() + self.titles.len())
    }
}

/// Cardinality of each keyspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeenStats {
    pub links: usize,
    pub titles: usize,
}

/// Handle over the seen-state document.
#[derive(Debug)]
pub struct SeenStore {
    path: Option<PathBuf>,
    record: SeenRecord,
}

impl SeenStore {
    /// Load the store from `path`. Missing or unparsable files yield an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let record = load_record(&path);
        tracing::debug!(
            target: "store",
            path = %path.display(),
            links = record.links.len(),
            titles = record.titles.len(),
            "seen store loaded"
        );
        Self {
            path: Some(path),
            record,
        }
    }

    /// Open `<data_dir>/seen.json`.
    pub fn open_in_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        Self::open(data_dir.as_ref().join(SEEN_FILE_NAME))
    }

    /// Non-persisting store (previews, tests).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            record: SeenRecord::default(),
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record(&self) -> &SeenRecord {
        &self.record
    }

    pub fn is_link_seen(&self, link: &str) -> bool {
        self.record.links.contains_key(link)
    }

    pub fn is_title_seen(&self, title: &str) -> bool {
        self.record.titles.contains_key(&fingerprint(title))
    }

    pub fn mark_seen(&mut self, link: &str, title: &str) -> Result<()> {
        self.mark_seen_at(link, title, Utc::now())
    }

    pub fn mark_seen_at(&mut self, link: &str, title: &str, now: DateTime<Utc>) -> Result<()> {
        self.mark_all_seen_at(std::iter::once((link, title)), now)
    }

    pub fn mark_all_seen<'a, I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.mark_all_seen_at(items, Utc::now())
    }

    /// Record `now` against every (link, title) pair, prune, then flush.
    pub fn mark_all_seen_at<'a, I>(&mut self, items: I, now: DateTime<Utc>) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let ts = now.timestamp_millis();
        let mut marked = 0usize;
        for (link, title) in items {
            self.record.links.insert(link.to_string(), ts);
            self.record.titles.insert(fingerprint(title), ts);
            marked += 1;
        }
        let pruned = self.record.prune(now);
        tracing::debug!(target: "store", marked, pruned, "marked items as seen");
        self.flush()
    }

    /// Reset to empty, unconditionally.
    pub fn clear(&mut self) -> Result<()> {
        self.record = SeenRecord::default();
        tracing::info!(target: "store", "seen store cleared");
        self.flush()
    }

    pub fn stats(&self) -> SeenStats {
        SeenStats {
            links: self.record.links.len(),
            titles: self.record.titles.len(),
        }
    }

    fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating data dir {}", dir.display()))?;
        }
        let bytes = serde_json::to_vec_pretty(&self.record).context("serializing seen store")?;
        fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

fn load_record(path: &Path) -> SeenRecord {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return SeenRecord::default(),
    };
    match serde_json::from_str(&s) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(
                target: "store",
                path = %path.display(),
                error = %e,
                "seen store unreadable; starting empty"
            );
            SeenRecord::default()
        }
    }
}

/// Normalize a title: lowercase, keep only `[a-z0-9]` and whitespace, collapse whitespace.
pub fn normalize_title(title: &str) -> String {
    let lower = title.to_lowercase();
    let kept: String = lower
        .chars()
        // BOM counts as whitespace here, matching titles fingerprinted by earlier versions.
        .map(|c| if c == '\u{feff}' { ' ' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fast non-cryptographic title fingerprint: 32-bit `h*31 + c` over the normalized title,
/// rendered in signed base-36. Collisions are treated as "same story".
pub fn fingerprint(title: &str) -> String {
    let normalized = normalize_title(title);
    let mut hash: i32 = 0;
    for b in normalized.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(b as i32);
    }
    to_base36(hash as i64)
}

fn to_base36(n: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut v = n.unsigned_abs();
    let mut buf = Vec::new();
    while v > 0 {
        buf.push(DIGITS[(v % 36) as usize]);
        v /= 36;
    }
    if n < 0 {
        buf.push(b'-');
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}
