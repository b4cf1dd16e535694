// tests/seen_store.rs
use chrono::{Duration, TimeZone, Utc};
use feedbag::store::{fingerprint, SeenStore, RETENTION_DAYS, SEEN_FILE_NAME};
use std::fs;

#[test]
fn marks_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let mut store = SeenStore::open_in_dir(dir.path());
    assert_eq!(store.stats().links, 0);
    store
        .mark_seen("https://a.test/1", "React Compiler: now stable!")
        .unwrap();

    let reopened = SeenStore::open_in_dir(dir.path());
    assert!(reopened.is_link_seen("https://a.test/1"));
    // Different casing and punctuation, same fingerprint.
    assert!(reopened.is_title_seen("react compiler now   STABLE"));
    assert!(!reopened.is_link_seen("https://a.test/2"));
}

#[test]
fn file_uses_urls_and_title_hashes_keys() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap();

    let mut store = SeenStore::open_in_dir(dir.path());
    store.mark_seen_at("https://a.test/1", "Hello", now).unwrap();

    let raw = fs::read_to_string(dir.path().join(SEEN_FILE_NAME)).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["urls"]["https://a.test/1"], now.timestamp_millis());
    assert_eq!(v["titleHashes"][fingerprint("Hello")], now.timestamp_millis());
}

#[test]
fn corrupt_or_missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SEEN_FILE_NAME);

    let missing = SeenStore::open(&path);
    assert_eq!(missing.stats().links + missing.stats().titles, 0);

    fs::write(&path, "{ not json").unwrap();
    let mut corrupt = SeenStore::open(&path);
    assert!(!corrupt.is_link_seen("x"));

    // A mark after a corrupt load rewrites the file cleanly.
    corrupt.mark_seen("https://a.test/1", "Hello").unwrap();
    assert!(SeenStore::open(&path).is_link_seen("https://a.test/1"));
}

#[test]
fn marking_is_idempotent() {
    let now = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap();
    let mut once = SeenStore::in_memory();
    once.mark_seen_at("https://a.test/1", "Hello world", now).unwrap();

    let mut twice = SeenStore::in_memory();
    twice.mark_seen_at("https://a.test/1", "Hello world", now).unwrap();
    twice.mark_seen_at("https://a.test/1", "Hello world", now).unwrap();

    assert_eq!(once.record(), twice.record());
}

#[test]
fn old_entries_are_pruned_on_next_mark() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap();

    let mut store = SeenStore::open_in_dir(dir.path());
    store
        .mark_seen_at("https://old.test", "Old news", now - Duration::days(RETENTION_DAYS + 1))
        .unwrap();
    store
        .mark_seen_at("https://recent.test", "Recent news", now - Duration::days(2))
        .unwrap();

    // Lookups alone never prune.
    assert!(store.is_link_seen("https://old.test"));

    store.mark_seen_at("https://new.test", "New news", now).unwrap();
    let reopened = SeenStore::open_in_dir(dir.path());
    assert!(!reopened.is_link_seen("https://old.test"));
    assert!(!reopened.is_title_seen("Old news"));
    assert!(reopened.is_link_seen("https://recent.test"));
    assert_eq!(reopened.stats().links, 2);
}

#[test]
fn clear_empties_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SeenStore::open_in_dir(dir.path());
    store
        .mark_all_seen([("https://a.test/1", "One"), ("https://a.test/2", "Two")])
        .unwrap();
    assert_eq!(store.stats().links, 2);

    store.clear().unwrap();
    let reopened = SeenStore::open_in_dir(dir.path());
    assert_eq!(reopened.stats().links, 0);
    assert_eq!(reopened.stats().titles, 0);
}
