// tests/config_load.rs
use feedbag::config::{
    data_dir, load_default, load_from, FeedKind, ENV_CONFIG_PATH, ENV_DATA_DIR,
};
use feedbag::{Category, FeedbagConfig};
use std::{env, fs, path::PathBuf};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("feedbag.toml");
    fs::write(
        &p_toml,
        r#"
[topics]
priority = ["react", " react ", ""]
skip = ["election"]

[briefing]
max_essential = 2

[[feeds]]
name = "Syntax Snack Pack"
url = "https://syntax.fm/snackpack"
kind = "scrape"
category = "essential"
topics = ["web dev"]
"#,
    )
    .unwrap();
    let t = load_from(&p_toml).unwrap();
    assert_eq!(t.topics.priority, vec!["react".to_string()]);
    assert_eq!(t.briefing.max_essential, 2);
    assert_eq!(t.briefing.max_professional, 3);
    assert_eq!(t.feeds[0].kind, FeedKind::Scrape);

    let p_json = dir.path().join("feedbag.json");
    fs::write(
        &p_json,
        r#"{"feeds":[{"name":"Kottke","url":"https://feeds.kottke.org/main",
            "kind":"rss","category":"personal"}]}"#,
    )
    .unwrap();
    let j = load_from(&p_json).unwrap();
    assert_eq!(j.feeds[0].category, Category::Personal);
    assert!(j.topics.skip.is_empty());
}

#[test]
fn unknown_category_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("bad.toml");
    fs::write(
        &p,
        r#"
[[feeds]]
name = "X"
url = "https://x.test"
kind = "rss"
category = "gossip"
"#,
    )
    .unwrap();
    let err = load_from(&p).unwrap_err();
    assert!(format!("{err:#}").contains("bad.toml"));
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);

    // 1) Nothing on disk: built-in seed
    assert_eq!(load_default().unwrap(), FeedbagConfig::default_seed());

    // 2) ./config/feedbag.toml
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("feedbag.toml"),
        "[topics]\npriority = [\"zig\"]\n",
    )
    .unwrap();
    assert_eq!(load_default().unwrap().topics.priority, vec!["zig".to_string()]);

    // 3) Env wins
    let p_env = tmp.path().join("other.json");
    fs::write(&p_env, r#"{"topics":{"priority":["gleam"]}}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(load_default().unwrap().topics.priority, vec!["gleam".to_string()]);

    // 4) Env pointing nowhere is an error, not a silent fallback
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(load_default().is_err());
    env::remove_var(ENV_CONFIG_PATH);

    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn data_dir_prefers_env() {
    env::set_var(ENV_DATA_DIR, "/tmp/feedbag-data");
    assert_eq!(data_dir(), PathBuf::from("/tmp/feedbag-data"));

    env::set_var(ENV_DATA_DIR, "  ");
    assert!(data_dir().ends_with(".feedbag"));
    env::remove_var(ENV_DATA_DIR);
}
