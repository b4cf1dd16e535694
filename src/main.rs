//! feedbag: binary entrypoint
//! Fetches configured feeds, runs the dedup/rank pipeline and prints the daily briefing.
//! Logs go to stderr; stdout carries only the briefing.

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedbag::briefing::{self, Format};
use feedbag::config::{self, BriefingLimits, FeedbagConfig};
use feedbag::ingest;
use feedbag::item::Category;
use feedbag::{Pipeline, PipelineResult, SeenStore};

#[derive(Parser)]
#[command(
    name = "feedbag",
    version,
    about = "Personal news aggregator with deduplication"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate your daily briefing
    Briefing(BriefingArgs),
    /// Fetch feeds without dedup (for debugging)
    Fetch {
        /// Fetch only feeds whose name contains this
        #[arg(long)]
        feed: Option<String>,
    },
    /// Show statistics about seen items
    Stats,
    /// Clear all seen items (start fresh)
    Clear {
        /// Actually clear (required)
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
    /// List configured feeds
    ListFeeds,
    /// Generate and save the briefing to <data dir>/briefings/
    Save,
}

#[derive(Args)]
struct BriefingArgs {
    /// Output format: markdown, json, plain
    #[arg(short, long, default_value = "markdown")]
    format: String,
    /// Write to file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Don't mark items as seen
    #[arg(long, default_value_t = false)]
    no_mark: bool,
    #[arg(long)]
    max_essential: Option<usize>,
    #[arg(long)]
    max_professional: Option<usize>,
}

/// Custom `target:`s are listed so their info lines show without RUST_LOG.
const DEFAULT_LOG_FILTER: &str = "feedbag=info,ingest=info,pipeline=info,store=info,warn";

/// Tracing to stderr. Respects RUST_LOG and FEEDBAG_LOG_FORMAT=json.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let builder = tracing_subscriber::registry().with(filter);

    match std::env::var("FEEDBAG_LOG_FORMAT").as_deref() {
        Ok("json") => {
            let _ = builder.with(fmt_layer.json().flatten_event(true)).try_init();
        }
        _ => {
            let _ = builder.with(fmt_layer.compact()).try_init();
        }
    }
}

fn load_config() -> FeedbagConfig {
    match config::load_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "config unusable; using built-in defaults");
            FeedbagConfig::default_seed()
        }
    }
}

async fn fetch_and_rank(cfg: &FeedbagConfig, store: &SeenStore) -> Result<PipelineResult> {
    info!("Fetching feeds...");
    let client = ingest::http_client()?;
    let providers = ingest::providers_for(&cfg.feeds, &client);
    let items = ingest::fetch_all(&providers).await;
    info!(
        items = items.len(),
        feeds = cfg.feeds.len(),
        "fetched items"
    );

    let scoring = cfg.scoring();
    let result = Pipeline::new(&scoring, cfg.dedup_params()).run(items, store);
    info!(
        kept = result.items.len(),
        skipped = result.skipped.len(),
        "after dedup"
    );
    Ok(result)
}

fn mark_delivered(store: &mut SeenStore, result: &PipelineResult) {
    let pairs = result
        .items
        .iter()
        .map(|s| (s.item.link.as_str(), s.item.title.as_str()));
    match store.mark_all_seen(pairs) {
        Ok(()) => info!("Marked items as seen"),
        Err(e) => warn!(error = %format!("{e:#}"), "could not persist seen state"),
    }
}

async fn run_briefing(cfg: &FeedbagConfig, args: BriefingArgs) -> Result<()> {
    let format = args.format.parse::<Format>().unwrap_or_else(|e| {
        warn!(error = %e, "falling back to markdown");
        Format::Markdown
    });
    let limits = BriefingLimits {
        max_essential: args.max_essential.unwrap_or(cfg.briefing.max_essential),
        max_professional: args
            .max_professional
            .unwrap_or(cfg.briefing.max_professional),
    };

    let mut store = SeenStore::open_in_dir(config::data_dir());
    let result = fetch_and_rank(cfg, &store).await?;
    let output = briefing::render(format, &result.items, &result.skipped, limits, &Local::now())?;

    match &args.output {
        Some(path) => {
            fs::write(path, &output).with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote briefing to {}", path.display());
        }
        None => println!("{output}"),
    }

    if !args.no_mark {
        mark_delivered(&mut store, &result);
    }
    Ok(())
}

async fn run_fetch(cfg: &FeedbagConfig, feed: Option<String>) -> Result<()> {
    let feeds = match &feed {
        Some(name) => cfg.feeds_matching(name),
        None => cfg.feeds.clone(),
    };
    if feeds.is_empty() {
        bail!("No feed matching \"{}\"", feed.unwrap_or_default());
    }

    let client = ingest::http_client()?;
    let providers = ingest::providers_for(&feeds, &client);
    let items = ingest::fetch_all(&providers).await;

    for item in items.iter().take(20) {
        println!("{}", item.title);
        println!("  {} | {}", item.source, item.link);
        println!();
    }
    info!("Total: {} items", items.len());
    Ok(())
}

fn run_stats() {
    let dir = config::data_dir();
    let stats = SeenStore::open_in_dir(&dir).stats();
    println!("Feedbag Stats");
    println!("  Seen URLs: {}", stats.links);
    println!("  Seen title hashes: {}", stats.titles);
    println!("  Data dir: {}", dir.display());
}

fn run_clear(confirm: bool) -> Result<()> {
    if !confirm {
        println!("This will clear all seen items.");
        println!("Run with --confirm to proceed.");
        return Ok(());
    }
    SeenStore::open_in_dir(config::data_dir()).clear()?;
    println!("Cleared all seen items.");
    Ok(())
}

fn run_list_feeds(cfg: &FeedbagConfig) {
    println!("Configured Feeds:\n");
    for category in Category::ALL {
        let feeds: Vec<_> = cfg.feeds.iter().filter(|f| f.category == category).collect();
        if feeds.is_empty() {
            continue;
        }
        println!("{}", category.as_str().to_uppercase());
        for feed in feeds {
            println!("  {}", feed.name);
            println!("    {}", feed.url);
            println!("    Topics: {}", feed.topics.join(", "));
        }
        println!();
    }
}

async fn run_save(cfg: &FeedbagConfig) -> Result<()> {
    let dir = config::data_dir().join("briefings");
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let now = Local::now();
    let path = dir.join(briefing::archive_file_name(&now));

    let mut store = SeenStore::open_in_dir(config::data_dir());
    let result = fetch_and_rank(cfg, &store).await?;
    let output = briefing::markdown(&result.items, &result.skipped, cfg.briefing, &now);
    fs::write(&path, output).with_context(|| format!("writing {}", path.display()))?;

    mark_delivered(&mut store, &result);
    println!("Saved to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op otherwise.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = load_config();

    match cli.command {
        Commands::Briefing(args) => run_briefing(&cfg, args).await?,
        Commands::Fetch { feed } => run_fetch(&cfg, feed).await?,
        Commands::Stats => run_stats(),
        Commands::Clear { confirm } => run_clear(confirm)?,
        Commands::ListFeeds => run_list_feeds(&cfg),
        Commands::Save => run_save(&cfg).await?,
    }

    Ok(())
}
