// tests/metrics_pipeline.rs
#![cfg(feature = "strict-metrics")]
use feedbag::ingest::fetch_all;
use feedbag::ingest::providers::rss::RssProvider;
use feedbag::ingest::types::SourceProvider;
use feedbag::{Category, FeedbagConfig, Pipeline, SeenStore};
use metrics_exporter_prometheus::PrometheusBuilder;

#[tokio::test]
async fn metrics_exposed_after_fetch_and_rank() {
    // Install a local recorder for the test
    let handle = PrometheusBuilder::new().install_recorder().expect("recorder");

    let xml = std::fs::read_to_string("tests/fixtures/frontend_focus_rss.xml").expect("fixture");
    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(RssProvider::from_fixture(
        "Frontend Focus",
        Category::Essential,
        &xml,
    ))];
    let items = fetch_all(&providers).await;

    let cfg = FeedbagConfig::default_seed();
    let scoring = cfg.scoring();
    let _ = Pipeline::new(&scoring, cfg.dedup_params()).run(items, &SeenStore::in_memory());

    // Scrape metrics text and check series presence by substring
    let out = handle.render();
    assert!(out.contains("ingest_items_total"));
    assert!(out.contains("ingest_fetch_ms"));
    assert!(out.contains("pipeline_input_total"));
    assert!(out.contains("pipeline_skipped_total"));
    assert!(out.contains("pipeline_kept_total"));
}
