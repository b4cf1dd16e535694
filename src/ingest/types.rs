// src/ingest/types.rs
use anyhow::Result;

use crate::item::CandidateItem;

/// A feed source yielding normalized candidate items.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>>;
    fn name(&self) -> &str;
}
