// src/ingest/providers/mod.rs
pub mod rss;
pub mod snackpack;
