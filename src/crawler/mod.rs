//! Crawl engine
//!
//! This module contains the crawl machinery:
//! - [`Frontier`]: the shared queue of pending LIST/DETAIL work
//! - [`Fetcher`]: HTTP client with referer handling, retries, and session
//!   rotation on block signals
//! - [`Coordinator`]: the worker pool driving the two-state crawl

mod coordinator;
mod fetcher;
mod frontier;

pub use coordinator::Coordinator;
pub use fetcher::{referer_for, Fetcher};
pub use frontier::{ActiveItem, Frontier, Role, WorkItem};

use crate::config::Config;
use crate::output::JsonLinesSink;
use crate::{HarvestError, Result};
use std::path::Path;
use std::sync::Arc;

/// Runs a full harvest with the configured JSON Lines output file,
/// returning the number of records saved.
pub async fn crawl(config: Config) -> Result<usize> {
    let sink = JsonLinesSink::create(Path::new(&config.output.path))
        .map_err(|e| HarvestError::Sink(e.to_string()))?;
    tracing::info!(path = %sink.path(), "writing records");

    let coordinator = Coordinator::new(config, Arc::new(sink))?;
    coordinator.run().await
}
