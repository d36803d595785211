//! Crawl engine
//!
//! The pieces that turn an entity list into an archived result set:
//!
//! - [`retry`] - bounded retries with fixed backoff
//! - [`limiter`] - concurrency cap and inter-request jitter
//! - [`planner`] - per-entity skip-vs-fetch decisions from disk state
//! - [`fetcher`] - the page-loading boundary and its HTTP implementation
//! - [`extract`] - list and detail markup extraction
//! - [`orchestrator`] - the state machine composing all of the above

pub mod extract;
pub mod fetcher;
pub mod limiter;
pub mod orchestrator;
pub mod planner;
pub mod retry;

pub use extract::{AssetRef, CardExtractor, DetailExtractor, ExtractedDetail};
pub use fetcher::{
    build_http_client, FetchedPage, HttpFetcher, HttpListSource, ListSource, PageFetcher,
};
pub use limiter::FetchLimiter;
pub use orchestrator::Orchestrator;
pub use planner::{plan_for, FetchPlan};
pub use retry::{execute_with_retry, RetryPolicy};

use crate::config::Config;
use crate::state::RunSummary;
use crate::{GrimoireError, Result};

/// Runs a full crawl with the bundled HTTP fetcher and card extractor
///
/// # Example
///
/// ```no_run
/// use grimoire::config::load_config;
/// use grimoire::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = crawl(config).await?;
/// println!("fetched {} entities", summary.fetched);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<RunSummary> {
    let client = build_http_client(&config.user_agent)
        .map_err(|e| GrimoireError::Setup(format!("failed to build HTTP client: {}", e)))?;
    let timeout = config.crawler.navigation_timeout();

    let fetcher = HttpFetcher::new(client.clone(), timeout);
    let list_source = HttpListSource::new(
        HttpFetcher::new(client, timeout),
        config.source.base_url.clone(),
        config.source.list_url(),
    );

    let mut orchestrator = Orchestrator::new(config, fetcher, list_source, CardExtractor)?;
    orchestrator.run().await
}
