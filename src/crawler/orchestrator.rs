//! Crawl orchestration
//!
//! The orchestrator drives a full run: acquire the entity list (cache file
//! first, list source second), optionally short-circuit on a clean audit,
//! then walk the list entity by entity - plan, fetch with retries under the
//! rate limiter, extract and store assets, persist the detail document.
//!
//! Failure isolation is strict: anything that goes wrong below the entity
//! boundary degrades (a missing asset is logged and skipped), anything at
//! the entity boundary is caught and counted without touching sibling
//! entities, and only setup-time errors (no list, no client) abort the run.
//! Progress counters live in the returned [`RunSummary`]; whether an entity
//! is done is always re-derived from disk.

use crate::audit::Auditor;
use crate::config::Config;
use crate::crawler::extract::{AssetRef, DetailExtractor, ExtractedDetail};
use crate::crawler::fetcher::{build_http_client, ListSource, PageFetcher};
use crate::crawler::limiter::FetchLimiter;
use crate::crawler::planner::{plan_for, FetchPlan};
use crate::crawler::retry::{execute_with_retry, RetryPolicy};
use crate::output::{print_summary, RunLog};
use crate::state::{CrawlPhase, EntityOutcome, EntityRef, RunSummary};
use crate::store::{list_cache, AssetStore, DetailStore};
use crate::{GrimoireError, Result};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Top-level crawl state machine
///
/// Generic over its collaborators so tests can substitute a scripted
/// fetcher, list source, or extractor for the HTTP-backed defaults.
pub struct Orchestrator<F, L, E> {
    config: Arc<Config>,
    fetcher: F,
    list_source: L,
    extractor: E,
    details: DetailStore,
    assets: Arc<AssetStore>,
    limiter: Arc<FetchLimiter>,
    retry: RetryPolicy,
    run_log: RunLog,
    phase: CrawlPhase,
}

impl<F, L, E> Orchestrator<F, L, E>
where
    F: PageFetcher,
    L: ListSource,
    E: DetailExtractor,
{
    /// Creates an orchestrator, preparing the on-disk layout
    ///
    /// Fails only on setup errors: unusable output directories or an HTTP
    /// client that cannot be built.
    pub fn new(config: Config, fetcher: F, list_source: L, extractor: E) -> Result<Self> {
        let details = DetailStore::new(&config.output.data_dir)?;

        let asset_client = build_http_client(&config.user_agent)
            .map_err(|e| GrimoireError::Setup(format!("failed to build HTTP client: {}", e)))?;
        let assets = Arc::new(AssetStore::new(
            &config.output.icons_dir,
            asset_client,
            config.crawler.asset_timeout(),
        )?);

        let limiter = Arc::new(FetchLimiter::from_config(&config.crawler));
        let retry = RetryPolicy::from_config(&config.crawler);
        let run_log = RunLog::open(config.output.log_path())?;

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            list_source,
            extractor,
            details,
            assets,
            limiter,
            retry,
            run_log,
            phase: CrawlPhase::Idle,
        })
    }

    /// Current phase of the state machine
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the crawl to completion
    ///
    /// Returns the run's accounting. `Err` means the run never got going
    /// (list unavailable, setup failure); per-entity failures are inside the
    /// returned summary instead.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let start = std::time::Instant::now();
        self.run_log.append("run started");

        match self.run_inner().await {
            Ok(summary) => {
                self.run_log.append(&format!(
                    "run complete: {} fetched, {} skipped, {} failed in {:?}",
                    summary.fetched,
                    summary.skipped,
                    summary.failed,
                    start.elapsed()
                ));
                Ok(summary)
            }
            Err(e) => {
                self.transition(CrawlPhase::Failed);
                self.run_log.append(&format!("run failed: {}", e));
                tracing::error!("Run failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run_inner(&mut self) -> Result<RunSummary> {
        let (entities, from_cache) = self.acquire_list().await?;
        self.transition(CrawlPhase::ListAcquired);

        let mut summary = RunSummary::new(entities.len());
        let auditor = Auditor::new(&self.config.output.data_dir, &self.config.output.icons_dir);

        // A cached list means a previous run got at least this far; check
        // whether there is anything left to do before opening connections.
        if from_cache {
            self.transition(CrawlPhase::Auditing);
            let report = auditor.audit(&entities);
            if report.is_complete() {
                tracing::info!("Persisted data is complete, nothing to fetch");
                self.run_log.append("audit: persisted data complete");
                print_summary(&summary, &report);
                self.transition(CrawlPhase::Complete);
                return Ok(summary);
            }
        }

        self.transition(CrawlPhase::FetchingDetails);
        let total = entities.len();

        for (i, entity) in entities.iter().enumerate() {
            let outcome = match self.visit_entity(entity, i, total).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // One entity's permanent failure never aborts the run
                    tracing::error!("[{}/{}] {} failed: {}", i + 1, total, entity.name, e);
                    self.run_log.append(&format!(
                        "[{}/{}] {} failed: {}",
                        i + 1,
                        total,
                        entity.name,
                        e
                    ));
                    summary.last_error = Some(e.to_string());
                    EntityOutcome::Failed
                }
            };
            summary.record(outcome);

            if outcome != EntityOutcome::Skipped && i + 1 < total {
                let delay = self.limiter.inter_request_delay();
                tracing::debug!("Waiting {:?} before next entity", delay);
                tokio::time::sleep(delay).await;
            }
        }

        let report = auditor.audit(&entities);
        print_summary(&summary, &report);
        self.transition(CrawlPhase::Complete);
        Ok(summary)
    }

    /// Obtains the entity list, preferring the cache file
    ///
    /// A freshly scraped list is persisted before this returns, so a crash
    /// from here on never requires re-scraping the list page. Returns the
    /// list and whether it came from cache.
    async fn acquire_list(&self) -> Result<(Vec<EntityRef>, bool)> {
        let list_path = self.config.output.list_path();

        if list_cache::exists(&list_path) {
            tracing::info!("Reading entity list from {}", list_path.display());
            let entities = list_cache::read(&list_path)?;
            tracing::info!("Read {} entities from cache", entities.len());
            self.run_log
                .append(&format!("list: read {} entities from cache", entities.len()));
            return Ok((entities, true));
        }

        let entities =
            execute_with_retry(&self.retry, "entity list fetch", || {
                self.list_source.fetch_list()
            })
            .await?;

        list_cache::write(&list_path, &entities)?;
        tracing::info!(
            "Cached {} entities to {}",
            entities.len(),
            list_path.display()
        );
        self.run_log.append(&format!(
            "list: fetched and cached {} entities",
            entities.len()
        ));
        Ok((entities, false))
    }

    /// Processes one entity to completion
    async fn visit_entity(
        &self,
        entity: &EntityRef,
        index: usize,
        total: usize,
    ) -> Result<EntityOutcome> {
        if plan_for(entity, &self.details) == FetchPlan::Skip {
            tracing::info!(
                "[{}/{}] {} already archived, skipping",
                index + 1,
                total,
                entity.name
            );
            self.run_log.append(&format!(
                "[{}/{}] {} skipped (already archived)",
                index + 1,
                total,
                entity.name
            ));
            return Ok(EntityOutcome::Skipped);
        }

        tracing::info!("[{}/{}] Fetching {}", index + 1, total, entity.name);
        self.run_log
            .append(&format!("[{}/{}] fetching {}", index + 1, total, entity.name));

        // Permit held across all attempts: the fetch session never sees more
        // concurrent navigation than the limiter allows.
        let page = {
            let _permit = self.limiter.admit().await?;
            execute_with_retry(
                &self.retry,
                &format!("detail fetch for '{}'", entity.name),
                || self.fetcher.load(&entity.source_url),
            )
            .await?
        };

        let ExtractedDetail { assets, raw_html } = self.extractor.extract(entity, &page.body)?;
        let asset_count = assets.len();

        // The list-page icon, stored under the entity's own name
        if let Some(icon_url) = &entity.icon_url {
            if self.assets.store(icon_url, &entity.name).await?.is_none() {
                tracing::warn!("No icon stored for {}", entity.name);
            }
        }

        self.download_assets(entity, assets).await?;

        // Saved last: the detail document's existence marks the entity done
        let path = self.details.save(entity, &raw_html)?;
        tracing::info!("Archived {} to {}", entity.name, path.display());
        self.run_log.append(&format!(
            "[{}/{}] archived {} ({} page assets)",
            index + 1,
            total,
            entity.name,
            asset_count
        ));

        Ok(EntityOutcome::Fetched)
    }

    /// Downloads one entity's page assets concurrently
    ///
    /// Each download takes its own limiter permit, so the global ceiling
    /// bounds these together with everything else in flight. Unavailable
    /// assets are logged and dropped; only local I/O errors propagate.
    async fn download_assets(&self, entity: &EntityRef, assets: Vec<AssetRef>) -> Result<()> {
        if assets.is_empty() {
            return Ok(());
        }

        tracing::debug!("Downloading {} assets for {}", assets.len(), entity.name);
        let mut tasks = JoinSet::new();

        for asset in assets {
            let store = Arc::clone(&self.assets);
            let limiter = Arc::clone(&self.limiter);
            tasks.spawn(async move {
                let _permit = limiter.admit().await?;
                let stored = store.store(&asset.source_url, &asset.file_stem).await?;
                Ok::<_, GrimoireError>((asset, stored))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|e| GrimoireError::Setup(format!("asset task failed: {}", e)))??;
            match outcome {
                (asset, Some(path)) => {
                    tracing::debug!("Asset {} -> {}", asset.file_stem, path.display())
                }
                (asset, None) => tracing::warn!("Asset unavailable: {}", asset.source_url),
            }
        }

        Ok(())
    }

    fn transition(&mut self, to: CrawlPhase) {
        tracing::debug!("Phase {} -> {}", self.phase, to);
        self.run_log
            .append(&format!("phase: {} -> {}", self.phase, to));
        self.phase = to;
    }
}
