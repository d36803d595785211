//! Grimoire main entry point
//!
//! Command-line interface for the catalog crawler.

use anyhow::{bail, Context};
use clap::Parser;
use grimoire::audit::Auditor;
use grimoire::config::load_config_with_hash;
use grimoire::crawler::crawl;
use grimoire::output::print_report;
use grimoire::store::list_cache;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Grimoire: a resilient catalog crawler
///
/// Grimoire archives a catalog-style web database: the entity list, each
/// entity's detail page, and the images they reference. Runs are resumable;
/// re-running after an interruption only fetches what is still missing.
#[derive(Parser, Debug)]
#[command(name = "grimoire")]
#[command(version = "1.0.0")]
#[command(about = "A resilient catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "audit")]
    dry_run: bool,

    /// Audit persisted data against the cached entity list and exit
    /// (non-zero exit when incomplete)
    #[arg(long, conflicts_with = "dry_run")]
    audit: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) =
        load_config_with_hash(&cli.config).context("failed to load configuration")?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.audit {
        handle_audit(&config)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("grimoire=info,warn"),
            1 => EnvFilter::new("grimoire=debug,info"),
            2 => EnvFilter::new("grimoire=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &grimoire::Config) {
    println!("=== Grimoire Dry Run ===\n");

    println!("Source:");
    println!("  List page: {}", config.source.list_url());

    println!("\nCrawler Configuration:");
    println!("  Max attempts: {}", config.crawler.max_attempts);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!(
        "  Request delay: {}ms + up to {}ms jitter",
        config.crawler.min_request_delay_ms, config.crawler.request_jitter_ms
    );
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout_ms
    );
    println!("  Asset timeout: {}ms", config.crawler.asset_timeout_ms);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);
    println!("  Icons directory: {}", config.output.icons_dir);
    println!("  List cache: {}", config.output.list_path().display());
    println!("  Run log: {}", config.output.log_path().display());

    println!("\n✓ Configuration is valid");
}

/// Handles the --audit mode: reports completeness of persisted data
fn handle_audit(config: &grimoire::Config) -> anyhow::Result<()> {
    let list_path = config.output.list_path();
    if !list_cache::exists(&list_path) {
        bail!(
            "no cached entity list at {}; run a crawl first",
            list_path.display()
        );
    }

    let entities = list_cache::read(&list_path).context("failed to read cached entity list")?;
    println!("Auditing {} entities\n", entities.len());

    let auditor = Auditor::new(&config.output.data_dir, &config.output.icons_dir);
    let report = auditor.audit(&entities);
    print_report(&report);

    if !report.is_complete() {
        std::process::exit(1);
    }
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: grimoire::Config) -> anyhow::Result<()> {
    tracing::info!("Starting crawl (resumes automatically if interrupted)");

    // Per-entity failures are inside the summary and do not affect the exit
    // code; only setup failures surface as errors here.
    let summary = crawl(config).await.context("crawl failed")?;

    tracing::info!(
        "Crawl finished: {} fetched, {} skipped, {} failed",
        summary.fetched,
        summary.skipped,
        summary.failed
    );
    Ok(())
}
