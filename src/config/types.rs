use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Grimoire
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum fetch attempts per operation (first try included)
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between retry attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Minimum delay between sequential entity fetches (milliseconds)
    #[serde(rename = "min-request-delay-ms", default = "default_min_request_delay_ms")]
    pub min_request_delay_ms: u64,

    /// Random jitter added on top of the minimum delay (milliseconds)
    #[serde(rename = "request-jitter-ms", default = "default_request_jitter_ms")]
    pub request_jitter_ms: u64,

    /// Maximum number of concurrently in-flight fetches
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: u32,

    /// Timeout for loading a detail or list page (milliseconds)
    #[serde(rename = "navigation-timeout-ms", default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Timeout for downloading a single image asset (milliseconds)
    #[serde(rename = "asset-timeout-ms", default = "default_asset_timeout_ms")]
    pub asset_timeout_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    5_000
}

fn default_min_request_delay_ms() -> u64 {
    3_000
}

fn default_request_jitter_ms() -> u64 {
    4_000
}

fn default_max_concurrent_fetches() -> u32 {
    3
}

fn default_navigation_timeout_ms() -> u64 {
    120_000
}

fn default_asset_timeout_ms() -> u64 {
    15_000
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            min_request_delay_ms: default_min_request_delay_ms(),
            request_jitter_ms: default_request_jitter_ms(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            asset_timeout_ms: default_asset_timeout_ms(),
        }
    }
}

impl CrawlerConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn min_request_delay(&self) -> Duration {
        Duration::from_millis(self.min_request_delay_ms)
    }

    pub fn request_jitter(&self) -> Duration {
        Duration::from_millis(self.request_jitter_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_millis(self.asset_timeout_ms)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Catalog source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the catalog site (e.g., "https://example.com")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the entity list page, relative to the base URL
    #[serde(rename = "list-path")]
    pub list_path: String,
}

impl SourceConfig {
    /// Returns the absolute URL of the entity list page
    pub fn list_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.list_path)
    }
}

/// Output layout configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding detail documents, the list cache, and the run log
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// Directory holding downloaded image assets
    #[serde(rename = "icons-dir")]
    pub icons_dir: String,

    /// Filename of the cached entity list (JSON array), inside data-dir
    #[serde(rename = "list-file", default = "default_list_file")]
    pub list_file: String,

    /// Filename of the append-only run log, inside data-dir
    #[serde(rename = "log-file", default = "default_log_file")]
    pub log_file: String,
}

fn default_list_file() -> String {
    "entities.json".to_string()
}

fn default_log_file() -> String {
    "crawl.log".to_string()
}

impl OutputConfig {
    pub fn list_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.list_file)
    }

    pub fn log_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.log_file)
    }
}
