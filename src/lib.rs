//! Grimoire: a resilient catalog crawler
//!
//! This crate archives a catalog-style web database: it acquires an ordered
//! list of entities, fetches each entity's detail page, downloads referenced
//! images, and audits the on-disk result set for completeness. On-disk
//! presence is the single source of truth for "done", so an interrupted run
//! can always be re-executed and will only perform the remaining work.

pub mod audit;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod store;

use thiserror::Error;

/// Main error type for Grimoire operations
#[derive(Debug, Error)]
pub enum GrimoireError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP status {status} for {url}")]
    BadStatus { url: String, status: u16 },

    #[error("Operation failed after {attempts} attempts: {source}")]
    Transient {
        attempts: u32,
        source: Box<GrimoireError>,
    },

    #[error("Entity list unavailable: {message}")]
    ListUnavailable { message: String },

    #[error("Extraction failed for {url}: {message}")]
    Extract { url: String, message: String },

    #[error("Setup failure: {0}")]
    Setup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl GrimoireError {
    /// Unwraps the original cause of a retry-exhaustion error.
    ///
    /// Retry exhaustion wraps the last attempt's error unchanged; this
    /// returns that inner error, or `self` for any other variant.
    pub fn root_cause(&self) -> &GrimoireError {
        match self {
            Self::Transient { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Grimoire operations
pub type Result<T> = std::result::Result<T, GrimoireError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{CrawlPhase, EntityOutcome, EntityRef, RunSummary};
