//! Persistence layer
//!
//! Everything the crawl writes lives behind this module: raw detail
//! documents, downloaded image assets, and the cached entity list. Path
//! derivation is centralized in [`paths`] so the stores and the integrity
//! auditor can never disagree about where an artifact belongs.

mod assets;
mod detail;
pub mod list_cache;
pub mod paths;

pub use assets::AssetStore;
pub use detail::DetailStore;
