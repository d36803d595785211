//! Crawl run state types
//!
//! Identity of the entities being crawled, the orchestrator's phase machine,
//! and per-run accounting. None of these types drive correctness decisions;
//! the filesystem does (see `crawler::planner`).

mod entity;
mod phase;

pub use entity::{EntityOutcome, EntityRef, RunSummary};
pub use phase::CrawlPhase;
