//! Run output: the append-only run log and end-of-run summaries

mod run_log;
mod summary;

pub use run_log::RunLog;
pub use summary::{print_report, print_summary};
