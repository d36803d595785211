//! Resumable fetch planning
//!
//! The skip-vs-fetch decision for one entity. On-disk presence of the
//! entity's detail document is the whole decision: no in-memory bookkeeping
//! is consulted, no partial-content validation is attempted (an empty or
//! truncated file counts as done - accepted risk), and no other entity's
//! state is considered. That makes the decision safe to evaluate repeatedly
//! and concurrently, and it is what lets a killed run resume by simply
//! running again.

use crate::state::EntityRef;
use crate::store::DetailStore;

/// Decision for one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// Detail document already persisted; do nothing
    Skip,

    /// No detail document on disk; fetch it
    Fetch,
}

/// Plans work for one entity from persisted state alone
pub fn plan_for(entity: &EntityRef, details: &DetailStore) -> FetchPlan {
    if details.exists(entity) {
        FetchPlan::Skip
    } else {
        FetchPlan::Fetch
    }
}
