//! In-process caching of board facts.
//!
//! This module keeps one snapshot of the configured board's recent sprints,
//! the status vocabulary and the team roster:
//! - Snapshots live for a fixed TTL and are then replaced wholesale
//! - Readers never see a partially refreshed snapshot
//! - A missing board id is reported to the caller, never papered over with stale data

mod clock;
mod facts;

#[cfg(test)]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use facts::{CacheInfo, CachedFacts, FactCache};
