//! Structured span field names used across the engine.
//!
//! Keeping the names in one place lets log queries rely on them.

/// Number of clusters marked dirty at the start of a recompute pass.
pub const DIRTY_CLUSTERS: &str = "dirty_clusters";

/// Number of candidates marked dirty at the start of a recompute pass.
pub const DIRTY_CANDIDATES: &str = "dirty_candidates";

/// Number of mapping pairs scored during a recompute pass.
pub const RESCORED_PAIRS: &str = "rescored_pairs";

/// Recompute pass duration in microseconds.
pub const UPDATE_DURATION_US: &str = "update_duration_us";

/// Number of graph events drained in one `process_events` call.
pub const EVENTS_DRAINED: &str = "events_drained";

/// Number of candidates still unmapped.
pub const UNMAPPED_CANDIDATES: &str = "unmapped_candidates";
