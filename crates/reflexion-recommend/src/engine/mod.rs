//! Recommendation engine: configuration, event handling, incremental
//! recomputation, initial mappings, and oracle-based evaluation.

pub mod evaluation;
pub mod initial_mapping;
pub mod recommendation_engine;

pub use evaluation::{is_hit, percentile_rank, OracleEdge};
pub use initial_mapping::InitialMapping;
pub use recommendation_engine::RecommendationEngine;
