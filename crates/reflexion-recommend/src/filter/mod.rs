//! Recommendation filters: turn scored pairs into recommendations.

pub mod max_filter;

pub use max_filter::MaxFilter;

use std::sync::Arc;

use crate::mapping_pair::MappingPair;

/// Consumes mapping pairs and selects recommendations from them.
///
/// Pairs are shared, not copied: the engine keeps no pair of its own, so the
/// `Arc` handed to `upsert` is the one every query returns until it is
/// superseded. Query results are sorted by `(candidate, cluster)`.
pub trait RecommendationFilter: Send {
    /// Insert a pair, replacing any pair with the same ids.
    fn upsert(&mut self, pair: Arc<MappingPair>);

    /// Forget every pair of `candidate_id`.
    fn remove_candidate(&mut self, candidate_id: &str);

    /// Forget every pair of `cluster_id`.
    fn remove_cluster(&mut self, cluster_id: &str);

    fn get(&self, candidate_id: &str, cluster_id: &str) -> Option<Arc<MappingPair>>;

    fn recommendations(&self) -> Vec<Arc<MappingPair>>;

    fn recommendations_for_candidate(&self, candidate_id: &str) -> Vec<Arc<MappingPair>>;

    fn recommendations_for_cluster(&self, cluster_id: &str) -> Vec<Arc<MappingPair>>;

    /// Recommendations unambiguous enough to be applied without a user decision.
    fn automatic_mappings(&self) -> Vec<Arc<MappingPair>>;

    fn all_pairs(&self) -> Vec<Arc<MappingPair>>;

    fn reset(&mut self);
}
