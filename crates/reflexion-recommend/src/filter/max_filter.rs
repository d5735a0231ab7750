//! MaxFilter: recommend the pairs with the highest attraction value.

use std::sync::Arc;

use reflexion_core::constants::ATTRACTION_VALUE_DELTA;
use reflexion_core::types::collections::{FxHashMap, FxHashSet};

use super::RecommendationFilter;
use crate::mapping_pair::MappingPair;

type PairKey = (String, String);

/// Keeps every live pair and the set of pairs whose positive attraction value
/// lies within [`ATTRACTION_VALUE_DELTA`] of the current maximum.
///
/// When the recommended set runs empty it is rebuilt from all pairs, in key
/// order, so the outcome does not depend on insertion history.
#[derive(Debug, Default)]
pub struct MaxFilter {
    pairs: FxHashMap<PairKey, Arc<MappingPair>>,
    recommended: FxHashSet<PairKey>,
    /// Recommended pairs per candidate.
    candidate_counts: FxHashMap<String, usize>,
    current_value: f64,
}

impl MaxFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The attraction value recommendations are currently measured against.
    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn place(&mut self, key: PairKey, value: f64) {
        let difference = self.current_value - value;
        let contained = self.recommended.contains(&key);
        if difference < -ATTRACTION_VALUE_DELTA && value > 0.0 {
            self.clear_recommended();
            self.current_value = value;
            self.recommend(key);
        } else if difference < ATTRACTION_VALUE_DELTA {
            if !contained && value > 0.0 {
                self.recommend(key);
            }
        } else if contained {
            self.unrecommend(&key);
        }
    }

    fn recommend(&mut self, key: PairKey) {
        *self.candidate_counts.entry(key.0.clone()).or_default() += 1;
        self.recommended.insert(key);
    }

    fn unrecommend(&mut self, key: &PairKey) {
        if !self.recommended.remove(key) {
            return;
        }
        if let Some(count) = self.candidate_counts.get_mut(&key.0) {
            *count -= 1;
            if *count == 0 {
                self.candidate_counts.remove(&key.0);
            }
        }
    }

    fn clear_recommended(&mut self) {
        self.recommended.clear();
        self.candidate_counts.clear();
        self.current_value = 0.0;
    }

    fn rebuild_if_empty(&mut self) {
        if !self.recommended.is_empty() {
            return;
        }
        self.clear_recommended();
        self.current_value = f64::MIN;
        let mut entries: Vec<(PairKey, f64)> = self
            .pairs
            .iter()
            .map(|(key, pair)| (key.clone(), pair.attraction_value()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, value) in entries {
            self.place(key, value);
        }
        if self.recommended.is_empty() {
            self.current_value = 0.0;
        }
    }

    fn remove_where(&mut self, matches: impl Fn(&PairKey) -> bool) {
        let doomed: Vec<PairKey> = self.pairs.keys().filter(|k| matches(k)).cloned().collect();
        for key in doomed {
            self.pairs.remove(&key);
            self.unrecommend(&key);
        }
        self.rebuild_if_empty();
    }

    fn collect(&self, keys: impl Iterator<Item = PairKey>) -> Vec<Arc<MappingPair>> {
        let mut keys: Vec<PairKey> = keys.collect();
        keys.sort();
        keys.iter().filter_map(|k| self.pairs.get(k).cloned()).collect()
    }
}

impl RecommendationFilter for MaxFilter {
    fn upsert(&mut self, pair: Arc<MappingPair>) {
        let key = pair.key();
        let value = pair.attraction_value();
        self.pairs.insert(key.clone(), pair);
        self.place(key, value);
        self.rebuild_if_empty();
    }

    fn remove_candidate(&mut self, candidate_id: &str) {
        self.remove_where(|(candidate, _)| candidate == candidate_id);
    }

    fn remove_cluster(&mut self, cluster_id: &str) {
        self.remove_where(|(_, cluster)| cluster == cluster_id);
    }

    fn get(&self, candidate_id: &str, cluster_id: &str) -> Option<Arc<MappingPair>> {
        self.pairs
            .get(&(candidate_id.to_string(), cluster_id.to_string()))
            .cloned()
    }

    fn recommendations(&self) -> Vec<Arc<MappingPair>> {
        self.collect(self.recommended.iter().cloned())
    }

    fn recommendations_for_candidate(&self, candidate_id: &str) -> Vec<Arc<MappingPair>> {
        self.collect(
            self.recommended
                .iter()
                .filter(|(candidate, _)| candidate == candidate_id)
                .cloned(),
        )
    }

    fn recommendations_for_cluster(&self, cluster_id: &str) -> Vec<Arc<MappingPair>> {
        self.collect(
            self.recommended
                .iter()
                .filter(|(_, cluster)| cluster == cluster_id)
                .cloned(),
        )
    }

    /// Recommended pairs whose candidate has no competing recommendation.
    fn automatic_mappings(&self) -> Vec<Arc<MappingPair>> {
        self.collect(
            self.recommended
                .iter()
                .filter(|(candidate, _)| self.candidate_counts.get(candidate) == Some(&1))
                .cloned(),
        )
    }

    fn all_pairs(&self) -> Vec<Arc<MappingPair>> {
        self.collect(self.pairs.keys().cloned())
    }

    fn reset(&mut self) {
        self.pairs.clear();
        self.clear_recommended();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(candidate: &str, cluster: &str, value: f64) -> Arc<MappingPair> {
        Arc::new(MappingPair::new(candidate, cluster, value))
    }

    #[test]
    fn higher_value_replaces_recommendations() {
        let mut filter = MaxFilter::new();
        filter.upsert(pair("A", "X", 1.0));
        filter.upsert(pair("B", "X", 2.0));
        let recommended = filter.recommendations();
        assert_eq!(recommended.len(), 1);
        assert_eq!(recommended[0].candidate_id(), "B");
        assert_eq!(filter.current_value(), 2.0);
    }

    #[test]
    fn non_positive_values_are_never_recommended() {
        let mut filter = MaxFilter::new();
        filter.upsert(pair("A", "X", 0.0));
        filter.upsert(pair("B", "X", -1.0));
        assert!(filter.recommendations().is_empty());
        assert_eq!(filter.all_pairs().len(), 2);
    }

    #[test]
    fn lowered_recommendation_falls_back_to_next_best() {
        let mut filter = MaxFilter::new();
        filter.upsert(pair("A", "X", 3.0));
        filter.upsert(pair("B", "X", 2.0));
        filter.upsert(pair("A", "X", 1.0));
        let recommended = filter.recommendations();
        assert_eq!(recommended.len(), 1);
        assert_eq!(recommended[0].candidate_id(), "B");
    }
}
