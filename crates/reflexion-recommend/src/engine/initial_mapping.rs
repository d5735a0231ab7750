//! Seeded synthetic initial mappings guided by the oracle.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reflexion_core::errors::RecommendationError;

use super::RecommendationEngine;
use crate::graph::ReflexionGraph;

/// Candidates to map, grouped by the cluster they should be mapped onto.
pub type InitialMapping = BTreeMap<String, BTreeSet<String>>;

impl RecommendationEngine {
    /// Choose unmapped candidates to map onto their oracle cluster until
    /// `target_fraction` of all candidates would be mapped.
    ///
    /// Clusters take turns in sorted order, each turn drawing one remaining
    /// candidate of that cluster at random. The fraction is checked before
    /// every draw, so the result never overshoots the fraction; checking only
    /// after a full round of clusters would map up to one candidate per
    /// cluster more. The same graph, fraction and seed always produce the
    /// same mapping. Nothing is applied to the graph.
    pub fn create_initial_mapping(
        &self,
        graph: &ReflexionGraph,
        target_fraction: f64,
        seed: u64,
    ) -> Result<InitialMapping, RecommendationError> {
        if !(0.0..=1.0).contains(&target_fraction) {
            return Err(RecommendationError::InvalidArgument(format!(
                "fraction {target_fraction} is outside [0, 1]"
            )));
        }
        self.check_graph(graph)?;
        let oracle = self.oracle.as_ref().ok_or_else(|| {
            RecommendationError::InvalidArgument(
                "an initial mapping needs an oracle mapping".to_string(),
            )
        })?;

        let candidates = self.candidates(graph);
        let total = candidates.len();
        let mut mapped = candidates
            .iter()
            .filter(|id| graph.maps_to(id).is_some())
            .count();

        let mut pools: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for candidate in candidates {
            if graph.maps_to(&candidate).is_some() {
                continue;
            }
            let Some(expected) = oracle.maps_to(&candidate) else {
                continue;
            };
            if !self.classifier.is_cluster(expected) {
                continue;
            }
            pools.entry(expected.id.clone()).or_default().push(candidate);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut mapping = InitialMapping::new();
        let reached = |mapped: usize| total == 0 || mapped as f64 / total as f64 >= target_fraction;

        'turns: loop {
            let mut drew = false;
            for (cluster, pool) in pools.iter_mut() {
                if reached(mapped) {
                    break 'turns;
                }
                if pool.is_empty() {
                    continue;
                }
                let candidate = pool.remove(rng.gen_range(0..pool.len()));
                let expected = oracle.maps_to(&candidate).map(|node| node.id.as_str());
                if expected != Some(cluster.as_str()) {
                    return Err(RecommendationError::InvariantViolation(format!(
                        "'{candidate}' was drawn for '{cluster}' but the oracle maps it onto {expected:?}"
                    )));
                }
                mapping.entry(cluster.clone()).or_default().insert(candidate);
                mapped += 1;
                drew = true;
            }
            if !drew {
                break;
            }
        }

        tracing::debug!(
            seed,
            target_fraction,
            candidates = total,
            mapped,
            clusters = mapping.len(),
            "initial mapping drawn"
        );
        Ok(mapping)
    }

    /// Map every chosen candidate onto its cluster.
    pub fn apply_initial_mapping(
        graph: &mut ReflexionGraph,
        mapping: &InitialMapping,
    ) -> Result<(), RecommendationError> {
        for (cluster, candidates) in mapping {
            for candidate in candidates {
                graph.add_to_mapping(candidate, cluster)?;
            }
        }
        Ok(())
    }
}
