//! Evaluation against an oracle mapping: hits and percentile ranks.

use std::borrow::Borrow;
use std::collections::BTreeSet;

use reflexion_core::constants::UNDEFINED_PERCENTILE_RANK;
use reflexion_core::errors::RecommendationError;
use serde::{Deserialize, Serialize};

use super::RecommendationEngine;
use crate::graph::ReflexionGraph;
use crate::mapping_pair::MappingPair;

/// The oracle mapping edge responsible for a candidate, with the clusters
/// that count as correct for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleEdge {
    pub source_id: String,
    pub target_id: String,
    /// The target and everything below it.
    pub allowed_clusters: BTreeSet<String>,
}

/// Whether mapping `candidate_id` onto `cluster_id` agrees with `oracle`:
/// some oracle mapping edge leads from an ascendant-or-self of the candidate
/// to an ascendant-or-self of the cluster.
pub fn is_hit(oracle: &ReflexionGraph, candidate_id: &str, cluster_id: &str) -> bool {
    let cluster_ascendants: BTreeSet<String> = oracle.ascendants(cluster_id).into_iter().collect();
    oracle.ascendants(candidate_id).iter().any(|ascendant| {
        oracle
            .explicit_maps_to(ascendant)
            .is_some_and(|target| cluster_ascendants.contains(target))
    })
}

/// Percentile rank of `candidate_id` among the pairs scored against the
/// oracle edge's clusters.
///
/// The pairs are ranked best first (ties keep their input order) and
/// restricted to pairs whose cluster is in `edge.allowed_clusters`. With
/// the candidate's first pair at `index` of `count`, the rank is
/// `1 - index / count`, rounded to four decimals: the best pair scores `1.0`,
/// the last of `N` scores `1 / N`. A candidate without any such pair scores
/// `-1.0`. `pairs` itself is left untouched.
pub fn percentile_rank<P: Borrow<MappingPair>>(
    candidate_id: &str,
    pairs: &[P],
    edge: &OracleEdge,
) -> f64 {
    let mut ranked: Vec<&MappingPair> = pairs
        .iter()
        .map(|pair| Borrow::<MappingPair>::borrow(pair))
        .filter(|pair| edge.allowed_clusters.contains(pair.cluster_id()))
        .collect();
    ranked.sort_by(|a, b| b.cmp(a));

    let Some(index) = ranked.iter().position(|pair| pair.candidate_id() == candidate_id) else {
        return UNDEFINED_PERCENTILE_RANK;
    };
    round4(1.0 - index as f64 / ranked.len() as f64)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

impl RecommendationEngine {
    fn require_oracle(&self) -> Result<&ReflexionGraph, RecommendationError> {
        self.oracle
            .as_ref()
            .ok_or_else(|| RecommendationError::InvalidArgument("no oracle mapping configured".to_string()))
    }

    /// See [`is_hit`]. Fails without an oracle.
    pub fn is_hit(&self, candidate_id: &str, cluster_id: &str) -> Result<bool, RecommendationError> {
        Ok(is_hit(self.require_oracle()?, candidate_id, cluster_id))
    }

    /// The cluster the oracle maps `candidate_id` onto, if any.
    pub fn expected_cluster_id(&self, candidate_id: &str) -> Result<Option<String>, RecommendationError> {
        let oracle = self.require_oracle()?;
        Ok(oracle.maps_to(candidate_id).map(|node| node.id.clone()))
    }

    /// The oracle mapping edge whose source subtree contains `candidate_id`.
    ///
    /// `NotFound` if no such edge exists, `InvariantViolation` if more than
    /// one ascendant of the candidate is mapped explicitly.
    pub fn oracle_edge(&self, candidate_id: &str) -> Result<OracleEdge, RecommendationError> {
        let oracle = self.require_oracle()?;
        let mut edges = oracle.ascendants(candidate_id).into_iter().filter_map(|ascendant| {
            oracle
                .explicit_maps_to(&ascendant)
                .map(|target| (ascendant.clone(), target.to_string()))
        });
        let (source_id, target_id) = edges.next().ok_or_else(|| {
            RecommendationError::NotFound(format!("no oracle mapping edge covers '{candidate_id}'"))
        })?;
        if let Some((other, _)) = edges.next() {
            return Err(RecommendationError::InvariantViolation(format!(
                "'{candidate_id}' is covered by oracle mapping edges from both '{source_id}' and '{other}'"
            )));
        }
        let allowed_clusters = oracle.descendants(&target_id).into_iter().collect();
        Ok(OracleEdge {
            source_id,
            target_id,
            allowed_clusters,
        })
    }

    /// Percentile rank of `candidate_id` among every pair currently scored.
    pub fn percentile_rank(&self, candidate_id: &str) -> Result<f64, RecommendationError> {
        let edge = self.oracle_edge(candidate_id)?;
        Ok(percentile_rank(candidate_id, &self.all_pairs(), &edge))
    }
}
