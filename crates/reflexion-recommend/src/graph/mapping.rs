//! OracleMapping: a serializable set of mapping edges.

use serde::{Deserialize, Serialize};

use reflexion_core::errors::GraphError;

use super::reflexion_graph::ReflexionGraph;

/// One explicit mapping edge from an implementation node to an architecture node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingEdge {
    pub source: String,
    pub target: String,
}

/// A mapping that can be laid over a graph's implementation and
/// architecture, typically the ground truth of an experiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OracleMapping {
    pub edges: Vec<MappingEdge>,
}

impl OracleMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edge(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edges.push(MappingEdge {
            source: source.into(),
            target: target.into(),
        });
        self
    }

    /// The explicit mapping currently held by `graph`, sorted by source.
    pub fn from_graph(graph: &ReflexionGraph) -> Self {
        let mut edges: Vec<MappingEdge> = graph
            .mapping_edges()
            .map(|(source, target)| MappingEdge {
                source: source.to_string(),
                target: target.to_string(),
            })
            .collect();
        edges.sort_by(|a, b| a.source.cmp(&b.source));
        Self { edges }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Build a graph from `base`'s implementation and architecture plus this
    /// mapping, with its analysis already run. Nothing is published.
    pub fn build_graph(&self, base: &ReflexionGraph) -> Result<ReflexionGraph, GraphError> {
        let mut oracle = base.without_mapping();
        for edge in &self.edges {
            oracle.add_to_mapping_silent(&edge.source, &edge.target)?;
        }
        oracle.run_analysis();
        Ok(oracle)
    }
}
