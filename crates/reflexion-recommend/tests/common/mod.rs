//! Shared graph fixtures for reflexion-recommend integration tests.

#![allow(dead_code)]

use reflexion_core::config::RecommendationSettings;
use reflexion_core::types::Node;
use reflexion_recommend::{OracleMapping, ReflexionGraph};

/// Builds graphs edge by edge; panics on invalid input.
pub struct GraphBuilder {
    graph: ReflexionGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: ReflexionGraph::new(),
        }
    }

    pub fn clusters(mut self, ids: &[&str]) -> Self {
        for id in ids {
            self.graph.add_node(Node::architecture(*id, "Cluster")).unwrap();
        }
        self
    }

    pub fn candidates(mut self, ids: &[&str]) -> Self {
        for id in ids {
            self.graph.add_node(Node::implementation(*id, "Class")).unwrap();
        }
        self
    }

    pub fn node(mut self, node: Node) -> Self {
        self.graph.add_node(node).unwrap();
        self
    }

    pub fn edge(mut self, source: &str, target: &str) -> Self {
        self.graph.add_edge(source, target, "Call").unwrap();
        self
    }

    pub fn arch_edge(mut self, source: &str, target: &str) -> Self {
        self.graph.add_edge(source, target, "Depends").unwrap();
        self
    }

    pub fn child(mut self, child: &str, parent: &str) -> Self {
        self.graph.set_parent(child, Some(parent)).unwrap();
        self
    }

    pub fn mapped(mut self, source: &str, target: &str) -> Self {
        self.graph.add_to_mapping(source, target).unwrap();
        self
    }

    pub fn build(self) -> ReflexionGraph {
        self.graph
    }
}

pub fn settings() -> RecommendationSettings {
    RecommendationSettings::default()
}

/// Clusters K1, K2, K3 without architecture edges. A is mapped onto K1 and
/// B onto K2; candidates x, y, z are unmapped with x -> A, y -> B, z -> x.
pub fn three_cluster_graph() -> ReflexionGraph {
    GraphBuilder::new()
        .clusters(&["K1", "K2", "K3"])
        .candidates(&["A", "B", "x", "y", "z"])
        .edge("x", "A")
        .edge("y", "B")
        .edge("z", "x")
        .mapped("A", "K1")
        .mapped("B", "K2")
        .build()
}

/// Ten unmapped candidates c0..c9 and clusters K1, K2.
/// The oracle maps c0..c4 onto K1 and c5..c9 onto K2.
pub fn ten_candidate_graph() -> (ReflexionGraph, OracleMapping) {
    let ids: Vec<String> = (0..10).map(|i| format!("c{i}")).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let graph = GraphBuilder::new()
        .clusters(&["K1", "K2"])
        .candidates(&refs)
        .build();
    let oracle = ids.iter().enumerate().fold(OracleMapping::new(), |oracle, (i, id)| {
        oracle.with_edge(id.as_str(), if i < 5 { "K1" } else { "K2" })
    });
    (graph, oracle)
}

/// Two triangles of candidates: c0..c2 belong to K1, c3..c5 to K2.
pub fn two_triangle_graph() -> (ReflexionGraph, OracleMapping) {
    let graph = GraphBuilder::new()
        .clusters(&["K1", "K2"])
        .candidates(&["c0", "c1", "c2", "c3", "c4", "c5"])
        .edge("c0", "c1")
        .edge("c1", "c2")
        .edge("c0", "c2")
        .edge("c3", "c4")
        .edge("c4", "c5")
        .edge("c3", "c5")
        .build();
    let oracle = OracleMapping::new()
        .with_edge("c0", "K1")
        .with_edge("c1", "K1")
        .with_edge("c2", "K1")
        .with_edge("c3", "K2")
        .with_edge("c4", "K2")
        .with_edge("c5", "K2");
    (graph, oracle)
}
