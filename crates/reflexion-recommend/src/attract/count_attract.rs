//! CountAttract: attraction from weighted dependency counts.
//!
//! For a candidate `c` and cluster `K`, every implementation dependency
//! between the subtree of `c` and an already mapped node contributes:
//!
//! - its full weight if the other end is mapped onto `K`,
//! - `weight * (1 - phi)` if the other end is mapped onto another cluster and
//!   the dependency would be allowed had `c` been mapped onto `K`,
//! - nothing otherwise.
//!
//! This is the "overall minus to-others" formulation with both sums taken in
//! one scan over the subtree's edges.

use std::collections::BTreeMap;

use reflexion_core::config::{AttractFunctionKind, CountAttractConfig};
use reflexion_core::constants::DEFAULT_EDGE_WEIGHT;
use reflexion_core::events::{EdgeChangeEvent, HierarchyChangeEvent};
use reflexion_core::types::collections::FxHashMap;
use reflexion_core::types::{ChangeType, Edge, EdgeState, Node};

use super::{AttractFunction, DirtyTracker};
use crate::classify::NodeClassifier;
use crate::graph::ReflexionGraph;

pub struct CountAttract {
    tracker: DirtyTracker,
    phi: f64,
    edge_weights: BTreeMap<String, f64>,
    /// `(source cluster, target cluster)` → state of a dependency between them.
    state_cache: FxHashMap<(String, String), EdgeState>,
}

impl CountAttract {
    pub fn new(config: &CountAttractConfig, classifier: NodeClassifier) -> Self {
        Self {
            tracker: DirtyTracker::new(classifier),
            phi: config.effective_phi(),
            edge_weights: config.edge_weights.clone(),
            state_cache: FxHashMap::default(),
        }
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    fn edge_weight(&self, edge_type: &str) -> f64 {
        self.edge_weights
            .get(edge_type)
            .copied()
            .unwrap_or(DEFAULT_EDGE_WEIGHT)
    }

    fn cached_state(&mut self, graph: &ReflexionGraph, from: &str, to: &str) -> EdgeState {
        let key = (from.to_string(), to.to_string());
        if let Some(state) = self.state_cache.get(&key) {
            return *state;
        }
        let state = graph.state_between(from, to);
        self.state_cache.insert(key, state);
        state
    }

    /// Clusters whose scores move when something gets mapped onto or
    /// unmapped from `cluster`.
    fn mark_affected_clusters(&mut self, graph: &ReflexionGraph, cluster: &str) {
        if self.phi < 1.0 {
            // Foreign clusters contribute through allowed dependencies.
            self.tracker.mark_all_clusters(graph);
            return;
        }
        self.tracker.mark_cluster(graph, cluster);
        for neighbor in graph.architecture_neighbors(cluster) {
            self.tracker.mark_cluster(graph, &neighbor);
        }
    }

    fn contribution(
        &mut self,
        graph: &ReflexionGraph,
        node_id: &str,
        edge: &Edge,
        cluster_id: &str,
    ) -> f64 {
        let Some(neighbor) = edge.other_end(node_id) else {
            return 0.0;
        };
        let Some(neighbor_cluster) = graph.maps_to_id(neighbor) else {
            return 0.0;
        };
        let weight = self.edge_weight(&edge.edge_type);
        if neighbor_cluster == cluster_id {
            return weight;
        }
        let state = if edge.source == node_id {
            self.cached_state(graph, cluster_id, neighbor_cluster)
        } else {
            self.cached_state(graph, neighbor_cluster, cluster_id)
        };
        if state.is_allowed() {
            weight * (1.0 - self.phi)
        } else {
            0.0
        }
    }
}

impl AttractFunction for CountAttract {
    fn kind(&self) -> AttractFunctionKind {
        AttractFunctionKind::CountAttract
    }

    fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut DirtyTracker {
        &mut self.tracker
    }

    fn score(&mut self, graph: &ReflexionGraph, candidate: &Node, cluster: &Node) -> f64 {
        if candidate.node_type != self.tracker.classifier().candidate_type() {
            return 0.0;
        }
        let mut attraction = 0.0;
        for node_id in graph.descendants(&candidate.id) {
            for edge in graph.implementation_edges_of(&node_id) {
                attraction += self.contribution(graph, &node_id, edge, &cluster.id);
            }
        }
        attraction
    }

    fn on_changed_candidate(
        &mut self,
        graph: &ReflexionGraph,
        cluster: &Node,
        candidate: &Node,
        change: ChangeType,
    ) {
        if !self.tracker.handling_required(&candidate.id, change, true) {
            return;
        }
        self.mark_affected_clusters(graph, &cluster.id);
        if change == ChangeType::Removal {
            self.tracker.mark_candidate(graph, &candidate.id);
            self.tracker.mark_all_clusters(graph);
        }
        self.tracker.mark_dependent_candidates(graph, &candidate.id);
    }

    /// Only a dependency on a mapped node counts, and only for the candidates
    /// enclosing the other end. The far end's mapping is taken both from the
    /// event, which reflects the graph when the edge changed, and from `graph`.
    fn on_changed_implementation_edge(&mut self, graph: &ReflexionGraph, event: &EdgeChangeEvent) {
        let edge = &event.edge;
        let ends = [
            (&event.source_context, &event.target_context, edge.target.as_str()),
            (&event.target_context, &event.source_context, edge.source.as_str()),
        ];
        for (near, far, far_id) in ends {
            let mut clusters: Vec<String> = far.maps_to.iter().cloned().collect();
            if let Some(current) = graph.maps_to_id(far_id) {
                if !clusters.iter().any(|c| c == current) {
                    clusters.push(current.to_string());
                }
            }
            if clusters.is_empty() {
                continue;
            }
            self.tracker.mark_candidates(graph, &near.ascendants);
            for cluster in &clusters {
                self.mark_affected_clusters(graph, cluster);
            }
        }
    }

    fn on_changed_hierarchy(&mut self, graph: &ReflexionGraph, event: &HierarchyChangeEvent) {
        if event.child.in_architecture() {
            // Ascendants decide which dependencies are allowed.
            self.state_cache.clear();
            self.tracker.mark_all_clusters(graph);
            self.tracker.mark_all_candidates(graph);
        } else {
            self.tracker.mark_moved_subtree(graph, event);
        }
    }

    fn on_added_architecture_edge(&mut self, graph: &ReflexionGraph, edge: &Edge) {
        self.on_architecture_changed(graph, edge);
    }

    fn on_removed_architecture_edge(&mut self, graph: &ReflexionGraph, edge: &Edge) {
        self.on_architecture_changed(graph, edge);
    }

    fn on_added_cluster(&mut self, graph: &ReflexionGraph, cluster: &Node) {
        self.state_cache.clear();
        self.tracker.mark_cluster(graph, &cluster.id);
        self.tracker.mark_all_candidates(graph);
    }

    fn on_removed_cluster(&mut self, _graph: &ReflexionGraph, cluster: &Node) {
        self.state_cache.clear();
        self.tracker.clear_cluster(&cluster.id);
    }
}

impl CountAttract {
    fn on_architecture_changed(&mut self, graph: &ReflexionGraph, edge: &Edge) {
        self.state_cache.clear();
        self.tracker.mark_cluster(graph, &edge.source);
        self.tracker.mark_cluster(graph, &edge.target);
        if self.phi < 1.0 {
            self.tracker.mark_all_clusters(graph);
        }
        self.tracker.mark_all_candidates(graph);
    }
}
