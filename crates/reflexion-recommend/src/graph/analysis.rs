//! Reflexion analysis: edge states derived from the mapping and the specified architecture.

use petgraph::stable_graph::EdgeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use reflexion_core::events::{ChangeEvent, EdgeStateChangeEvent};
use reflexion_core::types::collections::FxHashSet;
use reflexion_core::types::{EdgeState, Subgraph};

use super::reflexion_graph::ReflexionGraph;

impl ReflexionGraph {
    /// Compute every edge state and keep them current from now on.
    ///
    /// Publishes an edge-state change for every edge whose state differs
    /// from before. Events published from here on are flagged as
    /// post-initialization.
    pub fn run_analysis(&mut self) {
        self.analysis_initialized = true;
        self.recompute_states(true);
    }

    /// Recompute states after a mutation, if analysis has ever run.
    pub(crate) fn refresh_states(&mut self) {
        if self.analysis_initialized {
            self.recompute_states(true);
        }
    }

    pub(crate) fn recompute_states(&mut self, notify: bool) {
        let mut covered: FxHashSet<EdgeIndex> = FxHashSet::default();
        let mut updates: Vec<(EdgeIndex, EdgeState)> = Vec::with_capacity(self.graph.edge_count());

        for idx in self.graph.edge_indices() {
            let edge = &self.graph[idx];
            if edge.subgraph != Subgraph::Implementation {
                continue;
            }
            let state = match (self.maps_to_id(&edge.source), self.maps_to_id(&edge.target)) {
                (Some(source_cluster), Some(target_cluster)) => {
                    let (state, via) = self.classify_dependency(source_cluster, target_cluster);
                    if let Some(via) = via {
                        covered.insert(via);
                    }
                    state
                }
                _ => EdgeState::Unmapped,
            };
            updates.push((idx, state));
        }
        for idx in self.graph.edge_indices() {
            if self.graph[idx].subgraph == Subgraph::Architecture {
                let state = if covered.contains(&idx) {
                    EdgeState::Convergent
                } else {
                    EdgeState::Absent
                };
                updates.push((idx, state));
            }
        }

        for (idx, new_state) in updates {
            let Some(edge) = self.graph.edge_weight_mut(idx) else {
                continue;
            };
            let old_state = edge.state;
            if old_state == new_state {
                continue;
            }
            edge.state = new_state;
            if notify {
                let edge = edge.clone();
                self.publish(ChangeEvent::EdgeStateChange(EdgeStateChangeEvent {
                    edge,
                    old_state,
                    new_state,
                }));
            }
        }
    }

    /// State a dependency from a node in `source_cluster` to a node in
    /// `target_cluster` would have.
    pub fn state_between(&self, source_cluster: &str, target_cluster: &str) -> EdgeState {
        self.classify_dependency(source_cluster, target_cluster).0
    }

    /// Classify a dependency between two clusters, returning the specified
    /// architecture edge that allows it, if any.
    fn classify_dependency(
        &self,
        source_cluster: &str,
        target_cluster: &str,
    ) -> (EdgeState, Option<EdgeIndex>) {
        let source_ascendants = self.ascendants(source_cluster);
        if source_ascendants.iter().any(|a| a == target_cluster) {
            return (EdgeState::ImplicitlyAllowed, None);
        }
        let target_ascendants = self.ascendants(target_cluster);
        for from in &source_ascendants {
            let Some(&from_idx) = self.node_index.get(from) else {
                continue;
            };
            for edge in self.graph.edges_directed(from_idx, Direction::Outgoing) {
                let weight = edge.weight();
                if weight.subgraph == Subgraph::Architecture
                    && target_ascendants.iter().any(|t| *t == weight.target)
                {
                    return (EdgeState::Allowed, Some(edge.id()));
                }
            }
        }
        (EdgeState::Divergent, None)
    }
}
