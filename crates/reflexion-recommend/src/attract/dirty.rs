//! DirtyTracker: the clusters and candidates whose scores are stale.

use reflexion_core::events::HierarchyChangeEvent;
use reflexion_core::types::collections::FxHashSet;
use reflexion_core::types::ChangeType;

use crate::classify::NodeClassifier;
use crate::graph::ReflexionGraph;

/// Dirty-set bookkeeping shared by the attraction functions.
///
/// Clusters are cleared one by one by the engine as it rescores them.
/// Candidates stay dirty for the whole pass, since every dirty cluster
/// consumes the same candidate list, and are dropped in [`finish_pass`].
///
/// [`finish_pass`]: DirtyTracker::finish_pass
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    classifier: NodeClassifier,
    clusters: FxHashSet<String>,
    candidates: FxHashSet<String>,
    /// Candidates whose current mapping has been accounted for.
    handled: FxHashSet<String>,
}

impl DirtyTracker {
    pub fn new(classifier: NodeClassifier) -> Self {
        Self {
            classifier,
            clusters: FxHashSet::default(),
            candidates: FxHashSet::default(),
            handled: FxHashSet::default(),
        }
    }

    pub fn classifier(&self) -> &NodeClassifier {
        &self.classifier
    }

    /// Mark a cluster dirty if it exists and is a cluster.
    pub fn mark_cluster(&mut self, graph: &ReflexionGraph, id: &str) {
        if graph.node(id).is_some_and(|n| self.classifier.is_cluster(n)) {
            self.clusters.insert(id.to_string());
        }
    }

    pub fn mark_all_clusters(&mut self, graph: &ReflexionGraph) {
        let classifier = &self.classifier;
        self.clusters.extend(
            graph
                .nodes()
                .filter(|n| classifier.is_cluster(n))
                .map(|n| n.id.clone()),
        );
    }

    /// Mark a candidate dirty if it exists, is a candidate, and is unmapped.
    pub fn mark_candidate(&mut self, graph: &ReflexionGraph, id: &str) {
        let eligible = graph.node(id).is_some_and(|n| self.classifier.is_candidate(n))
            && graph.maps_to(id).is_none();
        if eligible {
            self.candidates.insert(id.to_string());
        }
    }

    pub fn mark_all_candidates(&mut self, graph: &ReflexionGraph) {
        let classifier = &self.classifier;
        self.candidates.extend(
            graph
                .nodes()
                .filter(|n| classifier.is_candidate(n) && graph.maps_to(&n.id).is_none())
                .map(|n| n.id.clone()),
        );
    }

    /// Record every currently mapped candidate as handled.
    pub fn seed_handled(&mut self, graph: &ReflexionGraph) {
        let classifier = &self.classifier;
        self.handled.extend(
            graph
                .nodes()
                .filter(|n| classifier.is_candidate(n) && graph.maps_to(&n.id).is_some())
                .map(|n| n.id.clone()),
        );
    }

    /// Mark every candidate among `id` and its ascendants.
    pub fn mark_enclosing_candidates(&mut self, graph: &ReflexionGraph, id: &str) {
        for ascendant in graph.ascendants(id) {
            self.mark_candidate(graph, &ascendant);
        }
    }

    /// Mark every candidate among `ids`. Ids no longer in the graph are skipped.
    pub fn mark_candidates(&mut self, graph: &ReflexionGraph, ids: &[String]) {
        for id in ids {
            self.mark_candidate(graph, id);
        }
    }

    /// Mark the candidates depending on, or depended on by, the subtree of
    /// `root`, and the candidates enclosing `root`, whose own subtrees contain
    /// every dependency inside it.
    pub fn mark_dependent_candidates(&mut self, graph: &ReflexionGraph, root: &str) {
        self.mark_enclosing_candidates(graph, root);
        let subtree: FxHashSet<String> = graph.descendants(root).into_iter().collect();
        let mut neighbors: FxHashSet<String> = FxHashSet::default();
        for node_id in &subtree {
            for edge in graph.implementation_edges_of(node_id) {
                if let Some(other) = edge.other_end(node_id) {
                    if !subtree.contains(other) {
                        neighbors.insert(other.to_string());
                    }
                }
            }
        }
        for neighbor in neighbors {
            self.mark_enclosing_candidates(graph, &neighbor);
        }
    }

    /// Mark everything an implementation subtree move can rescore: candidates
    /// enclosing the old and the new position, candidates depending on the
    /// subtree, and every cluster.
    pub fn mark_moved_subtree(&mut self, graph: &ReflexionGraph, event: &HierarchyChangeEvent) {
        self.mark_candidates(graph, &event.old_ascendants);
        self.mark_candidates(graph, &event.new_ascendants);
        self.mark_dependent_candidates(graph, &event.child.id);
        self.mark_all_clusters(graph);
    }

    pub fn clear_cluster(&mut self, id: &str) {
        self.clusters.remove(id);
    }

    pub fn clear_candidate(&mut self, id: &str) {
        self.candidates.remove(id);
    }

    /// Dirty clusters, sorted for a deterministic pass order.
    pub fn clusters(&self) -> Vec<String> {
        let mut clusters: Vec<String> = self.clusters.iter().cloned().collect();
        clusters.sort();
        clusters
    }

    /// Dirty candidates, sorted for a deterministic pass order.
    pub fn candidates(&self) -> Vec<String> {
        let mut candidates: Vec<String> = self.candidates.iter().cloned().collect();
        candidates.sort();
        candidates
    }

    pub fn is_cluster_dirty(&self, id: &str) -> bool {
        self.clusters.contains(id)
    }

    pub fn is_candidate_dirty(&self, id: &str) -> bool {
        self.candidates.contains(id)
    }

    /// Drop candidate dirtiness once every dirty cluster has consumed it.
    pub fn finish_pass(&mut self) {
        if self.clusters.is_empty() {
            self.candidates.clear();
        }
    }

    /// Whether a mapping change of `candidate` still has to be applied.
    ///
    /// An addition needs handling only if the candidate is not yet handled,
    /// a removal only if it is. With `update` the handled set follows the
    /// change.
    pub fn handling_required(&mut self, candidate: &str, change: ChangeType, update: bool) -> bool {
        match change {
            ChangeType::Addition => {
                if self.handled.contains(candidate) {
                    return false;
                }
                if update {
                    self.handled.insert(candidate.to_string());
                }
                true
            }
            ChangeType::Removal => {
                if !self.handled.contains(candidate) {
                    return false;
                }
                if update {
                    self.handled.remove(candidate);
                }
                true
            }
        }
    }

    pub fn is_handled(&self, candidate: &str) -> bool {
        self.handled.contains(candidate)
    }

    pub fn forget_candidate(&mut self, id: &str) {
        self.candidates.remove(id);
        self.handled.remove(id);
    }

    pub fn reset(&mut self) {
        self.clusters.clear();
        self.candidates.clear();
        self.handled.clear();
    }
}
