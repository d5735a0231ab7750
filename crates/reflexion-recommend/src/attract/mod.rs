//! Attraction functions: pluggable scoring with incremental dirty tracking.
//!
//! Each function owns a [`DirtyTracker`] and keeps it current from the
//! structural hooks the engine forwards to it. The engine only ever rescores
//! what the tracker reports as dirty.

pub mod count_attract;
pub mod dirty;
pub mod no_attract;
pub mod registry;

pub use count_attract::CountAttract;
pub use dirty::DirtyTracker;
pub use no_attract::NoAttract;
pub use registry::{AttractFunctionFactory, AttractFunctionRegistry};

use reflexion_core::config::AttractFunctionKind;
use reflexion_core::events::{EdgeChangeEvent, EdgeStateChangeEvent, HierarchyChangeEvent};
use reflexion_core::types::{ChangeType, Edge, Node};

use crate::graph::ReflexionGraph;

/// Scores candidates against clusters and tracks which scores are stale.
///
/// Hooks have no-op or tracker-only defaults, so an implementation only
/// overrides what its scoring actually depends on.
pub trait AttractFunction: Send {
    fn kind(&self) -> AttractFunctionKind;

    fn tracker(&self) -> &DirtyTracker;

    fn tracker_mut(&mut self) -> &mut DirtyTracker;

    /// Attraction of `candidate` towards `cluster`.
    fn score(&mut self, graph: &ReflexionGraph, candidate: &Node, cluster: &Node) -> f64;

    /// Called once by `configure`, after which everything is scored from scratch.
    fn initialize(&mut self, graph: &ReflexionGraph) {
        let tracker = self.tracker_mut();
        tracker.seed_handled(graph);
        tracker.mark_all_clusters(graph);
        tracker.mark_all_candidates(graph);
    }

    /// `candidate` was mapped onto or unmapped from `cluster`.
    fn on_changed_candidate(
        &mut self,
        graph: &ReflexionGraph,
        cluster: &Node,
        candidate: &Node,
        change: ChangeType,
    );

    fn on_changed_edge_state(&mut self, _graph: &ReflexionGraph, _event: &EdgeStateChangeEvent) {}

    fn on_added_architecture_edge(&mut self, _graph: &ReflexionGraph, _edge: &Edge) {}

    fn on_removed_architecture_edge(&mut self, _graph: &ReflexionGraph, _edge: &Edge) {}

    /// An implementation dependency appeared or disappeared.
    ///
    /// Uses the endpoint contexts from the event, since an endpoint may be
    /// gone from `graph` by the time the event is handled.
    fn on_changed_implementation_edge(&mut self, graph: &ReflexionGraph, event: &EdgeChangeEvent) {
        let tracker = self.tracker_mut();
        tracker.mark_candidates(graph, &event.source_context.ascendants);
        tracker.mark_candidates(graph, &event.target_context.ascendants);
        tracker.mark_all_clusters(graph);
    }

    /// A node moved to another parent, together with its subtree.
    fn on_changed_hierarchy(&mut self, graph: &ReflexionGraph, event: &HierarchyChangeEvent) {
        let tracker = self.tracker_mut();
        if event.child.in_architecture() {
            tracker.mark_all_clusters(graph);
            tracker.mark_all_candidates(graph);
        } else {
            tracker.mark_moved_subtree(graph, event);
        }
    }

    fn on_added_cluster(&mut self, graph: &ReflexionGraph, cluster: &Node) {
        self.tracker_mut().mark_cluster(graph, &cluster.id);
    }

    fn on_removed_cluster(&mut self, _graph: &ReflexionGraph, cluster: &Node) {
        self.tracker_mut().clear_cluster(&cluster.id);
    }

    /// A brand-new candidate must be scored against every cluster.
    fn on_added_candidate(&mut self, graph: &ReflexionGraph, candidate: &Node) {
        let tracker = self.tracker_mut();
        tracker.mark_candidate(graph, &candidate.id);
        tracker.mark_all_clusters(graph);
    }

    fn on_removed_candidate(&mut self, _graph: &ReflexionGraph, candidate: &Node) {
        self.tracker_mut().forget_candidate(&candidate.id);
    }

    fn candidate_type(&self) -> &str {
        self.tracker().classifier().candidate_type()
    }

    fn cluster_type(&self) -> &str {
        self.tracker().classifier().cluster_type()
    }

    fn dirty_clusters(&self) -> Vec<String> {
        self.tracker().clusters()
    }

    fn dirty_candidates(&self) -> Vec<String> {
        self.tracker().candidates()
    }

    fn clear_cluster_dirty(&mut self, id: &str) {
        self.tracker_mut().clear_cluster(id);
    }

    fn mark_candidate_dirty(&mut self, graph: &ReflexionGraph, id: &str) {
        self.tracker_mut().mark_candidate(graph, id);
    }

    fn mark_cluster_dirty(&mut self, graph: &ReflexionGraph, id: &str) {
        self.tracker_mut().mark_cluster(graph, id);
    }

    /// End of a recompute pass.
    fn finish_pass(&mut self) {
        self.tracker_mut().finish_pass();
    }
}
