//! NoAttract: every pair scores zero. Baseline for experiments.

use reflexion_core::config::AttractFunctionKind;
use reflexion_core::events::{EdgeChangeEvent, HierarchyChangeEvent};
use reflexion_core::types::{ChangeType, Node};

use super::{AttractFunction, DirtyTracker};
use crate::classify::NodeClassifier;
use crate::graph::ReflexionGraph;

pub struct NoAttract {
    tracker: DirtyTracker,
}

impl NoAttract {
    pub fn new(classifier: NodeClassifier) -> Self {
        Self {
            tracker: DirtyTracker::new(classifier),
        }
    }
}

impl AttractFunction for NoAttract {
    fn kind(&self) -> AttractFunctionKind {
        AttractFunctionKind::NoAttract
    }

    fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut DirtyTracker {
        &mut self.tracker
    }

    fn score(&mut self, _graph: &ReflexionGraph, _candidate: &Node, _cluster: &Node) -> f64 {
        0.0
    }

    fn on_changed_candidate(
        &mut self,
        graph: &ReflexionGraph,
        _cluster: &Node,
        candidate: &Node,
        change: ChangeType,
    ) {
        if self.tracker.handling_required(&candidate.id, change, true)
            && change == ChangeType::Removal
        {
            self.tracker.mark_candidate(graph, &candidate.id);
            self.tracker.mark_all_clusters(graph);
        }
    }

    fn on_changed_implementation_edge(&mut self, _graph: &ReflexionGraph, _event: &EdgeChangeEvent) {}

    fn on_changed_hierarchy(&mut self, _graph: &ReflexionGraph, _event: &HierarchyChangeEvent) {}
}
