//! RecommendationEngine: keeps candidate/cluster attraction scores current
//! as the graph changes.

use std::sync::Arc;
use std::time::Instant;

use reflexion_core::config::{AttractFunctionKind, RecommendationSettings};
use reflexion_core::errors::RecommendationError;
use reflexion_core::events::{
    ChangeEvent, EdgeChangeEvent, GraphEvent, MapsToChangeEvent, NodeChangeEvent, Subscription,
    TryRecvError,
};
use reflexion_core::tracing::metrics;
use reflexion_core::types::collections::FxHashSet;
use reflexion_core::types::{ChangeType, Node};
use tracing::field::Empty;

use crate::attract::{AttractFunction, AttractFunctionRegistry};
use crate::classify::NodeClassifier;
use crate::filter::{MaxFilter, RecommendationFilter};
use crate::graph::{OracleMapping, ReflexionGraph};
use crate::mapping_pair::MappingPair;
use crate::statistics::{DecisionLog, StatisticsRecorder};

/// Incremental recommendation engine over one [`ReflexionGraph`].
///
/// The engine holds a subscription to the graph it was configured with and
/// never the graph itself; the host passes the graph back in whenever it
/// drives the engine. Calls with any other graph fail with
/// [`RecommendationError::GraphMismatch`].
pub struct RecommendationEngine {
    graph_id: Option<u64>,
    settings: Option<RecommendationSettings>,
    pub(crate) oracle: Option<ReflexionGraph>,
    pub(crate) classifier: NodeClassifier,
    attract_function: Option<Box<dyn AttractFunction>>,
    filter: Box<dyn RecommendationFilter>,
    unmapped_candidates: FxHashSet<String>,
    subscription: Option<Subscription>,
    statistics: Box<dyn StatisticsRecorder>,
    registry: AttractFunctionRegistry,
}

impl RecommendationEngine {
    /// An unconfigured engine with a [`MaxFilter`], a [`DecisionLog`], and the
    /// default attraction function registry.
    pub fn new() -> Self {
        Self {
            graph_id: None,
            settings: None,
            oracle: None,
            classifier: NodeClassifier::default(),
            attract_function: None,
            filter: Box::new(MaxFilter::new()),
            unmapped_candidates: FxHashSet::default(),
            subscription: None,
            statistics: Box::new(DecisionLog::new()),
            registry: AttractFunctionRegistry::default(),
        }
    }

    pub fn with_filter(mut self, filter: Box<dyn RecommendationFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_statistics(mut self, statistics: Box<dyn StatisticsRecorder>) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_registry(mut self, registry: AttractFunctionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry_mut(&mut self) -> &mut AttractFunctionRegistry {
        &mut self.registry
    }

    // ---- Configuration ----

    /// Attach the engine to `graph` and score everything from scratch.
    ///
    /// Every fallible step runs before the engine is touched, so on error the
    /// previous configuration stays in place.
    pub fn configure(
        &mut self,
        graph: &mut ReflexionGraph,
        settings: &RecommendationSettings,
        oracle_mapping: Option<&OracleMapping>,
    ) -> Result<(), RecommendationError> {
        settings
            .validate()
            .map_err(|e| RecommendationError::Configuration(e.to_string()))?;
        let attract_config = settings.attract_function_config()?;
        let classifier = NodeClassifier::from_settings(settings);
        let mut attract = self.registry.create(&attract_config, classifier.clone())?;
        let oracle = oracle_mapping
            .map(|mapping| mapping.build_graph(graph))
            .transpose()?;

        let was_recording = self.statistics.is_active();
        self.statistics.stop();
        self.statistics.reset();
        self.statistics.set_config_info(settings);

        self.subscription = None;
        self.graph_id = Some(graph.id());
        self.settings = Some(settings.clone());
        self.oracle = oracle;
        self.classifier = classifier;
        self.filter.reset();
        self.unmapped_candidates = graph
            .nodes()
            .filter(|n| self.classifier.is_candidate(n) && graph.maps_to(&n.id).is_none())
            .map(|n| n.id.clone())
            .collect();
        attract.initialize(graph);
        self.attract_function = Some(attract);
        self.subscription = Some(graph.subscribe());

        if !graph.analysis_initialized() {
            graph.run_analysis();
        }
        let drained = self.drain(graph);
        let rescored = self.recompute(graph);

        if was_recording {
            self.statistics.start();
        }
        tracing::info!(
            graph = graph.id(),
            attract_function = %settings.attract_function,
            candidates = self.candidates(graph).len(),
            clusters = self.clusters(graph).len(),
            unmapped = self.unmapped_candidates.len(),
            oracle = self.oracle.is_some(),
            drained,
            rescored,
            "recommendations configured"
        );
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.graph_id.is_some()
    }

    pub fn settings(&self) -> Option<&RecommendationSettings> {
        self.settings.as_ref()
    }

    pub fn attract_function_kind(&self) -> Option<AttractFunctionKind> {
        self.attract_function.as_ref().map(|f| f.kind())
    }

    pub fn classifier(&self) -> &NodeClassifier {
        &self.classifier
    }

    pub fn oracle(&self) -> Option<&ReflexionGraph> {
        self.oracle.as_ref()
    }

    pub fn has_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    pub(crate) fn check_graph(&self, graph: &ReflexionGraph) -> Result<(), RecommendationError> {
        match self.graph_id {
            None => Err(RecommendationError::InvalidArgument(
                "recommendation engine is not configured".to_string(),
            )),
            Some(expected) if expected != graph.id() => Err(RecommendationError::GraphMismatch {
                expected,
                actual: graph.id(),
            }),
            Some(_) => Ok(()),
        }
    }

    // ---- Event handling ----

    /// Handle every event the graph has published since the last call.
    /// Returns the number of events drained.
    pub fn process_events(&mut self, graph: &ReflexionGraph) -> Result<usize, RecommendationError> {
        self.check_graph(graph)?;
        let drained = self.drain(graph);
        if drained > 0 {
            tracing::debug!(
                { metrics::EVENTS_DRAINED } = drained,
                { metrics::UNMAPPED_CANDIDATES } = self.unmapped_candidates.len(),
                "graph events processed"
            );
        }
        Ok(drained)
    }

    fn drain(&mut self, graph: &ReflexionGraph) -> usize {
        let mut drained = 0;
        loop {
            let next = match &self.subscription {
                Some(subscription) => subscription.try_next(),
                None => break,
            };
            match next {
                Ok(event) => {
                    drained += 1;
                    self.handle_event(graph, event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.end_of_stream(None);
                    self.subscription = None;
                    break;
                }
            }
        }
        drained
    }

    fn handle_event(&mut self, graph: &ReflexionGraph, event: GraphEvent) {
        if !event.analysis_initialized {
            tracing::trace!(
                sequence = event.sequence,
                kind = event.change.kind(),
                "event before analysis, ignored"
            );
            return;
        }
        tracing::debug!(sequence = event.sequence, kind = event.change.kind(), "graph event");
        match event.change {
            ChangeEvent::MapsToChange(change) => self.on_maps_to_change(graph, change),
            ChangeEvent::EdgeStateChange(change) => {
                if let Some(attract) = self.attract_function.as_mut() {
                    attract.on_changed_edge_state(graph, &change);
                }
            }
            ChangeEvent::ArchitectureEdge(change) => self.on_architecture_edge(graph, change),
            ChangeEvent::ImplementationEdge(change) => self.on_implementation_edge(graph, change),
            ChangeEvent::Node(change) => self.on_node(graph, change),
            ChangeEvent::Hierarchy(change) => {
                if let Some(attract) = self.attract_function.as_mut() {
                    attract.on_changed_hierarchy(graph, &change);
                    self.recompute(graph);
                }
            }
            ChangeEvent::Completed => self.end_of_stream(None),
            ChangeEvent::Error(message) => self.end_of_stream(Some(message)),
        }
    }

    fn on_maps_to_change(&mut self, graph: &ReflexionGraph, change: MapsToChangeEvent) {
        if !self.classifier.is_candidate(&change.source) {
            return;
        }
        let candidate_id = change.source.id.as_str();
        let cluster_id = change.target.id.as_str();
        match change.change {
            ChangeType::Addition => {
                self.unmapped_candidates.remove(candidate_id);
            }
            ChangeType::Removal => {
                self.unmapped_candidates.insert(candidate_id.to_string());
            }
        }

        let chosen = self.statistics.is_active().then(|| {
            self.filter
                .get(candidate_id, cluster_id)
                .map(|pair| pair.as_ref().clone())
                .unwrap_or_else(|| MappingPair::unscored(candidate_id, cluster_id))
        });

        self.filter.remove_candidate(candidate_id);
        if let Some(attract) = self.attract_function.as_mut() {
            attract.on_changed_candidate(graph, &change.target, &change.source, change.change);
        }
        self.recompute(graph);

        if let Some(pair) = chosen {
            self.statistics.record_decision(pair.as_decision(change.change));
        }
    }

    fn on_architecture_edge(&mut self, graph: &ReflexionGraph, change: EdgeChangeEvent) {
        if !change.specified {
            return;
        }
        let Some(attract) = self.attract_function.as_mut() else {
            return;
        };
        match change.change {
            ChangeType::Addition => attract.on_added_architecture_edge(graph, &change.edge),
            ChangeType::Removal => attract.on_removed_architecture_edge(graph, &change.edge),
        }
        self.recompute(graph);
    }

    fn on_implementation_edge(&mut self, graph: &ReflexionGraph, change: EdgeChangeEvent) {
        let Some(attract) = self.attract_function.as_mut() else {
            return;
        };
        attract.on_changed_implementation_edge(graph, &change);
        self.recompute(graph);
    }

    fn on_node(&mut self, graph: &ReflexionGraph, change: NodeChangeEvent) {
        let node = &change.node;
        let is_cluster = self.classifier.is_cluster(node);
        let is_candidate = self.classifier.is_candidate(node);
        if !is_cluster && !is_candidate {
            return;
        }
        let Some(attract) = self.attract_function.as_mut() else {
            return;
        };
        match (change.change, is_cluster) {
            (ChangeType::Addition, true) => attract.on_added_cluster(graph, node),
            (ChangeType::Removal, true) => {
                attract.on_removed_cluster(graph, node);
                self.filter.remove_cluster(&node.id);
            }
            (ChangeType::Addition, false) => {
                if graph.contains_node(&node.id) && graph.maps_to(&node.id).is_none() {
                    self.unmapped_candidates.insert(node.id.clone());
                }
                attract.on_added_candidate(graph, node);
            }
            (ChangeType::Removal, false) => {
                self.unmapped_candidates.remove(&node.id);
                self.filter.remove_candidate(&node.id);
                attract.on_removed_candidate(graph, node);
            }
        }
        self.recompute(graph);
    }

    fn end_of_stream(&mut self, error: Option<String>) {
        match error {
            Some(message) => tracing::warn!(%message, "graph reported an error, recording stopped"),
            None => tracing::debug!("graph event stream ended, recording stopped"),
        }
        self.statistics.stop();
    }

    // ---- Recomputation ----

    /// Rescore every dirty pair against the current graph.
    /// Returns the number of pairs scored.
    pub fn update_recommendations(&mut self, graph: &ReflexionGraph) -> Result<usize, RecommendationError> {
        self.check_graph(graph)?;
        Ok(self.recompute(graph))
    }

    fn recompute(&mut self, graph: &ReflexionGraph) -> usize {
        let Some(attract) = self.attract_function.as_mut() else {
            return 0;
        };
        let clusters = attract.dirty_clusters();
        let candidates = attract.dirty_candidates();
        if clusters.is_empty() {
            attract.finish_pass();
            return 0;
        }

        let span = tracing::info_span!(
            "update_recommendations",
            dirty_clusters = clusters.len(),
            dirty_candidates = candidates.len(),
            rescored_pairs = Empty,
            update_duration_us = Empty,
        );
        let _guard = span.enter();
        let started = Instant::now();
        let mut rescored = 0usize;

        for cluster_id in &clusters {
            let Some(cluster) = graph.node(cluster_id) else {
                attract.clear_cluster_dirty(cluster_id);
                self.filter.remove_cluster(cluster_id);
                tracing::warn!(cluster = %cluster_id, "dirty cluster no longer in graph, dropped");
                continue;
            };
            for candidate_id in &candidates {
                match graph.node(candidate_id) {
                    Some(candidate) if graph.maps_to(candidate_id).is_none() => {
                        let value = attract.score(graph, candidate, cluster);
                        self.filter.upsert(Arc::new(MappingPair::new(
                            candidate_id.as_str(),
                            cluster_id.as_str(),
                            value,
                        )));
                        rescored += 1;
                    }
                    _ => self.filter.remove_candidate(candidate_id),
                }
            }
            attract.clear_cluster_dirty(cluster_id);
        }
        attract.finish_pass();

        span.record(metrics::RESCORED_PAIRS, rescored as u64);
        span.record(metrics::UPDATE_DURATION_US, started.elapsed().as_micros() as u64);
        rescored
    }

    /// Force `candidate_id` to be rescored against every cluster in the next pass.
    pub fn mark_candidate_dirty(
        &mut self,
        graph: &ReflexionGraph,
        candidate_id: &str,
    ) -> Result<(), RecommendationError> {
        self.check_graph(graph)?;
        if let Some(attract) = self.attract_function.as_mut() {
            attract.mark_candidate_dirty(graph, candidate_id);
            attract.tracker_mut().mark_all_clusters(graph);
        }
        Ok(())
    }

    /// Force `cluster_id` to be rescored in the next pass.
    pub fn mark_cluster_dirty(
        &mut self,
        graph: &ReflexionGraph,
        cluster_id: &str,
    ) -> Result<(), RecommendationError> {
        self.check_graph(graph)?;
        if let Some(attract) = self.attract_function.as_mut() {
            attract.mark_cluster_dirty(graph, cluster_id);
        }
        Ok(())
    }

    pub fn dirty_clusters(&self) -> Vec<String> {
        self.attract_function
            .as_ref()
            .map(|f| f.dirty_clusters())
            .unwrap_or_default()
    }

    pub fn dirty_candidates(&self) -> Vec<String> {
        self.attract_function
            .as_ref()
            .map(|f| f.dirty_candidates())
            .unwrap_or_default()
    }

    // ---- Queries ----

    /// Every candidate in `graph`, sorted.
    pub fn candidates(&self, graph: &ReflexionGraph) -> Vec<String> {
        self.collect_ids(graph, |n| self.classifier.is_candidate(n))
    }

    /// Every cluster in `graph`, sorted.
    pub fn clusters(&self, graph: &ReflexionGraph) -> Vec<String> {
        self.collect_ids(graph, |n| self.classifier.is_cluster(n))
    }

    pub fn mapped_candidates(&self, graph: &ReflexionGraph) -> Vec<String> {
        self.collect_ids(graph, |n| {
            self.classifier.is_candidate(n) && graph.maps_to(&n.id).is_some()
        })
    }

    /// Candidates without a mapping, as tracked from graph events. Sorted.
    pub fn unmapped_candidates(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.unmapped_candidates.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn unmapped_candidates_left(&self) -> bool {
        !self.unmapped_candidates.is_empty()
    }

    pub fn is_unmapped_candidate(&self, id: &str) -> bool {
        self.unmapped_candidates.contains(id)
    }

    fn collect_ids(&self, graph: &ReflexionGraph, keep: impl Fn(&Node) -> bool) -> Vec<String> {
        let mut ids: Vec<String> = graph.nodes().filter(|&n| keep(n)).map(|n| n.id.clone()).collect();
        ids.sort();
        ids
    }

    pub fn recommendations(&self) -> Vec<Arc<MappingPair>> {
        self.filter.recommendations()
    }

    /// Recommendations involving `node`, as a candidate or as a cluster.
    pub fn recommendations_for(&self, node: &Node) -> Vec<Arc<MappingPair>> {
        if self.classifier.is_candidate(node) {
            self.filter.recommendations_for_candidate(&node.id)
        } else if self.classifier.is_cluster(node) {
            self.filter.recommendations_for_cluster(&node.id)
        } else {
            Vec::new()
        }
    }

    pub fn automatic_mappings(&self) -> Vec<Arc<MappingPair>> {
        self.filter.automatic_mappings()
    }

    pub fn all_pairs(&self) -> Vec<Arc<MappingPair>> {
        self.filter.all_pairs()
    }

    pub fn pair(&self, candidate_id: &str, cluster_id: &str) -> Option<Arc<MappingPair>> {
        self.filter.get(candidate_id, cluster_id)
    }

    // ---- Statistics ----

    pub fn start_recording(&mut self) {
        self.statistics.start();
    }

    pub fn stop_recording(&mut self) {
        self.statistics.stop();
    }

    pub fn is_recording(&self) -> bool {
        self.statistics.is_active()
    }

    pub fn statistics(&self) -> &dyn StatisticsRecorder {
        self.statistics.as_ref()
    }

    pub fn statistics_mut(&mut self) -> &mut dyn StatisticsRecorder {
        self.statistics.as_mut()
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("graph_id", &self.graph_id)
            .field("attract_function", &self.attract_function_kind())
            .field("unmapped_candidates", &self.unmapped_candidates.len())
            .field("subscription", &self.subscription)
            .field("recording", &self.statistics.is_active())
            .finish()
    }
}
