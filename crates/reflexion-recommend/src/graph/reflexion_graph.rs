//! ReflexionGraph: observable implementation/architecture graph with a mapping relation.

use std::sync::atomic::{AtomicU64, Ordering};

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use reflexion_core::errors::GraphError;
use reflexion_core::events::{
    ChangeEvent, EdgeChangeEvent, EndpointContext, EventBus, HierarchyChangeEvent,
    MapsToChangeEvent, NodeChangeEvent, Subscription,
};
use reflexion_core::types::collections::{FxHashMap, SmallVec4};
use reflexion_core::types::{ChangeType, Edge, EdgeState, Node, Subgraph};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Effective mapping of a set of nodes, captured before a mutation.
pub(crate) type MappingSnapshot = Vec<(Node, Option<Node>)>;

/// A reflexion graph: dependency edges in two subgraphs, a containment
/// hierarchy per subgraph, and an explicit implementation → architecture
/// mapping that descendants inherit.
///
/// Every mutation publishes [`ChangeEvent`]s to the subscribers obtained
/// through [`ReflexionGraph::subscribe`]. Once [`ReflexionGraph::run_analysis`]
/// has run, edge states are kept current after every mutation.
pub struct ReflexionGraph {
    id: u64,
    pub(crate) graph: StableGraph<Node, Edge, Directed>,
    pub(crate) node_index: FxHashMap<String, NodeIndex>,
    pub(crate) edge_index: FxHashMap<String, EdgeIndex>,
    pub(crate) parents: FxHashMap<String, String>,
    pub(crate) children: FxHashMap<String, SmallVec4<String>>,
    pub(crate) explicit_mapping: FxHashMap<String, String>,
    next_edge: u64,
    pub(crate) analysis_initialized: bool,
    bus: EventBus,
}

impl ReflexionGraph {
    pub fn new() -> Self {
        Self {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            graph: StableGraph::new(),
            node_index: FxHashMap::default(),
            edge_index: FxHashMap::default(),
            parents: FxHashMap::default(),
            children: FxHashMap::default(),
            explicit_mapping: FxHashMap::default(),
            next_edge: 0,
            analysis_initialized: false,
            bus: EventBus::new(),
        }
    }

    /// Process-unique identity of this graph instance.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph.node_weight(idx))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index
            .get(id)
            .and_then(|idx| self.graph.node_weight(*idx))
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.graph
            .edge_indices()
            .filter_map(move |idx| self.graph.edge_weight(idx))
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edge_index
            .get(id)
            .and_then(|idx| self.graph.edge_weight(*idx))
    }

    /// Architecture edges are part of the intended architecture.
    pub fn is_specified(&self, edge: &Edge) -> bool {
        edge.subgraph == Subgraph::Architecture
    }

    pub fn analysis_initialized(&self) -> bool {
        self.analysis_initialized
    }

    // ---- Subscriptions ----

    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    /// Tell subscribers that no further events will follow.
    pub fn complete(&self) {
        self.publish(ChangeEvent::Completed);
    }

    /// Tell subscribers that the graph failed.
    pub fn fail(&self, message: impl Into<String>) {
        self.publish(ChangeEvent::Error(message.into()));
    }

    pub(crate) fn publish(&self, change: ChangeEvent) {
        self.bus.publish(change, self.analysis_initialized);
    }

    // ---- Nodes ----

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.node_index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode { id: node.id });
        }
        let snapshot = node.clone();
        let idx = self.graph.add_node(node);
        self.node_index.insert(snapshot.id.clone(), idx);
        self.publish(ChangeEvent::Node(NodeChangeEvent {
            node: snapshot,
            change: ChangeType::Addition,
        }));
        Ok(())
    }

    /// Remove a node together with its incident edges and its explicit
    /// mapping. Its children move up to its parent.
    pub fn remove_node(&mut self, id: &str) -> Result<Node, GraphError> {
        let idx = self.require_node(id)?;
        let node = self.graph[idx].clone();

        let affected: Vec<String> = match node.subgraph {
            Subgraph::Implementation => vec![node.id.clone()],
            Subgraph::Architecture => self
                .explicit_mapping
                .iter()
                .filter(|(_, target)| target.as_str() == id)
                .map(|(source, _)| source.clone())
                .collect(),
        };
        let before = self.snapshot_mapping(&affected);
        let former_ascendants = self.ascendants(id);

        let incident: Vec<EdgeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|e| e.id())
            .collect();
        for edge_idx in incident {
            if let Some(edge) = self.graph.remove_edge(edge_idx) {
                self.edge_index.remove(&edge.id);
                self.publish_edge_change(edge, ChangeType::Removal);
            }
        }

        self.explicit_mapping.remove(id);
        self.explicit_mapping.retain(|_, target| target != id);

        let parent = self.parents.remove(id);
        if let Some(parent) = &parent {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.retain(|c| c != id);
            }
        }
        let moved: Vec<String> = self.children.remove(id).unwrap_or_default().into_vec();
        for child in &moved {
            match &parent {
                Some(parent) => {
                    self.parents.insert(child.clone(), parent.clone());
                    self.children
                        .entry(parent.clone())
                        .or_default()
                        .push(child.clone());
                }
                None => {
                    self.parents.remove(child);
                }
            }
        }

        self.graph.remove_node(idx);
        self.node_index.remove(id);

        self.publish_mapping_diff(before);
        // The removed node's own chain minus itself is where its children now hang.
        let new_ascendants: Vec<String> = former_ascendants.iter().skip(1).cloned().collect();
        for child in &moved {
            self.publish_hierarchy_change(child, former_ascendants.clone(), new_ascendants.clone());
        }
        self.publish(ChangeEvent::Node(NodeChangeEvent {
            node: node.clone(),
            change: ChangeType::Removal,
        }));
        self.refresh_states();
        Ok(node)
    }

    // ---- Edges ----

    /// Add a dependency edge. Both endpoints must live in the same subgraph.
    /// Returns the new edge's id.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        edge_type: impl Into<String>,
    ) -> Result<String, GraphError> {
        let source_idx = self.require_node(source)?;
        let target_idx = self.require_node(target)?;
        let subgraph = self.graph[source_idx].subgraph;
        if self.graph[target_idx].subgraph != subgraph {
            return Err(GraphError::CrossSubgraphEdge {
                source_id: source.to_string(),
                target_id: target.to_string(),
            });
        }
        self.next_edge += 1;
        let edge = Edge {
            id: format!("e{}", self.next_edge),
            source: source.to_string(),
            target: target.to_string(),
            edge_type: edge_type.into(),
            subgraph,
            state: EdgeState::Undefined,
        };
        let id = edge.id.clone();
        let edge_idx = self.graph.add_edge(source_idx, target_idx, edge.clone());
        self.edge_index.insert(id.clone(), edge_idx);
        self.publish_edge_change(edge, ChangeType::Addition);
        self.refresh_states();
        Ok(id)
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<Edge, GraphError> {
        let edge_idx = self
            .edge_index
            .remove(id)
            .ok_or_else(|| GraphError::EdgeNotFound { id: id.to_string() })?;
        let edge = self
            .graph
            .remove_edge(edge_idx)
            .ok_or_else(|| GraphError::EdgeNotFound { id: id.to_string() })?;
        self.publish_edge_change(edge.clone(), ChangeType::Removal);
        self.refresh_states();
        Ok(edge)
    }

    fn publish_edge_change(&self, edge: Edge, change: ChangeType) {
        let specified = self.is_specified(&edge);
        let source_context = self.endpoint_context(&edge.source);
        let target_context = self.endpoint_context(&edge.target);
        let event = EdgeChangeEvent {
            edge,
            change,
            specified,
            source_context,
            target_context,
        };
        match event.edge.subgraph {
            Subgraph::Architecture => self.publish(ChangeEvent::ArchitectureEdge(event)),
            Subgraph::Implementation => self.publish(ChangeEvent::ImplementationEdge(event)),
        }
    }

    fn endpoint_context(&self, id: &str) -> EndpointContext {
        EndpointContext {
            ascendants: self.ascendants(id),
            maps_to: self.maps_to_id(id).map(str::to_string),
        }
    }

    pub(crate) fn publish_hierarchy_change(
        &self,
        child: &str,
        old_ascendants: Vec<String>,
        new_ascendants: Vec<String>,
    ) {
        if let Some(node) = self.node(child) {
            self.publish(ChangeEvent::Hierarchy(HierarchyChangeEvent {
                child: node.clone(),
                old_ascendants,
                new_ascendants,
            }));
        }
    }

    /// Implementation edges touching `id`, in either direction.
    pub fn implementation_edges_of(&self, id: &str) -> Vec<&Edge> {
        self.incident_edges(id, Subgraph::Implementation)
    }

    /// Nodes connected to `id` by an architecture edge, in either direction.
    pub fn architecture_neighbors(&self, id: &str) -> Vec<String> {
        let mut neighbors: Vec<String> = self
            .incident_edges(id, Subgraph::Architecture)
            .into_iter()
            .filter_map(|edge| edge.other_end(id).map(str::to_string))
            .filter(|other| other != id)
            .collect();
        neighbors.sort();
        neighbors.dedup();
        neighbors
    }

    fn incident_edges(&self, id: &str, subgraph: Subgraph) -> Vec<&Edge> {
        let Some(&idx) = self.node_index.get(id) else {
            return Vec::new();
        };
        let outgoing = self.graph.edges_directed(idx, Direction::Outgoing);
        // Self-loops show up in both directions; keep them once.
        let incoming = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| e.source() != e.target());
        outgoing
            .chain(incoming)
            .map(|e| e.weight())
            .filter(|edge| edge.subgraph == subgraph)
            .collect()
    }

    // ---- Mapping ----

    /// Explicitly map an implementation node onto an architecture node.
    pub fn add_to_mapping(&mut self, source: &str, target: &str) -> Result<(), GraphError> {
        self.change_mapping(source, Some(target), true)
    }

    pub fn remove_from_mapping(&mut self, source: &str) -> Result<(), GraphError> {
        self.change_mapping(source, None, true)
    }

    /// Like [`add_to_mapping`](Self::add_to_mapping) but publishes nothing.
    pub fn add_to_mapping_silent(&mut self, source: &str, target: &str) -> Result<(), GraphError> {
        self.change_mapping(source, Some(target), false)
    }

    /// Like [`remove_from_mapping`](Self::remove_from_mapping) but publishes nothing.
    pub fn remove_from_mapping_silent(&mut self, source: &str) -> Result<(), GraphError> {
        self.change_mapping(source, None, false)
    }

    fn change_mapping(
        &mut self,
        source: &str,
        target: Option<&str>,
        notify: bool,
    ) -> Result<(), GraphError> {
        let source_idx = self.require_node(source)?;
        self.require_subgraph(source_idx, Subgraph::Implementation)?;
        match target {
            Some(target) => {
                let target_idx = self.require_node(target)?;
                self.require_subgraph(target_idx, Subgraph::Architecture)?;
                if let Some(existing) = self.explicit_mapping.get(source) {
                    return Err(GraphError::AlreadyMapped {
                        id: source.to_string(),
                        cluster: existing.clone(),
                    });
                }
            }
            None => {
                if !self.explicit_mapping.contains_key(source) {
                    return Err(GraphError::NotMapped {
                        id: source.to_string(),
                    });
                }
            }
        }

        let before = if notify {
            self.snapshot_mapping(&[source.to_string()])
        } else {
            Vec::new()
        };
        match target {
            Some(target) => {
                self.explicit_mapping
                    .insert(source.to_string(), target.to_string());
            }
            None => {
                self.explicit_mapping.remove(source);
            }
        }
        if notify {
            self.publish_mapping_diff(before);
            self.refresh_states();
        } else if self.analysis_initialized {
            self.recompute_states(false);
        }
        Ok(())
    }

    /// The architecture node `id` is mapped onto, explicitly or through
    /// its nearest explicitly mapped ascendant.
    pub fn maps_to(&self, id: &str) -> Option<&Node> {
        self.maps_to_id(id).and_then(|target| self.node(target))
    }

    pub(crate) fn maps_to_id(&self, id: &str) -> Option<&str> {
        if !self.node_index.contains_key(id) {
            return None;
        }
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(target) = self.explicit_mapping.get(node) {
                return Some(target.as_str());
            }
            current = self.parents.get(node).map(String::as_str);
        }
        None
    }

    /// The explicit mapping target of `id`, ignoring inheritance.
    pub fn explicit_maps_to(&self, id: &str) -> Option<&str> {
        self.explicit_mapping.get(id).map(String::as_str)
    }

    /// All explicit mapping edges as `(implementation, architecture)` pairs.
    pub fn mapping_edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.explicit_mapping
            .iter()
            .map(|(source, target)| (source.as_str(), target.as_str()))
    }

    pub(crate) fn snapshot_mapping(&self, roots: &[String]) -> MappingSnapshot {
        let mut snapshot = Vec::new();
        for root in roots {
            for id in self.subtree_pre_order(root) {
                if let Some(node) = self.node(&id) {
                    snapshot.push((node.clone(), self.maps_to(&id).cloned()));
                }
            }
        }
        snapshot
    }

    /// Publish a Removal and/or Addition for every snapshotted node whose
    /// effective mapping differs from the current one.
    pub(crate) fn publish_mapping_diff(&self, before: MappingSnapshot) {
        for (source, old) in before {
            let new = self.maps_to(&source.id).cloned();
            if old.as_ref().map(|n| &n.id) == new.as_ref().map(|n| &n.id) {
                continue;
            }
            let source = self.node(&source.id).cloned().unwrap_or(source);
            if let Some(old) = old {
                self.publish(ChangeEvent::MapsToChange(MapsToChangeEvent {
                    source: source.clone(),
                    target: old,
                    change: ChangeType::Removal,
                }));
            }
            if let Some(new) = new {
                self.publish(ChangeEvent::MapsToChange(MapsToChangeEvent {
                    source,
                    target: new,
                    change: ChangeType::Addition,
                }));
            }
        }
    }

    // ---- Copies ----

    /// A copy with the same nodes, edges, hierarchy and mapping but a fresh
    /// identity and no subscribers.
    pub fn detached_copy(&self) -> Self {
        Self {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            graph: self.graph.clone(),
            node_index: self.node_index.clone(),
            edge_index: self.edge_index.clone(),
            parents: self.parents.clone(),
            children: self.children.clone(),
            explicit_mapping: self.explicit_mapping.clone(),
            next_edge: self.next_edge,
            analysis_initialized: self.analysis_initialized,
            bus: EventBus::new(),
        }
    }

    /// Implementation and architecture without any mapping, analysis not yet run.
    pub fn without_mapping(&self) -> Self {
        let mut copy = self.detached_copy();
        copy.explicit_mapping.clear();
        copy.analysis_initialized = false;
        let edges: Vec<EdgeIndex> = copy.graph.edge_indices().collect();
        for idx in edges {
            if let Some(edge) = copy.graph.edge_weight_mut(idx) {
                edge.state = EdgeState::Undefined;
            }
        }
        copy
    }

    // ---- Lookup helpers ----

    pub(crate) fn require_node(&self, id: &str) -> Result<NodeIndex, GraphError> {
        self.node_index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })
    }

    pub(crate) fn require_subgraph(
        &self,
        idx: NodeIndex,
        expected: Subgraph,
    ) -> Result<(), GraphError> {
        let node = &self.graph[idx];
        if node.subgraph != expected {
            return Err(GraphError::WrongSubgraph {
                id: node.id.clone(),
                expected,
                actual: node.subgraph,
            });
        }
        Ok(())
    }
}

impl Default for ReflexionGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReflexionGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReflexionGraph")
            .field("id", &self.id)
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("mapped", &self.explicit_mapping.len())
            .field("analysis_initialized", &self.analysis_initialized)
            .finish()
    }
}
