//! Event payload types published by a reflexion graph.

use serde::{Deserialize, Serialize};

use crate::types::{ChangeType, Edge, EdgeState, Node};

/// An implementation node was mapped onto, or unmapped from, an architecture node.
///
/// Published for every node whose effective mapping changes, including
/// descendants that follow their parent implicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapsToChangeEvent {
    pub source: Node,
    pub target: Node,
    pub change: ChangeType,
}

/// The reflexion state of an edge changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStateChangeEvent {
    pub edge: Edge,
    pub old_state: EdgeState,
    pub new_state: EdgeState,
}

/// Where an edge endpoint sat when the event was published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointContext {
    /// The endpoint followed by its ascendants, nearest first.
    pub ascendants: Vec<String>,
    /// The architecture node the endpoint was effectively mapped onto.
    pub maps_to: Option<String>,
}

/// An edge was added to or removed from one of the subgraphs.
///
/// The endpoint contexts are captured at publication, so a removal still
/// tells where a since-deleted endpoint used to be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeChangeEvent {
    pub edge: Edge,
    pub change: ChangeType,
    /// Part of the intended architecture rather than derived from it.
    pub specified: bool,
    #[serde(default)]
    pub source_context: EndpointContext,
    #[serde(default)]
    pub target_context: EndpointContext,
}

/// A node moved within the containment hierarchy, taking its subtree along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyChangeEvent {
    pub child: Node,
    /// Former parent and its ascendants, nearest first. Empty for a former root.
    pub old_ascendants: Vec<String>,
    /// New parent and its ascendants, nearest first. Empty for a new root.
    pub new_ascendants: Vec<String>,
}

/// A node was added to or removed from the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeChangeEvent {
    pub node: Node,
    pub change: ChangeType,
}

/// Everything a reflexion graph can report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeEvent {
    MapsToChange(MapsToChangeEvent),
    EdgeStateChange(EdgeStateChangeEvent),
    ArchitectureEdge(EdgeChangeEvent),
    ImplementationEdge(EdgeChangeEvent),
    Node(NodeChangeEvent),
    Hierarchy(HierarchyChangeEvent),
    /// The graph will publish nothing more.
    Completed,
    /// The graph failed and will publish nothing more.
    Error(String),
}

impl ChangeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MapsToChange(_) => "maps_to_change",
            Self::EdgeStateChange(_) => "edge_state_change",
            Self::ArchitectureEdge(_) => "architecture_edge",
            Self::ImplementationEdge(_) => "implementation_edge",
            Self::Node(_) => "node",
            Self::Hierarchy(_) => "hierarchy",
            Self::Completed => "completed",
            Self::Error(_) => "error",
        }
    }

    /// True for the two events that end a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error(_))
    }
}

/// Envelope delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEvent {
    /// Monotonic per graph, starting at 1.
    pub sequence: u64,
    /// Whether the graph analysis had run at least once when the event was published.
    pub analysis_initialized: bool,
    pub change: ChangeEvent,
}
