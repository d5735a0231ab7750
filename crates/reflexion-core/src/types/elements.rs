//! Nodes, edges, subgraphs, edge states, and change types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::collections::FxHashSet;
use crate::constants::{IS_ANONYMOUS_TOGGLE, IS_ARTIFICIAL_TOGGLE};

/// Which half of a reflexion graph an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subgraph {
    Implementation,
    Architecture,
}

impl Subgraph {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Implementation => "implementation",
            Self::Architecture => "architecture",
        }
    }
}

impl fmt::Display for Subgraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether something was added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    Addition,
    Removal,
}

impl ChangeType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Removal => "removal",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reflexion state of an edge.
///
/// Implementation edges end up `Unmapped`, `Allowed`, `ImplicitlyAllowed`
/// or `Divergent`; architecture edges end up `Convergent` or `Absent`.
/// Every edge starts out `Undefined` until the first analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EdgeState {
    #[default]
    Undefined,
    Unmapped,
    Allowed,
    ImplicitlyAllowed,
    Divergent,
    Convergent,
    Absent,
}

impl EdgeState {
    /// True for the two states in which an implementation dependency is permitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed | Self::ImplicitlyAllowed)
    }
}

/// A node of the reflexion graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub node_type: String,
    pub subgraph: Subgraph,
    #[serde(default)]
    pub toggles: FxHashSet<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, subgraph: Subgraph) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            subgraph,
            toggles: FxHashSet::default(),
        }
    }

    /// Shorthand for an implementation-subgraph node.
    pub fn implementation(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self::new(id, node_type, Subgraph::Implementation)
    }

    /// Shorthand for an architecture-subgraph node.
    pub fn architecture(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self::new(id, node_type, Subgraph::Architecture)
    }

    pub fn with_toggle(mut self, toggle: impl Into<String>) -> Self {
        self.toggles.insert(toggle.into());
        self
    }

    pub fn has_toggle(&self, toggle: &str) -> bool {
        self.toggles.contains(toggle)
    }

    pub fn is_artificial(&self) -> bool {
        self.has_toggle(IS_ARTIFICIAL_TOGGLE)
    }

    pub fn is_anonymous(&self) -> bool {
        self.has_toggle(IS_ANONYMOUS_TOGGLE)
    }

    pub fn in_implementation(&self) -> bool {
        self.subgraph == Subgraph::Implementation
    }

    pub fn in_architecture(&self) -> bool {
        self.subgraph == Subgraph::Architecture
    }
}

/// A typed dependency edge inside one subgraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub edge_type: String,
    pub subgraph: Subgraph,
    #[serde(default)]
    pub state: EdgeState,
}

impl Edge {
    /// The endpoint opposite to `node_id`, if `node_id` is an endpoint at all.
    pub fn other_end(&self, node_id: &str) -> Option<&str> {
        if self.source == node_id {
            Some(&self.target)
        } else if self.target == node_id {
            Some(&self.source)
        } else {
            None
        }
    }
}
