//! Reflexion graph errors.

use super::error_code::{self, ReflexionErrorCode};
use crate::types::Subgraph;

/// Errors raised by structural graph mutations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    #[error("Edge not found: {id}")]
    EdgeNotFound { id: String },

    #[error("Duplicate node: {id}")]
    DuplicateNode { id: String },

    #[error("Node {id} is in the {actual} subgraph, expected {expected}")]
    WrongSubgraph {
        id: String,
        expected: Subgraph,
        actual: Subgraph,
    },

    #[error("Edge endpoints {source_id} and {target_id} are in different subgraphs")]
    CrossSubgraphEdge { source_id: String, target_id: String },

    #[error("Node {id} is already explicitly mapped to {cluster}")]
    AlreadyMapped { id: String, cluster: String },

    #[error("Node {id} is not explicitly mapped")]
    NotMapped { id: String },

    #[error("Setting {parent} as parent of {child} would create a cycle")]
    HierarchyCycle { child: String, parent: String },
}

impl ReflexionErrorCode for GraphError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NodeNotFound { .. } | Self::EdgeNotFound { .. } => error_code::NOT_FOUND,
            _ => error_code::GRAPH_ERROR,
        }
    }
}
