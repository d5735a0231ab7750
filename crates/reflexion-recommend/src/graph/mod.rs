//! Reference reflexion graph: two subgraphs, a hierarchy, a mapping, and edge states.
//! Backed by a petgraph `StableGraph` with FxHashMap id indexes.

pub mod analysis;
pub mod hierarchy;
pub mod mapping;
pub mod reflexion_graph;

pub use mapping::{MappingEdge, OracleMapping};
pub use reflexion_graph::ReflexionGraph;
