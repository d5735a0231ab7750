//! Graph element types shared by the graph model, the events, and the engine.

pub mod collections;
pub mod elements;

pub use collections::{FxHashMap, FxHashSet};
pub use elements::{ChangeType, Edge, EdgeState, Node, Subgraph};
