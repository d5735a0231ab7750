//! # reflexion-core
//!
//! Foundation crate for the reflexion recommendation engine.
//! Defines graph element types, change events and subscriptions, errors,
//! settings, tracing setup, and shared constants. Every other crate in the
//! workspace depends on this one.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod types;

pub use config::RecommendationSettings;
pub use errors::{RecommendationError, ReflexionErrorCode};
pub use events::{ChangeEvent, EventBus, GraphEvent, Subscription};
pub use types::{ChangeType, Edge, EdgeState, Node, Subgraph};
