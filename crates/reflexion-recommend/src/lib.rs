//! # reflexion-recommend
//!
//! Incremental mapping recommendations for reflexion analysis.
//! Keeps a scored matrix of unmapped implementation candidates against
//! architecture clusters current as the graph changes, and evaluates the
//! recommendations against an oracle mapping.
//!
//! - `graph`: reference reflexion graph with change events and edge states
//! - `attract`: attraction functions and their dirty tracking
//! - `filter`: selection of recommendations from scored pairs
//! - `engine`: configuration, event handling, recomputation, evaluation
//! - `statistics`: recorded decisions and experiment metrics
//! - `experiment`: automatic mapping runs against an oracle

pub mod attract;
pub mod classify;
pub mod engine;
pub mod experiment;
pub mod filter;
pub mod graph;
pub mod mapping_pair;
pub mod statistics;

pub use attract::{AttractFunction, AttractFunctionRegistry, CountAttract, NoAttract};
pub use classify::NodeClassifier;
pub use engine::{is_hit, percentile_rank, InitialMapping, OracleEdge, RecommendationEngine};
pub use experiment::run_experiment;
pub use filter::{MaxFilter, RecommendationFilter};
pub use graph::{MappingEdge, OracleMapping, ReflexionGraph};
pub use mapping_pair::{MappingPair, WriteOnce};
pub use statistics::{DecisionLog, ExperimentSummary, MappingExperimentResult, StatisticsRecorder};
