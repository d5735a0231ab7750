//! Recommendation engine errors.
//! Aggregates subsystem errors via `From` conversions.

use super::error_code::{self, ReflexionErrorCode};
use super::{ConfigError, GraphError, StatisticsError};

/// Errors surfaced by the recommendation engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    /// Missing or unresolvable configuration. `configure` leaves the engine untouched.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A programming error: overwriting a write-once field, or an oracle
    /// disagreeing with itself during initial-mapping generation.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Rejected before any state was touched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Engine was configured with graph {expected}, called with graph {actual}")]
    GraphMismatch { expected: u64, actual: u64 },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Statistics error: {0}")]
    Statistics(#[from] StatisticsError),
}

impl ReflexionErrorCode for RecommendationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => error_code::CONFIGURATION_ERROR,
            Self::InvariantViolation(_) => error_code::INVARIANT_VIOLATION,
            Self::InvalidArgument(_) => error_code::INVALID_ARGUMENT,
            Self::NotFound(_) => error_code::NOT_FOUND,
            Self::GraphMismatch { .. } => error_code::GRAPH_MISMATCH,
            Self::Graph(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Statistics(e) => e.error_code(),
        }
    }
}
