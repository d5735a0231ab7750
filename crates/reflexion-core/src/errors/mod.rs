//! Error handling for the reflexion engine.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod graph_error;
pub mod recommendation_error;
pub mod statistics_error;

pub use config_error::ConfigError;
pub use error_code::ReflexionErrorCode;
pub use graph_error::GraphError;
pub use recommendation_error::RecommendationError;
pub use statistics_error::StatisticsError;
