//! Statistics recording and export errors.

use super::error_code::{self, ReflexionErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum StatisticsError {
    #[error("Failed to write statistics to {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("Failed to serialize statistics: {0}")]
    Serialization(String),

    #[error("No decisions recorded")]
    Empty,
}

impl ReflexionErrorCode for StatisticsError {
    fn error_code(&self) -> &'static str {
        error_code::STATISTICS_ERROR
    }
}
