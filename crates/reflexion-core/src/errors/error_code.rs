//! ReflexionErrorCode trait for stable, machine-readable error codes.

/// Every error enum implements this to expose a structured code string
/// that hosts can match on without parsing messages.
pub trait ReflexionErrorCode {
    /// Returns the error code string (e.g., "CONFIGURATION_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_message(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
pub const INVARIANT_VIOLATION: &str = "INVARIANT_VIOLATION";
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const GRAPH_ERROR: &str = "GRAPH_ERROR";
pub const GRAPH_MISMATCH: &str = "GRAPH_MISMATCH";
pub const STATISTICS_ERROR: &str = "STATISTICS_ERROR";
