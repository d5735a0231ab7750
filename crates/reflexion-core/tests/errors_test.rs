//! Tests for the error enums and their codes.

use std::collections::HashSet;

use reflexion_core::errors::error_code::{self, ReflexionErrorCode};
use reflexion_core::errors::*;
use reflexion_core::types::Subgraph;

/// T0-ERR-01: Every error enum exposes a non-empty code.
#[test]
fn test_all_errors_have_error_code() {
    let config = ConfigError::ValidationFailed {
        field: "seed".into(),
        message: "bad".into(),
    };
    assert_eq!(config.error_code(), error_code::CONFIG_ERROR);

    let graph = GraphError::DuplicateNode { id: "n1".into() };
    assert_eq!(graph.error_code(), error_code::GRAPH_ERROR);

    let missing = GraphError::NodeNotFound { id: "n1".into() };
    assert_eq!(missing.error_code(), error_code::NOT_FOUND);

    let stats = StatisticsError::Empty;
    assert_eq!(stats.error_code(), error_code::STATISTICS_ERROR);
}

/// T0-ERR-02: Recommendation errors carry distinct codes per taxonomy entry.
#[test]
fn test_recommendation_error_taxonomy() {
    let errors = [
        RecommendationError::Configuration("x".into()),
        RecommendationError::InvariantViolation("x".into()),
        RecommendationError::InvalidArgument("x".into()),
        RecommendationError::NotFound("x".into()),
        RecommendationError::GraphMismatch {
            expected: 1,
            actual: 2,
        },
    ];
    let codes: HashSet<&str> = errors.iter().map(|e| e.error_code()).collect();
    assert_eq!(codes.len(), errors.len());
}

/// T0-ERR-03: Wrapped errors keep the code of the inner error.
#[test]
fn test_from_conversions_preserve_code() {
    let err: RecommendationError = GraphError::WrongSubgraph {
        id: "c1".into(),
        expected: Subgraph::Architecture,
        actual: Subgraph::Implementation,
    }
    .into();
    assert_eq!(err.error_code(), error_code::GRAPH_ERROR);
    assert!(err.to_string().contains("implementation subgraph"));

    let err: RecommendationError = ConfigError::FileNotFound {
        path: "/nope".into(),
    }
    .into();
    assert_eq!(err.error_code(), error_code::CONFIG_ERROR);
}

/// T0-ERR-04: coded_message() prefixes the code in brackets.
#[test]
fn test_coded_message_format() {
    let err = RecommendationError::InvalidArgument("fraction 1.5 is outside [0, 1]".into());
    assert_eq!(
        err.coded_message(),
        "[INVALID_ARGUMENT] Invalid argument: fraction 1.5 is outside [0, 1]"
    );
}
