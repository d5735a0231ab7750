//! Tests for hit detection, oracle edges, and percentile ranks.

mod common;

use common::{settings, three_cluster_graph, GraphBuilder};
use reflexion_core::errors::RecommendationError;
use reflexion_recommend::{is_hit, OracleMapping, RecommendationEngine};

/// T1-EVL-01: Percentile ranks through the engine, best first.
#[test]
fn test_percentile_rank_via_engine() {
    let mut graph = three_cluster_graph();
    let oracle = OracleMapping::new()
        .with_edge("x", "K1")
        .with_edge("y", "K3")
        .with_edge("z", "K1");
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();

    assert_eq!(engine.percentile_rank("x").unwrap(), 1.0);
    assert_eq!(engine.percentile_rank("y").unwrap(), 0.6667);
    // Last of three.
    assert_eq!(engine.percentile_rank("z").unwrap(), 0.3333);
}

/// T1-EVL-02: A covered candidate without scored pairs ranks -1.
#[test]
fn test_percentile_rank_without_pairs() {
    let mut graph = three_cluster_graph();
    let oracle = OracleMapping::new().with_edge("x", "K1");
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();

    graph.add_to_mapping("x", "K1").unwrap();
    engine.process_events(&graph).unwrap();
    assert_eq!(engine.percentile_rank("x").unwrap(), -1.0);
}

/// T1-EVL-03: Candidates outside the oracle have no oracle edge.
#[test]
fn test_oracle_edge_not_found() {
    let mut graph = three_cluster_graph();
    let oracle = OracleMapping::new().with_edge("x", "K1");
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();

    assert!(matches!(engine.oracle_edge("z"), Err(RecommendationError::NotFound(_))));
    assert!(matches!(engine.percentile_rank("z"), Err(RecommendationError::NotFound(_))));
    assert_eq!(engine.expected_cluster_id("z").unwrap(), None);

    let mut plain = RecommendationEngine::new();
    plain.configure(&mut graph, &settings(), None).unwrap();
    assert!(matches!(plain.is_hit("x", "K1"), Err(RecommendationError::InvalidArgument(_))));
}

/// T1-EVL-04: Hits follow the candidate and cluster hierarchies.
#[test]
fn test_is_hit_with_hierarchy() {
    let mut graph = GraphBuilder::new()
        .clusters(&["K1", "K2", "Sub"])
        .child("Sub", "K1")
        .candidates(&["p", "c"])
        .child("c", "p")
        .build();
    let oracle = OracleMapping::new().with_edge("p", "K1");
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();

    assert!(engine.is_hit("p", "K1").unwrap());
    assert!(engine.is_hit("c", "K1").unwrap());
    assert!(engine.is_hit("c", "Sub").unwrap());
    assert!(!engine.is_hit("c", "K2").unwrap());
    assert!(!is_hit(engine.oracle().unwrap(), "missing", "K1"));

    let edge = engine.oracle_edge("c").unwrap();
    assert_eq!(edge.source_id, "p");
    assert_eq!(edge.target_id, "K1");
    assert_eq!(
        edge.allowed_clusters.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["K1", "Sub"]
    );
}

/// T1-EVL-05: Two explicit oracle edges over one candidate are ambiguous.
#[test]
fn test_ambiguous_oracle_edge() {
    let mut graph = GraphBuilder::new()
        .clusters(&["K1", "K2"])
        .candidates(&["p", "c"])
        .child("c", "p")
        .build();
    let oracle = OracleMapping::new().with_edge("p", "K1").with_edge("c", "K2");
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();

    assert!(matches!(
        engine.oracle_edge("c"),
        Err(RecommendationError::InvariantViolation(_))
    ));
    assert_eq!(engine.oracle_edge("p").unwrap().target_id, "K1");
}
