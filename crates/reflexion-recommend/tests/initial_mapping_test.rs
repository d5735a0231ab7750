//! Tests for seeded initial mapping generation.

mod common;

use common::{settings, ten_candidate_graph};
use reflexion_core::errors::RecommendationError;
use reflexion_recommend::{InitialMapping, RecommendationEngine};

fn mapped_count(mapping: &InitialMapping) -> usize {
    mapping.values().map(|candidates| candidates.len()).sum()
}

/// T1-INI-01: The drawn mapping reaches the requested fraction exactly.
#[test]
fn test_reaches_fraction() {
    let (mut graph, oracle) = ten_candidate_graph();
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();

    let mapping = engine.create_initial_mapping(&graph, 0.5, 7).unwrap();
    assert_eq!(mapped_count(&mapping), 5);
    assert_eq!(mapping["K1"].len(), 3);
    assert_eq!(mapping["K2"].len(), 2);
}

/// T1-INI-02: Every drawn candidate goes to its oracle cluster.
#[test]
fn test_agrees_with_oracle() {
    let (mut graph, oracle) = ten_candidate_graph();
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();

    let mapping = engine.create_initial_mapping(&graph, 0.8, 11).unwrap();
    for (cluster, candidates) in &mapping {
        for candidate in candidates {
            assert_eq!(engine.expected_cluster_id(candidate).unwrap().as_deref(), Some(cluster.as_str()));
        }
    }
}

/// T1-INI-03: Same seed, same mapping; different seeds may differ but keep the size.
#[test]
fn test_deterministic_per_seed() {
    let (mut graph, oracle) = ten_candidate_graph();
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();

    let first = engine.create_initial_mapping(&graph, 0.5, 42).unwrap();
    let second = engine.create_initial_mapping(&graph, 0.5, 42).unwrap();
    assert_eq!(first, second);
    let other = engine.create_initial_mapping(&graph, 0.5, 43).unwrap();
    assert_eq!(mapped_count(&other), 5);
}

/// T1-INI-04: Boundary fractions draw nothing or everything.
#[test]
fn test_boundary_fractions() {
    let (mut graph, oracle) = ten_candidate_graph();
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();

    assert!(engine.create_initial_mapping(&graph, 0.0, 1).unwrap().is_empty());
    let all = engine.create_initial_mapping(&graph, 1.0, 1).unwrap();
    assert_eq!(mapped_count(&all), 10);
}

/// T1-INI-05: Already mapped candidates count toward the fraction.
#[test]
fn test_existing_mappings_count() {
    let (mut graph, oracle) = ten_candidate_graph();
    graph.add_to_mapping("c0", "K1").unwrap();
    graph.add_to_mapping("c5", "K2").unwrap();
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();

    let mapping = engine.create_initial_mapping(&graph, 0.5, 3).unwrap();
    assert_eq!(mapped_count(&mapping), 3);
    assert!(mapping.values().all(|c| !c.contains("c0") && !c.contains("c5")));
}

/// T1-INI-06: Applying the mapping maps exactly the drawn candidates.
#[test]
fn test_apply_initial_mapping() {
    let (mut graph, oracle) = ten_candidate_graph();
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();

    let mapping = engine.create_initial_mapping(&graph, 0.3, 5).unwrap();
    RecommendationEngine::apply_initial_mapping(&mut graph, &mapping).unwrap();
    engine.process_events(&graph).unwrap();
    assert_eq!(engine.mapped_candidates(&graph).len(), 3);
    assert_eq!(engine.unmapped_candidates().len(), 7);
}

/// T1-INI-07: Invalid fractions and missing oracles are rejected.
#[test]
fn test_invalid_arguments() {
    let (mut graph, oracle) = ten_candidate_graph();
    let mut engine = RecommendationEngine::new();
    assert!(matches!(
        engine.create_initial_mapping(&graph, 0.5, 1),
        Err(RecommendationError::InvalidArgument(_))
    ));

    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();
    for fraction in [1.5, -0.1, f64::NAN] {
        assert!(matches!(
            engine.create_initial_mapping(&graph, fraction, 1),
            Err(RecommendationError::InvalidArgument(_))
        ));
    }

    engine.configure(&mut graph, &settings(), None).unwrap();
    assert!(matches!(
        engine.create_initial_mapping(&graph, 0.5, 1),
        Err(RecommendationError::InvalidArgument(_))
    ));
}

/// T1-INI-08: The fraction is checked before every draw, so a round of
/// clusters can stop partway instead of overshooting.
#[test]
fn test_stops_mid_round() {
    let (mut graph, oracle) = ten_candidate_graph();
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), Some(&oracle)).unwrap();

    let mapping = engine.create_initial_mapping(&graph, 0.25, 3).unwrap();
    assert_eq!(mapped_count(&mapping), 3);
    assert_eq!(mapping["K1"].len(), 2);
    assert_eq!(mapping["K2"].len(), 1);
}
