//! Tests for MaxFilter recommendation selection.

use std::sync::Arc;

use reflexion_recommend::{MappingPair, MaxFilter, RecommendationFilter};

fn pair(candidate: &str, cluster: &str, value: f64) -> Arc<MappingPair> {
    Arc::new(MappingPair::new(candidate, cluster, value))
}

fn keys(pairs: &[Arc<MappingPair>]) -> Vec<(String, String)> {
    pairs.iter().map(|p| p.key()).collect()
}

fn key(candidate: &str, cluster: &str) -> (String, String) {
    (candidate.to_string(), cluster.to_string())
}

/// T1-FLT-01: Only pairs at the maximum are recommended.
#[test]
fn test_recommends_maximum() {
    let mut filter = MaxFilter::new();
    filter.upsert(pair("a", "K1", 1.0));
    filter.upsert(pair("b", "K1", 3.0));
    filter.upsert(pair("c", "K2", 3.0005));
    filter.upsert(pair("c", "K1", 2.0));

    assert_eq!(keys(&filter.recommendations()), vec![key("b", "K1"), key("c", "K2")]);
    assert_eq!(filter.current_value(), 3.0);
    assert_eq!(filter.len(), 4);
}

/// T1-FLT-02: Zero and negative values are never recommended.
#[test]
fn test_non_positive_values_are_not_recommended() {
    let mut filter = MaxFilter::new();
    filter.upsert(pair("a", "K1", 0.0));
    filter.upsert(pair("b", "K1", -1.0));
    assert!(filter.recommendations().is_empty());
    assert!(filter.automatic_mappings().is_empty());
    assert_eq!(filter.all_pairs().len(), 2);
}

/// T1-FLT-03: Automatic mappings are candidates with a single recommendation.
#[test]
fn test_automatic_mappings_need_unique_cluster() {
    let mut filter = MaxFilter::new();
    filter.upsert(pair("a", "K1", 2.0));
    filter.upsert(pair("a", "K2", 2.0));
    filter.upsert(pair("b", "K1", 2.0));
    assert_eq!(keys(&filter.automatic_mappings()), vec![key("b", "K1")]);
    assert_eq!(filter.recommendations_for_candidate("a").len(), 2);
    assert_eq!(keys(&filter.recommendations_for_cluster("K1")), vec![key("a", "K1"), key("b", "K1")]);
}

/// T1-FLT-04: Removing the last maximum rebuilds from the remaining pairs.
#[test]
fn test_rebuild_after_removal() {
    let mut filter = MaxFilter::new();
    filter.upsert(pair("a", "K1", 5.0));
    filter.upsert(pair("b", "K1", 2.0));
    filter.upsert(pair("c", "K2", 2.0));
    filter.upsert(pair("d", "K2", 1.0));

    filter.remove_candidate("a");
    assert_eq!(keys(&filter.recommendations()), vec![key("b", "K1"), key("c", "K2")]);
    assert_eq!(filter.current_value(), 2.0);

    filter.remove_cluster("K1");
    assert_eq!(keys(&filter.recommendations()), vec![key("c", "K2")]);
    assert!(filter.get("b", "K1").is_none());
}

/// T1-FLT-05: Replacing a pair keeps the shared handle the filter was given.
#[test]
fn test_upsert_replaces_and_shares() {
    let mut filter = MaxFilter::new();
    filter.upsert(pair("a", "K1", 1.0));
    let replacement = pair("a", "K1", 4.0);
    filter.upsert(Arc::clone(&replacement));

    let stored = filter.get("a", "K1").unwrap();
    assert!(Arc::ptr_eq(&stored, &replacement));
    assert_eq!(filter.len(), 1);
    assert_eq!(filter.current_value(), 4.0);
}

/// T1-FLT-06: A lowered score drops out of the recommendations.
#[test]
fn test_lowered_score_is_unrecommended() {
    let mut filter = MaxFilter::new();
    filter.upsert(pair("a", "K1", 3.0));
    filter.upsert(pair("b", "K1", 3.0));
    filter.upsert(pair("a", "K1", 1.0));
    assert_eq!(keys(&filter.recommendations()), vec![key("b", "K1")]);
}

/// T1-FLT-07: Reset forgets everything.
#[test]
fn test_reset() {
    let mut filter = MaxFilter::new();
    filter.upsert(pair("a", "K1", 3.0));
    filter.reset();
    assert!(filter.is_empty());
    assert!(filter.recommendations().is_empty());
    assert_eq!(filter.current_value(), 0.0);
}
