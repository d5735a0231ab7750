//! Tests for MappingPair equality, hashing, ordering, and write-once fields.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use reflexion_core::errors::RecommendationError;
use reflexion_core::types::ChangeType;
use reflexion_recommend::{MappingPair, WriteOnce};

fn hash_of(pair: &MappingPair) -> u64 {
    let mut hasher = DefaultHasher::new();
    pair.hash(&mut hasher);
    hasher.finish()
}

/// T1-MPP-01: Write-once fields reject a second write, even of the same value.
#[test]
fn test_write_once_rejects_second_set() {
    let mut slot: WriteOnce<f64> = WriteOnce::default();
    assert!(!slot.is_set());
    slot.set(0.5, "value").unwrap();
    assert_eq!(slot.get(), Some(&0.5));
    let err = slot.set(0.5, "value").unwrap_err();
    assert!(matches!(err, RecommendationError::InvariantViolation(_)));

    let mut pair = MappingPair::new("A", "X", 1.0);
    assert!(pair.set_candidate_id("A").is_err());
    assert!(pair.set_cluster_id("Y").is_err());
    assert!(pair.set_attraction_value(1.0).is_err());
    assert_eq!(pair.cluster_id(), "X");
}

/// T1-MPP-02: Values closer than the delta compare equal.
#[test]
fn test_equality_tolerates_small_differences() {
    assert_eq!(MappingPair::new("A", "X", 0.8001), MappingPair::new("A", "X", 0.8009));
    assert_ne!(MappingPair::new("A", "X", 0.799), MappingPair::new("A", "X", 0.8001));
    assert_ne!(MappingPair::new("A", "X", 0.8), MappingPair::new("A", "Y", 0.8));
}

/// T1-MPP-03: Equal pairs hash equally, whatever their exact values.
#[test]
fn test_equal_pairs_hash_equally() {
    let a = MappingPair::new("A", "X", 0.99951);
    let b = MappingPair::new("A", "X", 0.99949);
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));

    let set: HashSet<MappingPair> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

/// T1-MPP-04: Pairs order by attraction value only.
#[test]
fn test_ordering_by_value() {
    let mut pairs = vec![
        MappingPair::new("C", "X", 2.0),
        MappingPair::new("A", "Y", 0.5),
        MappingPair::unscored("B", "X"),
    ];
    pairs.sort();
    let order: Vec<&str> = pairs.iter().map(|p| p.candidate_id()).collect();
    assert_eq!(order, vec!["B", "A", "C"]);
    assert!(MappingPair::new("Z", "X", 1.0) > MappingPair::new("A", "X", 0.0));
}

/// T1-MPP-05: Decisions serialize with their change type and timestamp.
#[test]
fn test_decision_serde() {
    let decision = MappingPair::new("A", "X", 1.5).as_decision(ChangeType::Removal);
    let json = serde_json::to_string(&decision).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["candidate_id"], "A");
    assert_eq!(value["cluster_id"], "X");
    assert_eq!(value["attraction_value"], 1.5);
    assert!(value.get("chosen_at").is_some());

    let back: MappingPair = serde_json::from_str(&json).unwrap();
    assert_eq!(back, decision);
    assert_eq!(back.change_type(), Some(ChangeType::Removal));
    assert_eq!(back.chosen_at(), decision.chosen_at());

    let plain = serde_json::to_value(MappingPair::new("A", "X", 0.0)).unwrap();
    assert!(plain.get("change_type").is_none());
}

/// T1-MPP-06: Unscored pairs read -1 and survive serialization unscored.
#[test]
fn test_unscored_round_trip() {
    let pair = MappingPair::unscored("A", "X");
    let back: MappingPair = serde_json::from_str(&serde_json::to_string(&pair).unwrap()).unwrap();
    assert!(!back.is_scored());
    assert_eq!(back.attraction_value(), -1.0);
    assert_eq!(pair.to_string(), "A -> X (-1.0000)");
}
