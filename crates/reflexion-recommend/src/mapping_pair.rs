//! MappingPair: one scored candidate/cluster association.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use reflexion_core::constants::{ATTRACTION_VALUE_DELTA, UNSCORED_ATTRACTION_VALUE};
use reflexion_core::errors::RecommendationError;
use reflexion_core::types::ChangeType;
use serde::{Deserialize, Serialize};

/// A slot that can be written exactly once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WriteOnce<T> {
    Unset,
    Set(T),
}

impl<T> WriteOnce<T> {
    /// Fill the slot. Fails if it already holds a value, even an equal one.
    pub fn set(&mut self, value: T, field: &'static str) -> Result<(), RecommendationError> {
        match self {
            Self::Unset => {
                *self = Self::Set(value);
                Ok(())
            }
            Self::Set(_) => Err(RecommendationError::InvariantViolation(format!(
                "{field} is write-once and already set"
            ))),
        }
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Unset => None,
            Self::Set(value) => Some(value),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }
}

impl<T> Default for WriteOnce<T> {
    fn default() -> Self {
        Self::Unset
    }
}

/// A scored `(candidate, cluster)` association.
///
/// Identifiers and the attraction value are write-once. Equality allows
/// attraction values to differ by less than [`ATTRACTION_VALUE_DELTA`];
/// ordering is by attraction value alone.
#[derive(Debug, Clone, Default)]
pub struct MappingPair {
    candidate_id: WriteOnce<String>,
    cluster_id: WriteOnce<String>,
    attraction_value: WriteOnce<f64>,
    change_type: Option<ChangeType>,
    chosen_at: Option<DateTime<Utc>>,
}

impl MappingPair {
    pub fn new(
        candidate_id: impl Into<String>,
        cluster_id: impl Into<String>,
        attraction_value: f64,
    ) -> Self {
        Self {
            candidate_id: WriteOnce::Set(candidate_id.into()),
            cluster_id: WriteOnce::Set(cluster_id.into()),
            attraction_value: WriteOnce::Set(attraction_value),
            change_type: None,
            chosen_at: None,
        }
    }

    /// A pair with identifiers but no score yet; reads as `-1.0`.
    pub fn unscored(candidate_id: impl Into<String>, cluster_id: impl Into<String>) -> Self {
        Self {
            candidate_id: WriteOnce::Set(candidate_id.into()),
            cluster_id: WriteOnce::Set(cluster_id.into()),
            ..Self::default()
        }
    }

    pub fn candidate_id(&self) -> &str {
        self.candidate_id.get().map(String::as_str).unwrap_or_default()
    }

    pub fn cluster_id(&self) -> &str {
        self.cluster_id.get().map(String::as_str).unwrap_or_default()
    }

    /// The score, or `-1.0` while unscored.
    pub fn attraction_value(&self) -> f64 {
        self.attraction_value
            .get()
            .copied()
            .unwrap_or(UNSCORED_ATTRACTION_VALUE)
    }

    pub fn is_scored(&self) -> bool {
        self.attraction_value.is_set()
    }

    pub fn set_candidate_id(&mut self, id: impl Into<String>) -> Result<(), RecommendationError> {
        self.candidate_id.set(id.into(), "candidate_id")
    }

    pub fn set_cluster_id(&mut self, id: impl Into<String>) -> Result<(), RecommendationError> {
        self.cluster_id.set(id.into(), "cluster_id")
    }

    pub fn set_attraction_value(&mut self, value: f64) -> Result<(), RecommendationError> {
        self.attraction_value.set(value, "attraction_value")
    }

    pub fn change_type(&self) -> Option<ChangeType> {
        self.change_type
    }

    pub fn chosen_at(&self) -> Option<DateTime<Utc>> {
        self.chosen_at
    }

    /// A copy of this pair tagged as a historical decision taken now.
    pub fn as_decision(&self, change: ChangeType) -> Self {
        self.as_decision_at(change, Utc::now())
    }

    pub fn as_decision_at(&self, change: ChangeType, chosen_at: DateTime<Utc>) -> Self {
        Self {
            change_type: Some(change),
            chosen_at: Some(chosen_at),
            ..self.clone()
        }
    }

    pub fn same_ids(&self, other: &MappingPair) -> bool {
        self.candidate_id == other.candidate_id && self.cluster_id == other.cluster_id
    }

    /// Key used by filters and lookups.
    pub fn key(&self) -> (String, String) {
        (self.candidate_id().to_string(), self.cluster_id().to_string())
    }
}

impl PartialEq for MappingPair {
    fn eq(&self, other: &Self) -> bool {
        self.same_ids(other)
            && (self.attraction_value() - other.attraction_value()).abs() < ATTRACTION_VALUE_DELTA
    }
}

impl Eq for MappingPair {}

/// Hashes the identifiers only. Attraction values that compare equal can
/// straddle any truncation boundary, so the value cannot take part.
impl Hash for MappingPair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.candidate_id().hash(state);
        self.cluster_id().hash(state);
    }
}

impl PartialOrd for MappingPair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MappingPair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.attraction_value().total_cmp(&other.attraction_value())
    }
}

impl std::fmt::Display for MappingPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} ({:.4})",
            self.candidate_id(),
            self.cluster_id(),
            self.attraction_value()
        )
    }
}

/// Serialized form of a [`MappingPair`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingPairRecord {
    pub candidate_id: String,
    pub cluster_id: String,
    pub attraction_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_type: Option<ChangeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_at: Option<DateTime<Utc>>,
}

impl From<&MappingPair> for MappingPairRecord {
    fn from(pair: &MappingPair) -> Self {
        Self {
            candidate_id: pair.candidate_id().to_string(),
            cluster_id: pair.cluster_id().to_string(),
            attraction_value: pair.attraction_value(),
            change_type: pair.change_type,
            chosen_at: pair.chosen_at,
        }
    }
}

impl From<MappingPairRecord> for MappingPair {
    fn from(record: MappingPairRecord) -> Self {
        let mut pair = if record.attraction_value == UNSCORED_ATTRACTION_VALUE {
            MappingPair::unscored(record.candidate_id, record.cluster_id)
        } else {
            MappingPair::new(record.candidate_id, record.cluster_id, record.attraction_value)
        };
        pair.change_type = record.change_type;
        pair.chosen_at = record.chosen_at;
        pair
    }
}

impl Serialize for MappingPair {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        MappingPairRecord::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MappingPair {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        MappingPairRecord::deserialize(deserializer).map(MappingPair::from)
    }
}
