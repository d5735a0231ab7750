//! Statistics: committed mapping decisions and experiment metrics.

pub mod decision_log;
pub mod experiment_result;

pub use decision_log::DecisionLog;
pub use experiment_result::{
    Aggregate, CandidateStatistic, ExperimentSummary, MappedAt, MappingExperimentResult,
};

use reflexion_core::config::RecommendationSettings;

use crate::mapping_pair::MappingPair;

/// Records the mapping decisions committed while a session is active.
///
/// `start` and `stop` are idempotent. Decisions arriving while the session is
/// inactive are dropped.
pub trait StatisticsRecorder: Send {
    fn start(&mut self);

    fn stop(&mut self);

    /// Drop all recorded decisions. Does not change whether the session is active.
    fn reset(&mut self);

    fn is_active(&self) -> bool;

    fn record_decision(&mut self, decision: MappingPair);

    fn set_config_info(&mut self, settings: &RecommendationSettings);

    fn decisions(&self) -> &[MappingPair];
}
