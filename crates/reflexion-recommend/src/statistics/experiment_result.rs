//! Mapping experiment results: per-candidate outcomes, per-run rates,
//! cross-run means and standard deviations.

use std::path::Path;

use chrono::{DateTime, Utc};
use reflexion_core::config::RecommendationSettings;
use reflexion_core::constants::UNDEFINED_PERCENTILE_RANK;
use reflexion_core::errors::StatisticsError;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// When a candidate got its mapping during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "step")]
pub enum MappedAt {
    /// Part of the synthetic initial mapping.
    Initial,
    /// Committed at this step of the automatic mapping loop.
    Step(usize),
    /// Still unmapped when the run ended.
    LeftOver,
}

/// Outcome for one candidate in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateStatistic {
    pub candidate_id: String,
    pub expected_cluster_id: Option<String>,
    pub mapped_cluster_id: Option<String>,
    pub hit: bool,
    pub mapped_at: MappedAt,
    /// Percentile ranks observed for this candidate, one per recorded step.
    pub percentile_ranks: Vec<f64>,
}

impl CandidateStatistic {
    pub fn new(candidate_id: impl Into<String>, mapped_at: MappedAt) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            expected_cluster_id: None,
            mapped_cluster_id: None,
            hit: false,
            mapped_at,
            percentile_ranks: Vec::new(),
        }
    }

    /// Mean over the defined percentile ranks, `-1.0` if there are none.
    pub fn average_percentile_rank(&self) -> f64 {
        let valid: Vec<f64> = self
            .percentile_ranks
            .iter()
            .copied()
            .filter(|rank| *rank >= 0.0)
            .collect();
        if valid.is_empty() {
            UNDEFINED_PERCENTILE_RANK
        } else {
            valid.iter().mean()
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.mapped_at, MappedAt::Step(_))
    }
}

/// Result of one experiment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingExperimentResult {
    pub seed: u64,
    pub candidates_total: usize,
    pub candidates_considered: usize,
    pub initially_mapped: usize,
    pub left_over: usize,
    pub total_hits: usize,
    pub total_fails: usize,
    pub mapping_rate: f64,
    pub hit_rate_all: f64,
    pub hit_rate_mapped: f64,
    pub precision: f64,
    pub recall: f64,
    pub f_score: f64,
    pub average_percentile_rank: f64,
    /// In the order the candidates were finished.
    pub candidates: Vec<CandidateStatistic>,
}

impl MappingExperimentResult {
    /// Derive every rate from the per-candidate outcomes.
    pub fn from_candidates(seed: u64, candidates: Vec<CandidateStatistic>) -> Self {
        let candidates_total = candidates.len();
        let initially_mapped = candidates
            .iter()
            .filter(|c| c.mapped_at == MappedAt::Initial)
            .count();
        let left_over = candidates
            .iter()
            .filter(|c| c.mapped_at == MappedAt::LeftOver)
            .count();
        let total_hits = candidates.iter().filter(|c| c.is_committed() && c.hit).count();
        let total_fails = candidates.iter().filter(|c| c.is_committed() && !c.hit).count();
        let candidates_considered = candidates_total - initially_mapped;
        let mapped = candidates_considered - left_over;

        let ratio = |numerator: usize, denominator: usize| {
            if denominator > 0 {
                numerator as f64 / denominator as f64
            } else {
                0.0
            }
        };
        let precision = ratio(total_hits, total_hits + total_fails);
        let recall = ratio(total_hits, total_hits + left_over);
        let f_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        let ranks: Vec<f64> = candidates
            .iter()
            .map(CandidateStatistic::average_percentile_rank)
            .filter(|rank| *rank >= 0.0)
            .collect();
        let average_percentile_rank = if ranks.is_empty() {
            UNDEFINED_PERCENTILE_RANK
        } else {
            ranks.iter().mean()
        };

        Self {
            seed,
            candidates_total,
            candidates_considered,
            initially_mapped,
            left_over,
            total_hits,
            total_fails,
            mapping_rate: ratio(mapped, candidates_considered),
            hit_rate_all: ratio(total_hits, candidates_considered),
            hit_rate_mapped: ratio(total_hits, mapped),
            precision,
            recall,
            f_score,
            average_percentile_rank,
            candidates,
        }
    }
}

/// Mean and sample standard deviation of one rate across runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Aggregate {
    pub mean: f64,
    pub std_dev: f64,
}

impl Aggregate {
    /// Empty input yields zeros; a single value has no spread.
    pub fn of(values: &[f64]) -> Self {
        match values.len() {
            0 => Self::default(),
            1 => Self {
                mean: values[0],
                std_dev: 0.0,
            },
            _ => Self {
                mean: values.iter().mean(),
                std_dev: values.iter().std_dev(),
            },
        }
    }
}

/// All runs of an experiment plus their aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub experiment_name: Option<String>,
    pub master_seed: u64,
    pub iterations: usize,
    pub created_at: DateTime<Utc>,
    pub settings: RecommendationSettings,
    pub candidates_total: usize,
    pub candidates_considered: usize,
    pub initially_mapped: usize,
    pub left_over: usize,
    pub total_hits: usize,
    pub total_fails: usize,
    pub mapping_rate: Aggregate,
    pub hit_rate_all: Aggregate,
    pub hit_rate_mapped: Aggregate,
    pub precision: Aggregate,
    pub recall: Aggregate,
    pub f_score: Aggregate,
    pub average_percentile_rank: f64,
    pub runs: Vec<MappingExperimentResult>,
}

impl ExperimentSummary {
    pub fn from_runs(settings: &RecommendationSettings, runs: Vec<MappingExperimentResult>) -> Self {
        let sum = |field: fn(&MappingExperimentResult) -> usize| runs.iter().map(field).sum::<usize>();
        let aggregate = |field: fn(&MappingExperimentResult) -> f64| {
            Aggregate::of(&runs.iter().map(field).collect::<Vec<_>>())
        };

        let candidates_total = sum(|r| r.candidates_total);
        let candidates_considered = sum(|r| r.candidates_considered);
        let initially_mapped = sum(|r| r.initially_mapped);
        let left_over = sum(|r| r.left_over);
        let total_hits = sum(|r| r.total_hits);
        let total_fails = sum(|r| r.total_fails);
        let mapping_rate = aggregate(|r| r.mapping_rate);
        let hit_rate_all = aggregate(|r| r.hit_rate_all);
        let hit_rate_mapped = aggregate(|r| r.hit_rate_mapped);
        let precision = aggregate(|r| r.precision);
        let recall = aggregate(|r| r.recall);
        let f_score = aggregate(|r| r.f_score);
        let ranks: Vec<f64> = runs
            .iter()
            .map(|r| r.average_percentile_rank)
            .filter(|rank| *rank >= 0.0)
            .collect();
        let average_percentile_rank = if ranks.is_empty() {
            UNDEFINED_PERCENTILE_RANK
        } else {
            Aggregate::of(&ranks).mean
        };

        Self {
            experiment_name: settings.experiment_name.clone(),
            master_seed: settings.seed,
            iterations: runs.len(),
            created_at: Utc::now(),
            settings: settings.clone(),
            candidates_total,
            candidates_considered,
            initially_mapped,
            left_over,
            total_hits,
            total_fails,
            mapping_rate,
            hit_rate_all,
            hit_rate_mapped,
            precision,
            recall,
            f_score,
            average_percentile_rank,
            runs,
        }
    }

    pub fn to_json(&self) -> Result<String, StatisticsError> {
        serde_json::to_string_pretty(self).map_err(|e| StatisticsError::Serialization(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), StatisticsError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| StatisticsError::WriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed(id: &str, step: usize, hit: bool) -> CandidateStatistic {
        CandidateStatistic {
            hit,
            ..CandidateStatistic::new(id, MappedAt::Step(step))
        }
    }

    #[test]
    fn rates_follow_outcomes() {
        let result = MappingExperimentResult::from_candidates(
            7,
            vec![
                CandidateStatistic::new("init", MappedAt::Initial),
                committed("a", 0, true),
                committed("b", 1, true),
                committed("c", 2, false),
                CandidateStatistic::new("d", MappedAt::LeftOver),
            ],
        );
        assert_eq!(result.candidates_total, 5);
        assert_eq!(result.candidates_considered, 4);
        assert_eq!(result.total_hits, 2);
        assert_eq!(result.total_fails, 1);
        assert_eq!(result.left_over, 1);
        assert_eq!(result.mapping_rate, 0.75);
        assert_eq!(result.hit_rate_all, 0.5);
        assert!((result.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((result.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((result.f_score - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.average_percentile_rank, -1.0);
    }

    #[test]
    fn aggregate_of_single_value_has_no_spread() {
        assert_eq!(Aggregate::of(&[0.4]), Aggregate { mean: 0.4, std_dev: 0.0 });
        assert_eq!(Aggregate::of(&[]), Aggregate::default());
        let spread = Aggregate::of(&[1.0, 3.0]);
        assert_eq!(spread.mean, 2.0);
        assert!((spread.std_dev - 2.0_f64.sqrt()).abs() < 1e-12);
    }
}
