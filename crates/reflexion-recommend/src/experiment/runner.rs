//! Mapping experiments: let the engine map a graph on its own and measure
//! how well it agrees with an oracle mapping.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reflexion_core::config::RecommendationSettings;
use reflexion_core::constants::UNDEFINED_PERCENTILE_RANK;
use reflexion_core::errors::RecommendationError;

use crate::engine::RecommendationEngine;
use crate::graph::{OracleMapping, ReflexionGraph};
use crate::mapping_pair::MappingPair;
use crate::statistics::{CandidateStatistic, ExperimentSummary, MappedAt, MappingExperimentResult};

/// Run `settings.iterations` independent mapping runs over copies of `graph`.
///
/// Each run draws its own seed from `settings.seed`, applies a synthetic
/// initial mapping, then commits recommendations one at a time until none is
/// left. The summary is also written to `settings.output_path` when set.
pub fn run_experiment(
    graph: &ReflexionGraph,
    oracle_mapping: &OracleMapping,
    settings: &RecommendationSettings,
) -> Result<ExperimentSummary, RecommendationError> {
    settings
        .validate()
        .map_err(|e| RecommendationError::Configuration(e.to_string()))?;
    let mut master = StdRng::seed_from_u64(settings.seed);
    let mut runs = Vec::with_capacity(settings.iterations as usize);

    for iteration in 0..settings.iterations {
        let seed: u64 = master.gen();
        let result = run_once(graph, oracle_mapping, settings, seed)?;
        tracing::info!(
            iteration,
            seed,
            hits = result.total_hits,
            fails = result.total_fails,
            left_over = result.left_over,
            f_score = result.f_score,
            "experiment run finished"
        );
        runs.push(result);
    }

    let summary = ExperimentSummary::from_runs(settings, runs);
    if let Some(path) = &settings.output_path {
        summary.save(path)?;
        tracing::info!(path = %path.display(), "experiment summary written");
    }
    Ok(summary)
}

fn run_once(
    graph: &ReflexionGraph,
    oracle_mapping: &OracleMapping,
    settings: &RecommendationSettings,
    seed: u64,
) -> Result<MappingExperimentResult, RecommendationError> {
    let mut working = graph.detached_copy();
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut working, settings, Some(oracle_mapping))?;

    let initial = engine.create_initial_mapping(&working, settings.initial_mapping_percentage, seed)?;
    RecommendationEngine::apply_initial_mapping(&mut working, &initial)?;
    engine.process_events(&working)?;

    let mut finished = Vec::new();
    let mut pending: BTreeMap<String, CandidateStatistic> = BTreeMap::new();
    for candidate_id in engine.candidates(&working) {
        let mut statistic = CandidateStatistic::new(candidate_id.as_str(), MappedAt::LeftOver);
        statistic.expected_cluster_id = engine.expected_cluster_id(&candidate_id)?;
        match working.maps_to(&candidate_id) {
            Some(cluster) => {
                statistic.mapped_at = MappedAt::Initial;
                statistic.mapped_cluster_id = Some(cluster.id.clone());
                statistic.hit = engine.is_hit(&candidate_id, &cluster.id)?;
                finished.push(statistic);
            }
            None => {
                pending.insert(candidate_id, statistic);
            }
        }
    }

    engine.start_recording();
    let mut step = 0;
    while let Some(pair) = next_choice(&engine, settings.ignore_tie_breaks) {
        let candidate_id = pair.candidate_id().to_string();
        let cluster_id = pair.cluster_id().to_string();
        let Some(mut statistic) = pending.remove(&candidate_id) else {
            tracing::warn!(candidate = %candidate_id, "recommended candidate is not pending, run stopped");
            break;
        };

        let rank = match engine.percentile_rank(&candidate_id) {
            Ok(rank) => rank,
            Err(RecommendationError::NotFound(_)) => UNDEFINED_PERCENTILE_RANK,
            Err(e) => return Err(e),
        };
        statistic.percentile_ranks.push(rank);
        statistic.hit = engine.is_hit(&candidate_id, &cluster_id)?;
        statistic.mapped_cluster_id = Some(cluster_id.clone());
        statistic.mapped_at = MappedAt::Step(step);

        working.add_to_mapping(&candidate_id, &cluster_id)?;
        engine.process_events(&working)?;
        finished.push(statistic);

        // Candidates below the one just mapped follow it implicitly.
        let followers: Vec<String> = pending
            .keys()
            .filter(|id| working.maps_to(id).is_some())
            .cloned()
            .collect();
        for id in followers {
            if let Some(mut follower) = pending.remove(&id) {
                let cluster = working.maps_to(&id).map(|node| node.id.clone());
                if let Some(cluster) = &cluster {
                    follower.hit = engine.is_hit(&id, cluster)?;
                }
                follower.mapped_cluster_id = cluster;
                follower.mapped_at = MappedAt::Step(step);
                finished.push(follower);
            }
        }
        step += 1;
    }
    engine.stop_recording();

    finished.extend(pending.into_values());
    Ok(MappingExperimentResult::from_candidates(seed, finished))
}

/// The next pair to commit: the first unambiguous recommendation, or with
/// `ignore_tie_breaks` the first recommendation of all.
fn next_choice(engine: &RecommendationEngine, ignore_tie_breaks: bool) -> Option<Arc<MappingPair>> {
    engine.automatic_mappings().into_iter().next().or_else(|| {
        if ignore_tie_breaks {
            engine.recommendations().into_iter().next()
        } else {
            None
        }
    })
}
