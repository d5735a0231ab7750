//! Tests for mapping experiments and recorded statistics.

mod common;

use common::{settings, three_cluster_graph, two_triangle_graph};
use reflexion_core::errors::StatisticsError;
use reflexion_core::types::ChangeType;
use reflexion_recommend::statistics::{Aggregate, MappedAt};
use reflexion_recommend::{run_experiment, DecisionLog, RecommendationEngine, StatisticsRecorder};

/// T1-EXP-01: The two-triangle graph is mapped completely and correctly.
#[test]
fn test_experiment_maps_everything() {
    let (graph, oracle) = two_triangle_graph();
    let settings = settings().with_initial_mapping_percentage(0.34).with_seed(9);
    let summary = run_experiment(&graph, &oracle, &settings).unwrap();

    assert_eq!(summary.runs.len(), 1);
    let run = &summary.runs[0];
    assert_eq!(run.candidates_total, 6);
    assert_eq!(run.initially_mapped, 3);
    assert_eq!(run.total_hits, 3);
    assert_eq!(run.total_fails, 0);
    assert_eq!(run.left_over, 0);
    assert_eq!(run.precision, 1.0);
    assert_eq!(run.recall, 1.0);
    assert_eq!(run.f_score, 1.0);
    assert_eq!(run.average_percentile_rank, 1.0);

    let steps: Vec<MappedAt> = run
        .candidates
        .iter()
        .filter(|c| c.is_committed())
        .map(|c| c.mapped_at)
        .collect();
    assert_eq!(steps, vec![MappedAt::Step(0), MappedAt::Step(1), MappedAt::Step(2)]);

    // The input graph is never touched.
    assert!(graph.mapping_edges().next().is_none());
}

/// T1-EXP-02: Iterations produce one run each and aggregate across them.
#[test]
fn test_multiple_iterations() {
    let (graph, oracle) = two_triangle_graph();
    let settings = settings()
        .with_initial_mapping_percentage(0.34)
        .with_iterations(2);
    let summary = run_experiment(&graph, &oracle, &settings).unwrap();

    assert_eq!(summary.iterations, 2);
    assert_eq!(summary.runs.len(), 2);
    assert_ne!(summary.runs[0].seed, summary.runs[1].seed);
    assert_eq!(summary.total_hits, 6);
    assert_eq!(summary.precision, Aggregate { mean: 1.0, std_dev: 0.0 });
}

/// T1-EXP-03: The same master seed reproduces every run.
#[test]
fn test_experiment_is_deterministic() {
    let (graph, oracle) = two_triangle_graph();
    let settings = settings().with_iterations(3).with_seed(1234);
    let first = run_experiment(&graph, &oracle, &settings).unwrap();
    let second = run_experiment(&graph, &oracle, &settings).unwrap();
    assert_eq!(first.runs, second.runs);
}

/// T1-EXP-04: The summary is written as JSON to the output path.
#[test]
fn test_summary_written_to_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.json");
    let (graph, oracle) = two_triangle_graph();
    let mut settings = settings().with_initial_mapping_percentage(0.34);
    settings.output_path = Some(path.clone());
    settings.experiment_name = Some("triangles".to_string());

    run_experiment(&graph, &oracle, &settings).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["experiment_name"], "triangles");
    assert_eq!(json["runs"].as_array().unwrap().len(), 1);
    assert_eq!(json["runs"][0]["candidates"][0]["mapped_at"]["kind"], "initial");
}

/// T1-EXP-05: Invalid settings fail before any run.
#[test]
fn test_invalid_settings_rejected() {
    let (graph, oracle) = two_triangle_graph();
    let settings = settings().with_iterations(0);
    assert!(run_experiment(&graph, &oracle, &settings).is_err());
}

/// T1-EXP-06: A decision log refuses to save nothing and saves what it recorded.
#[test]
fn test_decision_log_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("decisions.json");
    let mut graph = three_cluster_graph();
    let mut engine = RecommendationEngine::new();
    engine.configure(&mut graph, &settings(), None).unwrap();

    let empty = DecisionLog::new();
    assert!(matches!(empty.save(&path), Err(StatisticsError::Empty)));

    let mut log = DecisionLog::new();
    log.start();
    for pair in engine.automatic_mappings() {
        log.record_decision(pair.as_decision(ChangeType::Addition));
    }
    log.stop();
    log.record_decision(engine.all_pairs()[0].as_ref().clone());
    assert_eq!(log.decisions().len(), 2);
    assert!(log.started_at().is_some());

    log.save(&path).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["decisions"].as_array().unwrap().len(), 2);
    assert_eq!(json["decisions"][0]["change_type"], "Addition");
}

/// T1-EXP-07: Aggregates over no, one, and several values.
#[test]
fn test_aggregate() {
    assert_eq!(Aggregate::of(&[]), Aggregate { mean: 0.0, std_dev: 0.0 });
    assert_eq!(Aggregate::of(&[0.4]), Aggregate { mean: 0.4, std_dev: 0.0 });
    let spread = Aggregate::of(&[1.0, 3.0]);
    assert_eq!(spread.mean, 2.0);
    assert!((spread.std_dev - 2f64.sqrt()).abs() < 1e-12);
}
