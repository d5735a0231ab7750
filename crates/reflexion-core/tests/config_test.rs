//! Tests for RecommendationSettings loading, validation, and resolution.

use std::sync::Mutex;

use reflexion_core::config::{
    AttractFunctionConfig, AttractFunctionKind, CountAttractConfig, DocumentMergingType,
    RecommendationSettings, SettingsOverrides,
};
use reflexion_core::errors::{ConfigError, RecommendationError};

/// Serializes tests that touch environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_reflexion_env_vars() {
    for key in [
        "REFLEXION_ATTRACT_FUNCTION",
        "REFLEXION_SEED",
        "REFLEXION_ITERATIONS",
        "REFLEXION_INITIAL_MAPPING_PERCENTAGE",
        "REFLEXION_IGNORE_TIE_BREAKS",
        "REFLEXION_CANDIDATE_TYPE",
        "REFLEXION_CLUSTER_TYPE",
        "REFLEXION_OUTPUT_PATH",
    ] {
        std::env::remove_var(key);
    }
}

/// T0-CFG-01: Layered resolution (overrides > env > project file > defaults).
#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_reflexion_env_vars();

    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("reflexion.toml"),
        r#"
attract_function = "count_attract"
candidate_type = "Type"
seed = 7
iterations = 3

[count_attract]
phi = 0.5

[count_attract.edge_weights]
Call = 2.0
"#,
    )
    .unwrap();

    std::env::set_var("REFLEXION_ITERATIONS", "5");
    let overrides = SettingsOverrides {
        seed: Some(99),
        ..Default::default()
    };
    let settings = RecommendationSettings::load(dir.path(), Some(&overrides)).unwrap();
    clear_reflexion_env_vars();

    assert_eq!(settings.candidate_type, "Type");
    assert_eq!(settings.cluster_type, "Cluster");
    assert_eq!(settings.iterations, 5);
    assert_eq!(settings.seed, 99);
    let count = settings.count_attract.unwrap();
    assert_eq!(count.effective_phi(), 0.5);
    assert_eq!(count.edge_weights.get("Call"), Some(&2.0));
}

/// T0-CFG-02: Without a project file, defaults apply.
#[test]
fn test_defaults_without_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_reflexion_env_vars();

    let dir = tempfile::TempDir::new().unwrap();
    let settings = RecommendationSettings::load(dir.path(), None).unwrap();
    assert_eq!(settings, RecommendationSettings::default());
}

/// T0-CFG-03: Unparseable env values are skipped rather than fatal.
#[test]
fn test_bad_env_value_ignored() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_reflexion_env_vars();

    std::env::set_var("REFLEXION_SEED", "not-a-number");
    std::env::set_var("REFLEXION_ATTRACT_FUNCTION", "no-attract");
    let dir = tempfile::TempDir::new().unwrap();
    let settings = RecommendationSettings::load(dir.path(), None).unwrap();
    clear_reflexion_env_vars();

    assert_eq!(settings.seed, RecommendationSettings::default().seed);
    assert_eq!(settings.attract_function, AttractFunctionKind::NoAttract);
}

/// T0-CFG-04: Fractions outside [0, 1] fail validation.
#[test]
fn test_fraction_out_of_range_rejected() {
    for fraction in [-0.1, 1.01, f64::NAN] {
        let settings = RecommendationSettings::default().with_initial_mapping_percentage(fraction);
        match settings.validate() {
            Err(ConfigError::ValidationFailed { field, .. }) => {
                assert_eq!(field, "initial_mapping_percentage")
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}

/// T0-CFG-05: Negative edge weights and out-of-range phi fail validation.
#[test]
fn test_count_attract_validation() {
    let mut weights = std::collections::BTreeMap::new();
    weights.insert("Call".to_string(), -1.0);
    let settings = RecommendationSettings::default().with_count_attract(CountAttractConfig {
        phi: None,
        edge_weights: weights,
    });
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::ValidationFailed { field, .. }) if field == "count_attract.edge_weights.Call"
    ));

    let settings = RecommendationSettings::default().with_count_attract(CountAttractConfig {
        phi: Some(1.5),
        ..Default::default()
    });
    assert!(settings.validate().is_err());
}

/// T0-CFG-06: The block for the selected kind is resolved; a missing block is a configuration error.
#[test]
fn test_attract_function_config_resolution() {
    let settings = RecommendationSettings::default();
    assert!(matches!(
        settings.attract_function_config().unwrap(),
        AttractFunctionConfig::CountAttract(_)
    ));

    let settings = RecommendationSettings::default().with_attract_function(AttractFunctionKind::NbAttract);
    assert!(matches!(
        settings.attract_function_config(),
        Err(RecommendationError::Configuration(_))
    ));

    let settings = RecommendationSettings::default().with_attract_function(AttractFunctionKind::NoAttract);
    let config = settings.attract_function_config().unwrap();
    assert_eq!(config.kind(), AttractFunctionKind::NoAttract);
    assert_eq!(config.edge_weight("Anything"), 1.0);
}

/// T0-CFG-07: Nested blocks parse from TOML and survive a to_toml round trip.
#[test]
fn test_nested_blocks_from_toml() {
    let settings = RecommendationSettings::from_toml(
        r#"
attract_function = "adc_attract"

[adc_attract]
merging_type = "union"

[nb_attract]
alpha_smoothing = 0.5
"#,
    )
    .unwrap();
    assert_eq!(settings.attract_function, AttractFunctionKind::AdcAttract);
    let adc = settings.adc_attract.clone().unwrap();
    assert_eq!(adc.effective_merging_type(), DocumentMergingType::Union);
    assert_eq!(settings.nb_attract.as_ref().unwrap().effective_alpha_smoothing(), 0.5);

    let reparsed = RecommendationSettings::from_toml(&settings.to_toml().unwrap()).unwrap();
    assert_eq!(reparsed, settings);
}

/// T0-CFG-08: Invalid TOML reports a parse error.
#[test]
fn test_invalid_toml() {
    assert!(matches!(
        RecommendationSettings::from_toml("seed = [unterminated"),
        Err(ConfigError::ParseError { .. })
    ));
}

/// T0-CFG-09: Kind names parse with dashes, underscores, or no separator.
#[test]
fn test_kind_from_str() {
    assert_eq!("count-attract".parse::<AttractFunctionKind>().unwrap(), AttractFunctionKind::CountAttract);
    assert_eq!("NbAttract".parse::<AttractFunctionKind>().unwrap(), AttractFunctionKind::NbAttract);
    assert!("hugme".parse::<AttractFunctionKind>().is_err());
}
