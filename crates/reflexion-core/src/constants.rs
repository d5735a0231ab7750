//! Shared constants for the reflexion recommendation engine.

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Two attraction values closer than this are considered equal.
pub const ATTRACTION_VALUE_DELTA: f64 = 0.001;

/// Attraction value of a pair that was never scored, or that records an unmapping.
pub const UNSCORED_ATTRACTION_VALUE: f64 = -1.0;

/// Percentile rank returned when a candidate has no allowed pair.
pub const UNDEFINED_PERCENTILE_RANK: f64 = -1.0;

/// Toggle attribute marking compiler-generated implementation nodes.
pub const IS_ARTIFICIAL_TOGGLE: &str = "Element.Is_Artificial";

/// Toggle attribute marking anonymous implementation nodes.
pub const IS_ANONYMOUS_TOGGLE: &str = "Element.Is_Anonymous";

/// Default node type of mapping candidates.
pub const DEFAULT_CANDIDATE_TYPE: &str = "Class";

/// Default node type of architecture clusters.
pub const DEFAULT_CLUSTER_TYPE: &str = "Cluster";

/// Default number of experiment iterations.
pub const DEFAULT_ITERATIONS: u32 = 1;

/// Default master seed for experiments and initial mappings.
pub const DEFAULT_SEED: u64 = 593_946;

/// Default fraction of candidates mapped synthetically before an experiment.
pub const DEFAULT_INITIAL_MAPPING_PERCENTAGE: f64 = 0.5;

/// Default CountAttract phi (weight of edges into allowed foreign clusters).
pub const DEFAULT_PHI: f64 = 1.0;

/// Default weight of an implementation edge without a configured weight.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Default naive-Bayes alpha smoothing.
pub const DEFAULT_ALPHA_SMOOTHING: f64 = 1.0;

/// File name of the project-level settings file.
pub const SETTINGS_FILE_NAME: &str = "reflexion.toml";
