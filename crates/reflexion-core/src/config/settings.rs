//! RecommendationSettings: the per-run configuration bundle.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::attract_config::{
    AdcAttractConfig, AttractFunctionConfig, AttractFunctionKind, CountAttractConfig,
    NbAttractConfig, NoAttractConfig,
};
use crate::constants::{
    DEFAULT_CANDIDATE_TYPE, DEFAULT_CLUSTER_TYPE, DEFAULT_INITIAL_MAPPING_PERCENTAGE,
    DEFAULT_ITERATIONS, DEFAULT_SEED, SETTINGS_FILE_NAME,
};
use crate::errors::{ConfigError, RecommendationError};

/// Settings consumed by `configure` and by mapping experiments.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `apply_overrides`)
/// 2. Environment variables (`REFLEXION_*`)
/// 3. Project settings (`reflexion.toml` in the project root)
/// 4. Compiled defaults
///
/// The engine never mutates a settings value it was given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommendationSettings {
    /// Attraction function used for scoring.
    pub attract_function: AttractFunctionKind,
    /// Node type of mapping candidates.
    pub candidate_type: String,
    /// Node type of architecture clusters.
    pub cluster_type: String,
    /// Number of experiment iterations.
    pub iterations: u32,
    /// Master seed for experiments.
    pub seed: u64,
    /// Fraction of candidates mapped synthetically before an experiment starts.
    pub initial_mapping_percentage: f64,
    /// Commit the best recommendation even when it is ambiguous instead of
    /// stopping for a manual tie break.
    pub ignore_tie_breaks: bool,
    /// Where experiment results are written.
    pub output_path: Option<PathBuf>,
    /// Free-form label copied into recorded statistics.
    pub experiment_name: Option<String>,
    pub count_attract: Option<CountAttractConfig>,
    pub nb_attract: Option<NbAttractConfig>,
    pub adc_attract: Option<AdcAttractConfig>,
    pub no_attract: Option<NoAttractConfig>,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            attract_function: AttractFunctionKind::CountAttract,
            candidate_type: DEFAULT_CANDIDATE_TYPE.to_string(),
            cluster_type: DEFAULT_CLUSTER_TYPE.to_string(),
            iterations: DEFAULT_ITERATIONS,
            seed: DEFAULT_SEED,
            initial_mapping_percentage: DEFAULT_INITIAL_MAPPING_PERCENTAGE,
            ignore_tie_breaks: false,
            output_path: None,
            experiment_name: None,
            count_attract: Some(CountAttractConfig::default()),
            nb_attract: None,
            adc_attract: None,
            no_attract: None,
        }
    }
}

/// Explicit override arguments applied on top of every other layer.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub attract_function: Option<AttractFunctionKind>,
    pub seed: Option<u64>,
    pub iterations: Option<u32>,
    pub initial_mapping_percentage: Option<f64>,
    pub ignore_tie_breaks: Option<bool>,
    pub output_path: Option<PathBuf>,
}

impl RecommendationSettings {
    /// Load settings with layered resolution, then validate the result.
    pub fn load(root: &Path, overrides: Option<&SettingsOverrides>) -> Result<Self, ConfigError> {
        let project_path = root.join(SETTINGS_FILE_NAME);
        let mut settings = if project_path.exists() {
            Self::from_toml_file(&project_path)?
        } else {
            Self::default()
        };

        settings.apply_env_overrides();

        if let Some(overrides) = overrides {
            settings.apply_overrides(overrides);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string. Missing keys take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeFailed {
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.initial_mapping_percentage) {
            return Err(validation_failed(
                "initial_mapping_percentage",
                "must be between 0.0 and 1.0",
            ));
        }
        if self.iterations == 0 {
            return Err(validation_failed("iterations", "must be greater than 0"));
        }
        if self.candidate_type.trim().is_empty() {
            return Err(validation_failed("candidate_type", "must not be empty"));
        }
        if self.cluster_type.trim().is_empty() {
            return Err(validation_failed("cluster_type", "must not be empty"));
        }
        if let Some(count) = &self.count_attract {
            if !(0.0..=1.0).contains(&count.effective_phi()) {
                return Err(validation_failed(
                    "count_attract.phi",
                    "must be between 0.0 and 1.0",
                ));
            }
        }
        if let Some(nb) = &self.nb_attract {
            if nb.effective_alpha_smoothing() < 0.0 {
                return Err(validation_failed(
                    "nb_attract.alpha_smoothing",
                    "must not be negative",
                ));
            }
        }
        let weight_blocks = [
            ("count_attract", self.count_attract.as_ref().map(|c| &c.edge_weights)),
            ("nb_attract", self.nb_attract.as_ref().map(|c| &c.edge_weights)),
            ("adc_attract", self.adc_attract.as_ref().map(|c| &c.edge_weights)),
            ("no_attract", self.no_attract.as_ref().map(|c| &c.edge_weights)),
        ];
        for (block, weights) in weight_blocks {
            let Some(weights) = weights else { continue };
            if let Some((edge_type, _)) = weights.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
                return Err(validation_failed(
                    &format!("{block}.edge_weights.{edge_type}"),
                    "must be a non-negative number",
                ));
            }
        }
        Ok(())
    }

    /// Resolve the configuration block for the selected attraction function.
    ///
    /// `no_attract` needs no settings and falls back to an empty block; every
    /// other kind must carry its own block.
    pub fn attract_function_config(&self) -> Result<AttractFunctionConfig, RecommendationError> {
        let missing = || {
            RecommendationError::Configuration(format!(
                "no configuration block for attraction function '{}'",
                self.attract_function
            ))
        };
        match self.attract_function {
            AttractFunctionKind::CountAttract => self
                .count_attract
                .clone()
                .map(AttractFunctionConfig::CountAttract)
                .ok_or_else(missing),
            AttractFunctionKind::NbAttract => self
                .nb_attract
                .clone()
                .map(AttractFunctionConfig::NbAttract)
                .ok_or_else(missing),
            AttractFunctionKind::AdcAttract => self
                .adc_attract
                .clone()
                .map(AttractFunctionConfig::AdcAttract)
                .ok_or_else(missing),
            AttractFunctionKind::NoAttract => Ok(AttractFunctionConfig::NoAttract(
                self.no_attract.clone().unwrap_or_default(),
            )),
        }
    }

    pub fn with_attract_function(mut self, kind: AttractFunctionKind) -> Self {
        self.attract_function = kind;
        self
    }

    pub fn with_node_types(
        mut self,
        candidate_type: impl Into<String>,
        cluster_type: impl Into<String>,
    ) -> Self {
        self.candidate_type = candidate_type.into();
        self.cluster_type = cluster_type.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_initial_mapping_percentage(mut self, fraction: f64) -> Self {
        self.initial_mapping_percentage = fraction;
        self
    }

    pub fn with_count_attract(mut self, config: CountAttractConfig) -> Self {
        self.count_attract = Some(config);
        self
    }

    /// Apply explicit overrides.
    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(kind) = overrides.attract_function {
            self.attract_function = kind;
        }
        if let Some(seed) = overrides.seed {
            self.seed = seed;
        }
        if let Some(iterations) = overrides.iterations {
            self.iterations = iterations;
        }
        if let Some(fraction) = overrides.initial_mapping_percentage {
            self.initial_mapping_percentage = fraction;
        }
        if let Some(ignore) = overrides.ignore_tie_breaks {
            self.ignore_tie_breaks = ignore;
        }
        if let Some(path) = &overrides.output_path {
            self.output_path = Some(path.clone());
        }
    }

    /// Apply `REFLEXION_*` environment variables. Unparseable values are
    /// logged and skipped.
    fn apply_env_overrides(&mut self) {
        if let Some(kind) = env_parse::<AttractFunctionKind>("REFLEXION_ATTRACT_FUNCTION") {
            self.attract_function = kind;
        }
        if let Some(seed) = env_parse::<u64>("REFLEXION_SEED") {
            self.seed = seed;
        }
        if let Some(iterations) = env_parse::<u32>("REFLEXION_ITERATIONS") {
            self.iterations = iterations;
        }
        if let Some(fraction) = env_parse::<f64>("REFLEXION_INITIAL_MAPPING_PERCENTAGE") {
            self.initial_mapping_percentage = fraction;
        }
        if let Some(ignore) = env_parse::<bool>("REFLEXION_IGNORE_TIE_BREAKS") {
            self.ignore_tie_breaks = ignore;
        }
        if let Ok(val) = std::env::var("REFLEXION_CANDIDATE_TYPE") {
            self.candidate_type = val;
        }
        if let Ok(val) = std::env::var("REFLEXION_CLUSTER_TYPE") {
            self.cluster_type = val;
        }
        if let Ok(val) = std::env::var("REFLEXION_OUTPUT_PATH") {
            self.output_path = Some(PathBuf::from(val));
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let val = std::env::var(key).ok()?;
    match val.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            ::tracing::warn!(key, value = %val, "ignoring unparseable environment override");
            None
        }
    }
}

fn validation_failed(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
