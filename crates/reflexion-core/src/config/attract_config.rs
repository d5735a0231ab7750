//! Per-strategy configuration blocks for attraction functions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ALPHA_SMOOTHING, DEFAULT_EDGE_WEIGHT, DEFAULT_PHI};
use crate::errors::ConfigError;

/// The attraction function selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttractFunctionKind {
    #[default]
    CountAttract,
    NbAttract,
    AdcAttract,
    NoAttract,
}

impl AttractFunctionKind {
    pub const ALL: [AttractFunctionKind; 4] = [
        Self::CountAttract,
        Self::NbAttract,
        Self::AdcAttract,
        Self::NoAttract,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CountAttract => "count_attract",
            Self::NbAttract => "nb_attract",
            Self::AdcAttract => "adc_attract",
            Self::NoAttract => "no_attract",
        }
    }
}

impl fmt::Display for AttractFunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttractFunctionKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized || kind.name().replace('_', "") == normalized)
            .ok_or_else(|| ConfigError::ValidationFailed {
                field: "attract_function".to_string(),
                message: format!("unknown attraction function '{s}'"),
            })
    }
}

/// How the ADC strategy merges the documents of a cluster's members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentMergingType {
    #[default]
    Intersection,
    Union,
}

/// Configuration for the count-based attraction function.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CountAttractConfig {
    /// Discount on dependencies into other clusters that the architecture
    /// allows; such a dependency counts `1 - phi`. Default: 1.0.
    pub phi: Option<f64>,
    /// Weight per implementation edge type. Unlisted types weigh 1.0.
    pub edge_weights: BTreeMap<String, f64>,
}

impl CountAttractConfig {
    pub fn effective_phi(&self) -> f64 {
        self.phi.unwrap_or(DEFAULT_PHI)
    }
}

/// Configuration for the naive-Bayes attraction function.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct NbAttractConfig {
    /// Additive smoothing for unseen words. Default: 1.0.
    pub alpha_smoothing: Option<f64>,
    /// Feed cluster dependency attributes into the classifier. Default: false.
    pub use_cda: Option<bool>,
    pub edge_weights: BTreeMap<String, f64>,
}

impl NbAttractConfig {
    pub fn effective_alpha_smoothing(&self) -> f64 {
        self.alpha_smoothing.unwrap_or(DEFAULT_ALPHA_SMOOTHING)
    }

    pub fn effective_use_cda(&self) -> bool {
        self.use_cda.unwrap_or(false)
    }
}

/// Configuration for the document-similarity attraction function.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AdcAttractConfig {
    pub merging_type: Option<DocumentMergingType>,
    pub edge_weights: BTreeMap<String, f64>,
}

impl AdcAttractConfig {
    pub fn effective_merging_type(&self) -> DocumentMergingType {
        self.merging_type.unwrap_or_default()
    }
}

/// Configuration for the constant-zero attraction function.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct NoAttractConfig {
    pub edge_weights: BTreeMap<String, f64>,
}

/// The configuration block resolved for the selected kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AttractFunctionConfig {
    CountAttract(CountAttractConfig),
    NbAttract(NbAttractConfig),
    AdcAttract(AdcAttractConfig),
    NoAttract(NoAttractConfig),
}

impl AttractFunctionConfig {
    pub fn kind(&self) -> AttractFunctionKind {
        match self {
            Self::CountAttract(_) => AttractFunctionKind::CountAttract,
            Self::NbAttract(_) => AttractFunctionKind::NbAttract,
            Self::AdcAttract(_) => AttractFunctionKind::AdcAttract,
            Self::NoAttract(_) => AttractFunctionKind::NoAttract,
        }
    }

    pub fn edge_weights(&self) -> &BTreeMap<String, f64> {
        match self {
            Self::CountAttract(c) => &c.edge_weights,
            Self::NbAttract(c) => &c.edge_weights,
            Self::AdcAttract(c) => &c.edge_weights,
            Self::NoAttract(c) => &c.edge_weights,
        }
    }

    /// Weight of an implementation edge of the given type.
    pub fn edge_weight(&self, edge_type: &str) -> f64 {
        self.edge_weights()
            .get(edge_type)
            .copied()
            .unwrap_or(DEFAULT_EDGE_WEIGHT)
    }
}
