//! Configuration for the reflexion engine.
//! TOML-based, layered resolution: overrides > env > project file > defaults.

pub mod attract_config;
pub mod settings;

pub use attract_config::{
    AdcAttractConfig, AttractFunctionConfig, AttractFunctionKind, CountAttractConfig,
    DocumentMergingType, NbAttractConfig, NoAttractConfig,
};
pub use settings::{RecommendationSettings, SettingsOverrides};
