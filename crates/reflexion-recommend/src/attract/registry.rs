//! AttractFunctionRegistry: builds attraction functions by kind.

use reflexion_core::config::{AttractFunctionConfig, AttractFunctionKind};
use reflexion_core::errors::RecommendationError;
use reflexion_core::types::collections::FxHashMap;

use super::{AttractFunction, CountAttract, NoAttract};
use crate::classify::NodeClassifier;

/// Builds an attraction function from its configuration block.
pub type AttractFunctionFactory = Box<
    dyn Fn(&AttractFunctionConfig, NodeClassifier) -> Result<Box<dyn AttractFunction>, RecommendationError>
        + Send
        + Sync,
>;

/// Factories keyed by attraction function kind.
///
/// The default registry knows `count_attract` and `no_attract`. Other kinds
/// are accepted by the settings but need a factory registered here.
pub struct AttractFunctionRegistry {
    factories: FxHashMap<AttractFunctionKind, AttractFunctionFactory>,
}

impl AttractFunctionRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Register (or replace) the factory for `kind`.
    pub fn register(&mut self, kind: AttractFunctionKind, factory: AttractFunctionFactory) {
        self.factories.insert(kind, factory);
    }

    pub fn contains(&self, kind: AttractFunctionKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Registered kinds, in declaration order.
    pub fn kinds(&self) -> Vec<AttractFunctionKind> {
        AttractFunctionKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.contains(*kind))
            .collect()
    }

    pub fn create(
        &self,
        config: &AttractFunctionConfig,
        classifier: NodeClassifier,
    ) -> Result<Box<dyn AttractFunction>, RecommendationError> {
        let kind = config.kind();
        let factory = self.factories.get(&kind).ok_or_else(|| {
            RecommendationError::Configuration(format!(
                "no factory registered for attraction function '{kind}'"
            ))
        })?;
        factory(config, classifier)
    }
}

impl Default for AttractFunctionRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(AttractFunctionKind::CountAttract, Box::new(build_count_attract));
        registry.register(AttractFunctionKind::NoAttract, Box::new(build_no_attract));
        registry
    }
}

impl std::fmt::Debug for AttractFunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttractFunctionRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

fn build_count_attract(
    config: &AttractFunctionConfig,
    classifier: NodeClassifier,
) -> Result<Box<dyn AttractFunction>, RecommendationError> {
    match config {
        AttractFunctionConfig::CountAttract(count) => {
            Ok(Box::new(CountAttract::new(count, classifier)))
        }
        other => Err(RecommendationError::Configuration(format!(
            "factory for '{}' received a '{}' configuration block",
            AttractFunctionKind::CountAttract,
            other.kind()
        ))),
    }
}

fn build_no_attract(
    _config: &AttractFunctionConfig,
    classifier: NodeClassifier,
) -> Result<Box<dyn AttractFunction>, RecommendationError> {
    Ok(Box::new(NoAttract::new(classifier)))
}
