//! Candidate and cluster classification.

use reflexion_core::config::RecommendationSettings;
use reflexion_core::types::Node;

/// Decides which nodes take part in recommendations.
///
/// A node is a candidate iff its type is the candidate type, it lives in the
/// implementation subgraph, and it is neither artificial nor anonymous.
/// A node is a cluster iff its type is the cluster type and it lives in the
/// architecture subgraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeClassifier {
    candidate_type: String,
    cluster_type: String,
}

impl NodeClassifier {
    pub fn new(candidate_type: impl Into<String>, cluster_type: impl Into<String>) -> Self {
        Self {
            candidate_type: candidate_type.into(),
            cluster_type: cluster_type.into(),
        }
    }

    pub fn from_settings(settings: &RecommendationSettings) -> Self {
        Self::new(settings.candidate_type.clone(), settings.cluster_type.clone())
    }

    pub fn candidate_type(&self) -> &str {
        &self.candidate_type
    }

    pub fn cluster_type(&self) -> &str {
        &self.cluster_type
    }

    pub fn is_candidate(&self, node: &Node) -> bool {
        node.node_type == self.candidate_type
            && node.in_implementation()
            && !node.is_artificial()
            && !node.is_anonymous()
    }

    pub fn is_cluster(&self, node: &Node) -> bool {
        node.node_type == self.cluster_type && node.in_architecture()
    }
}

impl Default for NodeClassifier {
    fn default() -> Self {
        Self::from_settings(&RecommendationSettings::default())
    }
}
