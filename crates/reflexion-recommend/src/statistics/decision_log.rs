//! DecisionLog: in-memory recorder with JSON export.

use std::path::Path;

use chrono::{DateTime, Utc};
use reflexion_core::config::RecommendationSettings;
use reflexion_core::errors::StatisticsError;
use serde::Serialize;

use super::StatisticsRecorder;
use crate::mapping_pair::MappingPair;

#[derive(Debug, Default)]
pub struct DecisionLog {
    active: bool,
    started_at: Option<DateTime<Utc>>,
    config: Option<RecommendationSettings>,
    decisions: Vec<MappingPair>,
}

#[derive(Serialize)]
struct DecisionLogFile<'a> {
    started_at: Option<DateTime<Utc>>,
    config: Option<&'a RecommendationSettings>,
    decisions: &'a [MappingPair],
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn config(&self) -> Option<&RecommendationSettings> {
        self.config.as_ref()
    }

    pub fn to_json(&self) -> Result<String, StatisticsError> {
        let file = DecisionLogFile {
            started_at: self.started_at,
            config: self.config.as_ref(),
            decisions: &self.decisions,
        };
        serde_json::to_string_pretty(&file).map_err(|e| StatisticsError::Serialization(e.to_string()))
    }

    /// Write the recorded decisions to `path` as JSON.
    pub fn save(&self, path: &Path) -> Result<(), StatisticsError> {
        if self.decisions.is_empty() {
            return Err(StatisticsError::Empty);
        }
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| StatisticsError::WriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::info!(
            path = %path.display(),
            decisions = self.decisions.len(),
            "decision log written"
        );
        Ok(())
    }
}

impl StatisticsRecorder for DecisionLog {
    fn start(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.started_at = Some(Utc::now());
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn reset(&mut self) {
        self.decisions.clear();
        self.started_at = None;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn record_decision(&mut self, decision: MappingPair) {
        if !self.active {
            tracing::debug!(pair = %decision, "statistics inactive, decision dropped");
            return;
        }
        self.decisions.push(decision);
    }

    fn set_config_info(&mut self, settings: &RecommendationSettings) {
        self.config = Some(settings.clone());
    }

    fn decisions(&self) -> &[MappingPair] {
        &self.decisions
    }
}
