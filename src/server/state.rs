//! Application state management

use chrono::{DateTime, Utc};

use crate::inference::{InferenceConfig, PredictPipeline};

use super::ServerConfig;

/// Shared across handlers behind an `Arc`
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub pipeline: PredictPipeline,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let pipeline = PredictPipeline::new(
            InferenceConfig::new()
                .with_artifacts(config.artifacts.clone())
                .with_cache(config.cache_artifacts),
        );
        Self {
            config,
            pipeline,
            started_at: Utc::now(),
        }
    }
}
