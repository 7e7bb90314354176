//! Inference configuration

use crate::artifacts::ArtifactPaths;

/// Configuration for the prediction pipeline
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Artifacts to score with
    pub artifacts: ArtifactPaths,

    /// Reuse loaded artifacts through the process-wide cache instead of
    /// reading them on every call
    pub cache_artifacts: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactPaths::default(),
            cache_artifacts: true,
        }
    }
}

impl InferenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifacts(mut self, artifacts: ArtifactPaths) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_artifacts = enabled;
        self
    }
}
