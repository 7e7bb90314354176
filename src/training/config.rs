//! Training configuration

use crate::artifacts::ArtifactPaths;
use crate::error::{CreditRiskError, Result};
use crate::preprocessing::EncoderConfig;
use crate::schema;
use serde::{Deserialize, Serialize};

/// Probability cut-off chosen offline on validation data
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.42902538161651166;

/// Gradient-descent hyperparameters for the logistic model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// L2 regularization strength
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub learning_rate: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            alpha: 0.01,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
        }
    }
}

/// Configuration for a training run
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Decision threshold persisted with the model
    pub threshold: f64,

    /// Row identifier dropped before fitting, if present
    pub id_column: Option<String>,

    pub encoder: EncoderConfig,

    pub model: ModelParams,

    /// Where the fitted states are written
    pub artifacts: ArtifactPaths,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            threshold: std::env::var("DECISION_THRESHOLD")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_DECISION_THRESHOLD),
            id_column: Some(schema::DEFAULT_ID_COLUMN.to_string()),
            encoder: EncoderConfig::default(),
            model: ModelParams::default(),
            artifacts: ArtifactPaths::default(),
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_id_column(mut self, column: Option<impl Into<String>>) -> Self {
        self.id_column = column.map(Into::into);
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.model.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.model.learning_rate = lr;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.model.alpha = alpha;
        self
    }

    pub fn with_artifacts(mut self, artifacts: ArtifactPaths) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Check parameter ranges before any data is touched
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &str, value: String, reason: &str| CreditRiskError::InvalidParameter {
            name: name.to_string(),
            value,
            reason: reason.to_string(),
        };

        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(invalid("threshold", self.threshold.to_string(), "must be in (0, 1]"));
        }
        if !(self.model.learning_rate > 0.0) {
            return Err(invalid("learning_rate", self.model.learning_rate.to_string(), "must be positive"));
        }
        if !(self.model.alpha >= 0.0) {
            return Err(invalid("alpha", self.model.alpha.to_string(), "must be non-negative"));
        }
        if self.model.max_iter == 0 {
            return Err(invalid("max_iter", "0".to_string(), "must be at least 1"));
        }
        self.encoder.validate()
    }
}
