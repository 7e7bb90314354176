//! Encoder configuration

use crate::error::{CreditRiskError, Result};
use crate::schema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Smoothing applied to per-category target means
///
/// A category seen `n` times is blended with the global prior using the
/// weight `1 / (1 + exp(-(n - min_samples_leaf) / smoothing))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSmoothing {
    pub min_samples_leaf: usize,
    pub smoothing: f64,
}

impl Default for TargetSmoothing {
    fn default() -> Self {
        Self {
            min_samples_leaf: 20,
            smoothing: 10.0,
        }
    }
}

impl TargetSmoothing {
    /// Weight given to the category mean for a category seen `count` times
    pub fn weight(&self, count: usize) -> f64 {
        let z = -((count as f64) - self.min_samples_leaf as f64) / self.smoothing;
        1.0 / (1.0 + z.exp())
    }
}

/// Configuration for the feature encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Categorical columns encoded as integer codes (most-frequent imputation)
    pub ordinal_columns: Vec<String>,

    /// Categorical columns replaced by a smoothed target mean
    pub target_columns: Vec<String>,

    /// Numeric columns passed through before scaling
    pub numeric_columns: Vec<String>,

    /// Target mean smoothing
    pub smoothing: TargetSmoothing,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        let owned = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect();
        Self {
            ordinal_columns: owned(&[schema::PURPOSE, schema::HOUSING]),
            target_columns: owned(&[schema::SAVING_ACCOUNTS, schema::CHECKING_ACCOUNT]),
            numeric_columns: owned(&[
                schema::AGE,
                schema::SEX,
                schema::JOB,
                schema::CREDIT_AMOUNT,
                schema::DURATION,
            ]),
            smoothing: TargetSmoothing::default(),
        }
    }
}

impl EncoderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the ordinal columns
    pub fn with_ordinal<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.ordinal_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the target-encoded columns
    pub fn with_target<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.target_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the numeric columns
    pub fn with_numeric<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.numeric_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set target smoothing
    pub fn with_smoothing(mut self, min_samples_leaf: usize, smoothing: f64) -> Self {
        self.smoothing = TargetSmoothing {
            min_samples_leaf,
            smoothing,
        };
        self
    }

    /// Output column order: ordinal, then target, then numeric
    pub fn output_columns(&self) -> Vec<String> {
        self.ordinal_columns
            .iter()
            .chain(&self.target_columns)
            .chain(&self.numeric_columns)
            .cloned()
            .collect()
    }

    /// Check the three column groups are disjoint and non-empty overall
    pub fn validate(&self) -> Result<()> {
        let all = self.output_columns();
        if all.is_empty() {
            return Err(CreditRiskError::transform("encoder has no feature columns"));
        }

        let mut seen = HashSet::new();
        for col in &all {
            if !seen.insert(col.as_str()) {
                return Err(CreditRiskError::transform(format!(
                    "column '{}' assigned to more than one encoder group",
                    col
                )));
            }
        }

        if !(self.smoothing.smoothing > 0.0) {
            return Err(CreditRiskError::InvalidParameter {
                name: "smoothing".to_string(),
                value: self.smoothing.smoothing.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }
}
