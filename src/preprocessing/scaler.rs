//! Standard scaling

use crate::error::{CreditRiskError, Result};
use serde::{Deserialize, Serialize};

/// Fitted z-score parameters for one column: `(x - mean) / std`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleParams {
    pub mean: f64,
    /// Population standard deviation; a constant column stores 1.0
    pub std: f64,
}

impl ScaleParams {
    /// Fit on the training values of one column
    pub fn fit(column: &str, values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(CreditRiskError::transform(format!(
                "cannot fit scaler for '{}' on an empty column",
                column
            )));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(CreditRiskError::transform(format!(
                "column '{}' contains a non-finite value ({})",
                column, bad
            )));
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let std = variance.sqrt();

        Ok(Self {
            mean,
            std: if std == 0.0 { 1.0 } else { std },
        })
    }

    pub fn scale(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}
