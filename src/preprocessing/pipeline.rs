//! Feature encoding pipeline

use super::{
    config::EncoderConfig, ordinal::OrdinalEncoding, scaler::ScaleParams, target::TargetEncoding,
};
use crate::error::{CreditRiskError, Result};
use crate::schema::is_missing_token;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| CreditRiskError::transform(format!("missing required column '{}'", name)))
}

/// Read a categorical column, mapping null and missing tokens to `None`
fn categorical_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = required_column(df, name)?.cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|v| {
            v.filter(|s| !is_missing_token(s))
                .map(|s| s.trim().to_string())
        })
        .collect();
    Ok(values)
}

/// Read a numeric column; any null or unparseable cell is a caller error
fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = required_column(df, name)?;
    let casted = series.cast(&DataType::Float64).map_err(|e| {
        CreditRiskError::transform(format!("column '{}' is not numeric: {}", name, e))
    })?;
    casted
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            Some(x) if x.is_finite() => Ok(x),
            _ => Err(CreditRiskError::transform(format!(
                "row {}: column '{}' has a missing or non-numeric value",
                row, name
            ))),
        })
        .collect()
}

/// Unfitted encoder: holds the column partition and fits [`EncoderState`]
#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder {
    config: EncoderConfig,
}

impl FeatureEncoder {
    /// Create an encoder with the default column partition
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    pub fn with_config(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Fit encodings and scaling on training rows and their 0/1 labels
    pub fn fit(&self, df: &DataFrame, labels: &Array1<f64>) -> Result<EncoderState> {
        let start = Instant::now();
        self.config.validate()?;

        if df.height() == 0 {
            return Err(CreditRiskError::transform("cannot fit encoder on an empty dataset"));
        }
        if df.height() != labels.len() {
            return Err(CreditRiskError::transform(format!(
                "training rows ({}) and labels ({}) have different lengths",
                df.height(),
                labels.len()
            )));
        }
        if let Some(bad) = labels.iter().find(|v| !v.is_finite()) {
            return Err(CreditRiskError::transform(format!("invalid label value {}", bad)));
        }
        let labels = labels.to_vec();

        let ordinal = self
            .config
            .ordinal_columns
            .iter()
            .map(|col| OrdinalEncoding::fit(col, &categorical_values(df, col)?))
            .collect::<Result<Vec<_>>>()?;

        let target = self
            .config
            .target_columns
            .iter()
            .map(|col| {
                TargetEncoding::fit(
                    col,
                    &categorical_values(df, col)?,
                    &labels,
                    &self.config.smoothing,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let mut state = EncoderState {
            ordinal,
            target,
            numeric: self.config.numeric_columns.clone(),
            scaling: Vec::new(),
            output_columns: self.config.output_columns(),
            n_samples_seen: df.height(),
        };

        let raw = state.encode_columns(df)?;
        state.scaling = state
            .output_columns
            .iter()
            .zip(&raw)
            .map(|(name, values)| ScaleParams::fit(name, values))
            .collect::<Result<Vec<_>>>()?;

        info!(
            rows = df.height(),
            ordinal = ?self.config.ordinal_columns,
            target = ?self.config.target_columns,
            numeric = ?self.config.numeric_columns,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Feature encoder fitted"
        );

        Ok(state)
    }

    /// Fit and transform the training rows in one step
    pub fn fit_transform(
        &self,
        df: &DataFrame,
        labels: &Array1<f64>,
    ) -> Result<(EncoderState, Array2<f64>)> {
        let state = self.fit(df, labels)?;
        let x = state.transform(df)?;
        Ok((state, x))
    }
}

/// Fitted, immutable encoder configuration persisted as the `preprocessor` artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderState {
    ordinal: Vec<OrdinalEncoding>,
    target: Vec<TargetEncoding>,
    numeric: Vec<String>,
    /// One entry per output column, same order
    scaling: Vec<ScaleParams>,
    output_columns: Vec<String>,
    n_samples_seen: usize,
}

impl EncoderState {
    /// Encode and scale rows into a matrix whose columns follow
    /// [`output_columns`](Self::output_columns)
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if self.scaling.len() != self.output_columns.len() {
            return Err(CreditRiskError::transform(format!(
                "encoder state has {} scaling entries for {} output columns",
                self.scaling.len(),
                self.output_columns.len()
            )));
        }

        let raw = self.encode_columns(df)?;
        let scaled: Vec<Vec<f64>> = raw
            .into_par_iter()
            .zip(self.scaling.par_iter())
            .map(|(values, params)| values.into_iter().map(|v| params.scale(v)).collect())
            .collect();

        let n_rows = df.height();
        let n_cols = scaled.len();
        debug!(rows = n_rows, cols = n_cols, "Rows transformed");
        Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| scaled[c][r]))
    }

    /// Unscaled encoded values, one vector per output column
    fn encode_columns(&self, df: &DataFrame) -> Result<Vec<Vec<f64>>> {
        let mut columns = Vec::with_capacity(self.output_columns.len());

        for enc in &self.ordinal {
            columns.push(enc.encode_column(&categorical_values(df, enc.column())?));
        }
        for enc in &self.target {
            columns.push(enc.encode_column(&categorical_values(df, enc.column())?));
        }
        for name in &self.numeric {
            columns.push(numeric_values(df, name)?);
        }

        Ok(columns)
    }

    /// Output column names in matrix order
    pub fn output_columns(&self) -> &[String] {
        &self.output_columns
    }

    pub fn n_features(&self) -> usize {
        self.output_columns.len()
    }

    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    pub fn ordinal_encodings(&self) -> &[OrdinalEncoding] {
        &self.ordinal
    }

    pub fn target_encodings(&self) -> &[TargetEncoding] {
        &self.target
    }

    /// Scaling parameters keyed by output column
    pub fn scale_params(&self) -> impl Iterator<Item = (&str, &ScaleParams)> + '_ {
        self.output_columns
            .iter()
            .map(String::as_str)
            .zip(self.scaling.iter())
    }

    /// Content hash of the fitted state; a model records the fingerprint of
    /// the encoder it was trained behind
    pub fn fingerprint(&self) -> Result<u64> {
        let bytes = serde_json::to_vec(self)?;
        Ok(xxh3_64(&bytes))
    }

    /// Fitted statistics as a JSON-compatible summary
    pub fn summary(&self) -> serde_json::Value {
        let ordinal: serde_json::Map<String, serde_json::Value> = self
            .ordinal
            .iter()
            .map(|enc| {
                let codes: serde_json::Map<String, serde_json::Value> = enc
                    .codes()
                    .iter()
                    .map(|(k, v)| (k.to_string(), serde_json::json!(v)))
                    .collect();
                (
                    enc.column().to_string(),
                    serde_json::json!({ "impute_value": enc.impute_value(), "codes": codes }),
                )
            })
            .collect();

        let target: serde_json::Map<String, serde_json::Value> = self
            .target
            .iter()
            .map(|enc| {
                let means: serde_json::Map<String, serde_json::Value> = enc
                    .means()
                    .iter()
                    .map(|(k, v)| (k.to_string(), serde_json::json!(v)))
                    .collect();
                (
                    enc.column().to_string(),
                    serde_json::json!({ "prior": enc.prior(), "means": means }),
                )
            })
            .collect();

        let scaling: serde_json::Map<String, serde_json::Value> = self
            .scale_params()
            .map(|(name, p)| (name.to_string(), serde_json::json!({ "mean": p.mean, "std": p.std })))
            .collect();

        serde_json::json!({
            "output_columns": self.output_columns,
            "n_samples_seen": self.n_samples_seen,
            "ordinal": ordinal,
            "target": target,
            "scaling": scaling,
        })
    }
}
