//! Training orchestration: raw frames in, persisted artifacts out

use super::config::TrainingConfig;
use super::logistic::LogisticRegression;
use super::metrics::{roc_auc, ClassificationReport};
use super::model::{DecisionThreshold, ModelState};
use crate::artifacts::ArtifactPaths;
use crate::error::{CreditRiskError, Result};
use crate::inference::ArtifactCache;
use crate::ingestion::read_csv;
use crate::preprocessing::{EncoderState, FeatureEncoder};
use crate::schema::{self, RISK};
use ndarray::Array1;
use polars::prelude::*;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

/// Everything a training run produced
#[derive(Debug, Clone, Serialize)]
pub struct TrainingOutcome {
    pub encoder: EncoderState,
    pub model: ModelState,
    pub report: ClassificationReport,
    /// `None` when the test split holds a single class
    pub roc_auc: Option<f64>,
    pub n_train: usize,
    pub n_test: usize,
    pub training_time_secs: f64,
}

/// Fits the encoder and model, evaluates on held-out rows and writes artifacts
#[derive(Debug, Clone, Default)]
pub struct TrainPipeline {
    config: TrainingConfig,
}

impl TrainPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn artifacts(&self) -> &ArtifactPaths {
        &self.config.artifacts
    }

    /// Train from two CSV files with the raw training schema
    pub fn run_from_paths(
        &self,
        train_path: impl AsRef<Path>,
        test_path: impl AsRef<Path>,
    ) -> Result<TrainingOutcome> {
        let load = |path: &Path| read_csv(path).map_err(|e| log_failure(e.into_training("load")));
        let train_df = load(train_path.as_ref())?;
        let test_df = load(test_path.as_ref())?;
        self.run(&train_df, &test_df)
    }

    /// Train on raw train/test frames
    ///
    /// Any failure is returned as [`CreditRiskError::Training`] wrapping the
    /// underlying cause.
    pub fn run(&self, train_df: &DataFrame, test_df: &DataFrame) -> Result<TrainingOutcome> {
        self.run_inner(train_df, test_df).map_err(log_failure)
    }

    fn run_inner(&self, train_df: &DataFrame, test_df: &DataFrame) -> Result<TrainingOutcome> {
        let start = Instant::now();
        let config = &self.config;

        config.validate().map_err(|e| e.into_training("configure"))?;
        let threshold =
            DecisionThreshold::new(config.threshold).map_err(|e| e.into_training("configure"))?;

        info!(
            train_rows = train_df.height(),
            test_rows = test_df.height(),
            threshold = threshold.value(),
            "Starting training run"
        );

        let (x_train_df, y_train) = self
            .prepare(train_df)
            .map_err(|e| e.into_training("prepare"))?;
        let (x_test_df, y_test) = self
            .prepare(test_df)
            .map_err(|e| e.into_training("prepare"))?;

        let encoder = FeatureEncoder::with_config(config.encoder.clone());
        let (encoder_state, x_train) = encoder
            .fit_transform(&x_train_df, &y_train)
            .map_err(|e| e.into_training("encode"))?;
        let x_test = encoder_state
            .transform(&x_test_df)
            .map_err(|e| e.into_training("encode"))?;

        let model = LogisticRegression::fit(&x_train, &y_train, &config.model)
            .map_err(|e| e.into_training("fit"))?;
        info!(
            iterations = model.n_iter,
            intercept = model.intercept,
            "Logistic model fitted"
        );
        let model_state = ModelState::new(model, &encoder_state, threshold)
            .map_err(|e| e.into_training("fit"))?;

        let (report, auc) = evaluate(&model_state, &x_test, &y_test)
            .map_err(|e| e.into_training("evaluate"))?;

        let artifacts = &config.artifacts;
        artifacts
            .save(&encoder_state, &model_state)
            .map_err(|e| e.into_training("persist"))?;
        ArtifactCache::global().invalidate(artifacts);

        let training_time_secs = start.elapsed().as_secs_f64();
        info!(
            accuracy = report.accuracy,
            roc_auc = ?auc,
            preprocessor = %artifacts.preprocessor.display(),
            model = %artifacts.model.display(),
            elapsed_secs = training_time_secs,
            "Training run complete"
        );

        Ok(TrainingOutcome {
            encoder: encoder_state,
            model: model_state,
            report,
            roc_auc: auc,
            n_train: x_train.nrows(),
            n_test: x_test.nrows(),
            training_time_secs,
        })
    }

    /// Recode labels and sex, drop the row identifier, split off `Risk`
    fn prepare(&self, df: &DataFrame) -> Result<(DataFrame, Array1<f64>)> {
        let mut df = schema::recode_risk(df)?;
        df = schema::recode_sex(&df)?;

        if let Some(id) = &self.config.id_column {
            if df.get_column_names().iter().any(|c| c.as_str() == id) {
                df = df.drop(id)?;
            }
        }

        let labels: Array1<f64> = df
            .column(RISK)?
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| v.ok_or_else(|| CreditRiskError::transform("missing Risk label")))
            .collect::<Result<Vec<f64>>>()?
            .into();

        Ok((df.drop(RISK)?, labels))
    }
}

fn evaluate(
    model: &ModelState,
    x_test: &ndarray::Array2<f64>,
    y_test: &Array1<f64>,
) -> Result<(ClassificationReport, Option<f64>)> {
    let proba = model.predict_proba(x_test)?;
    let y_pred: Vec<f64> = proba
        .iter()
        .map(|&p| model.threshold.decide(p).class())
        .collect();
    let y_true = y_test.to_vec();

    let report = ClassificationReport::compute(&y_true, &y_pred)?;
    let auc = match roc_auc(&y_true, &proba.to_vec()) {
        Ok(auc) => Some(auc),
        Err(e) => {
            warn!(error = %e, "ROC-AUC not computed");
            None
        }
    };
    Ok((report, auc))
}

fn log_failure(err: CreditRiskError) -> CreditRiskError {
    error!(error = %err, "Training failed");
    err
}
