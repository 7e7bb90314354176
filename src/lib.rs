//! Credit risk scoring
//!
//! Predicts whether a loan applicant presents good or bad credit risk.
//!
//! # Modules
//!
//! - [`schema`] - Column names, applicant records and label recoding
//! - [`preprocessing`] - Ordinal / target encoding and standard scaling
//! - [`training`] - Logistic model, decision threshold and the training pipeline
//! - [`inference`] - Prediction pipeline and the shared artifact cache
//! - [`artifacts`] - Persisted encoder and model state
//! - [`ingestion`] - CSV I/O and the stratified train/test split
//! - [`server`] - HTTP form and JSON API
//! - [`cli`] - Command-line interface

pub mod error;

pub mod schema;
pub mod preprocessing;
pub mod training;
pub mod inference;
pub mod artifacts;
pub mod ingestion;

pub mod server;
pub mod cli;

pub use error::{CreditRiskError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{CreditRiskError, Result};

    pub use crate::schema::{ApplicantRecord, RawApplicant, RiskLabel, Sex};

    pub use crate::preprocessing::{EncoderConfig, EncoderState, FeatureEncoder};

    pub use crate::training::{
        ClassificationReport, DecisionThreshold, ModelState, TrainPipeline, TrainingConfig,
        TrainingOutcome, DEFAULT_DECISION_THRESHOLD,
    };

    pub use crate::inference::{ArtifactCache, InferenceConfig, PredictPipeline, Prediction};

    pub use crate::artifacts::ArtifactPaths;

    pub use crate::ingestion::{read_csv, split_dataset, write_csv};
}
