//! Error types for credit risk scoring

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for credit risk operations
pub type Result<T> = std::result::Result<T, CreditRiskError>;

/// Main error type for the scoring core
///
/// Callers see four categories: [`TransformConfig`](Self::TransformConfig)
/// for bad input, [`ArtifactLoad`](Self::ArtifactLoad) for missing or corrupt
/// persisted state, and [`Prediction`](Self::Prediction) /
/// [`Training`](Self::Training) wrapping anything else raised underneath.
/// The remaining variants are raised inside the core and get wrapped at the
/// orchestrator boundary.
#[derive(Error, Debug)]
pub enum CreditRiskError {
    #[error("Transform config error: {0}")]
    TransformConfig(String),

    #[error("Artifact load error ({}): {reason}", path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("Prediction error during {stage}: {source}")]
    Prediction {
        stage: &'static str,
        #[source]
        source: Box<CreditRiskError>,
    },

    #[error("Training error during {stage}: {source}")]
    Training {
        stage: &'static str,
        #[source]
        source: Box<CreditRiskError>,
    },

    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}

impl CreditRiskError {
    /// Shorthand for a [`TransformConfig`](Self::TransformConfig) error
    pub fn transform(msg: impl Into<String>) -> Self {
        CreditRiskError::TransformConfig(msg.into())
    }

    /// Wrap `self` as a training failure. Already-wrapped training errors pass
    /// through untouched.
    pub fn into_training(self, stage: &'static str) -> Self {
        match self {
            err @ CreditRiskError::Training { .. } => err,
            other => CreditRiskError::Training {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Wrap `self` as a prediction failure.
    ///
    /// Input and artifact errors keep their own category so callers can tell
    /// a malformed request from a broken deployment.
    pub fn into_prediction(self, stage: &'static str) -> Self {
        match self {
            err @ (CreditRiskError::TransformConfig(_)
            | CreditRiskError::ArtifactLoad { .. }
            | CreditRiskError::Prediction { .. }) => err,
            other => CreditRiskError::Prediction {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// True when the error was caused by the caller's input
    pub fn is_caller_error(&self) -> bool {
        matches!(self, CreditRiskError::TransformConfig(_))
    }
}

impl From<polars::error::PolarsError> for CreditRiskError {
    fn from(err: polars::error::PolarsError) -> Self {
        CreditRiskError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for CreditRiskError {
    fn from(err: serde_json::Error) -> Self {
        CreditRiskError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CreditRiskError {
    fn from(err: ndarray::ShapeError) -> Self {
        CreditRiskError::Computation(format!("invalid shape: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = CreditRiskError::transform("missing column 'Age'");
        assert_eq!(err.to_string(), "Transform config error: missing column 'Age'");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CreditRiskError = io_err.into();
        assert!(matches!(err, CreditRiskError::Io(_)));
    }

    #[test]
    fn test_training_wrap_preserves_cause() {
        let err = CreditRiskError::transform("empty dataset").into_training("encoder fit");
        assert!(matches!(err, CreditRiskError::Training { stage: "encoder fit", .. }));
        let cause = err.source().unwrap();
        assert!(cause.to_string().contains("empty dataset"));

        // Wrapping twice does not nest
        let again = err.into_training("model fit");
        assert!(matches!(again, CreditRiskError::Training { stage: "encoder fit", .. }));
    }

    #[test]
    fn test_prediction_wrap_keeps_caller_errors() {
        let err = CreditRiskError::transform("bad sex").into_prediction("transform");
        assert!(err.is_caller_error());

        let err = CreditRiskError::Computation("nan".to_string()).into_prediction("scoring");
        assert!(matches!(err, CreditRiskError::Prediction { stage: "scoring", .. }));
        assert!(!err.is_caller_error());
    }
}
