//! Fitted model state and the decision rule

use super::logistic::LogisticRegression;
use crate::error::{CreditRiskError, Result};
use crate::preprocessing::EncoderState;
use crate::schema::RiskLabel;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Cut-off on P(bad risk): scores at or above it are labelled bad
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DecisionThreshold(f64);

impl DecisionThreshold {
    pub fn new(value: f64) -> Result<Self> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(CreditRiskError::InvalidParameter {
                name: "threshold".to_string(),
                value: value.to_string(),
                reason: "must be in (0, 1]".to_string(),
            })
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn decide(&self, probability: f64) -> RiskLabel {
        if probability >= self.0 {
            RiskLabel::Bad
        } else {
            RiskLabel::Good
        }
    }
}

impl TryFrom<f64> for DecisionThreshold {
    type Error = CreditRiskError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DecisionThreshold> for f64 {
    fn from(t: DecisionThreshold) -> f64 {
        t.0
    }
}

/// Model artifact: the classifier, the columns it was fit on, the encoder it
/// was trained behind and its threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub model: LogisticRegression,
    pub feature_names: Vec<String>,
    /// [`EncoderState::fingerprint`] of the paired encoder
    pub encoder_fingerprint: u64,
    pub threshold: DecisionThreshold,
}

impl ModelState {
    /// Bind a fitted model to the encoder whose output it was trained on
    pub fn new(
        model: LogisticRegression,
        encoder: &EncoderState,
        threshold: DecisionThreshold,
    ) -> Result<Self> {
        Self::from_parts(
            model,
            encoder.output_columns().to_vec(),
            encoder.fingerprint()?,
            threshold,
        )
    }

    pub fn from_parts(
        model: LogisticRegression,
        feature_names: Vec<String>,
        encoder_fingerprint: u64,
        threshold: DecisionThreshold,
    ) -> Result<Self> {
        if model.n_features() != feature_names.len() {
            return Err(CreditRiskError::Computation(format!(
                "model has {} coefficients but {} feature names",
                model.n_features(),
                feature_names.len()
            )));
        }
        Ok(Self {
            model,
            feature_names,
            encoder_fingerprint,
            threshold,
        })
    }

    /// P(bad risk) per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.model.predict_proba(x)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<RiskLabel>> {
        Ok(self
            .predict_proba(x)?
            .iter()
            .map(|&p| self.threshold.decide(p))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::logistic::sigmoid;
    use crate::training::DEFAULT_DECISION_THRESHOLD;
    use ndarray::array;

    #[test]
    fn test_threshold_boundary() {
        let t = DecisionThreshold::new(DEFAULT_DECISION_THRESHOLD).unwrap();
        assert_eq!(t.decide(DEFAULT_DECISION_THRESHOLD), RiskLabel::Bad);
        assert_eq!(t.decide(DEFAULT_DECISION_THRESHOLD - 1e-12), RiskLabel::Good);
        assert_eq!(t.decide(1.0), RiskLabel::Bad);
        assert_eq!(t.decide(0.0), RiskLabel::Good);
    }

    #[test]
    fn test_threshold_range() {
        assert!(DecisionThreshold::new(0.0).is_err());
        assert!(DecisionThreshold::new(1.0).is_ok());
        assert!(serde_json::from_str::<DecisionThreshold>("1.5").is_err());
    }

    #[test]
    fn test_probability_equal_to_threshold_is_bad() {
        let intercept = 0.3;
        let threshold = DecisionThreshold::new(sigmoid(intercept)).unwrap();
        let model = LogisticRegression::from_parameters(array![0.0, 0.0], intercept);
        let state = ModelState::from_parts(model, vec!["a".into(), "b".into()], 0, threshold).unwrap();

        let labels = state.predict(&array![[1.0, -4.0]]).unwrap();
        assert_eq!(labels, vec![RiskLabel::Bad]);
    }

    #[test]
    fn test_name_count_mismatch() {
        let model = LogisticRegression::from_parameters(array![0.0], 0.0);
        let t = DecisionThreshold::new(0.5).unwrap();
        assert!(ModelState::from_parts(model, vec![], 0, t).is_err());
    }
}
