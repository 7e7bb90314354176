//! L2-regularized logistic regression

use super::config::ModelParams;
use crate::error::{CreditRiskError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Logistic function for a single score
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Binary logistic regression fitted by full-batch gradient descent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
    /// Iterations run before convergence or `max_iter`
    pub n_iter: usize,
}

impl LogisticRegression {
    /// Build from known parameters
    pub fn from_parameters(coefficients: Array1<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
            n_iter: 0,
        }
    }

    /// Fit on an encoded matrix and 0/1 labels
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, params: &ModelParams) -> Result<Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples == 0 {
            return Err(CreditRiskError::Computation("no training samples".to_string()));
        }
        if n_samples != y.len() {
            return Err(CreditRiskError::Computation(format!(
                "expected {} labels, got {}",
                n_samples,
                y.len()
            )));
        }

        let mut weights = Array1::zeros(n_features);
        let mut bias = 0.0;
        let lr = params.learning_rate;
        let alpha = params.alpha;
        let mut n_iter = 0;

        for _ in 0..params.max_iter {
            n_iter += 1;
            let linear = x.dot(&weights) + bias;
            let predictions = linear.mapv(sigmoid);

            let errors = &predictions - y;
            let dw = (x.t().dot(&errors) / n_samples as f64) + (alpha * &weights);
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < params.tol {
                break;
            }

            weights = weights - lr * dw;
            bias -= lr * db;
        }

        if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(CreditRiskError::Computation(
                "gradient descent diverged".to_string(),
            ));
        }

        Ok(Self {
            coefficients: weights,
            intercept: bias,
            n_iter,
        })
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// P(class 1) for each row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coefficients.len() {
            return Err(CreditRiskError::Computation(format!(
                "model expects {} features, got {}",
                self.coefficients.len(),
                x.ncols()
            )));
        }
        Ok((x.dot(&self.coefficients) + self.intercept).mapv(sigmoid))
    }
}
