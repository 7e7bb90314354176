//! Model training
//!
//! - [`LogisticRegression`] fitted by gradient descent on the encoded matrix
//! - [`ModelState`] pairing the fitted model with its feature names and
//!   [`DecisionThreshold`]
//! - [`TrainPipeline`] running recode → encode → fit → evaluate → persist

mod config;
mod logistic;
mod metrics;
mod model;
mod pipeline;

pub use config::{ModelParams, TrainingConfig, DEFAULT_DECISION_THRESHOLD};
pub use logistic::{sigmoid, LogisticRegression};
pub use metrics::{roc_auc, ClassMetrics, ClassificationReport};
pub use model::{DecisionThreshold, ModelState};
pub use pipeline::{TrainPipeline, TrainingOutcome};
