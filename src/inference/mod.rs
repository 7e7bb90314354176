//! Inference
//!
//! [`PredictPipeline`] validates applicant input, applies the persisted
//! encoder, scores P(bad risk) and compares it to the model's threshold.
//! Loaded artifacts are shared read-only through [`ArtifactCache`].

mod config;
mod engine;

pub use config::InferenceConfig;
pub use engine::{ArtifactCache, LoadedArtifacts, PredictPipeline, Prediction};
