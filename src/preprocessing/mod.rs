//! Feature preprocessing
//!
//! Turns applicant rows into the numeric matrix the model consumes:
//! - Ordinal encoding with most-frequent imputation (Purpose, Housing)
//! - Smoothed target encoding (Saving accounts, Checking account)
//! - Standard scaling of every output column
//!
//! [`FeatureEncoder`] fits on training data and produces an immutable
//! [`EncoderState`], which is what gets persisted and reused at inference.

mod category_map;
mod config;
mod ordinal;
mod pipeline;
mod scaler;
mod target;

pub use category_map::CategoryMap;
pub use config::{EncoderConfig, TargetSmoothing};
pub use ordinal::OrdinalEncoding;
pub use pipeline::{EncoderState, FeatureEncoder};
pub use scaler::ScaleParams;
pub use target::{TargetEncoding, MISSING_CATEGORY};
