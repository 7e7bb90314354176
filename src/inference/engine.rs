//! Prediction pipeline and the shared artifact cache

use super::InferenceConfig;
use crate::artifacts::ArtifactPaths;
use crate::error::{CreditRiskError, Result};
use crate::preprocessing::EncoderState;
use crate::schema::{self, ApplicantRecord, RawApplicant, RiskLabel};
use crate::training::ModelState;
use parking_lot::RwLock;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::{Instant, SystemTime};
use tracing::{debug, error, info};

/// Encoder and model loaded together and checked against each other
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub encoder: EncoderState,
    pub model: ModelState,
}

impl LoadedArtifacts {
    /// Read both artifacts; the encoder's output columns must equal the
    /// model's feature names and its fingerprint must match the one the
    /// model recorded at training time
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let encoder = paths.load_encoder()?;
        let model = paths.load_model()?;

        if encoder.output_columns() != model.feature_names.as_slice() {
            return Err(CreditRiskError::ArtifactLoad {
                path: paths.model.clone(),
                reason: format!(
                    "model features {:?} do not match encoder output {:?}",
                    model.feature_names,
                    encoder.output_columns()
                ),
            });
        }
        if model.model.n_features() != encoder.n_features() {
            return Err(CreditRiskError::ArtifactLoad {
                path: paths.model.clone(),
                reason: format!(
                    "model has {} coefficients for {} encoded features",
                    model.model.n_features(),
                    encoder.n_features()
                ),
            });
        }

        let fingerprint = encoder.fingerprint().map_err(|e| CreditRiskError::ArtifactLoad {
            path: paths.preprocessor.clone(),
            reason: e.to_string(),
        })?;
        if fingerprint != model.encoder_fingerprint {
            return Err(CreditRiskError::ArtifactLoad {
                path: paths.model.clone(),
                reason: format!(
                    "model was trained behind encoder {:016x}, found {:016x}",
                    model.encoder_fingerprint, fingerprint
                ),
            });
        }

        Ok(Self { encoder, model })
    }
}

static GLOBAL_CACHE: OnceLock<ArtifactCache> = OnceLock::new();

/// Modification time and length of one artifact file
type FileStamp = Option<(SystemTime, u64)>;

/// On-disk identity of an artifact pair when it was read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArtifactStamp {
    preprocessor: FileStamp,
    model: FileStamp,
}

impl ArtifactStamp {
    fn read(paths: &ArtifactPaths) -> Self {
        let file_stamp = |path: &std::path::Path| -> FileStamp {
            let meta = std::fs::metadata(path).ok()?;
            Some((meta.modified().ok()?, meta.len()))
        };
        Self {
            preprocessor: file_stamp(&paths.preprocessor),
            model: file_stamp(&paths.model),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    artifacts: Arc<LoadedArtifacts>,
    stamp: ArtifactStamp,
}

/// Read-mostly map of loaded artifacts keyed by their paths
///
/// Entries are re-read when either file changes on disk, so a long-running
/// server follows artifacts rewritten by another process.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    entries: RwLock<HashMap<ArtifactPaths, CacheEntry>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance, created on first use
    pub fn global() -> &'static ArtifactCache {
        GLOBAL_CACHE.get_or_init(ArtifactCache::new)
    }

    /// Cached artifacts for `paths`, loading them on a miss or when the
    /// files changed since they were cached
    pub fn get_or_load(&self, paths: &ArtifactPaths) -> Result<Arc<LoadedArtifacts>> {
        let stamp = ArtifactStamp::read(paths);
        if let Some(hit) = self.entries.read().get(paths) {
            if hit.stamp == stamp {
                return Ok(Arc::clone(&hit.artifacts));
            }
        }

        let mut entries = self.entries.write();
        // Another caller may have reloaded while we waited for the write lock
        if let Some(hit) = entries.get(paths) {
            if hit.stamp == stamp {
                return Ok(Arc::clone(&hit.artifacts));
            }
            debug!(model = %paths.model.display(), "Artifacts changed on disk, reloading");
        }

        let loaded = match LoadedArtifacts::load(paths) {
            Ok(loaded) => Arc::new(loaded),
            Err(e) => {
                entries.remove(paths);
                return Err(e);
            }
        };
        entries.insert(
            paths.clone(),
            CacheEntry {
                artifacts: Arc::clone(&loaded),
                stamp,
            },
        );
        info!(
            preprocessor = %paths.preprocessor.display(),
            model = %paths.model.display(),
            "Artifacts loaded into cache"
        );
        Ok(loaded)
    }

    /// Drop the entry for `paths` so the next call reloads from disk
    pub fn invalidate(&self, paths: &ArtifactPaths) {
        if self.entries.write().remove(paths).is_some() {
            debug!(model = %paths.model.display(), "Artifact cache entry invalidated");
        }
    }
}

/// Label plus the probability it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: RiskLabel,
    /// P(bad risk)
    pub probability: f64,
}

impl Prediction {
    pub fn verdict(&self) -> &'static str {
        self.label.verdict()
    }
}

/// Scores applicants with the persisted encoder and model
///
/// Caller input errors come back as [`CreditRiskError::TransformConfig`],
/// missing or inconsistent artifacts as [`CreditRiskError::ArtifactLoad`],
/// and anything else as [`CreditRiskError::Prediction`].
#[derive(Debug, Clone, Default)]
pub struct PredictPipeline {
    config: InferenceConfig,
}

impl PredictPipeline {
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Loaded artifacts, from the shared cache when enabled
    pub fn artifacts(&self) -> Result<Arc<LoadedArtifacts>> {
        let paths = &self.config.artifacts;
        let loaded = if self.config.cache_artifacts {
            ArtifactCache::global().get_or_load(paths)
        } else {
            LoadedArtifacts::load(paths).map(Arc::new)
        };
        loaded.map_err(|e| log_failure(e.into_prediction("load")))
    }

    /// Label for one applicant
    pub fn predict(&self, record: &ApplicantRecord) -> Result<RiskLabel> {
        Ok(self.score(record)?.label)
    }

    /// P(bad risk) for one applicant
    pub fn predict_proba(&self, record: &ApplicantRecord) -> Result<f64> {
        Ok(self.score(record)?.probability)
    }

    /// Label and probability for one applicant
    pub fn score(&self, record: &ApplicantRecord) -> Result<Prediction> {
        let mut scored = self.predict_batch(std::slice::from_ref(record))?;
        scored.pop().ok_or_else(|| {
            CreditRiskError::Computation("no prediction produced".to_string()).into_prediction("score")
        })
    }

    /// Validate loosely typed input, then score it
    pub fn predict_raw(&self, raw: &RawApplicant) -> Result<Prediction> {
        let record = raw.validate().map_err(log_failure)?;
        self.score(&record)
    }

    /// Score several applicants, preserving order
    pub fn predict_batch(&self, records: &[ApplicantRecord]) -> Result<Vec<Prediction>> {
        let frame = ApplicantRecord::to_frame(records)
            .map_err(|e| log_failure(e.into_prediction("recode")))?;
        self.predict_frame(&frame)
    }

    /// Score a frame in the raw feature schema (sex as text or 0/1)
    pub fn predict_frame(&self, df: &DataFrame) -> Result<Vec<Prediction>> {
        let start = Instant::now();
        let artifacts = self.artifacts()?;

        let recoded = schema::recode_sex(df).map_err(|e| log_failure(e.into_prediction("recode")))?;
        let x = artifacts
            .encoder
            .transform(&recoded)
            .map_err(|e| log_failure(e.into_prediction("transform")))?;
        let proba = artifacts
            .model
            .predict_proba(&x)
            .map_err(|e| log_failure(e.into_prediction("score")))?;

        let threshold = artifacts.model.threshold;
        let predictions: Vec<Prediction> = proba
            .iter()
            .map(|&p| Prediction {
                label: threshold.decide(p),
                probability: p,
            })
            .collect();

        debug!(
            rows = predictions.len(),
            threshold = threshold.value(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Predictions computed"
        );
        Ok(predictions)
    }
}

fn log_failure(err: CreditRiskError) -> CreditRiskError {
    if err.is_caller_error() {
        debug!(error = %err, "Prediction input rejected");
    } else {
        error!(error = %err, "Prediction failed");
    }
    err
}
