//! Persisted encoder and model state

use crate::error::{CreditRiskError, Result};
use crate::preprocessing::EncoderState;
use crate::training::ModelState;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const PREPROCESSOR_FILE: &str = "preprocessor.json";
pub const MODEL_FILE: &str = "model.json";
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Locations of the two artifacts written by training and read by inference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactPaths {
    pub preprocessor: PathBuf,
    pub model: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        let dir = std::env::var("ARTIFACTS_DIR").unwrap_or_else(|_| DEFAULT_ARTIFACTS_DIR.to_string());
        Self::in_dir(dir)
    }
}

impl ArtifactPaths {
    /// Well-known file names under `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            preprocessor: dir.join(PREPROCESSOR_FILE),
            model: dir.join(MODEL_FILE),
        }
    }

    pub fn exist(&self) -> bool {
        self.preprocessor.is_file() && self.model.is_file()
    }

    /// Write both artifacts as a pair
    ///
    /// Both files are staged next to their targets before either is renamed
    /// into place, so a failed write leaves the previous pair untouched.
    pub fn save(&self, encoder: &EncoderState, model: &ModelState) -> Result<()> {
        let staged_encoder = stage_json(&self.preprocessor, encoder)?;
        let staged_model = match stage_json(&self.model, model) {
            Ok(staged) => staged,
            Err(e) => {
                discard(&staged_encoder);
                return Err(e);
            }
        };
        if let Err(e) = std::fs::rename(&staged_encoder, &self.preprocessor) {
            discard(&staged_encoder);
            discard(&staged_model);
            return Err(e.into());
        }
        // Model last: until this rename lands the fingerprint check rejects the pair
        if let Err(e) = std::fs::rename(&staged_model, &self.model) {
            discard(&staged_model);
            return Err(e.into());
        }
        debug!(
            preprocessor = %self.preprocessor.display(),
            model = %self.model.display(),
            "Artifacts written"
        );
        Ok(())
    }

    pub fn load_encoder(&self) -> Result<EncoderState> {
        load_json(&self.preprocessor)
    }

    pub fn load_model(&self) -> Result<ModelState> {
        load_json(&self.model)
    }
}

/// Write `value` to a sibling temp file of `path` and return the temp path
fn stage_json<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| CreditRiskError::InvalidParameter {
        name: "artifact path".to_string(),
        value: path.display().to_string(),
        reason: "has no file name".to_string(),
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut staged_name = file_name.to_os_string();
    staged_name.push(".tmp");
    let staged = path.with_file_name(staged_name);

    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(&staged, json)?;
    Ok(staged)
}

fn discard(staged: &Path) {
    if let Err(e) = std::fs::remove_file(staged) {
        warn!(path = %staged.display(), error = %e, "Could not remove staged artifact");
    }
}

/// Read and decode an artifact; every failure is reported as [`CreditRiskError::ArtifactLoad`]
fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let load_error = |reason: String| CreditRiskError::ArtifactLoad {
        path: path.to_path_buf(),
        reason,
    };
    let json = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| load_error(format!("malformed artifact: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_in_dir() {
        let paths = ArtifactPaths::in_dir("out");
        assert_eq!(paths.preprocessor, Path::new("out").join("preprocessor.json"));
        assert_eq!(paths.model, Path::new("out").join("model.json"));
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        assert!(!paths.exist());
        match paths.load_model() {
            Err(CreditRiskError::ArtifactLoad { path, .. }) => assert_eq!(path, paths.model),
            other => panic!("expected ArtifactLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_artifact() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        std::fs::write(&paths.preprocessor, "{ not json").unwrap();
        assert!(matches!(
            paths.load_encoder(),
            Err(CreditRiskError::ArtifactLoad { .. })
        ));
    }
}
