//! CSV ingestion and the stratified train/test split

use crate::error::{CreditRiskError, Result};
use crate::schema::RISK;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Read a headered CSV file
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| CreditRiskError::Data(format!("{}: {}", path.display(), e)))?
        .finish()
        .map_err(|e| CreditRiskError::Data(format!("{}: {}", path.display(), e)))?;
    Ok(df)
}

/// Write `df` as a headered CSV file, creating parent directories
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Stratified shuffle split on the `Risk` column.
///
/// Each class contributes `round(n_class * test_size)` rows to the test set.
/// Rows keep their original relative order within each output.
pub fn split_dataset(df: &DataFrame, test_size: f64, seed: u64) -> Result<(DataFrame, DataFrame)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(CreditRiskError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }

    let risk = df
        .column(RISK)
        .map_err(|_| CreditRiskError::transform(format!("missing required column '{}'", RISK)))?
        .as_materialized_series()
        .cast(&DataType::String)?;

    // BTreeMap keeps class iteration order stable across runs
    let mut class_indices: BTreeMap<String, Vec<IdxSize>> = BTreeMap::new();
    for (i, value) in risk.str()?.into_iter().enumerate() {
        let class = value.ok_or_else(|| {
            CreditRiskError::transform(format!("row {}: missing {} value", i, RISK))
        })?;
        class_indices
            .entry(class.trim().to_ascii_lowercase())
            .or_default()
            .push(i as IdxSize);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train_idx = Vec::new();
    let mut test_idx = Vec::new();

    for indices in class_indices.values_mut() {
        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f64) * test_size).round() as usize;
        test_idx.extend_from_slice(&indices[..n_test]);
        train_idx.extend_from_slice(&indices[n_test..]);
    }

    if train_idx.is_empty() || test_idx.is_empty() {
        return Err(CreditRiskError::Data(
            "stratified split produced an empty train or test set".to_string(),
        ));
    }

    train_idx.sort_unstable();
    test_idx.sort_unstable();

    let train = df.take(&IdxCa::from_vec("idx".into(), train_idx))?;
    let test = df.take(&IdxCa::from_vec("idx".into(), test_idx))?;

    info!(
        rows = df.height(),
        train_rows = train.height(),
        test_rows = test.height(),
        classes = class_indices.len(),
        seed,
        "Dataset split"
    );

    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn risk_frame() -> DataFrame {
        let risk: Vec<&str> = (0..20).map(|i| if i % 4 == 0 { "bad" } else { "good" }).collect();
        let id: Vec<i64> = (0..20).collect();
        df!("id" => id, "Risk" => risk).unwrap()
    }

    fn count(df: &DataFrame, class: &str) -> usize {
        df.column("Risk")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .filter(|v| *v == Some(class))
            .count()
    }

    #[test]
    fn test_split_is_stratified() {
        let df = risk_frame();
        let (train, test) = split_dataset(&df, 0.2, 42).unwrap();

        assert_eq!(train.height() + test.height(), 20);
        assert_eq!(count(&test, "bad"), 1);
        assert_eq!(count(&test, "good"), 3);
    }

    #[test]
    fn test_split_is_seeded() {
        let df = risk_frame();
        let (a, _) = split_dataset(&df, 0.25, 7).unwrap();
        let (b, _) = split_dataset(&df, 0.25, 7).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn test_split_rejects_bad_ratio() {
        assert!(split_dataset(&risk_frame(), 1.0, 0).is_err());
        assert!(split_dataset(&risk_frame(), 0.0, 0).is_err());
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("train.csv");
        let mut df = risk_frame();
        write_csv(&mut df, &path).unwrap();
        let back = read_csv(&path).unwrap();
        assert_eq!(back.shape(), (20, 2));
    }
}
