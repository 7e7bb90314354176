//! Smoothed target-mean encoding

use super::category_map::CategoryMap;
use super::config::TargetSmoothing;
use crate::error::{CreditRiskError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key under which missing values are tracked as their own category
pub const MISSING_CATEGORY: &str = "<missing>";

/// Fitted target encoding for one column
///
/// Each category maps to its label mean blended toward the global prior.
/// Categories seen once, and categories unseen at fit time, map to the prior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetEncoding {
    column: String,
    prior: f64,
    means: CategoryMap<f64>,
}

impl TargetEncoding {
    pub fn fit(
        column: &str,
        values: &[Option<String>],
        labels: &[f64],
        smoothing: &TargetSmoothing,
    ) -> Result<Self> {
        if values.len() != labels.len() {
            return Err(CreditRiskError::transform(format!(
                "column '{}' has {} rows but {} labels were given",
                column,
                values.len(),
                labels.len()
            )));
        }
        if labels.is_empty() {
            return Err(CreditRiskError::transform(format!(
                "cannot fit target encoding for '{}' on an empty dataset",
                column
            )));
        }

        let prior = labels.iter().sum::<f64>() / labels.len() as f64;

        let mut stats: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for (value, &label) in values.iter().zip(labels) {
            let key = value.as_deref().unwrap_or(MISSING_CATEGORY);
            let entry = stats.entry(key).or_insert((0.0, 0));
            entry.0 += label;
            entry.1 += 1;
        }

        let entries: BTreeMap<String, f64> = stats
            .into_iter()
            .map(|(category, (sum, count))| {
                let encoded = if count == 1 {
                    prior
                } else {
                    let weight = smoothing.weight(count);
                    prior * (1.0 - weight) + (sum / count as f64) * weight
                };
                (category.to_string(), encoded)
            })
            .collect();

        Ok(Self {
            column: column.to_string(),
            prior,
            means: CategoryMap::new(entries, prior),
        })
    }

    pub fn encode(&self, value: Option<&str>) -> f64 {
        self.means.resolve(value.unwrap_or(MISSING_CATEGORY))
    }

    pub fn encode_column(&self, values: &[Option<String>]) -> Vec<f64> {
        values.iter().map(|v| self.encode(v.as_deref())).collect()
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn prior(&self) -> f64 {
        self.prior
    }

    pub fn means(&self) -> &CategoryMap<f64> {
        &self.means
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &[Option<&str>]) -> Vec<Option<String>> {
        raw.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_means_blend_toward_prior() {
        let vals = values(&[Some("little"), Some("little"), Some("rich"), Some("rich"), Some("rich"), Some("rich")]);
        let labels = [1.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let enc = TargetEncoding::fit("Saving accounts", &vals, &labels, &TargetSmoothing::default()).unwrap();

        let prior = 2.0 / 6.0;
        assert!((enc.prior() - prior).abs() < 1e-12);

        // Small counts sit between the raw mean and the prior
        let little = enc.encode(Some("little"));
        let rich = enc.encode(Some("rich"));
        assert!(little > prior && little < 1.0);
        assert!(rich < prior && rich > 0.0);
    }

    #[test]
    fn test_no_smoothing_limit() {
        let vals = values(&[Some("a"), Some("a"), Some("b"), Some("b")]);
        let labels = [1.0, 1.0, 0.0, 0.0];
        let smoothing = TargetSmoothing { min_samples_leaf: 0, smoothing: 1e-3 };
        let enc = TargetEncoding::fit("c", &vals, &labels, &smoothing).unwrap();
        assert!((enc.encode(Some("a")) - 1.0).abs() < 1e-9);
        assert!(enc.encode(Some("b")).abs() < 1e-9);
    }

    #[test]
    fn test_unseen_and_singletons_use_prior() {
        let vals = values(&[Some("a"), Some("a"), Some("once")]);
        let labels = [1.0, 0.0, 1.0];
        let enc = TargetEncoding::fit("c", &vals, &labels, &TargetSmoothing::default()).unwrap();
        assert_eq!(enc.encode(Some("never-seen")), enc.prior());
        assert_eq!(enc.encode(Some("once")), enc.prior());
    }

    #[test]
    fn test_missing_is_a_category() {
        let vals = values(&[None, None, None, Some("a"), Some("a"), Some("a")]);
        let labels = [1.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        let smoothing = TargetSmoothing { min_samples_leaf: 0, smoothing: 1e-3 };
        let enc = TargetEncoding::fit("c", &vals, &labels, &smoothing).unwrap();
        assert!(enc.encode(None) > 0.99);
        assert!(enc.means().contains(MISSING_CATEGORY));
    }

    #[test]
    fn test_length_mismatch() {
        let vals = values(&[Some("a")]);
        let err = TargetEncoding::fit("c", &vals, &[1.0, 0.0], &TargetSmoothing::default()).unwrap_err();
        assert!(err.is_caller_error());
    }
}
