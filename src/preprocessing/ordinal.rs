//! Ordinal encoding with most-frequent imputation

use super::category_map::CategoryMap;
use crate::error::{CreditRiskError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fitted ordinal encoding for one column
///
/// Codes follow sorted category order. Missing values take the most frequent
/// training category (ties go to the smallest), and unseen categories take
/// that category's code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalEncoding {
    column: String,
    impute_value: String,
    codes: CategoryMap<f64>,
}

impl OrdinalEncoding {
    pub fn fit(column: &str, values: &[Option<String>]) -> Result<Self> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in values.iter().flatten() {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }

        // BTreeMap iterates in sorted order, so strict `>` keeps the smallest on ties
        let mut most_frequent: Option<(&str, usize)> = None;
        for (&category, &count) in &counts {
            if most_frequent.map_or(true, |(_, best)| count > best) {
                most_frequent = Some((category, count));
            }
        }
        let (impute_value, _) = most_frequent.ok_or_else(|| {
            CreditRiskError::transform(format!("column '{}' has no observed values", column))
        })?;

        let entries: BTreeMap<String, f64> = counts
            .keys()
            .enumerate()
            .map(|(code, category)| (category.to_string(), code as f64))
            .collect();
        let fallback = entries[impute_value];

        Ok(Self {
            column: column.to_string(),
            impute_value: impute_value.to_string(),
            codes: CategoryMap::new(entries, fallback),
        })
    }

    pub fn encode(&self, value: Option<&str>) -> f64 {
        self.codes.resolve(value.unwrap_or(&self.impute_value))
    }

    pub fn encode_column(&self, values: &[Option<String>]) -> Vec<f64> {
        values.iter().map(|v| self.encode(v.as_deref())).collect()
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn impute_value(&self) -> &str {
        &self.impute_value
    }

    pub fn codes(&self) -> &CategoryMap<f64> {
        &self.codes
    }
}
