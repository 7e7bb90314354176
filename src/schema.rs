//! Applicant schema
//!
//! Column names of the credit dataset, the fixed `Sex` / `Risk` recodings
//! shared by training and inference, and the typed applicant record built
//! from free-form form input.

use crate::error::{CreditRiskError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const AGE: &str = "Age";
pub const SEX: &str = "Sex";
pub const JOB: &str = "Job";
pub const HOUSING: &str = "Housing";
pub const SAVING_ACCOUNTS: &str = "Saving accounts";
pub const CHECKING_ACCOUNT: &str = "Checking account";
pub const CREDIT_AMOUNT: &str = "Credit amount";
pub const DURATION: &str = "Duration";
pub const PURPOSE: &str = "Purpose";

/// Label column of the training data
pub const RISK: &str = "Risk";

/// Row identifier written by the dataset export; not a feature
pub const DEFAULT_ID_COLUMN: &str = "Unnamed: 0";

/// Every feature column, in dataset order
pub const FEATURE_COLUMNS: [&str; 9] = [
    AGE,
    SEX,
    JOB,
    HOUSING,
    SAVING_ACCOUNTS,
    CHECKING_ACCOUNT,
    CREDIT_AMOUNT,
    DURATION,
    PURPOSE,
];

/// Text values treated as a missing categorical
pub fn is_missing_token(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("na") || v.eq_ignore_ascii_case("nan")
}

/// Applicant sex, coded `male → 1`, `female → 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn code(self) -> i64 {
        match self {
            Sex::Male => 1,
            Sex::Female => 0,
        }
    }
}

impl FromStr for Sex {
    type Err = CreditRiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(CreditRiskError::transform(format!(
                "unrecognized sex value '{}', expected 'male' or 'female'",
                other
            ))),
        }
    }
}

/// Predicted risk class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "bad risk")]
    Bad,
    #[serde(rename = "good risk")]
    Good,
}

impl RiskLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLabel::Bad => "bad risk",
            RiskLabel::Good => "good risk",
        }
    }

    /// Sentence shown to the end user
    pub fn verdict(self) -> &'static str {
        match self {
            RiskLabel::Bad => "This customer presents BAD RISK",
            RiskLabel::Good => "This customer presents GOOD RISK",
        }
    }

    /// Numeric class used by the model: bad = 1, good = 0
    pub fn class(self) -> f64 {
        match self {
            RiskLabel::Bad => 1.0,
            RiskLabel::Good => 0.0,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn risk_code(value: &str) -> Option<f64> {
    match value.trim().to_ascii_lowercase().as_str() {
        "bad" => Some(1.0),
        "good" => Some(0.0),
        _ => None,
    }
}

fn string_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| CreditRiskError::transform(format!("missing required column '{}'", name)))
}

/// Replace the `Sex` column with its integer code.
///
/// Already-coded integer columns are accepted as long as every value is 0 or 1.
pub fn recode_sex(df: &DataFrame) -> Result<DataFrame> {
    let series = string_column(df, SEX)?.as_materialized_series();

    let codes: Vec<i64> = if series.dtype().is_integer() {
        let ca = series.cast(&DataType::Int64)?;
        ca.i64()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| match v {
                Some(code @ (0 | 1)) => Ok(code),
                other => Err(CreditRiskError::transform(format!(
                    "row {}: invalid {} code {:?}",
                    row, SEX, other
                ))),
            })
            .collect::<Result<_>>()?
    } else {
        let ca = series.cast(&DataType::String)?;
        ca.str()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| match v {
                Some(s) => s.parse::<Sex>().map(Sex::code).map_err(|_| {
                    CreditRiskError::transform(format!(
                        "row {}: unrecognized {} value '{}'",
                        row, SEX, s
                    ))
                }),
                None => Err(CreditRiskError::transform(format!(
                    "row {}: missing {} value",
                    row, SEX
                ))),
            })
            .collect::<Result<_>>()?
    };

    let mut result = df.clone();
    result.with_column(Series::new(SEX.into(), codes))?;
    Ok(result)
}

/// Replace the `Risk` column with `bad → 1.0`, `good → 0.0`
pub fn recode_risk(df: &DataFrame) -> Result<DataFrame> {
    let series = string_column(df, RISK)?.as_materialized_series();
    let ca = series.cast(&DataType::String)?;
    let labels: Vec<f64> = ca
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            Some(s) => risk_code(s).ok_or_else(|| {
                CreditRiskError::transform(format!(
                    "row {}: unrecognized {} value '{}', expected 'bad' or 'good'",
                    row, RISK, s
                ))
            }),
            None => Err(CreditRiskError::transform(format!(
                "row {}: missing {} value",
                row, RISK
            ))),
        })
        .collect::<Result<_>>()?;

    let mut result = df.clone();
    result.with_column(Series::new(RISK.into(), labels))?;
    Ok(result)
}

/// Applicant fields exactly as a form or JSON body delivers them
///
/// Integer fields accept either text or a JSON number; both are checked by
/// [`validate`](Self::validate).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawApplicant {
    #[serde(deserialize_with = "deserialize_text_or_number")]
    pub age: String,
    pub sex: String,
    #[serde(deserialize_with = "deserialize_text_or_number")]
    pub job: String,
    pub housing: String,
    #[serde(default)]
    pub saving_accounts: Option<String>,
    #[serde(default)]
    pub checking_account: Option<String>,
    #[serde(deserialize_with = "deserialize_text_or_number")]
    pub credit_amount: String,
    #[serde(deserialize_with = "deserialize_text_or_number")]
    pub duration: String,
    pub purpose: String,
}

fn deserialize_text_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => Ok(text),
        TextOrNumber::Integer(n) => Ok(n.to_string()),
        TextOrNumber::Float(x) => Ok(x.to_string()),
    }
}

fn parse_int(field: &str, value: &str, min: i64) -> Result<i64> {
    let parsed: i64 = value.trim().parse().map_err(|_| {
        CreditRiskError::transform(format!("field '{}': '{}' is not an integer", field, value))
    })?;
    if parsed < min {
        return Err(CreditRiskError::transform(format!(
            "field '{}': {} is below the minimum of {}",
            field, parsed, min
        )));
    }
    Ok(parsed)
}

fn required_category(field: &str, value: &str) -> Result<String> {
    if is_missing_token(value) {
        return Err(CreditRiskError::transform(format!("field '{}' is required", field)));
    }
    Ok(value.trim().to_string())
}

fn optional_category(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !is_missing_token(v))
        .map(|v| v.trim().to_string())
}

impl RawApplicant {
    /// Validate and coerce every field
    pub fn validate(&self) -> Result<ApplicantRecord> {
        Ok(ApplicantRecord {
            age: parse_int("age", &self.age, 0)?,
            sex: self.sex.parse()?,
            job: parse_int("job", &self.job, 0)?,
            housing: required_category("housing", &self.housing)?,
            saving_accounts: optional_category(self.saving_accounts.as_deref()),
            checking_account: optional_category(self.checking_account.as_deref()),
            credit_amount: parse_int("credit_amount", &self.credit_amount, 1)?,
            duration: parse_int("duration", &self.duration, 1)?,
            purpose: required_category("purpose", &self.purpose)?,
        })
    }
}

impl TryFrom<RawApplicant> for ApplicantRecord {
    type Error = CreditRiskError;

    fn try_from(raw: RawApplicant) -> Result<Self> {
        raw.validate()
    }
}

/// One validated applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub age: i64,
    pub sex: Sex,
    pub job: i64,
    pub housing: String,
    pub saving_accounts: Option<String>,
    pub checking_account: Option<String>,
    pub credit_amount: i64,
    pub duration: i64,
    pub purpose: String,
}

impl ApplicantRecord {
    /// Build a frame in the training schema, `Sex` already coded
    pub fn to_frame(records: &[ApplicantRecord]) -> Result<DataFrame> {
        if records.is_empty() {
            return Err(CreditRiskError::transform("no applicant records given"));
        }

        let column_of = |f: fn(&ApplicantRecord) -> i64| -> Vec<i64> { records.iter().map(f).collect() };
        let housing: Vec<&str> = records.iter().map(|r| r.housing.as_str()).collect();
        let purpose: Vec<&str> = records.iter().map(|r| r.purpose.as_str()).collect();
        let saving: Vec<Option<&str>> = records.iter().map(|r| r.saving_accounts.as_deref()).collect();
        let checking: Vec<Option<&str>> = records.iter().map(|r| r.checking_account.as_deref()).collect();

        let df = DataFrame::new(vec![
            Column::new(AGE.into(), column_of(|r| r.age)),
            Column::new(SEX.into(), column_of(|r| r.sex.code())),
            Column::new(JOB.into(), column_of(|r| r.job)),
            Column::new(HOUSING.into(), housing),
            Column::new(SAVING_ACCOUNTS.into(), saving),
            Column::new(CHECKING_ACCOUNT.into(), checking),
            Column::new(CREDIT_AMOUNT.into(), column_of(|r| r.credit_amount)),
            Column::new(DURATION.into(), column_of(|r| r.duration)),
            Column::new(PURPOSE.into(), purpose),
        ])?;
        Ok(df)
    }
}
