//! Shared fixtures for integration tests

#![allow(dead_code)]

use credit_risk::prelude::*;
use credit_risk::schema;
use ndarray::Array1;
use polars::prelude::*;
use std::path::Path;

/// Deterministic applicant table with a clear good/bad pattern.
///
/// Bad rows: little or unknown checking account, long duration, large credit.
/// Good rows: moderate or rich checking account, short duration, small credit.
pub fn synthetic_dataset(n: usize) -> DataFrame {
    let mut id = Vec::with_capacity(n);
    let mut age = Vec::with_capacity(n);
    let mut sex = Vec::with_capacity(n);
    let mut job = Vec::with_capacity(n);
    let mut housing = Vec::with_capacity(n);
    let mut saving: Vec<Option<&str>> = Vec::with_capacity(n);
    let mut checking: Vec<Option<&str>> = Vec::with_capacity(n);
    let mut credit = Vec::with_capacity(n);
    let mut duration = Vec::with_capacity(n);
    let mut purpose = Vec::with_capacity(n);
    let mut risk = Vec::with_capacity(n);

    for i in 0..n {
        let is_bad = i % 3 == 0;
        id.push(i as i64);
        sex.push(if i % 2 == 0 { "male" } else { "female" });
        if is_bad {
            age.push(22 + (i % 10) as i64);
            job.push(1i64);
            housing.push(if i % 2 == 0 { "rent" } else { "free" });
            saving.push(if i % 4 == 0 { None } else { Some("little") });
            checking.push(if i % 5 == 0 { None } else { Some("little") });
            credit.push(8000 + (i % 5) as i64 * 1000);
            duration.push(36 + (i % 3) as i64 * 6);
            purpose.push(if i % 2 == 0 { "business" } else { "car" });
            risk.push("bad");
        } else {
            age.push(30 + (i % 20) as i64);
            job.push(2i64);
            housing.push("own");
            saving.push(match i % 3 {
                1 => Some("little"),
                _ => Some("moderate"),
            });
            checking.push(if i % 4 == 0 { Some("rich") } else { Some("moderate") });
            credit.push(1000 + (i % 7) as i64 * 400);
            duration.push(6 + (i % 4) as i64 * 3);
            purpose.push(if i % 2 == 0 { "car" } else { "radio/TV" });
            risk.push("good");
        }
    }

    df!(
        schema::DEFAULT_ID_COLUMN => id,
        schema::AGE => age,
        schema::SEX => sex,
        schema::JOB => job,
        schema::HOUSING => housing,
        schema::SAVING_ACCOUNTS => saving,
        schema::CHECKING_ACCOUNT => checking,
        schema::CREDIT_AMOUNT => credit,
        schema::DURATION => duration,
        schema::PURPOSE => purpose,
        schema::RISK => risk,
    )
    .unwrap()
}

/// Features with sex coded and labels as 0/1, ready for the encoder
pub fn encoder_inputs(df: &DataFrame) -> (DataFrame, Array1<f64>) {
    let df = schema::recode_sex(&schema::recode_risk(df).unwrap()).unwrap();
    let labels: Vec<f64> = df
        .column(schema::RISK)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    (df.drop(schema::RISK).unwrap(), Array1::from(labels))
}

/// `{30, male, 2, own, little, moderate, 5000, 12, car}`
pub fn reference_applicant() -> RawApplicant {
    RawApplicant {
        age: "30".into(),
        sex: "male".into(),
        job: "2".into(),
        housing: "own".into(),
        saving_accounts: Some("little".into()),
        checking_account: Some("moderate".into()),
        credit_amount: "5000".into(),
        duration: "12".into(),
        purpose: "car".into(),
    }
}

pub fn risky_applicant() -> RawApplicant {
    RawApplicant {
        age: "24".into(),
        sex: "female".into(),
        job: "1".into(),
        housing: "rent".into(),
        saving_accounts: None,
        checking_account: Some("little".into()),
        credit_amount: "12000".into(),
        duration: "48".into(),
        purpose: "business".into(),
    }
}

/// Split the synthetic table and train into `dir`
pub fn train_into(dir: &Path) -> (ArtifactPaths, TrainingOutcome) {
    let df = synthetic_dataset(300);
    let (train, test) = split_dataset(&df, 0.2, 42).unwrap();
    let paths = ArtifactPaths::in_dir(dir);
    let config = TrainingConfig::new()
        .with_threshold(DEFAULT_DECISION_THRESHOLD)
        .with_artifacts(paths.clone());
    let outcome = TrainPipeline::new(config).run(&train, &test).unwrap();
    (paths, outcome)
}

pub fn pipeline_for(paths: &ArtifactPaths, cache: bool) -> PredictPipeline {
    PredictPipeline::new(
        InferenceConfig::new()
            .with_artifacts(paths.clone())
            .with_cache(cache),
    )
}
