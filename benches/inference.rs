use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use credit_risk::prelude::*;
use credit_risk::schema;
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_applicant_data(n_rows: usize) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let housing = ["own", "rent", "free"];
    let accounts = [None, Some("little"), Some("moderate"), Some("rich")];
    let purposes = ["car", "radio/TV", "business", "education", "repairs"];

    let mut age = Vec::with_capacity(n_rows);
    let mut sex = Vec::with_capacity(n_rows);
    let mut job = Vec::with_capacity(n_rows);
    let mut house = Vec::with_capacity(n_rows);
    let mut saving = Vec::with_capacity(n_rows);
    let mut checking = Vec::with_capacity(n_rows);
    let mut credit = Vec::with_capacity(n_rows);
    let mut duration = Vec::with_capacity(n_rows);
    let mut purpose = Vec::with_capacity(n_rows);
    let mut risk = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let d: i64 = rng.gen_range(4..72);
        let c: i64 = rng.gen_range(250..18000);
        age.push(rng.gen_range(19i64..75));
        sex.push(if rng.gen_bool(0.7) { "male" } else { "female" });
        job.push(rng.gen_range(0i64..4));
        house.push(*housing.choose(&mut rng).unwrap_or(&"own"));
        saving.push(*accounts.choose(&mut rng).unwrap_or(&None));
        checking.push(*accounts.choose(&mut rng).unwrap_or(&None));
        credit.push(c);
        duration.push(d);
        purpose.push(*purposes.choose(&mut rng).unwrap_or(&"car"));
        let score = d as f64 / 72.0 + c as f64 / 18000.0 + rng.gen::<f64>() * 0.5;
        risk.push(if score > 1.0 { "bad" } else { "good" });
    }

    df!(
        schema::AGE => age,
        schema::SEX => sex,
        schema::JOB => job,
        schema::HOUSING => house,
        schema::SAVING_ACCOUNTS => saving,
        schema::CHECKING_ACCOUNT => checking,
        schema::CREDIT_AMOUNT => credit,
        schema::DURATION => duration,
        schema::PURPOSE => purpose,
        schema::RISK => risk,
    )
    .unwrap()
}

fn bench_inference(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());
    let df = create_applicant_data(2000);
    let (train, test) = split_dataset(&df, 0.2, 42).unwrap();
    TrainPipeline::new(TrainingConfig::new().with_artifacts(paths.clone()))
        .run(&train, &test)
        .unwrap();

    let record = RawApplicant {
        age: "30".into(),
        sex: "male".into(),
        job: "2".into(),
        housing: "own".into(),
        saving_accounts: Some("little".into()),
        checking_account: Some("moderate".into()),
        credit_amount: "5000".into(),
        duration: "12".into(),
        purpose: "car".into(),
    };

    let mut group = c.benchmark_group("inference");

    for cached in [true, false] {
        let pipeline = PredictPipeline::new(
            InferenceConfig::new()
                .with_artifacts(paths.clone())
                .with_cache(cached),
        );
        let name = if cached { "single_cached" } else { "single_fresh_load" };
        group.bench_function(name, |b| {
            b.iter(|| pipeline.predict_raw(black_box(&record)).unwrap())
        });
    }

    let pipeline = PredictPipeline::new(InferenceConfig::new().with_artifacts(paths.clone()));
    for n_rows in [100, 1000].iter() {
        let batch = create_applicant_data(*n_rows);
        group.bench_with_input(BenchmarkId::new("frame", n_rows), &batch, |b, batch| {
            b.iter(|| pipeline.predict_frame(black_box(batch)).unwrap())
        });
    }

    group.finish();
}

fn bench_encoder_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoder");
    group.sample_size(20);

    for n_rows in [1000, 10000].iter() {
        let df = create_applicant_data(*n_rows);
        let df = schema::recode_sex(&schema::recode_risk(&df).unwrap()).unwrap();
        let labels: ndarray::Array1<f64> = df
            .column(schema::RISK)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &(df, labels), |b, (df, labels)| {
            b.iter(|| FeatureEncoder::new().fit(black_box(df), black_box(labels)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_inference, bench_encoder_fit);
criterion_main!(benches);
