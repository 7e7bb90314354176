//! Credit risk CLI
//!
//! Command-line interface for splitting data, training, prediction and serving.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::artifacts::{ArtifactPaths, DEFAULT_ARTIFACTS_DIR};
use crate::inference::{InferenceConfig, PredictPipeline};
use crate::ingestion::{read_csv, split_dataset, write_csv};
use crate::schema::RawApplicant;
use crate::training::{ModelParams, TrainPipeline, TrainingConfig, DEFAULT_DECISION_THRESHOLD};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn bad(s: &str) -> ColoredString    { s.truecolor(235, 110, 100) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "credit-risk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Customer credit risk scoring")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a raw dataset into stratified train/test CSV files
    Split {
        /// Raw dataset (CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Directory for train.csv and test.csv
        #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
        output: PathBuf,

        /// Fraction of each class held out for testing
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Shuffle seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Fit the encoder and model, evaluate and write artifacts
    Train {
        /// Training split (CSV)
        #[arg(long)]
        train: PathBuf,

        /// Test split (CSV)
        #[arg(long)]
        test: PathBuf,

        /// Artifact directory
        #[arg(short, long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
        artifacts: PathBuf,

        /// Decision threshold stored with the model
        #[arg(long, env = "DECISION_THRESHOLD", default_value_t = DEFAULT_DECISION_THRESHOLD)]
        threshold: f64,

        /// Maximum gradient descent iterations
        #[arg(long, default_value = "1000")]
        max_iter: usize,

        /// Gradient descent step size
        #[arg(long, default_value = "0.1")]
        learning_rate: f64,

        /// L2 regularization strength
        #[arg(long, default_value = "0.01")]
        alpha: f64,
    },

    /// Score applicants with the trained artifacts
    Predict {
        /// Applicants in the raw feature schema (CSV)
        #[arg(short, long, conflicts_with = "applicant", required_unless_present = "applicant")]
        data: Option<PathBuf>,

        /// A single applicant as a JSON object
        #[arg(long)]
        applicant: Option<String>,

        /// Write rows with probability and prediction columns
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Artifact directory
        #[arg(short, long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
        artifacts: PathBuf,
    },

    /// Show the fitted encoder and model
    Info {
        /// Artifact directory
        #[arg(short, long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
        artifacts: PathBuf,
    },

    /// Start the web server
    Serve {
        /// Server port
        #[arg(short, long, env = "API_PORT", default_value = "5000")]
        port: u16,

        /// Server host
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Artifact directory
        #[arg(short, long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
        artifacts: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_split(data_path: &Path, output_dir: &Path, test_size: f64, seed: u64) -> anyhow::Result<()> {
    section("Split");

    step_run("Loading data");
    let start = Instant::now();
    let df = read_csv(data_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    step_run("Splitting");
    let (mut train, mut test) = split_dataset(&df, test_size, seed)?;
    step_done(&format!("{} train / {} test", train.height(), test.height()));

    let train_path = output_dir.join("train.csv");
    let test_path = output_dir.join("test.csv");
    step_run(&format!("Saving → {}", output_dir.display()));
    write_csv(&mut train, &train_path)?;
    write_csv(&mut test, &test_path)?;
    step_done("train.csv, test.csv");

    println!();
    Ok(())
}

pub fn cmd_train(
    train_path: &Path,
    test_path: &Path,
    artifacts_dir: &Path,
    threshold: f64,
    params: &ModelParams,
) -> anyhow::Result<()> {
    section("Train");

    let config = TrainingConfig::new()
        .with_threshold(threshold)
        .with_max_iter(params.max_iter)
        .with_learning_rate(params.learning_rate)
        .with_alpha(params.alpha)
        .with_artifacts(ArtifactPaths::in_dir(artifacts_dir));

    step_run("Fitting encoder and model");
    let outcome = TrainPipeline::new(config).run_from_paths(train_path, test_path)?;
    step_done(&format!("{:.3}s", outcome.training_time_secs));

    section("Evaluation");
    for line in outcome.report.to_string().lines() {
        println!("  {}", line);
    }
    println!();
    let auc = outcome
        .roc_auc
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "n/a".to_string());
    println!("  {:<16} {}", muted("ROC-AUC"), auc.white().bold());
    println!("  {:<16} {}", muted("Threshold"), outcome.model.threshold.value().to_string().white());
    println!("  {:<16} {} / {}", muted("Rows"), outcome.n_train, outcome.n_test);
    println!("  {:<16} {}", muted("Artifacts"), artifacts_dir.display());
    println!();

    Ok(())
}

pub fn cmd_predict(
    data_path: Option<&Path>,
    applicant: Option<&str>,
    output: Option<&Path>,
    artifacts_dir: &Path,
) -> anyhow::Result<()> {
    section("Predict");

    let pipeline = PredictPipeline::new(
        InferenceConfig::new()
            .with_artifacts(ArtifactPaths::in_dir(artifacts_dir))
            .with_cache(false),
    );

    if let Some(json) = applicant {
        let raw: RawApplicant = serde_json::from_str(json)?;
        let prediction = pipeline.predict_raw(&raw)?;
        let verdict = match prediction.label {
            crate::schema::RiskLabel::Bad => bad(prediction.verdict()),
            crate::schema::RiskLabel::Good => ok(prediction.verdict()),
        };
        println!("  {}", verdict.bold());
        println!("  {:<16} {:.4}", muted("P(bad risk)"), prediction.probability);
        println!();
        return Ok(());
    }

    let Some(data_path) = data_path else {
        anyhow::bail!("either --data or --applicant is required");
    };

    step_run("Loading data");
    let mut df = read_csv(data_path)?;
    step_done(&format!("{} rows", df.height()));

    step_run("Scoring");
    let start = Instant::now();
    let predictions = pipeline.predict_frame(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    let n_bad = predictions
        .iter()
        .filter(|p| p.label == crate::schema::RiskLabel::Bad)
        .count();
    println!();
    println!("  {:<16} {}", muted("Bad risk"), n_bad.to_string().white().bold());
    println!("  {:<16} {}", muted("Good risk"), (predictions.len() - n_bad).to_string().white());

    if let Some(output) = output {
        let proba: Vec<f64> = predictions.iter().map(|p| p.probability).collect();
        let labels: Vec<&str> = predictions.iter().map(|p| p.label.as_str()).collect();
        df.with_column(Series::new("probability".into(), proba))?;
        df.with_column(Series::new("prediction".into(), labels))?;

        step_run(&format!("Saving → {}", output.display()));
        write_csv(&mut df, output)?;
        step_done(&format!("{} rows", df.height()));
    }

    println!();
    Ok(())
}

pub fn cmd_info(artifacts_dir: &Path) -> anyhow::Result<()> {
    section("Artifacts");

    let paths = ArtifactPaths::in_dir(artifacts_dir);
    let encoder = paths.load_encoder()?;
    let model = paths.load_model()?;

    println!("  {:<16} {}", muted("Preprocessor"), paths.preprocessor.display());
    println!("  {:<16} {}", muted("Model"), paths.model.display());
    println!("  {:<16} {}", muted("Fitted on"), format!("{} rows", encoder.n_samples_seen()));
    println!("  {:<16} {}", muted("Threshold"), model.threshold.value());
    println!("  {:<16} {:.6}", muted("Intercept"), model.model.intercept);

    section("Features");
    println!("  {:<20} {:>12} {:>12} {:>12}", muted("Column"), muted("Coef"), muted("Mean"), muted("Std"));
    println!("  {}", dim(&"─".repeat(59)));
    for ((name, params), coef) in encoder.scale_params().zip(model.model.coefficients.iter()) {
        println!("  {:<20} {:>12.4} {:>12.4} {:>12.4}", name, coef, params.mean, params.std);
    }

    section("Categories");
    for enc in encoder.ordinal_encodings() {
        let codes: Vec<String> = enc.codes().iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        println!("  {:<20} {} {}", enc.column(), codes.join(", "), dim(&format!("(impute: {})", enc.impute_value())));
    }
    for enc in encoder.target_encodings() {
        let means: Vec<String> = enc.means().iter().map(|(k, v)| format!("{}={:.3}", k, v)).collect();
        println!("  {:<20} {} {}", enc.column(), means.join(", "), dim(&format!("(prior: {:.3})", enc.prior())));
    }

    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(host: &str, port: u16, artifacts_dir: &Path) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Credit Risk".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Web UI ", &format!("http://{}:{}", host, port)));
    line_box(&kv("Form   ", &format!("http://{}:{}/predictdata", host, port)));
    line_box(&kv("Health ", &format!("http://{}:{}/api/health", host, port)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    let config = ServerConfig {
        host: host.to_string(),
        port,
        artifacts: ArtifactPaths::in_dir(artifacts_dir),
        ..Default::default()
    };

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_train() {
        let cli = Cli::try_parse_from([
            "credit-risk", "train", "--train", "a.csv", "--test", "b.csv", "--threshold", "0.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Train { threshold, max_iter, learning_rate, alpha, .. } => {
                assert_eq!(threshold, 0.5);
                assert_eq!(max_iter, 1000);
                assert_eq!(learning_rate, 0.1);
                assert_eq!(alpha, 0.01);
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1mbold\x1b[0m"), "bold");
    }
}
