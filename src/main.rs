//! Credit risk scoring - main entry point

use clap::Parser;
use credit_risk::cli::{cmd_info, cmd_predict, cmd_serve, cmd_split, cmd_train, Cli, Commands};
use credit_risk::training::ModelParams;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_risk=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Split { data, output, test_size, seed } => {
            cmd_split(&data, &output, test_size, seed)?;
        }
        Commands::Train { train, test, artifacts, threshold, max_iter, learning_rate, alpha } => {
            let params = ModelParams {
                max_iter,
                learning_rate,
                alpha,
                ..ModelParams::default()
            };
            cmd_train(&train, &test, &artifacts, threshold, &params)?;
        }
        Commands::Predict { data, applicant, output, artifacts } => {
            cmd_predict(data.as_deref(), applicant.as_deref(), output.as_deref(), &artifacts)?;
        }
        Commands::Info { artifacts } => {
            cmd_info(&artifacts)?;
        }
        Commands::Serve { port, host, artifacts } => {
            cmd_serve(&host, port, &artifacts).await?;
        }
    }

    Ok(())
}
