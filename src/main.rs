//! House price pipeline - main entry point

use clap::Parser;
use house_price_pipeline::cli::{cmd_analyze, cmd_train, cmd_transform, cmd_validate, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "house_price_pipeline=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { data, top } => {
            cmd_analyze(&data, top)?;
        }
        Commands::Transform { data, output, split, fit, target } => {
            cmd_transform(&data, &output, split, fit.as_deref(), &target)?;
        }
        Commands::Train { data, test, config, output } => {
            cmd_train(&data, test.as_deref(), config.as_deref(), output.as_deref())?;
        }
        Commands::Validate { data, config, grid, shap } => {
            cmd_validate(&data, config.as_deref(), grid, shap)?;
        }
    }

    Ok(())
}
