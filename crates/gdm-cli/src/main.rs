mod cli;

use anyhow::Context;
use clap::Parser;
use gdm_runtime::{Outcome, Pipeline, ProcessRunner, StdoutTracer};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    load_env_file()?;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let params = cli.into_parameters()?;

    let pipeline = Pipeline::new(ProcessRunner, StdoutTracer, std::env::current_dir()?);
    match pipeline.run(&params)? {
        Outcome::Executed => tracing::info!(deployment = %params.deployment.trim(), "deployment finished"),
        Outcome::DryRun => tracing::info!("dry run finished, gcloud deployment command not run"),
    }

    Ok(())
}

/// Loads `PLUGIN_ENV_FILE`, if set, into the environment before flags are
/// parsed. Variables already set in the environment win.
fn load_env_file() -> anyhow::Result<()> {
    let Some(path) = std::env::var_os("PLUGIN_ENV_FILE").filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    dotenvy::from_path(&path)
        .with_context(|| format!("failed to load env file {}", path.to_string_lossy()))
}

/// Logs go to stderr; stdout carries the command trace and gcloud's output.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
