//! stac4d CLI
//!
//! Builds and inspects topo4d STAC catalogs of point-cloud acquisitions.

mod batch;
mod cli;
mod commands;
mod config_loader;
mod dry_run;
mod errors;
mod output;
mod output_types;
mod progress;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = commands::execute(cli) {
        match err.downcast_ref::<errors::CliError>() {
            Some(cli_error) => cli_error.display(),
            None => errors::from_anyhow(&err).display(),
        }
        std::process::exit(1);
    }

    Ok(())
}
