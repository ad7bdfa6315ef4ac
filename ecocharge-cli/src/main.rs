//! EcoCharge command-line client.
//!
//! Thin front end over `ecocharge-client`: admin sign-in and account
//! management, the SQL console, station ratings and reports, and a live view
//! of the ratings / devices change feed.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod admin_commands;
mod auth_commands;
mod cli;
mod commands;
mod config_commands;
mod output;
mod public_commands;
mod watch_commands;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // stderr keeps stdout clean for --json
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::report_error(&e);
            ExitCode::FAILURE
        },
    }
}
