#![allow(clippy::enum_variant_names)]

use clap::Parser as _;
use tracing::debug;

use crate::{
    application::{Application, ApplicationError, data::LogLevel},
    cli::Cli,
};

mod application;
mod cli;
mod filesystem;
mod persistence;
mod shell;

#[compio::main]
#[snafu::report]
async fn main() -> Result<(), ApplicationError> {
    let cli_args = Cli::parse();
    setup_tracing(cli_args.log_level);
    debug!("Parsed CLI arguments: {cli_args:?}");

    Application::run(cli_args).await
}

/// Diagnostics go to stderr so that stdout carries only shell output.
fn setup_tracing(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_max_level(level.filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .init();
}
