//! `lzw-roundtrip` binary entry point.

mod cli;

use std::io;
use std::process::ExitCode;

use clap::CommandFactory;
use lzw_roundtrip::{Harness, Lzw};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::from_args(std::env::args_os());

    if cli.files.is_empty() {
        if let Err(err) = Cli::command().print_help() {
            eprintln!("lzw-roundtrip: {err}");
        }
        return ExitCode::SUCCESS;
    }

    // Diagnostics go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = cli.config();
    tracing::debug!(?config, files = cli.files.len(), "starting run");

    let mut harness = Harness::new(Lzw, config, io::stdout().lock());
    match harness.run(&cli.files) {
        // Exit codes are a byte wide; saturate rather than wrap to zero.
        Ok(stats) => ExitCode::from(u8::try_from(stats.errors_found).unwrap_or(u8::MAX)),
        Err(err) => {
            tracing::error!(error = %err, "run aborted");
            eprintln!("lzw-roundtrip: {err}");
            ExitCode::FAILURE
        }
    }
}
