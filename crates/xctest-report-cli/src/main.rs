//! xctest-report: JUnit reports from piped xcodebuild output
//!
//! Reads build output on stdin, echoes it to stdout, and writes one JUnit
//! XML report per test suite. Logs go to stderr.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use xctest_report_cli::config::Config;
use xctest_report_cli::run::{FATAL_EXIT_STATUS, exit_status, run};

fn main() -> ExitCode {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::from(FATAL_EXIT_STATUS);
    }

    match run(&config, io::stdin().lock(), io::stdout().lock()) {
        Ok(summary) => ExitCode::from(exit_status(&summary)),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(FATAL_EXIT_STATUS)
        }
    }
}
