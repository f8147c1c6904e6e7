//! CLI binary for `chore_tracker`.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the
//! library.

use std::process::ExitCode;

use chore_tracker::cli::{run, Cli};
use chore_tracker::config::ChoresConfig;
use chore_tracker::logging;
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = ChoresConfig::load().map(|c| c.log_level).unwrap_or_else(|_| "warn".to_string());
    logging::init(&level);

    let output = run(cli);

    for line in output.stdout {
        println!("{line}");
    }
    for msg in output.stderr {
        eprintln!("{msg}");
    }

    output.exit_code
}
