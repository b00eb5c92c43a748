//! consent-fixtures - regression runner for the cookie-notice detection engine.
//!
//! Parses arguments, sets up logging and colors, then dispatches the command.
//! Exit codes: 0 when every fixture passed, 1 when any failed, 2 on a fatal
//! error such as bad configuration or a failed profile preparation.

use std::process::ExitCode;

use clap::Parser;
use consent_fixtures_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    let color = ui::init_colors(args.no_color);

    match commands::execute(args.command, color).await {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("{:?}", error::to_miette(err));
            ExitCode::from(2)
        }
    }
}
