//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Run the cookie-notice detection fixtures against the engine
#[derive(Parser, Debug)]
#[command(
    name = "consent-fixtures",
    version,
    about = "Regression fixtures for cookie-notice and scroll-blocking detection",
    long_about = "Checks every fixture page with the detection engine and compares\n\
                  the result against the recorded notice signature, hideable range\n\
                  and scroll-blocking expectation."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows every fixture state transition and engine invocation.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all log output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check fixtures and report pass/fail per fixture
    Run(RunArgs),

    /// List catalog entries with their expectations
    List,
}

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Harness configuration file
    ///
    /// Defaults to `consent-fixtures.toml` in the working directory when it
    /// exists. `CONSENT_FIXTURES_*` variables override file values.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding one `<name>/index.html` per fixture
    #[arg(long, value_name = "DIR")]
    pub fixtures_root: Option<PathBuf>,

    /// Maximum number of concurrent page checks
    ///
    /// Defaults to half the available CPUs, at least one.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Only run these fixtures, by name
    #[arg(long, value_name = "NAME", num_args = 1..)]
    pub only: Vec<String>,

    /// Output format for the report
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Report output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per fixture plus a summary
    #[default]
    Text,
    /// The full run report as JSON on stdout
    Json,
}
