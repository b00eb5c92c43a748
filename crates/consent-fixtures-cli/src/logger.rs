//! Logging setup for the CLI.
//!
//! Logs go to stderr so `run --format json` keeps stdout machine-readable.
//!
//! Filter precedence:
//! 1. `--verbose`: DEBUG for the harness crates
//! 2. `--quiet`: ERROR only
//! 3. `RUST_LOG`
//! 4. INFO for the harness crates

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "consent_fixtures=debug,consent_fixtures_cli=debug";
const QUIET_FILTER: &str = "consent_fixtures=error,consent_fixtures_cli=error";
const DEFAULT_FILTER: &str = "consent_fixtures=info,consent_fixtures_cli=info";

/// Initialize the global tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter(verbose, quiet))
        .with(fmt_layer)
        .init();
}

fn filter(verbose: bool, quiet: bool) -> EnvFilter {
    match directives(verbose, quiet) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Fixed directives for the flag-selected levels; `None` defers to `RUST_LOG`.
fn directives(verbose: bool, quiet: bool) -> Option<&'static str> {
    if verbose {
        Some(VERBOSE_FILTER)
    } else if quiet {
        Some(QUIET_FILTER)
    } else {
        None
    }
}
