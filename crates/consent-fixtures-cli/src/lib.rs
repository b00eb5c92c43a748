//! Command-line interface for the consent-fixtures harness.
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - `run` and `list`
//! - [`error`] - conversion of harness errors into miette diagnostics
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - colored report output

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;
