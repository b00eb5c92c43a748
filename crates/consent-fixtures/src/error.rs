//! Error types for harness operations.
//!
//! Only two kinds of error ever escape a run: profile preparation failures and
//! configuration problems. Everything that goes wrong while checking a single
//! fixture is folded into that fixture's report instead, so the variants for
//! engine I/O below mostly surface through [`crate::CheckResult::Errored`].

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The main error type for harness operations.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// One-time profile preparation failed. Fatal to the whole run.
    #[error("profile preparation failed: {reason}")]
    ProfileSetup {
        /// Human-readable reason for the failure
        reason: String,
        /// Optional underlying error that caused the failure
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The engine bridge process could not be started.
    #[error("failed to spawn engine process '{program}': {source}")]
    EngineSpawn {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The engine bridge process did not finish in time.
    #[error("engine '{operation}' timed out after {timeout:?}")]
    EngineTimeout {
        /// `prepare` or `check`
        operation: &'static str,
        /// Deadline that was exceeded
        timeout: Duration,
    },

    /// The engine bridge process exited unsuccessfully.
    #[error("engine exited with status {code}: {stderr}")]
    EngineExit {
        /// Exit code, or -1 when killed by a signal
        code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// The engine produced output that does not follow the result contract.
    #[error("invalid engine output: {0}")]
    EngineOutput(String),

    /// A fixture name was requested that the catalog does not contain.
    #[error("unknown fixture '{0}'")]
    UnknownFixture(String),

    /// The fixtures root cannot be turned into `file://` URLs.
    #[error("invalid fixtures root: {}", .0.display())]
    InvalidFixtureRoot(PathBuf),

    /// Configuration could not be loaded or failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Generic I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for HarnessError {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A specialized Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
