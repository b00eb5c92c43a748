//! Command implementations.

use std::process::ExitCode;
use std::sync::Arc;

use consent_fixtures::{CATALOG, CommandEngine, HarnessConfig, Result, Runner, catalog};
use tracing::debug;

use crate::cli::{Command, OutputFormat, RunArgs};
use crate::ui;

/// How a successful invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every checked fixture passed.
    Passed,
    /// At least one fixture failed.
    Failed,
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Passed => ExitCode::SUCCESS,
            RunStatus::Failed => ExitCode::from(1),
        }
    }
}

/// Dispatches a parsed command.
///
/// # Errors
///
/// Returns fatal harness errors: bad configuration, unknown fixture names or
/// a failed profile preparation.
pub async fn execute(command: Command, color: bool) -> Result<RunStatus> {
    match command {
        Command::Run(args) => run(args, color).await,
        Command::List => {
            print!("{}", ui::render_catalog(CATALOG, color));
            Ok(RunStatus::Passed)
        }
    }
}

/// Loads configuration, applies command-line overrides and runs the
/// selected fixtures.
///
/// # Errors
///
/// See [`execute`].
pub async fn run(args: RunArgs, color: bool) -> Result<RunStatus> {
    let cases = catalog::select(&args.only)?;
    let config = load_config(&args)?;
    debug!(?config, fixtures = cases.len(), "loaded harness configuration");

    let engine = Arc::new(CommandEngine::from_config(&config));
    let report = Runner::from_config(engine, &config)?.run(&cases).await?;

    match args.format {
        OutputFormat::Text => print!("{}", ui::render_report(&report, color)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if report.is_success() {
        RunStatus::Passed
    } else {
        RunStatus::Failed
    })
}

fn load_config(args: &RunArgs) -> Result<HarnessConfig> {
    let mut config = HarnessConfig::load(args.config.as_deref())?;
    if let Some(root) = &args.fixtures_root {
        config.fixtures_root.clone_from(root);
    }
    if args.jobs.is_some() {
        config.jobs = args.jobs;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use consent_fixtures::HarnessError;
    use std::path::PathBuf;

    #[test]
    fn flags_override_loaded_config() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("harness.toml");
        std::fs::write(&file, "fixtures_root = \"from-file\"\njobs = 8\n").unwrap();

        let args = RunArgs {
            config: Some(file),
            fixtures_root: Some(PathBuf::from("from-flag")),
            jobs: Some(2),
            ..RunArgs::default()
        };
        let config = load_config(&args).unwrap();

        assert_eq!(config.fixtures_root, PathBuf::from("from-flag"));
        assert_eq!(config.jobs, Some(2));
    }

    #[test]
    fn zero_jobs_flag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("harness.toml");
        std::fs::write(&file, "").unwrap();

        let args = RunArgs {
            config: Some(file),
            jobs: Some(0),
            ..RunArgs::default()
        };

        assert!(matches!(load_config(&args), Err(HarnessError::Config(_))));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(ExitCode::from(RunStatus::Passed), ExitCode::SUCCESS);
        assert_eq!(ExitCode::from(RunStatus::Failed), ExitCode::from(1));
    }
}
