//! Conversion of harness errors into miette diagnostics for display.

use consent_fixtures::HarnessError;
use miette::Report;

/// Convert a fatal harness error into a miette report with a hint where one
/// helps.
pub fn to_miette(err: HarnessError) -> Report {
    match &err {
        HarnessError::ProfileSetup { .. } => miette::miette!(
            help = "check that BRAVE_BINARY points at a browser and the engine bridge is installed",
            "{}",
            err
        ),
        HarnessError::EngineSpawn { .. } => miette::miette!(
            help = "set [engine] program and args in consent-fixtures.toml",
            "{}",
            err
        ),
        HarnessError::UnknownFixture(_) => miette::miette!(
            help = "run `consent-fixtures list` to see the available fixtures",
            "{}",
            err
        ),
        HarnessError::InvalidFixtureRoot(_) => miette::miette!(
            help = "pass an existing directory with --fixtures-root",
            "{}",
            err
        ),
        _ => miette::miette!("{}", err),
    }
}
