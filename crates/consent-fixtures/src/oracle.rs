//! Per-fixture assertions.
//!
//! Three families are checked for every fixture: the engine error check, the
//! notice signature/range check and the scroll-blocking check. Each produces
//! its own [`Verdict`] and none of them suppresses another.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::catalog::TestCase;
use crate::engine::CheckResult;
use crate::signature::canonicalize;

/// Outcome of one sub-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Verdict {
    /// The expectation held.
    Pass,
    /// The expectation did not hold; the message shows expected and actual.
    Fail(String),
    /// No assertion was made. Never counts as a pass.
    NotVerified(String),
}

impl Verdict {
    /// True only for [`Verdict::Pass`].
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// True only for [`Verdict::Fail`].
    #[must_use]
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }

    /// True only for [`Verdict::NotVerified`].
    #[must_use]
    pub fn is_not_verified(&self) -> bool {
        matches!(self, Self::NotVerified(_))
    }
}

/// Overall result of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No sub-check failed.
    Pass,
    /// The engine errored or a sub-check failed.
    Fail,
}

/// Lifecycle of a fixture within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureState {
    /// Waiting for a worker.
    Pending,
    /// Check in flight.
    Running,
    /// The engine returned a detection.
    Completed,
    /// The engine returned an error, timed out, or the task died.
    Errored,
}

impl fmt::Display for FixtureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Errored => "errored",
        })
    }
}

/// Everything reported for a single fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureReport {
    /// Fixture name.
    pub name: String,
    /// Engine failure, if the check could not run.
    pub engine_error: Option<String>,
    /// Notice signature and range check.
    pub notice: Verdict,
    /// Scroll-blocking check.
    pub scroll_blocking: Verdict,
    /// Wall time of the check.
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl FixtureReport {
    /// Fixture outcome: fail if the engine errored or any sub-check failed.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        let failed = self.engine_error.is_some()
            || self.notice.is_fail()
            || self.scroll_blocking.is_fail();
        if failed {
            Outcome::Fail
        } else {
            Outcome::Pass
        }
    }

    /// Terminal state of the fixture.
    #[must_use]
    pub fn state(&self) -> FixtureState {
        if self.engine_error.is_some() {
            FixtureState::Errored
        } else {
            FixtureState::Completed
        }
    }

    /// Sub-checks that were left unverified.
    pub fn not_verified(&self) -> impl Iterator<Item = &Verdict> {
        [&self.notice, &self.scroll_blocking]
            .into_iter()
            .filter(|verdict| verdict.is_not_verified())
    }
}

/// Evaluates a check result against a test case.
#[must_use]
pub fn evaluate(case: &TestCase, result: &CheckResult, elapsed: Duration) -> FixtureReport {
    let (engine_error, notice, scroll_blocking) = match result {
        CheckResult::Errored(reason) => (
            Some(format!("[{}] ERROR: {reason}", case.name)),
            Verdict::NotVerified("no detection result".to_string()),
            Verdict::NotVerified("no detection result".to_string()),
        ),
        CheckResult::Completed(detection) => {
            let canonical = canonicalize(detection);
            let actual_hash = canonical.signature.as_ref().map(|s| s.as_str());
            (
                None,
                check_notice(case, actual_hash, canonical.hideable_element_range),
                check_scroll_blocking(case, canonical.scroll_blocked),
            )
        }
    };

    FixtureReport {
        name: case.name.to_string(),
        engine_error,
        notice,
        scroll_blocking,
        elapsed,
    }
}

fn check_notice(
    case: &TestCase,
    actual_hash: Option<&str>,
    actual_range: Option<u32>,
) -> Verdict {
    let Some(expected) = case.expected_notice else {
        return match actual_hash {
            None => Verdict::Pass,
            Some(hash) => Verdict::Fail(format!(
                "unexpectedly found cookie notice with markup hash \"{hash}\""
            )),
        };
    };

    let mut problems = Vec::new();
    if actual_hash != Some(expected.hash) {
        problems.push(format!(
            "expected cookie notice hash \"{}\" did not match result \"{}\"",
            expected.hash,
            display_or_undefined(actual_hash)
        ));
    }
    if actual_range != Some(expected.range) {
        problems.push(format!(
            "expected cookie notice range \"{}\" did not match result \"{}\"",
            expected.range,
            display_or_undefined(actual_range)
        ));
    }

    if problems.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Fail(problems.join("; "))
    }
}

fn check_scroll_blocking(case: &TestCase, actual: bool) -> Verdict {
    match case.expected_scroll_blocked {
        None => Verdict::NotVerified("scroll blocking test ignored".to_string()),
        Some(expected) if expected == actual => Verdict::Pass,
        Some(expected) => Verdict::Fail(format!(
            "expected scroll blocking result [{expected}] did not match detected result [{actual}]"
        )),
    }
}

fn display_or_undefined<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "undefined".to_string(), |v| v.to_string())
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }
}
