//! Concurrent fixture runner.
//!
//! A run prepares the shared profile once, then checks every selected fixture
//! on a `JoinSet` gated by a `Semaphore`. Permits are handed out in catalog
//! order, so fixtures start in that order but may finish in any order. Each
//! fixture's failure stays local to its own report.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::TestCase;
use crate::config::{BaseConfiguration, HarnessConfig};
use crate::engine::{CheckResult, DetectionEngine};
use crate::error::{HarnessError, Result};
use crate::oracle::{FixtureReport, FixtureState, Outcome, evaluate};

/// Worker budget for a host with `available` parallelism: half of it, at
/// least one.
#[must_use]
pub fn worker_budget(available: usize) -> usize {
    (available / 2).max(1)
}

/// Worker budget derived from this host's CPU count.
#[must_use]
pub fn default_worker_budget() -> usize {
    worker_budget(num_cpus::get())
}

/// Results of a full run, in catalog order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Identifier used in log lines for this run.
    pub run_id: Uuid,
    /// Concurrency ceiling the run used.
    pub worker_budget: usize,
    /// One report per fixture.
    pub fixtures: Vec<FixtureReport>,
    /// Wall time of the whole run, profile preparation included.
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl RunReport {
    /// Number of fixtures that passed.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(Outcome::Pass)
    }

    /// Number of fixtures that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(Outcome::Fail)
    }

    /// Number of sub-checks left unverified across all fixtures.
    #[must_use]
    pub fn not_verified(&self) -> usize {
        self.fixtures.iter().map(|f| f.not_verified().count()).sum()
    }

    /// True when no fixture failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// The report for a fixture by name.
    #[must_use]
    pub fn fixture(&self, name: &str) -> Option<&FixtureReport> {
        self.fixtures.iter().find(|f| f.name == name)
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.fixtures
            .iter()
            .filter(|f| f.outcome() == outcome)
            .count()
    }
}

fn serialize_millis<S: serde::Serializer>(
    value: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

/// Drives one engine over a set of fixtures.
#[derive(Clone)]
pub struct Runner {
    engine: Arc<dyn DetectionEngine>,
    base: BaseConfiguration,
    fixtures_root: PathBuf,
    worker_budget: usize,
    check_timeout: Option<Duration>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("base", &self.base)
            .field("fixtures_root", &self.fixtures_root)
            .field("worker_budget", &self.worker_budget)
            .field("check_timeout", &self.check_timeout)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Creates a runner with the host-derived worker budget and no deadline.
    ///
    /// `fixtures_root` must be absolute.
    pub fn new(
        engine: Arc<dyn DetectionEngine>,
        base: BaseConfiguration,
        fixtures_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            base,
            fixtures_root: fixtures_root.into(),
            worker_budget: default_worker_budget(),
            check_timeout: None,
        }
    }

    /// Creates a runner from loaded harness settings: their base
    /// configuration, absolute fixtures root, `jobs` override and per-check
    /// deadline.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the fixtures root cannot be made absolute.
    pub fn from_config(engine: Arc<dyn DetectionEngine>, config: &HarnessConfig) -> Result<Self> {
        let mut runner = Self::new(engine, config.base(), config.absolute_fixtures_root()?)
            .with_check_timeout(config.check_timeout());
        if let Some(jobs) = config.jobs {
            runner = runner.with_worker_budget(jobs);
        }
        Ok(runner)
    }

    /// Overrides the worker budget. Values below one are raised to one.
    #[must_use]
    pub fn with_worker_budget(mut self, worker_budget: usize) -> Self {
        self.worker_budget = worker_budget.max(1);
        self
    }

    /// Fails any single check that runs longer than `check_timeout`.
    #[must_use]
    pub fn with_check_timeout(mut self, check_timeout: Option<Duration>) -> Self {
        self.check_timeout = check_timeout;
        self
    }

    /// The configured worker budget.
    #[must_use]
    pub fn worker_budget(&self) -> usize {
        self.worker_budget
    }

    /// Prepares the profile, then checks every case.
    ///
    /// # Errors
    ///
    /// Returns `ProfileSetup` if preparation fails, in which case no fixture
    /// is checked, and `InvalidFixtureRoot` if fixture URLs cannot be built.
    /// Per-fixture failures never produce an error here.
    pub async fn run(&self, cases: &[TestCase]) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        // Resolve every URL up front so a bad root fails before any work.
        let planned = cases
            .iter()
            .map(|case| {
                let url = case.document_url(&self.fixtures_root)?;
                Ok((*case, self.base.for_page(url.to_string(), case.name)))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            %run_id,
            fixtures = planned.len(),
            workers = self.worker_budget,
            "preparing profile"
        );
        self.engine
            .prepare_profile(&self.base)
            .await
            .map_err(|e| match e {
                HarnessError::ProfileSetup { .. } => e,
                other => HarnessError::ProfileSetup {
                    reason: other.to_string(),
                    source: Some(Box::new(other)),
                },
            })?;

        let semaphore = Arc::new(Semaphore::new(self.worker_budget));
        let mut join_set = JoinSet::new();
        let mut task_names = HashMap::with_capacity(planned.len());

        for (index, (case, config)) in planned.into_iter().enumerate() {
            debug!(%run_id, fixture = case.name, state = %FixtureState::Pending, "fixture state");

            // Acquire before spawning so checks start in catalog order.
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .expect("semaphore closed unexpectedly");

            let engine = Arc::clone(&self.engine);
            let check_timeout = self.check_timeout;

            let handle = join_set.spawn(async move {
                let _permit = permit;
                let running = FixtureState::Running;
                debug!(%run_id, fixture = case.name, state = %running, "fixture state");

                let check_started = Instant::now();
                let result = match check_timeout {
                    Some(limit) => tokio::time::timeout(limit, engine.check_page(&config))
                        .await
                        .unwrap_or_else(|_| {
                            CheckResult::error(format!("check timed out after {limit:?}"))
                        }),
                    None => engine.check_page(&config).await,
                };

                let report = evaluate(&case, &result, check_started.elapsed());
                debug!(%run_id, fixture = case.name, state = %report.state(), "fixture state");
                (index, report)
            });
            task_names.insert(handle.id(), (index, case));
        }

        let mut slots: Vec<Option<FixtureReport>> = vec![None; task_names.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, report)) => {
                    if report.outcome() == Outcome::Fail {
                        warn!(%run_id, fixture = %report.name, "fixture failed");
                    }
                    slots[index] = Some(report);
                }
                Err(join_err) => {
                    let Some((index, case)) = task_names.get(&join_err.id()).copied() else {
                        warn!(%run_id, "untracked fixture task failed: {}", join_err);
                        continue;
                    };
                    warn!(%run_id, fixture = case.name, "fixture task panicked: {}", join_err);
                    let result = CheckResult::error(format!("check task panicked: {join_err}"));
                    slots[index] = Some(evaluate(&case, &result, Duration::ZERO));
                }
            }
        }

        let fixtures: Vec<FixtureReport> = slots.into_iter().flatten().collect();
        let report = RunReport {
            run_id,
            worker_budget: self.worker_budget,
            fixtures,
            elapsed: started.elapsed(),
        };

        info!(
            %run_id,
            passed = report.passed(),
            failed = report.failed(),
            not_verified = report.not_verified(),
            "run finished in {:?}",
            report.elapsed
        );

        Ok(report)
    }
}
