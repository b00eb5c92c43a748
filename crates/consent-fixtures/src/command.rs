//! Subprocess bridge to the external detection engine.
//!
//! The engine itself is a browser-driving tool outside this workspace.
//! `CommandEngine` talks to it through a small bridge program:
//!
//! ```text
//! <program> <args...> prepare   stdin: BaseConfiguration JSON   stdout: ignored
//! <program> <args...> check     stdin: CheckConfiguration JSON  stdout: check result JSON
//! ```
//!
//! The check result JSON has the fields `error`, `identified`, `markupInner`,
//! `hideableElementRange` and `scrollBlocked`. A non-zero exit status is a
//! failure in both operations, and stdout is read no further than 16 MB.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::{BaseConfiguration, CheckConfiguration, HarnessConfig};
use crate::engine::{CheckResult, DetectionEngine, RawCheckResult};
use crate::error::{HarnessError, Result};

/// Maximum accepted size of a check result (16 MB).
const MAX_OUTPUT_SIZE: usize = 16 * 1024 * 1024;

/// Default process deadline for profile preparation (5 minutes).
pub const DEFAULT_PREPARE_TIMEOUT: Duration = Duration::from_secs(300);

/// Default process deadline for a page check (2 minutes).
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(120);

/// A [`DetectionEngine`] backed by a bridge process per operation.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    prepare_timeout: Duration,
    check_timeout: Option<Duration>,
    output_limit: usize,
}

impl CommandEngine {
    /// Creates an engine running `program` with leading `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            prepare_timeout: DEFAULT_PREPARE_TIMEOUT,
            check_timeout: Some(DEFAULT_CHECK_TIMEOUT),
            output_limit: MAX_OUTPUT_SIZE,
        }
    }

    /// Creates an engine from the `engine` section of the harness config,
    /// with its check deadline taken from `check_timeout_secs`.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.engine.program.clone(), config.engine.args.clone())
            .with_check_timeout(config.check_timeout())
    }

    /// Sets the deadline for `prepare`.
    #[must_use]
    pub fn with_prepare_timeout(mut self, prepare_timeout: Duration) -> Self {
        self.prepare_timeout = prepare_timeout;
        self
    }

    /// Sets the deadline for each `check`; `None` lets checks run unbounded.
    #[must_use]
    pub fn with_check_timeout(mut self, check_timeout: Option<Duration>) -> Self {
        self.check_timeout = check_timeout;
        self
    }

    /// The deadline applied to each `check`.
    #[must_use]
    pub fn check_timeout(&self) -> Option<Duration> {
        self.check_timeout
    }

    /// Runs one bridge operation and returns its stdout.
    async fn invoke<T: Serialize>(
        &self,
        operation: &'static str,
        input: &T,
        deadline: Option<Duration>,
    ) -> Result<Vec<u8>> {
        let payload = serde_json::to_vec(input)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(operation)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(program = %self.program, operation, "spawning engine bridge");

        let mut child = cmd.spawn().map_err(|source| HarnessError::EngineSpawn {
            program: self.program.clone(),
            source,
        })?;

        let (Some(mut stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(HarnessError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "failed to capture engine stdio",
            )));
        };

        // A bridge that exits without reading its input closes the pipe early;
        // its exit status is what gets reported.
        if let Err(e) = stdin.write_all(&payload).await {
            warn!(operation, "engine stdin closed early: {}", e);
        }
        drop(stdin);

        let limit = self.output_limit;
        // One byte past the limit is enough to detect an oversized result.
        let read_limit = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Err(e) = stderr.take(read_limit).read_to_end(&mut buf).await {
                debug!("engine stderr unreadable: {}", e);
            }
            buf
        });

        let collect = async move {
            let mut out = Vec::new();
            stdout.take(read_limit).read_to_end(&mut out).await?;

            // Bail before waiting; dropping the child kills it.
            if out.len() > limit {
                return Err(HarnessError::EngineOutput(format!(
                    "output exceeds the {limit} byte limit"
                )));
            }

            let status = child.wait().await?;
            let err = stderr_task.await.unwrap_or_default();
            Ok::<_, HarnessError>((status, out, err))
        };

        let (status, stdout, stderr) = match deadline {
            Some(deadline) => timeout(deadline, collect)
                .await
                .map_err(|_| HarnessError::EngineTimeout {
                    operation,
                    timeout: deadline,
                })??,
            None => collect.await?,
        };

        if !status.success() {
            return Err(HarnessError::EngineExit {
                code: status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(stdout)
    }

    async fn try_check(&self, config: &CheckConfiguration) -> Result<CheckResult> {
        let stdout = self.invoke("check", config, self.check_timeout).await?;
        let raw: RawCheckResult = serde_json::from_slice(&stdout)
            .map_err(|e| HarnessError::EngineOutput(format!("malformed check result: {e}")))?;
        CheckResult::try_from(raw)
    }
}

#[async_trait]
impl DetectionEngine for CommandEngine {
    async fn prepare_profile(&self, base: &BaseConfiguration) -> Result<()> {
        self.invoke("prepare", base, Some(self.prepare_timeout))
            .await
            .map(|_| ())
            .map_err(|e| HarnessError::ProfileSetup {
                reason: e.to_string(),
                source: Some(Box::new(e)),
            })
    }

    async fn check_page(&self, config: &CheckConfiguration) -> CheckResult {
        self.try_check(config)
            .await
            .unwrap_or_else(CheckResult::error)
    }
}
