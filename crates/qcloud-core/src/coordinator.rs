//! Drives compile and backtest jobs to completion.
//!
//! A run is strictly sequential: compile, wait for the build, launch the
//! backtest, wait for completion, persist the final payload, then optionally
//! delete the remote backtest. Every wait honours the coordinator's
//! [`CancellationToken`].

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::endpoints::BacktestParameters;
use crate::envelope::Envelope;
use crate::error::{ApiError, Result};
use crate::models::{
    BacktestId, BacktestResponse, CompileId, CompileReadResponse, CompileState, ProjectId,
};
use crate::polling::PollPolicy;
use crate::ValidationError;

const COMPILE_WAIT: &str = "compile wait";
const BACKTEST_WAIT: &str = "backtest wait";
const RUN: &str = "backtest run";

/// Final `/backtests/read` payload, typed and raw.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSnapshot {
    pub response: BacktestResponse,
    pub envelope: Envelope,
}

/// Inputs of a full compile-and-backtest run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub project_id: ProjectId,
    pub test_name: String,
    pub output_dir: PathBuf,
    pub parameters: BacktestParameters,
    /// Delete the remote backtest once its result is on disk.
    pub delete_after: bool,
    pub compile_poll: PollPolicy,
    pub backtest_poll: PollPolicy,
}

impl RunRequest {
    pub fn new(project_id: ProjectId, test_name: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_id,
            test_name: test_name.into(),
            output_dir: output_dir.into(),
            parameters: BacktestParameters::new(),
            delete_after: true,
            compile_poll: PollPolicy::compile(),
            backtest_poll: PollPolicy::backtest(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_parameters(mut self, parameters: BacktestParameters) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Leaves the remote backtest in place after the run.
    pub fn keep_remote(mut self) -> Self {
        self.delete_after = false;
        self
    }

    pub fn with_compile_poll(mut self, policy: PollPolicy) -> Self {
        self.compile_poll = policy;
        self
    }

    pub fn with_backtest_poll(mut self, policy: PollPolicy) -> Self {
        self.backtest_poll = policy;
        self
    }

    /// The test name becomes a file name, so it must be a single path component.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let name = self.test_name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyTestName);
        }
        if name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(ValidationError::InvalidTestName {
                value: self.test_name.clone(),
            });
        }
        Ok(())
    }

    pub fn result_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.json", self.test_name.trim()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub compile_id: CompileId,
    pub backtest_id: BacktestId,
    pub result: BacktestResponse,
    pub result_path: PathBuf,
    /// Whether the remote backtest was deleted.
    pub deleted: bool,
}

#[derive(Clone)]
pub struct Coordinator {
    client: ApiClient,
    cancel: CancellationToken,
}

impl Coordinator {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Polls `/compile/read` until the job leaves `InQueue`.
    ///
    /// `BuildError` is a normal outcome here; callers decide what it means.
    pub async fn wait_for_compile(
        &self,
        project_id: ProjectId,
        compile_id: &CompileId,
        policy: PollPolicy,
    ) -> Result<CompileReadResponse> {
        let started = Instant::now();
        let mut polls = 0_u32;
        loop {
            let read = self
                .guarded(COMPILE_WAIT, self.client.compile().read(project_id, compile_id))
                .await?;
            polls += 1;

            if read.state.is_terminal() {
                info!(%compile_id, state = read.state.as_str(), polls, "compile settled");
                return Ok(read);
            }
            if policy.expired(started) {
                return Err(ApiError::Timeout {
                    operation: COMPILE_WAIT,
                    handle: compile_id.to_string(),
                    elapsed: started.elapsed(),
                });
            }
            debug!(%compile_id, polls, "compile still queued");
            self.pause(COMPILE_WAIT, policy).await?;
        }
    }

    /// Polls `/backtests/read` until the backtest reports `completed`.
    pub async fn wait_for_backtest(
        &self,
        project_id: ProjectId,
        backtest_id: &BacktestId,
        policy: PollPolicy,
    ) -> Result<BacktestSnapshot> {
        let started = Instant::now();
        let mut polls = 0_u32;
        loop {
            let envelope = self
                .guarded(
                    BACKTEST_WAIT,
                    self.client.backtests().read_envelope(project_id, backtest_id),
                )
                .await?;
            let response: BacktestResponse = self.client.decode("/backtests/read", &envelope).await?;
            polls += 1;

            if response.backtest.completed {
                info!(%backtest_id, status = response.backtest.status.as_str(), polls, "backtest completed");
                return Ok(BacktestSnapshot { response, envelope });
            }
            if policy.expired(started) {
                return Err(ApiError::Timeout {
                    operation: BACKTEST_WAIT,
                    handle: backtest_id.to_string(),
                    elapsed: started.elapsed(),
                });
            }
            debug!(
                %backtest_id,
                status = response.backtest.status.as_str(),
                progress = response.backtest.progress,
                "backtest running"
            );
            self.pause(BACKTEST_WAIT, policy).await?;
        }
    }

    /// Compiles the project, runs a backtest, writes `<output_dir>/<test_name>.json`.
    pub async fn run_backtest(&self, request: &RunRequest) -> Result<RunOutcome> {
        request.validate()?;
        let project_id = request.project_id;

        info!(project_id, "creating compile job");
        let created = self
            .guarded(RUN, self.client.compile().create(project_id))
            .await?;
        let compile = if created.state.is_terminal() {
            CompileReadResponse::from(created)
        } else {
            self.wait_for_compile(project_id, &created.compile_id, request.compile_poll)
                .await?
        };

        if compile.state == CompileState::BuildError {
            warn!(compile_id = %compile.compile_id, lines = compile.logs.len(), "build failed");
            return Err(ApiError::BuildFailed {
                compile_id: compile.compile_id.into(),
                logs: compile.logs,
            });
        }

        info!(compile_id = %compile.compile_id, test_name = %request.test_name, "creating backtest");
        let launched = self
            .guarded(
                RUN,
                self.client.backtests().create(
                    project_id,
                    &compile.compile_id,
                    request.test_name.trim(),
                    &request.parameters,
                ),
            )
            .await?;
        let backtest_id = launched.backtest.backtest_id;

        let snapshot = self
            .wait_for_backtest(project_id, &backtest_id, request.backtest_poll)
            .await?;
        if snapshot.response.backtest.failed() {
            warn!(
                %backtest_id,
                error = snapshot.response.backtest.error.as_deref().unwrap_or_default(),
                "backtest finished with an error"
            );
        }

        let result_path = request.result_path();
        write_result(&result_path, &snapshot.envelope).await?;
        info!(path = %result_path.display(), "wrote backtest result");

        let deleted = if request.delete_after {
            self.guarded(RUN, self.client.backtests().delete(project_id, &backtest_id))
                .await?;
            info!(%backtest_id, "deleted remote backtest");
            true
        } else {
            false
        };

        Ok(RunOutcome {
            compile_id: compile.compile_id,
            backtest_id,
            result: snapshot.response,
            result_path,
            deleted,
        })
    }

    async fn guarded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ApiError::Cancelled { operation }),
            result = call => result,
        }
    }

    async fn pause(&self, operation: &'static str, policy: PollPolicy) -> Result<()> {
        self.guarded(operation, async {
            tokio::time::sleep(policy.interval).await;
            Ok(())
        })
        .await
    }
}

async fn write_result(path: &Path, envelope: &Envelope) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = envelope.to_pretty_json().map_err(std::io::Error::other)?;
    tokio::fs::write(path, body).await?;
    Ok(())
}
