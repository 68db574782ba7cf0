//! Application service: the upload/poll orchestrator.
//!
//! Owns the single `UploadTask`, the last known instance state and the
//! active poll cycle. Every state change goes through this type.
//!
//! Each reset bumps `generation` and cancels the current token. Work that
//! started under an older generation finishes its network call but never
//! writes its result back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use imgrelay_common::{RunState, UploadUrlResponse};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ApiError, BlobUploader, GatewayApi, ProgressReporter, UploadError};
use crate::domain::{PollCycle, PollPolicy, TaskStatus, UploadTask, WorkflowError};

#[derive(Debug, Default)]
struct Inner {
    task: Option<UploadTask>,
    instance: RunState,
}

pub struct Orchestrator<G, U> {
    gateway: G,
    uploader: U,
    policy: PollPolicy,
    inner: Mutex<Inner>,
    generation: AtomicU64,
    cancel: Mutex<CancellationToken>,
}

impl<G: GatewayApi, U: BlobUploader> Orchestrator<G, U> {
    #[must_use]
    pub fn new(gateway: G, uploader: U, policy: PollPolicy) -> Self {
        Self {
            gateway,
            uploader,
            policy,
            inner: Mutex::new(Inner::default()),
            generation: AtomicU64::new(0),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Sets the task status unless a reset happened since `generation`.
    fn transition(&self, generation: u64, status: TaskStatus) -> bool {
        let mut inner = self.lock();
        if !self.is_current(generation) {
            tracing::debug!(generation, next = %status, "discarding stale result");
            return false;
        }
        match inner.task.as_mut() {
            Some(task) => {
                tracing::debug!(from = %task.status, to = %status, "task transition");
                task.status = status;
                true
            }
            None => false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Status of the current task, `Idle` when there is none.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        status_of(&self.lock())
    }

    /// File name of the current task.
    #[must_use]
    pub fn filename(&self) -> Option<String> {
        self.lock().task.as_ref().map(|t| t.filename.clone())
    }

    /// Last instance state seen by `refresh_status`.
    #[must_use]
    pub fn instance_state(&self) -> RunState {
        self.lock().instance
    }

    #[must_use]
    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    /// Re-reads the compute instance state. Failures read as `Unknown`.
    pub async fn refresh_status(&self) -> RunState {
        let state = match self.gateway.instance_status().await {
            Ok(resp) => RunState::from_reported(resp.state.as_deref()),
            Err(e) => {
                tracing::warn!(error = %e, "cannot read instance status");
                RunState::Unknown
            }
        };
        self.lock().instance = state;
        state
    }

    /// Stops the active poll cycle, if any. Results still in flight are
    /// discarded when they arrive. Only `reset` calls this, so a cancelled
    /// cycle never leaves the task parked in `Waiting`.
    fn cancel_poll(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut token = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        token.cancel();
        *token = CancellationToken::new();
        tracing::debug!(generation, "poll cancelled");
    }

    /// Back to `Idle`: cancels polling, drops the task and wipes both
    /// namespaces. A wipe failure is logged and otherwise ignored.
    pub async fn reset(&self) {
        self.cancel_poll();
        self.lock().task = None;
        if let Err(e) = self.gateway.clear_buckets().await {
            tracing::warn!(error = %e, "namespace reset failed");
        }
    }

    /// Resets, then makes `filename` the current task in `Ready`.
    pub async fn select_file(&self, filename: impl Into<String>, payload: Vec<u8>) {
        self.reset().await;
        let task = UploadTask::new(filename, payload);
        tracing::debug!(filename = %task.filename, bytes = task.payload.len(), "file selected");
        self.lock().task = Some(task);
    }

    /// Uploads the current file and moves it to `Waiting`.
    ///
    /// # Errors
    ///
    /// `NoFileSelected`, `Busy`, `AlreadyFinished` and `InstanceNotRunning`
    /// refuse the call without touching any state. Credential and upload
    /// failures move the task to `Failed` and are returned as well.
    pub async fn start_upload(&self) -> Result<(), WorkflowError> {
        let generation = self.generation.load(Ordering::SeqCst);
        let (filename, payload) = {
            let mut inner = self.lock();
            let instance = inner.instance;
            let task = inner.task.as_mut().ok_or(WorkflowError::NoFileSelected)?;
            if task.status.is_busy() {
                return Err(WorkflowError::Busy);
            }
            if task.status.is_terminal() {
                return Err(WorkflowError::AlreadyFinished(task.status.to_string()));
            }
            if !instance.is_running() {
                return Err(WorkflowError::InstanceNotRunning(instance));
            }
            task.status = TaskStatus::Uploading;
            (task.filename.clone(), task.payload.clone())
        };

        let credential = match self.request_credential(&filename).await {
            Ok(credential) => credential,
            Err(e) => return Err(self.fail(generation, e)),
        };

        if let Err(e) = self.uploader.upload(&credential, &filename, payload).await {
            let err = match e {
                UploadError::Rejected { status, body } => {
                    WorkflowError::UploadRejected { status, body }
                }
                UploadError::Transport(msg) => WorkflowError::UploadTransport(msg),
            };
            return Err(self.fail(generation, err));
        }

        tracing::debug!(filename = %filename, "upload accepted");
        self.transition(generation, TaskStatus::Waiting);
        Ok(())
    }

    fn fail(&self, generation: u64, err: WorkflowError) -> WorkflowError {
        self.transition(
            generation,
            TaskStatus::Failed {
                message: err.to_string(),
            },
        );
        err
    }

    /// One broker call, repeated once on a transport error or 5xx.
    async fn request_credential(&self, filename: &str) -> Result<UploadUrlResponse, WorkflowError> {
        let first = self.gateway.request_upload_url(filename).await;
        let result = match first {
            Err(e) if e.is_retryable() => {
                tracing::warn!(error = %e, "credential request failed, retrying once");
                self.gateway.request_upload_url(filename).await
            }
            other => other,
        };
        result.map_err(|e| match e {
            ApiError::Status { status, message } if (400..500).contains(&status) => {
                WorkflowError::CredentialRejected(message)
            }
            other => WorkflowError::CredentialUnavailable(other.to_string()),
        })
    }

    /// Polls for the processed object until it exists, the budget runs out
    /// or the cycle is cancelled. Returns the status the task ends up in.
    ///
    /// Does nothing unless the task is `Waiting`.
    pub async fn wait_for_output(&self) -> TaskStatus {
        let generation = self.generation.load(Ordering::SeqCst);
        let token = self
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let filename = {
            let inner = self.lock();
            match inner.task.as_ref() {
                Some(task) if task.status == TaskStatus::Waiting => task.filename.clone(),
                _ => return status_of(&inner),
            }
        };

        let mut cycle = PollCycle::new(self.policy);
        let mut ticker = tokio::time::interval_at(
            Instant::now() + self.policy.interval,
            self.policy.interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = token.cancelled() => {
                    tracing::debug!(filename = %filename, "poll cycle cancelled");
                    return self.status();
                }
                _ = ticker.tick() => {}
            }

            let exhausted = cycle.tick();
            match self.gateway.check_output(&filename).await {
                Ok(resp) => {
                    if let Some(url) = resp.ready_url() {
                        let url = url.to_string();
                        self.transition(generation, TaskStatus::Done { url });
                        return self.status();
                    }
                    tracing::debug!(
                        filename = %filename,
                        remaining_ms = cycle.remaining().as_millis(),
                        "output not ready"
                    );
                }
                Err(e) => {
                    tracing::debug!(filename = %filename, error = %e, "output check failed");
                }
            }

            if !self.is_current(generation) {
                return self.status();
            }
            if exhausted {
                self.transition(generation, TaskStatus::TimedOut);
                return self.status();
            }
        }
    }
}

fn status_of(inner: &Inner) -> TaskStatus {
    inner
        .task
        .as_ref()
        .map(|t| t.status.clone())
        .unwrap_or_default()
}

// ── Use-case ─────────────────────────────────────────────────────────────────

/// Full run for one file: select, check the instance, upload, poll.
///
/// Returns the read URL of the processed image.
///
/// # Errors
///
/// Any refusal or failure from `start_upload`, `TimedOut` when the budget
/// runs out, `Cancelled` when a reset interrupts the poll.
pub async fn process_file<G: GatewayApi, U: BlobUploader>(
    orchestrator: &Orchestrator<G, U>,
    reporter: &impl ProgressReporter,
    filename: &str,
    payload: Vec<u8>,
) -> Result<String, WorkflowError> {
    reporter.step("Clearing previous results...");
    orchestrator.select_file(filename, payload).await;

    reporter.step("Checking compute instance...");
    let state = orchestrator.refresh_status().await;
    if !state.is_running() {
        reporter.warn(&format!("Compute instance is {state}"));
    }

    reporter.step(&format!("Uploading {filename}..."));
    orchestrator.start_upload().await?;
    reporter.success("Upload complete");

    reporter.step("Waiting for processed image...");
    match orchestrator.wait_for_output().await {
        TaskStatus::Done { url } => {
            reporter.success("Processed image ready");
            Ok(url)
        }
        TaskStatus::TimedOut => Err(WorkflowError::TimedOut {
            waited_ms: u64::try_from(orchestrator.policy().timeout.as_millis())
                .unwrap_or(u64::MAX),
        }),
        _ => Err(WorkflowError::Cancelled),
    }
}
