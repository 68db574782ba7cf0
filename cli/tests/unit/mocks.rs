//! Shared mock infrastructure for unit tests.
//!
//! Provides scripted [`GatewayApi`] and [`BlobUploader`] implementations so
//! each test file doesn't have to re-define the same boilerplate. Counters
//! live behind an `Arc` so a test keeps a handle after the mock moves into
//! the orchestrator.

#![allow(clippy::expect_used)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use imgrelay_cli::application::{ApiError, BlobUploader, GatewayApi, UploadError};
use imgrelay_common::{CheckOutputResponse, InstanceStatusResponse, UploadUrlResponse};

pub const READ_URL: &str = "https://output.storage.test/cat.png?X-Amz-Signature=abc";

pub fn credential(filename: &str) -> UploadUrlResponse {
    let mut fields = BTreeMap::new();
    fields.insert("key".to_string(), filename.to_string());
    fields.insert("policy".to_string(), "eyJ9".to_string());
    UploadUrlResponse {
        url: "https://input.storage.test/".to_string(),
        fields,
    }
}

// ── Call counters ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Calls {
    pub upload_url: AtomicUsize,
    pub check: AtomicUsize,
    pub clear: AtomicUsize,
    pub status: AtomicUsize,
}

impl Calls {
    pub fn upload_url(&self) -> usize {
        self.upload_url.load(Ordering::SeqCst)
    }
    pub fn check(&self) -> usize {
        self.check.load(Ordering::SeqCst)
    }
    pub fn clear(&self) -> usize {
        self.clear.load(Ordering::SeqCst)
    }
    pub fn status(&self) -> usize {
        self.status.load(Ordering::SeqCst)
    }
}

// ── Mock: gateway ─────────────────────────────────────────────────────────────

/// Gateway whose answers are fixed up front.
pub struct MockGateway {
    instance: Result<Option<String>, ApiError>,
    credential_errors: Mutex<VecDeque<ApiError>>,
    ready_on_check: Option<usize>,
    failing_checks: Vec<usize>,
    all_checks_fail: bool,
    check_delay: Duration,
    clear_fails: bool,
    pub calls: Arc<Calls>,
}

impl MockGateway {
    /// Instance reports `state`; output never appears.
    pub fn with_state(state: &str) -> Self {
        Self {
            instance: Ok(Some(state.to_string())),
            credential_errors: Mutex::new(VecDeque::new()),
            ready_on_check: None,
            failing_checks: Vec::new(),
            all_checks_fail: false,
            check_delay: Duration::ZERO,
            clear_fails: false,
            calls: Arc::new(Calls::default()),
        }
    }

    pub fn running() -> Self {
        Self::with_state("running")
    }

    /// Output exists from the `n`th check on (1-based).
    pub fn ready_on_check(mut self, n: usize) -> Self {
        self.ready_on_check = Some(n);
        self
    }

    /// The listed checks (1-based) fail with a transport error.
    pub fn failing_checks(mut self, checks: &[usize]) -> Self {
        self.failing_checks = checks.to_vec();
        self
    }

    pub fn all_checks_fail(mut self) -> Self {
        self.all_checks_fail = true;
        self
    }

    /// Each check takes `delay` before answering.
    pub fn check_delay(mut self, delay: Duration) -> Self {
        self.check_delay = delay;
        self
    }

    /// The next credential requests fail with these errors, in order.
    pub fn credential_errors(self, errors: Vec<ApiError>) -> Self {
        *self.credential_errors.lock().expect("lock") = errors.into();
        self
    }

    pub fn status_unreachable(mut self) -> Self {
        self.instance = Err(ApiError::Transport("connection refused".to_string()));
        self
    }

    pub fn clear_fails(mut self) -> Self {
        self.clear_fails = true;
        self
    }

    /// Handle on the counters that outlives the move into an orchestrator.
    pub fn counters(&self) -> Arc<Calls> {
        Arc::clone(&self.calls)
    }
}

impl GatewayApi for MockGateway {
    async fn request_upload_url(&self, filename: &str) -> Result<UploadUrlResponse, ApiError> {
        self.calls.upload_url.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.credential_errors.lock().expect("lock").pop_front() {
            return Err(err);
        }
        Ok(credential(filename))
    }

    async fn check_output(&self, _filename: &str) -> Result<CheckOutputResponse, ApiError> {
        let n = self.calls.check.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.check_delay.is_zero() {
            tokio::time::sleep(self.check_delay).await;
        }
        if self.all_checks_fail || self.failing_checks.contains(&n) {
            return Err(ApiError::Transport("connection reset".to_string()));
        }
        match self.ready_on_check {
            Some(ready) if n >= ready => Ok(CheckOutputResponse::found(READ_URL.to_string())),
            _ => Ok(CheckOutputResponse::missing()),
        }
    }

    async fn clear_buckets(&self) -> Result<(), ApiError> {
        self.calls.clear.fetch_add(1, Ordering::SeqCst);
        if self.clear_fails {
            return Err(ApiError::Status {
                status: 502,
                message: "Failed to clear buckets".to_string(),
            });
        }
        Ok(())
    }

    async fn instance_status(&self) -> Result<InstanceStatusResponse, ApiError> {
        self.calls.status.fetch_add(1, Ordering::SeqCst);
        self.instance
            .clone()
            .map(|state| InstanceStatusResponse { state })
    }
}

// ── Mock: storage ─────────────────────────────────────────────────────────────

/// Records uploads; answers with a fixed result.
pub struct MockUploader {
    result: Result<(), UploadError>,
    pub uploads: Arc<Mutex<Vec<(String, usize)>>>,
}

impl MockUploader {
    pub fn accepting() -> Self {
        Self {
            result: Ok(()),
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn rejecting(status: u16, body: &str) -> Self {
        Self {
            result: Err(UploadError::Rejected {
                status,
                body: body.to_string(),
            }),
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl BlobUploader for MockUploader {
    async fn upload(
        &self,
        credential: &UploadUrlResponse,
        filename: &str,
        payload: Vec<u8>,
    ) -> Result<(), UploadError> {
        assert_eq!(
            credential.fields.get("key").map(String::as_str),
            Some(filename),
            "credential must be for the uploaded file"
        );
        self.uploads
            .lock()
            .expect("lock")
            .push((filename.to_string(), payload.len()));
        self.result.clone()
    }

    async fn download(&self, _url: &str) -> Result<Vec<u8>, UploadError> {
        Err(UploadError::Transport("not expected in this test".to_string()))
    }
}

// ── Mock: progress ────────────────────────────────────────────────────────────

/// Collects progress messages.
#[derive(Default)]
pub struct RecordingReporter {
    pub messages: Mutex<Vec<String>>,
}

impl imgrelay_cli::application::ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("step:{message}"));
    }
    fn success(&self, message: &str) {
        self.messages
            .lock()
            .expect("lock")
            .push(format!("success:{message}"));
    }
    fn warn(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("warn:{message}"));
    }
}
