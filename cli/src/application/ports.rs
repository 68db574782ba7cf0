//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared wire types,
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::PathBuf;

use anyhow::Result;
use imgrelay_common::{CheckOutputResponse, InstanceStatusResponse, UploadUrlResponse};
use thiserror::Error;

use crate::domain::ImgrelayConfig;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure of a gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The gateway answered with a non-2xx status.
    #[error("gateway returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// No usable response: connection, TLS or timeout failure.
    #[error("cannot reach gateway: {0}")]
    Transport(String),

    /// A 2xx response whose body did not match the expected shape.
    #[error("unexpected gateway response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Transport failures and 5xx are worth one more attempt; 4xx are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

/// Failure of the direct upload to storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("storage returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("{0}")]
    Transport(String),
}

// ── Gateway Port ──────────────────────────────────────────────────────────────

/// The four gateway endpoints.
#[allow(async_fn_in_trait)]
pub trait GatewayApi {
    /// Presigned POST credential for `filename` in the input namespace.
    async fn request_upload_url(&self, filename: &str) -> Result<UploadUrlResponse, ApiError>;
    /// Whether the processed object exists, with a read URL when it does.
    async fn check_output(&self, filename: &str) -> Result<CheckOutputResponse, ApiError>;
    /// Wipe both namespaces.
    async fn clear_buckets(&self) -> Result<(), ApiError>;
    /// Raw run state of the compute instance.
    async fn instance_status(&self) -> Result<InstanceStatusResponse, ApiError>;
}

// ── Storage Port ──────────────────────────────────────────────────────────────

/// Direct transfers against presigned storage URLs.
#[allow(async_fn_in_trait)]
pub trait BlobUploader {
    /// Multipart POST of `payload` using the credential's form fields.
    async fn upload(
        &self,
        credential: &UploadUrlResponse,
        filename: &str,
        payload: Vec<u8>,
    ) -> Result<(), UploadError>;
    /// GET of a presigned read URL.
    async fn download(&self, url: &str) -> Result<Vec<u8>, UploadError>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load configuration, returning defaults when no file exists.
    fn load(&self) -> Result<ImgrelayConfig>;
    /// Persist configuration.
    fn save(&self, config: &ImgrelayConfig) -> Result<()>;
    /// Path of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
