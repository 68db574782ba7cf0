//! Typed domain error enums.
//!
//! No I/O here. All error types implement `thiserror::Error` and convert to
//! `anyhow::Error` via the `?` operator.

use imgrelay_common::RunState;
use thiserror::Error;

// ── Workflow errors ───────────────────────────────────────────────────────────

/// Why an upload was refused or did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("No file selected.")]
    NoFileSelected,

    #[error("Compute instance is {0}; uploads need it running. Check with 'imgrelay status'.")]
    InstanceNotRunning(RunState),

    #[error("An upload is already in progress.")]
    Busy,

    #[error("This run already finished ({0}). Select the file again to start over.")]
    AlreadyFinished(String),

    #[error("Upload credential refused: {0}")]
    CredentialRejected(String),

    #[error("Credential service unavailable: {0}")]
    CredentialUnavailable(String),

    #[error("Storage rejected the upload (HTTP {status}): {body}")]
    UploadRejected { status: u16, body: String },

    #[error("Upload failed: {0}")]
    UploadTransport(String),

    #[error("No processed image after {waited_ms} ms.")]
    TimedOut { waited_ms: u64 },

    #[error("Run was reset before it finished.")]
    Cancelled,
}

impl WorkflowError {
    /// Stable identifier for `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFileSelected => "NO_FILE_SELECTED",
            Self::InstanceNotRunning(_) => "INSTANCE_NOT_RUNNING",
            Self::Busy => "BUSY",
            Self::AlreadyFinished(_) => "ALREADY_FINISHED",
            Self::CredentialRejected(_) => "CREDENTIAL_REJECTED",
            Self::CredentialUnavailable(_) => "CREDENTIAL_UNAVAILABLE",
            Self::UploadRejected { .. } => "UPLOAD_REJECTED",
            Self::UploadTransport(_) => "UPLOAD_TRANSPORT",
            Self::TimedOut { .. } => "TIMED_OUT",
            Self::Cancelled => "CANCELLED",
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
