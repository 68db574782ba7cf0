//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod ports;
pub mod services;

pub use ports::{
    ApiError, BlobUploader, ConfigStore, GatewayApi, ProgressReporter, UploadError,
};
pub use services::orchestrator::{Orchestrator, process_file};
