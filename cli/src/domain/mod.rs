//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod task;

pub use config::{ImgrelayConfig, validate_config_key, validate_config_value};
pub use error::{ConfigError, WorkflowError};
pub use task::{PollCycle, PollPolicy, TaskStatus, UploadTask};
