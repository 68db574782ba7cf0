//! Seams between the gateway services and the AWS adapters.
//!
//! The services in `crate::services` only talk to these traits, so router
//! tests can run against the in-memory implementations in `crate::memory`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use imgrelay_common::{ObjectKey, UploadUrlResponse};

use crate::error::UpstreamError;

/// One of the two buckets the gateway manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Input,
    Output,
}

impl Namespace {
    pub const ALL: [Self; 2] = [Self::Input, Self::Output];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// Object storage operations used by the checker and the reset.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// `Ok(false)` means the object is absent; any other failure is an error.
    async fn exists(&self, namespace: Namespace, key: &ObjectKey) -> Result<bool, UpstreamError>;

    /// Keys on the first listing page of `namespace`.
    async fn list_keys(&self, namespace: Namespace) -> Result<Vec<String>, UpstreamError>;

    /// Deletes `keys` in a single batch. Callers never pass an empty slice.
    async fn delete_keys(&self, namespace: Namespace, keys: &[String])
    -> Result<(), UpstreamError>;
}

/// Issues short-lived credentials. Pure signing, no I/O.
pub trait Presigner: Send + Sync {
    /// Presigned POST form scoped to exactly `key` in `namespace`.
    fn presign_post(
        &self,
        namespace: Namespace,
        key: &ObjectKey,
        now: DateTime<Utc>,
    ) -> Result<UploadUrlResponse, UpstreamError>;

    /// Presigned GET URL for `key` in `namespace`.
    fn presign_get(
        &self,
        namespace: Namespace,
        key: &ObjectKey,
        now: DateTime<Utc>,
    ) -> Result<String, UpstreamError>;
}

/// Reads the run state of a compute instance.
#[async_trait]
pub trait InstanceInspector: Send + Sync {
    /// Raw state name as reported by the provider, `None` when the instance
    /// is not part of the response.
    async fn instance_state(&self, instance_id: &str) -> Result<Option<String>, UpstreamError>;
}
