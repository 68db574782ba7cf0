//! Hand-signed AWS adapters for the gateway ports.

pub mod ec2;
pub mod endpoint;
pub mod presign;
pub mod s3;
pub mod sigv4;
pub mod xml;

use crate::ports::Namespace;

/// Bucket names behind the two namespaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets {
    pub input: String,
    pub output: String,
}

impl Buckets {
    #[must_use]
    pub fn name(&self, namespace: Namespace) -> &str {
        match namespace {
            Namespace::Input => &self.input,
            Namespace::Output => &self.output,
        }
    }
}
