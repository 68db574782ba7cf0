//! Validated object keys.
//!
//! The user-supplied file name is used verbatim as the key in both the input
//! and the output bucket, so the rules are the storage layer's own
//! (non-empty, at most 1024 bytes of UTF-8) plus no `.`/`..` path segments,
//! which URL normalisation would rewrite after the request is signed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum key length accepted by S3-compatible storage.
pub const MAX_KEY_BYTES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("filename required")]
    Empty,

    #[error("filename too long: {0} bytes (max {MAX_KEY_BYTES})")]
    TooLong(usize),

    #[error("filename must not contain '.' or '..' path segments")]
    DotSegment,
}

fn has_dot_segment(raw: &str) -> bool {
    raw.split('/').any(|segment| segment == "." || segment == "..")
}

/// An object key that satisfies the storage constraints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validates `raw` and wraps it.
    pub fn parse(raw: impl Into<String>) -> Result<Self, KeyError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(KeyError::Empty);
        }
        if raw.len() > MAX_KEY_BYTES {
            return Err(KeyError::TooLong(raw.len()));
        }
        if has_dot_segment(&raw) {
            return Err(KeyError::DotSegment);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
