use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body of `POST /api/get-upload-url` and `POST /api/check-output`.
///
/// `filename` is optional on the wire so a missing field reaches the handler
/// and is answered with a 400 instead of an extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilenameRequest {
    #[serde(default)]
    pub filename: Option<String>,
}

impl FilenameRequest {
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
        }
    }
}

/// A presigned POST: target URL plus the form fields to send before the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadUrlResponse {
    pub url: String,
    pub fields: BTreeMap<String, String>,
}

/// Result of probing the output bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutputResponse {
    pub exists: bool,
    #[serde(
        rename = "processedImageUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub processed_image_url: Option<String>,
}

impl CheckOutputResponse {
    #[must_use]
    pub fn missing() -> Self {
        Self {
            exists: false,
            processed_image_url: None,
        }
    }

    #[must_use]
    pub fn found(url: String) -> Self {
        Self {
            exists: true,
            processed_image_url: Some(url),
        }
    }

    /// The read URL, only when the object exists and a URL was issued.
    #[must_use]
    pub fn ready_url(&self) -> Option<&str> {
        if self.exists {
            self.processed_image_url.as_deref()
        } else {
            None
        }
    }
}

/// Body of `POST /api/clear-buckets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearBucketsResponse {
    pub cleared: bool,
}

/// Body of `GET /api/ec2-status`. `state` is the raw EC2 state name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceStatusResponse {
    #[serde(default)]
    pub state: Option<String>,
}

/// Error body returned with any non-2xx gateway response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
