//! Endpoint resolution for S3 and EC2.

use reqwest::Url;

use crate::aws::sigv4::uri_encode_path;
use crate::error::UpstreamError;

/// How S3 object URLs are formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum S3Endpoint {
    /// `https://{bucket}.{regional host}/{key}` against AWS.
    VirtualHosted { region_host: String },
    /// `{scheme}://{authority}/{bucket}/{key}` against an override endpoint.
    PathStyle { scheme: String, authority: String },
}

impl S3Endpoint {
    #[must_use]
    pub fn aws(region: &str) -> Self {
        let region_host = if region == "us-east-1" {
            "s3.amazonaws.com".to_string()
        } else {
            format!("s3.{region}.amazonaws.com")
        };
        Self::VirtualHosted { region_host }
    }

    /// Parses an override such as `http://localhost:9000`.
    pub fn custom(endpoint: &str) -> Result<Self, UpstreamError> {
        let (scheme, authority) = split_origin(endpoint)?;
        Ok(Self::PathStyle { scheme, authority })
    }

    /// Picks the override when present, AWS otherwise.
    pub fn resolve(region: &str, endpoint: Option<&str>) -> Result<Self, UpstreamError> {
        endpoint.map_or_else(|| Ok(Self::aws(region)), Self::custom)
    }

    /// Value of the `host` header for requests against `bucket`.
    #[must_use]
    pub fn host(&self, bucket: &str) -> String {
        match self {
            Self::VirtualHosted { region_host } => format!("{bucket}.{region_host}"),
            Self::PathStyle { authority, .. } => authority.clone(),
        }
    }

    /// `scheme://host` for requests against `bucket`.
    #[must_use]
    pub fn origin(&self, bucket: &str) -> String {
        match self {
            Self::VirtualHosted { .. } => format!("https://{}", self.host(bucket)),
            Self::PathStyle { scheme, authority } => format!("{scheme}://{authority}"),
        }
    }

    /// Encoded request path for the bucket itself or one of its objects.
    #[must_use]
    pub fn canonical_uri(&self, bucket: &str, key: Option<&str>) -> String {
        let key = key.map(uri_encode_path);
        match (self, key) {
            (Self::VirtualHosted { .. }, Some(key)) => format!("/{key}"),
            (Self::VirtualHosted { .. }, None) => "/".to_string(),
            (Self::PathStyle { .. }, Some(key)) => format!("/{bucket}/{key}"),
            (Self::PathStyle { .. }, None) => format!("/{bucket}"),
        }
    }

    /// Form target for a presigned POST.
    #[must_use]
    pub fn post_url(&self, bucket: &str) -> String {
        match self {
            Self::VirtualHosted { .. } => format!("{}/", self.origin(bucket)),
            Self::PathStyle { .. } => format!("{}/{bucket}", self.origin(bucket)),
        }
    }
}

/// Where EC2 query API calls go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ec2Endpoint {
    pub scheme: String,
    pub authority: String,
}

impl Ec2Endpoint {
    #[must_use]
    pub fn aws(region: &str) -> Self {
        Self {
            scheme: "https".to_string(),
            authority: format!("ec2.{region}.amazonaws.com"),
        }
    }

    pub fn resolve(region: &str, endpoint: Option<&str>) -> Result<Self, UpstreamError> {
        match endpoint {
            None => Ok(Self::aws(region)),
            Some(raw) => {
                let (scheme, authority) = split_origin(raw)?;
                Ok(Self { scheme, authority })
            }
        }
    }

    #[must_use]
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.authority)
    }
}

fn split_origin(raw: &str) -> Result<(String, String), UpstreamError> {
    let url = Url::parse(raw).map_err(|e| UpstreamError::Unavailable(format!(
        "invalid endpoint '{raw}': {e}"
    )))?;
    let host = url
        .host_str()
        .ok_or_else(|| UpstreamError::Unavailable(format!("endpoint '{raw}' has no host")))?;
    let authority = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    Ok((url.scheme().to_string(), authority))
}
