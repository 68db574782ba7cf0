//! Gateway error types.
//!
//! `UpstreamError` describes a failed call to S3 or EC2. `GatewayError` is
//! what a handler returns; it decides the HTTP status and renders the
//! `{ "error": ... }` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use imgrelay_common::{ErrorResponse, KeyError};
use thiserror::Error;

// ── Upstream errors ───────────────────────────────────────────────────────────

/// Failure talking to a storage, signing or compute backend.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("cannot parse {service} response: {reason}")]
    Parse {
        service: &'static str,
        reason: String,
    },

    #[error("{failed} of {requested} objects could not be deleted")]
    PartialDelete { failed: usize, requested: usize },

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("{0}")]
    Unavailable(String),
}

// ── Handler errors ────────────────────────────────────────────────────────────

/// Error returned by a gateway handler.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("credential service unavailable: {0}")]
    BrokerUnavailable(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl GatewayError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::BrokerUnavailable(_) | Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<KeyError> for GatewayError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::Empty => Self::InvalidRequest("Filename required".to_string()),
            other => Self::InvalidRequest(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
