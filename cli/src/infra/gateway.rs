//! HTTP implementation of the `GatewayApi` port.

use std::time::Duration;

use imgrelay_common::routes::{CHECK_OUTPUT, CLEAR_BUCKETS, EC2_STATUS, GET_UPLOAD_URL};
use imgrelay_common::{
    CheckOutputResponse, ErrorResponse, FilenameRequest, InstanceStatusResponse,
    UploadUrlResponse,
};
use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::application::ports::{ApiError, GatewayApi};

/// Per-request timeout for gateway calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks JSON to the imgrelay gateway.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// # Errors
    ///
    /// The HTTP client cannot be built.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("imgrelay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn transport(e: &reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

/// Maps a non-2xx response to `ApiError::Status`, preferring the gateway's
/// `{ "error": ... }` message over the raw body.
async fn ensure_success(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let resp = ensure_success(resp).await?;
    let body = resp.text().await.map_err(|e| transport(&e))?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{e}: {body}")))
}

impl GatewayApi for HttpGateway {
    async fn request_upload_url(&self, filename: &str) -> Result<UploadUrlResponse, ApiError> {
        let resp = self
            .client
            .post(self.url(GET_UPLOAD_URL))
            .json(&FilenameRequest::new(filename))
            .send()
            .await
            .map_err(|e| transport(&e))?;
        decode(resp).await
    }

    async fn check_output(&self, filename: &str) -> Result<CheckOutputResponse, ApiError> {
        let resp = self
            .client
            .post(self.url(CHECK_OUTPUT))
            .json(&FilenameRequest::new(filename))
            .send()
            .await
            .map_err(|e| transport(&e))?;
        decode(resp).await
    }

    async fn clear_buckets(&self) -> Result<(), ApiError> {
        let resp = self
            .client
            .post(self.url(CLEAR_BUCKETS))
            .send()
            .await
            .map_err(|e| transport(&e))?;
        ensure_success(resp).await.map(|_| ())
    }

    async fn instance_status(&self) -> Result<InstanceStatusResponse, ApiError> {
        let resp = self
            .client
            .get(self.url(EC2_STATUS))
            .send()
            .await
            .map_err(|e| transport(&e))?;
        decode(resp).await
    }
}
