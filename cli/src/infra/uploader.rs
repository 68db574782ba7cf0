//! HTTP implementation of the `BlobUploader` port.

use std::time::Duration;

use imgrelay_common::UploadUrlResponse;
use imgrelay_common::policy::UPLOAD_FILE_FIELD;
use reqwest::multipart::{Form, Part};

use crate::application::ports::{BlobUploader, UploadError};

/// Whole-request budget for a storage transfer. Uploads are capped at
/// 10 MiB, so this only trips on a stalled connection.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends presigned POST forms and reads presigned GET URLs.
pub struct HttpUploader {
    client: reqwest::Client,
}

impl HttpUploader {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Uploader whose requests fail once `timeout` elapses.
    ///
    /// # Errors
    ///
    /// The HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("imgrelay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(client))
    }
}

/// Credential fields first, then the payload under `file`. Storage ignores
/// any field after the file.
#[must_use]
pub fn upload_form(credential: &UploadUrlResponse, filename: &str, payload: Vec<u8>) -> Form {
    let form = credential
        .fields
        .iter()
        .fold(Form::new(), |form, (name, value)| {
            form.text(name.clone(), value.clone())
        });
    form.part(
        UPLOAD_FILE_FIELD,
        Part::bytes(payload).file_name(filename.to_string()),
    )
}

async fn rejected(resp: reqwest::Response) -> UploadError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    UploadError::Rejected { status, body }
}

impl BlobUploader for HttpUploader {
    async fn upload(
        &self,
        credential: &UploadUrlResponse,
        filename: &str,
        payload: Vec<u8>,
    ) -> Result<(), UploadError> {
        let resp = self
            .client
            .post(&credential.url)
            .multipart(upload_form(credential, filename, payload))
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(rejected(resp).await)
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, UploadError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(rejected(resp).await);
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
