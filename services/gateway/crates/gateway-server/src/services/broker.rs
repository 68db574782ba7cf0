//! Credential broker: presigned upload forms for the input namespace.

use chrono::{DateTime, Utc};
use imgrelay_common::{ObjectKey, UploadUrlResponse};

use crate::error::GatewayError;
use crate::ports::{Namespace, Presigner};

/// Issues a write credential scoped to `filename` in the input namespace.
///
/// # Errors
///
/// `InvalidRequest` when `filename` is missing or empty (the presigner is not
/// called), `BrokerUnavailable` when signing fails.
pub fn request_write_credential(
    presigner: &dyn Presigner,
    filename: Option<&str>,
    now: DateTime<Utc>,
) -> Result<UploadUrlResponse, GatewayError> {
    let key = ObjectKey::parse(filename.unwrap_or_default())?;
    let credential = presigner
        .presign_post(Namespace::Input, &key, now)
        .map_err(|e| GatewayError::BrokerUnavailable(e.to_string()))?;
    tracing::debug!(key = %key, url = %credential.url, "issued write credential");
    Ok(credential)
}
