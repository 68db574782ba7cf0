//! Existence/fetch checker for the output namespace.

use chrono::{DateTime, Utc};
use imgrelay_common::{CheckOutputResponse, ObjectKey};

use crate::error::GatewayError;
use crate::ports::{Namespace, ObjectStore, Presigner};

/// Reports whether the processed object for `filename` exists and, if so,
/// a read URL for it.
///
/// Storage or signing failures are logged and reported as "not found"; the
/// caller cannot tell them apart from an object that is not ready yet.
///
/// # Errors
///
/// Only `InvalidRequest`, for a missing or empty `filename`.
pub async fn check_output(
    store: &dyn ObjectStore,
    presigner: &dyn Presigner,
    filename: Option<&str>,
    now: DateTime<Utc>,
) -> Result<CheckOutputResponse, GatewayError> {
    let key = ObjectKey::parse(filename.unwrap_or_default())?;

    match store.exists(Namespace::Output, &key).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(key = %key, "output not present yet");
            return Ok(CheckOutputResponse::missing());
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "existence check failed, reporting missing");
            return Ok(CheckOutputResponse::missing());
        }
    }

    match presigner.presign_get(Namespace::Output, &key, now) {
        Ok(url) => Ok(CheckOutputResponse::found(url)),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "cannot sign read url, reporting missing");
            Ok(CheckOutputResponse::missing())
        }
    }
}
