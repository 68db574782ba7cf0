//! Namespace reset: empties the input and then the output namespace.

use crate::error::GatewayError;
use crate::ports::{Namespace, ObjectStore};

/// Deletes every key on the first listing page of each namespace.
///
/// Empty namespaces are skipped, so calling this twice in a row is a no-op
/// the second time. Keys beyond the first page are left in place.
///
/// # Errors
///
/// `UpstreamUnavailable` on the first list or delete failure; the remaining
/// namespaces are not attempted.
pub async fn reset_all(store: &dyn ObjectStore) -> Result<(), GatewayError> {
    for namespace in Namespace::ALL {
        let keys = store.list_keys(namespace).await.map_err(|e| {
            GatewayError::UpstreamUnavailable(format!("list {}: {e}", namespace.as_str()))
        })?;
        if keys.is_empty() {
            tracing::debug!(namespace = namespace.as_str(), "namespace already empty");
            continue;
        }
        store.delete_keys(namespace, &keys).await.map_err(|e| {
            GatewayError::UpstreamUnavailable(format!("delete {}: {e}", namespace.as_str()))
        })?;
        tracing::info!(namespace = namespace.as_str(), deleted = keys.len(), "namespace cleared");
    }
    Ok(())
}
