//! Compute status reader.

use imgrelay_common::InstanceStatusResponse;

use crate::ports::InstanceInspector;

/// Raw run state of `instance_id`, or `null` on any failure.
pub async fn instance_status(
    inspector: &dyn InstanceInspector,
    instance_id: &str,
) -> InstanceStatusResponse {
    match inspector.instance_state(instance_id).await {
        Ok(state) => InstanceStatusResponse { state },
        Err(e) => {
            tracing::warn!(instance_id, error = %e, "cannot read instance state");
            InstanceStatusResponse { state: None }
        }
    }
}
