//! HTTP surface of the gateway.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use imgrelay_common::routes::{CHECK_OUTPUT, CLEAR_BUCKETS, EC2_STATUS, GET_UPLOAD_URL, HEALTHZ};
use imgrelay_common::{
    CheckOutputResponse, ClearBucketsResponse, FilenameRequest, InstanceStatusResponse,
    UploadUrlResponse,
};
use tower_http::trace::TraceLayer;

use crate::error::GatewayError;
use crate::services::{broker, checker, compute, reset};
use crate::state::AppState;

/// Builds the gateway router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(GET_UPLOAD_URL, post(get_upload_url))
        .route(CHECK_OUTPUT, post(check_output))
        .route(CLEAR_BUCKETS, post(clear_buckets))
        .route(EC2_STATUS, get(ec2_status))
        .route(HEALTHZ, get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_upload_url(
    State(state): State<AppState>,
    Json(req): Json<FilenameRequest>,
) -> Result<Json<UploadUrlResponse>, GatewayError> {
    tracing::debug!(filename = ?req.filename, "upload url requested");
    broker::request_write_credential(state.presigner.as_ref(), req.filename.as_deref(), Utc::now())
        .map(Json)
}

async fn check_output(
    State(state): State<AppState>,
    Json(req): Json<FilenameRequest>,
) -> Result<Json<CheckOutputResponse>, GatewayError> {
    tracing::debug!(filename = ?req.filename, "output check requested");
    checker::check_output(
        state.store.as_ref(),
        state.presigner.as_ref(),
        req.filename.as_deref(),
        Utc::now(),
    )
    .await
    .map(Json)
}

async fn clear_buckets(
    State(state): State<AppState>,
) -> Result<Json<ClearBucketsResponse>, GatewayError> {
    reset::reset_all(state.store.as_ref()).await?;
    Ok(Json(ClearBucketsResponse { cleared: true }))
}

async fn ec2_status(State(state): State<AppState>) -> Json<InstanceStatusResponse> {
    Json(compute::instance_status(state.inspector.as_ref(), &state.instance_id).await)
}

async fn healthz() -> &'static str {
    "ok"
}
