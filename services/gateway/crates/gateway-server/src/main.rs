//! imgrelay gateway entry point.
//!
//! Loads configuration from the environment, initialises tracing and serves
//! the four service endpoints plus `/healthz`.

use anyhow::{Context, Result};
use imgrelay_common::GatewayConfig;
use imgrelay_gateway::{AppState, logging, router};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration. Required: AWS_REGION, AWS_ACCESS_KEY_ID,
    //    AWS_SECRET_ACCESS_KEY, S3_INPUT_BUCKET_NAME, S3_OUTPUT_BUCKET_NAME,
    //    EC2_INSTANCE_ID.
    let config: GatewayConfig = envy::from_env()
        .context("failed to load gateway configuration from environment")?;

    // 2. Tracing, in the format the configuration asks for.
    logging::init(config.log_format)?;
    tracing::info!(
        listen_addr = %config.listen_addr,
        region = %config.aws_region,
        input_bucket = %config.s3_input_bucket_name,
        output_bucket = %config.s3_output_bucket_name,
        instance_id = %config.ec2_instance_id,
        s3_endpoint = ?config.s3_endpoint,
        "configuration loaded",
    );

    // 3. Adapters and router.
    let state = AppState::from_config(&config).context("failed to initialise AWS adapters")?;
    let app = router(state);

    // 4. Bind and serve until Ctrl-C.
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!("gateway ready on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("gateway shut down");
    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}
