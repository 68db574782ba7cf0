//! `imgrelay clear`: wipe the input and output namespaces.

use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::GatewayApi;

/// Run the clear command.
///
/// # Errors
///
/// The gateway cannot be reached or reports the wipe failed.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.config()?;
    app.gateway(&config)?
        .clear_buckets()
        .await
        .context("cannot clear namespaces")?;
    app.renderer().render_cleared()?;
    Ok(ExitCode::SUCCESS)
}
