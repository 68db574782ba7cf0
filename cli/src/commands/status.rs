//! `imgrelay status`: report the compute instance run state.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::domain::PollPolicy;

/// Run the status command.
///
/// An unreachable gateway or instance reads as `unknown`, not an error.
///
/// # Errors
///
/// The config file cannot be read or the HTTP client cannot be built.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.config()?;
    let orchestrator = app.orchestrator(&config, PollPolicy::default())?;
    let state = orchestrator.refresh_status().await;
    app.renderer().render_instance(state)?;
    Ok(ExitCode::SUCCESS)
}
