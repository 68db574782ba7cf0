//! `imgrelay process`: upload one image and wait for the processed result.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use imgrelay_common::policy::MAX_UPLOAD_BYTES;

use crate::app::AppContext;
use crate::application::ports::BlobUploader;
use crate::application::process_file;
use crate::domain::WorkflowError;
use crate::infra::uploader::{HttpUploader, TRANSFER_TIMEOUT};
use crate::output::{SilentReporter, TerminalReporter};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Image to upload
    pub file: PathBuf,

    /// Also download the processed image to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Give up waiting after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Milliseconds between output checks
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

/// Run the process command.
///
/// # Errors
///
/// The file cannot be read, the run is refused or fails, or the processed
/// image cannot be saved to `--output`.
pub async fn run(app: &AppContext, args: ProcessArgs) -> Result<ExitCode> {
    let filename = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("{} has no usable file name", args.file.display()))?;
    let payload = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    if payload.len() as u64 > MAX_UPLOAD_BYTES {
        warn(
            app,
            &format!(
                "{filename} is over the {} MiB upload limit; storage will likely reject it",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            ),
        );
    }

    let config = app.config()?;
    let policy = config.poll_policy(args.timeout_ms, args.interval_ms)?;
    let orchestrator = app.orchestrator(&config, policy)?;

    let run = async {
        if app.is_json() {
            process_file(&orchestrator, &SilentReporter, &filename, payload).await
        } else {
            let reporter = TerminalReporter::new(&app.output);
            process_file(&orchestrator, &reporter, &filename, payload).await
        }
    };
    let url = tokio::select! {
        result = run => result?,
        _ = tokio::signal::ctrl_c() => {
            warn(app, "Interrupted, clearing namespaces");
            orchestrator.reset().await;
            return Err(WorkflowError::Cancelled.into());
        }
    };

    let saved = match args.output {
        Some(path) => {
            let bytes = HttpUploader::with_timeout(TRANSFER_TIMEOUT)?
                .download(&url)
                .await
                .context("cannot download processed image")?;
            tokio::fs::write(&path, bytes)
                .await
                .with_context(|| format!("cannot write {}", path.display()))?;
            Some(path)
        }
        None => None,
    };

    app.renderer()
        .render_processed(&filename, &url, saved.as_deref())?;
    Ok(ExitCode::SUCCESS)
}

/// Stdout carries only the result object in JSON mode.
fn warn(app: &AppContext, message: &str) {
    if app.is_json() {
        tracing::warn!("{message}");
    } else {
        app.output.warn(message);
    }
}
