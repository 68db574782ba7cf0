//! JSON output helpers.
//!
//! `JsonRenderer` prints one pretty-printed object per command. `format_error`
//! builds the error object every `--json` code path prints when a command
//! fails.

use std::path::Path;

use anyhow::{Context, Result};
use imgrelay_common::RunState;
use serde_json::json;

use crate::domain::ImgrelayConfig;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

fn print(value: &serde_json::Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("JSON serialization failed")?
    );
    Ok(())
}

/// Machine-readable renderer for `--json`.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_processed(&self, filename: &str, url: &str, saved: Option<&Path>) -> Result<()> {
        print(&json!({
            "filename": filename,
            "status": "done",
            "url": url,
            "saved_to": saved.map(|p| p.display().to_string()),
        }))
    }

    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_instance(&self, state: RunState) -> Result<()> {
        print(&json!({
            "state": state,
            "running": state.is_running(),
        }))
    }

    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_cleared(&self) -> Result<()> {
        print(&json!({ "cleared": true }))
    }

    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_config(&self, config: &ImgrelayConfig, path: &Path) -> Result<()> {
        print(&json!({
            "config": config,
            "path": path.display().to_string(),
        }))
    }

    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_version(&self, version: &str) -> Result<()> {
        print(&json!({ "version": version }))
    }
}
