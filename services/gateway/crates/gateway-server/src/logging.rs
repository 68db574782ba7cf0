//! Tracing subscriber setup.

use anyhow::{Context, Result};
use imgrelay_common::LogFormat;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. The filter comes from `RUST_LOG` and
/// defaults to `info`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_ansi(false).with_current_span(false))
            .try_init(),
    }
    .context("failed to install tracing subscriber")
}
