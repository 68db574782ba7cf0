//! Application context: unified state passed to every command handler.
//!
//! Built once in `Cli::run()` from the global flags. Commands take
//! `&AppContext` instead of loose parameters.

use anyhow::{Context, Result};

use crate::application::Orchestrator;
use crate::application::services::config_service;
use crate::domain::{ImgrelayConfig, PollPolicy};
use crate::infra::config::YamlConfigStore;
use crate::infra::gateway::HttpGateway;
use crate::infra::uploader::{HttpUploader, TRANSFER_TIMEOUT};
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
    /// Gateway URL from `--gateway` / `IMGRELAY_GATEWAY`, overriding the file.
    pub gateway: Option<String>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Where `imgrelay config` reads and writes settings.
    pub config_store: YamlConfigStore,
    gateway_override: Option<String>,
}

impl AppContext {
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            mode,
            config_store: YamlConfigStore,
            gateway_override: flags.gateway,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// # Errors
    ///
    /// The config file exists but cannot be read.
    pub fn config(&self) -> Result<ImgrelayConfig> {
        config_service::load_config(&self.config_store)
    }

    /// Gateway client for the override URL, or the configured one.
    ///
    /// # Errors
    ///
    /// The HTTP client cannot be built.
    pub fn gateway(&self, config: &ImgrelayConfig) -> Result<HttpGateway> {
        let url = self
            .gateway_override
            .as_deref()
            .unwrap_or(&config.gateway.url);
        tracing::debug!(url, "gateway");
        HttpGateway::new(url).with_context(|| format!("cannot build client for {url}"))
    }

    /// Orchestrator wired to the real gateway and storage.
    ///
    /// # Errors
    ///
    /// The HTTP client cannot be built.
    pub fn orchestrator(
        &self,
        config: &ImgrelayConfig,
        policy: PollPolicy,
    ) -> Result<Orchestrator<HttpGateway, HttpUploader>> {
        Ok(Orchestrator::new(
            self.gateway(config)?,
            HttpUploader::with_timeout(TRANSFER_TIMEOUT)?,
            policy,
        ))
    }
}
