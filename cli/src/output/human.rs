//! Human-readable terminal renderer.

use std::path::Path;

use imgrelay_common::RunState;
use owo_colors::OwoColorize as _;

use crate::domain::ImgrelayConfig;
use crate::domain::config::VALID_CONFIG_KEYS;
use crate::infra::config::CONFIG_ENV;
use crate::output::OutputContext;

/// Renders results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// The URL always goes to stdout, even when quiet, so it can be piped.
    pub fn render_processed(&self, filename: &str, url: &str, saved: Option<&Path>) {
        self.ctx.success(&format!("{filename} processed"));
        if let Some(path) = saved {
            self.ctx.kv("Saved to:", &path.display().to_string());
        }
        println!("{url}");
    }

    pub fn render_instance(&self, state: RunState) {
        let styled = match state {
            RunState::Running => state.as_str().style(self.ctx.styles.success).to_string(),
            RunState::Pending | RunState::Stopping => {
                state.as_str().style(self.ctx.styles.warning).to_string()
            }
            RunState::Stopped | RunState::Unknown => {
                state.as_str().style(self.ctx.styles.error).to_string()
            }
        };
        if self.ctx.quiet {
            println!("{}", state.as_str());
        } else {
            self.ctx.kv("Instance:", &styled);
            if !state.is_running() {
                self.ctx.info("Uploads are refused until the instance is running.");
            }
        }
    }

    pub fn render_cleared(&self) {
        self.ctx.success("Input and output namespaces cleared");
    }

    pub fn render_config(&self, config: &ImgrelayConfig, path: &Path) {
        self.ctx.header("Configuration");
        for key in VALID_CONFIG_KEYS {
            let value = config.get(key).unwrap_or_default();
            self.ctx.kv(&format!("{key}:"), &value);
        }
        self.ctx.kv("File:", &path.display().to_string());
        self.ctx
            .kv("Override:", &format!("set {CONFIG_ENV} to use another file"));
    }
}
