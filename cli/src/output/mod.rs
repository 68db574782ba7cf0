//! Output formatting module

pub mod human;
pub mod json;
pub mod reporter;
pub mod styles;

use std::path::Path;

use anyhow::Result;
use console::Term;
use imgrelay_common::RunState;
use owo_colors::OwoColorize as _;
pub use styles::Styles;

pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::{SilentReporter, TerminalReporter};

use crate::domain::ImgrelayConfig;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}

/// Human or JSON rendering of command results.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// Render the read URL of a processed image.
    ///
    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_processed(&self, filename: &str, url: &str, saved: Option<&Path>) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_processed(filename, url, saved);
                Ok(())
            }
            Self::Json(r) => r.render_processed(filename, url, saved),
        }
    }

    /// Render the compute instance run state.
    ///
    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_instance(&self, state: RunState) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_instance(state);
                Ok(())
            }
            Self::Json(r) => r.render_instance(state),
        }
    }

    /// Render the outcome of a namespace reset.
    ///
    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_cleared(&self) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_cleared();
                Ok(())
            }
            Self::Json(r) => r.render_cleared(),
        }
    }

    /// Render the effective configuration and where it lives.
    ///
    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_config(&self, config: &ImgrelayConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config(config, path);
                Ok(())
            }
            Self::Json(r) => r.render_config(config, path),
        }
    }
}
