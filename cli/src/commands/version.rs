//! Version command

use anyhow::Result;

use crate::output::JsonRenderer;

/// Run the version command.
///
/// # Errors
///
/// JSON serialization failure.
pub fn run(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    if json {
        JsonRenderer.render_version(version)
    } else {
        println!("imgrelay {version}");
        Ok(())
    }
}
