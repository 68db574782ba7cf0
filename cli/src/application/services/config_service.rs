//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::ImgrelayConfig;

/// Load configuration.
///
/// # Errors
///
/// The file exists but cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<ImgrelayConfig> {
    store.load()
}

/// Validate and persist a single setting, returning the updated config.
///
/// # Errors
///
/// Unknown key, invalid value, or the file cannot be written.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<ImgrelayConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    Ok(config)
}
