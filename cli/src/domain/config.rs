//! Domain types and validators for imgrelay configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use anyhow::Result;
use imgrelay_common::policy::{POLL_INTERVAL_MS, POLL_TIMEOUT_MS};
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::task::PollPolicy;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &["gateway.url", "poll.timeout_ms", "poll.interval_ms"];

pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8080";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.imgrelay/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ImgrelayConfig {
    pub gateway: GatewaySettings,
    pub poll: PollSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Base URL of the imgrelay gateway.
    #[serde(default = "default_gateway_url")]
    pub url: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
        }
    }
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollSettings {
    pub timeout_ms: u64,
    pub interval_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            timeout_ms: POLL_TIMEOUT_MS,
            interval_ms: POLL_INTERVAL_MS,
        }
    }
}

impl ImgrelayConfig {
    /// Poll policy from the file, with optional per-run overrides.
    ///
    /// # Errors
    ///
    /// Either resulting value is zero.
    pub fn poll_policy(
        &self,
        timeout_ms: Option<u64>,
        interval_ms: Option<u64>,
    ) -> Result<PollPolicy, ConfigError> {
        PollPolicy::from_millis(
            timeout_ms.unwrap_or(self.poll.timeout_ms),
            interval_ms.unwrap_or(self.poll.interval_ms),
        )
    }

    /// Current value of `key` rendered as a string.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "gateway.url" => Some(self.gateway.url.clone()),
            "poll.timeout_ms" => Some(self.poll.timeout_ms.to_string()),
            "poll.interval_ms" => Some(self.poll.interval_ms.to_string()),
            _ => None,
        }
    }

    /// Validates and stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Unknown key or invalid value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "gateway.url" => self.gateway.url = value.trim_end_matches('/').to_string(),
            "poll.timeout_ms" => self.poll.timeout_ms = parse_millis(key, value)?,
            "poll.interval_ms" => self.poll.interval_ms = parse_millis(key, value)?,
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    match key {
        "gateway.url" if !(value.starts_with("http://") || value.starts_with("https://")) => {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                valid: "an http:// or https:// URL".to_string(),
            }
            .into())
        }
        "poll.timeout_ms" | "poll.interval_ms" => parse_millis(key, value).map(|_| ()),
        _ => Ok(()),
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            valid: "a positive number of milliseconds".to_string(),
        }
        .into()),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
