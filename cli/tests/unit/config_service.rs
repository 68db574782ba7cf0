//! Config use-cases against an in-memory store.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::RefCell;
use std::path::PathBuf;

use anyhow::Result;
use imgrelay_cli::application::ConfigStore;
use imgrelay_cli::application::services::config_service;
use imgrelay_cli::domain::ImgrelayConfig;

#[derive(Default)]
struct MemoryConfigStore {
    stored: RefCell<Option<ImgrelayConfig>>,
    saves: RefCell<usize>,
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<ImgrelayConfig> {
        Ok(self.stored.borrow().clone().unwrap_or_default())
    }

    fn save(&self, config: &ImgrelayConfig) -> Result<()> {
        *self.stored.borrow_mut() = Some(config.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("/nonexistent/config.yaml"))
    }
}

#[test]
fn load_without_file_returns_defaults() {
    let store = MemoryConfigStore::default();
    let config = config_service::load_config(&store).unwrap();
    assert_eq!(config, ImgrelayConfig::default());
}

#[test]
fn set_value_persists_the_change() {
    let store = MemoryConfigStore::default();
    config_service::set_value(&store, "gateway.url", "https://relay.example/").unwrap();
    config_service::set_value(&store, "poll.interval_ms", "2500").unwrap();

    let config = config_service::load_config(&store).unwrap();
    assert_eq!(config.gateway.url, "https://relay.example");
    assert_eq!(config.poll.interval_ms, 2_500);
    assert_eq!(*store.saves.borrow(), 2);
}

#[test]
fn invalid_value_is_not_saved() {
    let store = MemoryConfigStore::default();
    let err = config_service::set_value(&store, "poll.timeout_ms", "-1").unwrap_err();
    assert!(err.to_string().contains("Invalid value"), "got: {err}");
    assert_eq!(*store.saves.borrow(), 0);
}

#[test]
fn unknown_key_is_not_saved() {
    let store = MemoryConfigStore::default();
    assert!(config_service::set_value(&store, "bucket.name", "x").is_err());
    assert!(store.stored.borrow().is_none());
}

#[test]
fn stored_policy_feeds_the_orchestrator() {
    let store = MemoryConfigStore::default();
    config_service::set_value(&store, "poll.timeout_ms", "60000").unwrap();
    let policy = config_service::load_config(&store)
        .unwrap()
        .poll_policy(None, None)
        .unwrap();
    assert_eq!(policy.max_checks(), 12);
}
