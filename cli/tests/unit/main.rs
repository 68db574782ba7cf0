//! Unit tests for imgrelay CLI
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod architecture;
mod config_service;
mod mocks;
mod orchestrator;
