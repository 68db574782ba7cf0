//! Command implementations

pub mod clear;
pub mod config;
pub mod process;
pub mod status;
pub mod version;
