pub mod config;
pub mod key;
pub mod policy;
pub mod routes;
pub mod state;
pub mod types;

pub use config::{GatewayConfig, LogFormat};
pub use key::{KeyError, ObjectKey};
pub use state::RunState;
pub use types::*;
