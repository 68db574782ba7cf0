//! imgrelay gateway: presigned upload/read URLs, bucket reset and compute
//! status over S3 and EC2.

pub mod aws;
pub mod error;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod ports;
pub mod routes;
pub mod services;
pub mod state;

pub use error::{GatewayError, UpstreamError};
pub use routes::router;
pub use state::AppState;
