use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;

/// Gateway configuration, read from the process environment.
///
/// Field names map one-to-one onto upper-cased environment variables
/// (`aws_region` ← `AWS_REGION`, ...).
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    /// AWS region of both buckets and the compute instance.
    pub aws_region: String,

    pub aws_access_key_id: String,

    pub aws_secret_access_key: String,

    /// Session token when running with temporary credentials.
    #[serde(default)]
    pub aws_session_token: Option<String>,

    /// Bucket receiving uploads.
    pub s3_input_bucket_name: String,

    /// Bucket the compute instance writes processed images to.
    pub s3_output_bucket_name: String,

    /// Instance whose run state gates uploads.
    pub ec2_instance_id: String,

    /// Listen address (default: 0.0.0.0:8080)
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// S3-compatible endpoint override, e.g. `http://localhost:9000`.
    /// When set, requests use path-style addressing.
    #[serde(default)]
    pub s3_endpoint: Option<String>,

    /// EC2-compatible endpoint override.
    #[serde(default)]
    pub ec2_endpoint: Option<String>,

    #[serde(default)]
    pub log_format: LogFormat,
}

/// Log line format for the gateway.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("aws_region", &self.aws_region)
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_secret_access_key", &"<redacted>")
            .field(
                "aws_session_token",
                &self.aws_session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("s3_input_bucket_name", &self.s3_input_bucket_name)
            .field("s3_output_bucket_name", &self.s3_output_bucket_name)
            .field("ec2_instance_id", &self.ec2_instance_id)
            .field("listen_addr", &self.listen_addr)
            .field("s3_endpoint", &self.s3_endpoint)
            .field("ec2_endpoint", &self.ec2_endpoint)
            .field("log_format", &self.log_format)
            .finish()
    }
}
