//! Shared handler state.

use std::sync::Arc;

use imgrelay_common::GatewayConfig;

use crate::aws::Buckets;
use crate::aws::ec2::Ec2Client;
use crate::aws::endpoint::{Ec2Endpoint, S3Endpoint};
use crate::aws::presign::SigV4Presigner;
use crate::aws::s3::S3Client;
use crate::aws::sigv4::{Credentials, Signer};
use crate::error::UpstreamError;
use crate::ports::{InstanceInspector, ObjectStore, Presigner};

/// Ports plus the instance the status endpoint reports on.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub presigner: Arc<dyn Presigner>,
    pub inspector: Arc<dyn InstanceInspector>,
    pub instance_id: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        presigner: Arc<dyn Presigner>,
        inspector: Arc<dyn InstanceInspector>,
        instance_id: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            presigner,
            inspector,
            instance_id: instance_id.into(),
        }
    }

    /// Wires the S3 and EC2 adapters from configuration.
    ///
    /// # Errors
    ///
    /// Fails on a malformed endpoint override or if the HTTP client cannot
    /// be built.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, UpstreamError> {
        let credentials = Credentials {
            access_key_id: config.aws_access_key_id.clone(),
            secret_access_key: config.aws_secret_access_key.clone(),
            session_token: config.aws_session_token.clone(),
        };
        let buckets = Buckets {
            input: config.s3_input_bucket_name.clone(),
            output: config.s3_output_bucket_name.clone(),
        };
        let s3_endpoint = S3Endpoint::resolve(&config.aws_region, config.s3_endpoint.as_deref())?;
        let ec2_endpoint =
            Ec2Endpoint::resolve(&config.aws_region, config.ec2_endpoint.as_deref())?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("imgrelay-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Unavailable(format!("cannot build http client: {e}")))?;

        let s3_signer = Signer::new(credentials.clone(), &config.aws_region, "s3");
        let ec2_signer = Signer::new(credentials, &config.aws_region, "ec2");

        Ok(Self::new(
            Arc::new(S3Client::new(
                http.clone(),
                s3_signer.clone(),
                s3_endpoint.clone(),
                buckets.clone(),
            )),
            Arc::new(SigV4Presigner::new(s3_signer, s3_endpoint, buckets)),
            Arc::new(Ec2Client::new(http, ec2_signer, ec2_endpoint)),
            config.ec2_instance_id.as_str(),
        ))
    }
}
