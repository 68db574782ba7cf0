//! EC2 query API client, limited to `DescribeInstances`.

use async_trait::async_trait;
use chrono::Utc;

use crate::aws::endpoint::Ec2Endpoint;
use crate::aws::sigv4::{RequestParts, Signer, canonical_query, sha256_hex};
use crate::aws::xml;
use crate::error::UpstreamError;
use crate::ports::InstanceInspector;

const SERVICE: &str = "ec2";
const API_VERSION: &str = "2016-11-15";

#[derive(Debug, Clone)]
pub struct Ec2Client {
    http: reqwest::Client,
    signer: Signer,
    endpoint: Ec2Endpoint,
}

impl Ec2Client {
    #[must_use]
    pub fn new(http: reqwest::Client, signer: Signer, endpoint: Ec2Endpoint) -> Self {
        Self {
            http,
            signer,
            endpoint,
        }
    }
}

/// First `instanceState/name` in a `DescribeInstances` response.
fn first_state(body: &str) -> Result<Option<String>, UpstreamError> {
    let mut states = xml::texts_at(SERVICE, body, &["instanceState", "name"])?;
    Ok((!states.is_empty()).then(|| states.swap_remove(0)))
}

#[async_trait]
impl InstanceInspector for Ec2Client {
    async fn instance_state(&self, instance_id: &str) -> Result<Option<String>, UpstreamError> {
        let query = vec![
            ("Action".to_string(), "DescribeInstances".to_string()),
            ("InstanceId.1".to_string(), instance_id.to_string()),
            ("Version".to_string(), API_VERSION.to_string()),
        ];
        let payload_hash = sha256_hex(b"");
        let signed = self.signer.authorize(
            &RequestParts {
                method: "GET",
                host: &self.endpoint.authority,
                canonical_uri: "/",
                query: &query,
                headers: &[],
                payload_hash: &payload_hash,
            },
            Utc::now(),
        )?;

        let url = format!("{}/?{}", self.endpoint.origin(), canonical_query(&query));
        let mut builder = self.http.get(url);
        for (name, value) in &signed {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let transport = |source: reqwest::Error| UpstreamError::Transport {
            service: SERVICE,
            source,
        };
        let resp = builder.send().await.map_err(transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }
        first_state(&body)
    }
}
