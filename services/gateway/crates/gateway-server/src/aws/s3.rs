//! S3 REST client for the three calls the gateway makes itself.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use imgrelay_common::ObjectKey;
use reqwest::{Method, Response, StatusCode};
use sha2::{Digest, Sha256};

use crate::aws::Buckets;
use crate::aws::endpoint::S3Endpoint;
use crate::aws::sigv4::{RequestParts, Signer, canonical_query, sha256_hex};
use crate::aws::xml;
use crate::error::UpstreamError;
use crate::ports::{Namespace, ObjectStore};

const SERVICE: &str = "s3";

/// A signed request against one bucket.
struct S3Request<'a> {
    method: Method,
    bucket: &'a str,
    key: Option<&'a str>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct S3Client {
    http: reqwest::Client,
    signer: Signer,
    endpoint: S3Endpoint,
    buckets: Buckets,
}

impl S3Client {
    #[must_use]
    pub fn new(http: reqwest::Client, signer: Signer, endpoint: S3Endpoint, buckets: Buckets) -> Self {
        Self {
            http,
            signer,
            endpoint,
            buckets,
        }
    }

    async fn send(&self, req: S3Request<'_>) -> Result<Response, UpstreamError> {
        let host = self.endpoint.host(req.bucket);
        let canonical_uri = self.endpoint.canonical_uri(req.bucket, req.key);
        let payload_hash = sha256_hex(&req.body);

        let signed = self.signer.authorize(
            &RequestParts {
                method: req.method.as_str(),
                host: &host,
                canonical_uri: &canonical_uri,
                query: &req.query,
                headers: &req.headers,
                payload_hash: &payload_hash,
            },
            Utc::now(),
        )?;

        let mut url = format!("{}{canonical_uri}", self.endpoint.origin(req.bucket));
        if !req.query.is_empty() {
            url.push('?');
            url.push_str(&canonical_query(&req.query));
        }

        let mut builder = self.http.request(req.method, url);
        for (name, value) in &signed {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !req.body.is_empty() {
            builder = builder.body(req.body);
        }
        builder
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: SERVICE,
                source,
            })
    }
}

async fn status_error(resp: Response) -> UpstreamError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    UpstreamError::Status {
        service: SERVICE,
        status,
        body,
    }
}

async fn body_text(resp: Response) -> Result<String, UpstreamError> {
    resp.text()
        .await
        .map_err(|source| UpstreamError::Transport {
            service: SERVICE,
            source,
        })
}

/// Quiet-mode `DeleteObjects` request body.
fn delete_body(keys: &[String]) -> String {
    let objects: String = keys
        .iter()
        .map(|k| format!("<Object><Key>{}</Key></Object>", xml::escape(k)))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Delete xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
         <Quiet>true</Quiet>{objects}</Delete>"
    )
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn exists(&self, namespace: Namespace, key: &ObjectKey) -> Result<bool, UpstreamError> {
        let resp = self
            .send(S3Request {
                method: Method::HEAD,
                bucket: self.buckets.name(namespace),
                key: Some(key.as_str()),
                query: Vec::new(),
                headers: Vec::new(),
                body: Vec::new(),
            })
            .await?;
        match resp.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(status_error(resp).await),
        }
    }

    async fn list_keys(&self, namespace: Namespace) -> Result<Vec<String>, UpstreamError> {
        let resp = self
            .send(S3Request {
                method: Method::GET,
                bucket: self.buckets.name(namespace),
                key: None,
                query: vec![("list-type".to_string(), "2".to_string())],
                headers: Vec::new(),
                body: Vec::new(),
            })
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let body = body_text(resp).await?;
        xml::texts_at(SERVICE, &body, &["Contents", "Key"])
    }

    async fn delete_keys(
        &self,
        namespace: Namespace,
        keys: &[String],
    ) -> Result<(), UpstreamError> {
        let body = delete_body(keys).into_bytes();
        let checksum = STANDARD.encode(Sha256::digest(&body));
        let resp = self
            .send(S3Request {
                method: Method::POST,
                bucket: self.buckets.name(namespace),
                key: None,
                query: vec![("delete".to_string(), String::new())],
                headers: vec![
                    ("content-type".to_string(), "application/xml".to_string()),
                    ("x-amz-checksum-sha256".to_string(), checksum),
                ],
                body,
            })
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let body = body_text(resp).await?;
        let failed = xml::texts_at(SERVICE, &body, &["Error", "Key"])?;
        if failed.is_empty() {
            Ok(())
        } else {
            Err(UpstreamError::PartialDelete {
                failed: failed.len(),
                requested: keys.len(),
            })
        }
    }
}
