//! Presigned POST policies and presigned GET URLs for S3.

use std::collections::BTreeMap;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use imgrelay_common::policy::{
    MAX_UPLOAD_BYTES, READ_CREDENTIAL_TTL_SECS, WRITE_CREDENTIAL_TTL_SECS,
};
use imgrelay_common::{ObjectKey, UploadUrlResponse};
use serde_json::{Value, json};

use crate::aws::Buckets;
use crate::aws::endpoint::S3Endpoint;
use crate::aws::sigv4::{ALGORITHM, Signer, amz_date};
use crate::error::UpstreamError;
use crate::ports::{Namespace, Presigner};

/// Signs S3 upload forms and download URLs locally with SigV4.
#[derive(Debug, Clone)]
pub struct SigV4Presigner {
    signer: Signer,
    endpoint: S3Endpoint,
    buckets: Buckets,
}

impl SigV4Presigner {
    #[must_use]
    pub fn new(signer: Signer, endpoint: S3Endpoint, buckets: Buckets) -> Self {
        Self {
            signer,
            endpoint,
            buckets,
        }
    }

    fn policy(&self, bucket: &str, key: &ObjectKey, now: DateTime<Utc>) -> Value {
        let expiration = now + Duration::from_secs(WRITE_CREDENTIAL_TTL_SECS);
        let mut conditions = vec![
            json!({ "bucket": bucket }),
            json!(["content-length-range", 0, MAX_UPLOAD_BYTES]),
            json!({ "key": key.as_str() }),
            json!({ "x-amz-algorithm": ALGORITHM }),
            json!({ "x-amz-credential": self.signer.credential(now) }),
            json!({ "x-amz-date": amz_date(now) }),
        ];
        if let Some(token) = &self.signer.credentials().session_token {
            conditions.push(json!({ "x-amz-security-token": token }));
        }
        json!({
            "expiration": expiration.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            "conditions": conditions,
        })
    }
}

impl Presigner for SigV4Presigner {
    fn presign_post(
        &self,
        namespace: Namespace,
        key: &ObjectKey,
        now: DateTime<Utc>,
    ) -> Result<UploadUrlResponse, UpstreamError> {
        let bucket = self.buckets.name(namespace);
        let policy = serde_json::to_vec(&self.policy(bucket, key, now))
            .map_err(|e| UpstreamError::Signing(format!("cannot encode policy: {e}")))?;
        let policy_b64 = STANDARD.encode(policy);
        let signature = self.signer.sign(now, &policy_b64)?;

        let mut fields = BTreeMap::new();
        fields.insert("bucket".to_string(), bucket.to_string());
        fields.insert("key".to_string(), key.to_string());
        fields.insert("X-Amz-Algorithm".to_string(), ALGORITHM.to_string());
        fields.insert("X-Amz-Credential".to_string(), self.signer.credential(now));
        fields.insert("X-Amz-Date".to_string(), amz_date(now));
        if let Some(token) = &self.signer.credentials().session_token {
            fields.insert("X-Amz-Security-Token".to_string(), token.clone());
        }
        fields.insert("Policy".to_string(), policy_b64);
        fields.insert("X-Amz-Signature".to_string(), signature);

        Ok(UploadUrlResponse {
            url: self.endpoint.post_url(bucket),
            fields,
        })
    }

    fn presign_get(
        &self,
        namespace: Namespace,
        key: &ObjectKey,
        now: DateTime<Utc>,
    ) -> Result<String, UpstreamError> {
        let bucket = self.buckets.name(namespace);
        self.signer.presign_get(
            &self.endpoint.origin(bucket),
            &self.endpoint.host(bucket),
            &self.endpoint.canonical_uri(bucket, Some(key.as_str())),
            READ_CREDENTIAL_TTL_SECS,
            now,
        )
    }
}
