//! AWS Signature Version 4.
//!
//! Covers the two forms the gateway needs: header authorization for calls
//! it makes itself, and query-string presigning for URLs handed to clients.
//! Presigned POST policies reuse the same signing key (see `presign.rs`).

use std::fmt;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};

use crate::error::UpstreamError;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Everything except the RFC 3986 unreserved set is encoded.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Same as `UNRESERVED` but keeps `/` so object keys stay hierarchical.
const PATH_UNRESERVED: &AsciiSet = &UNRESERVED.remove(b'/');

// ── Credentials ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

// ── Encoding helpers ──────────────────────────────────────────────────────────

#[must_use]
pub fn uri_encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

#[must_use]
pub fn uri_encode_path(value: &str) -> String {
    utf8_percent_encode(value, PATH_UNRESERVED).to_string()
}

#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[must_use]
pub fn amz_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}

#[must_use]
pub fn short_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d").to_string()
}

/// Encodes and sorts query parameters into the canonical query string.
#[must_use]
pub fn canonical_query(params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, UpstreamError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| UpstreamError::Signing("failed to initialize hmac".to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

// ── Request description ───────────────────────────────────────────────────────

/// The parts of an HTTP request that enter the canonical request.
pub struct RequestParts<'a> {
    pub method: &'a str,
    pub host: &'a str,
    /// Already URI-encoded path, identical to the one sent on the wire.
    pub canonical_uri: &'a str,
    pub query: &'a [(String, String)],
    /// Additional headers to sign, names in lowercase.
    pub headers: &'a [(String, String)],
    pub payload_hash: &'a str,
}

// ── Signer ────────────────────────────────────────────────────────────────────

/// SigV4 signer bound to one region and service.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
    region: String,
    service: &'static str,
}

impl Signer {
    #[must_use]
    pub fn new(credentials: Credentials, region: impl Into<String>, service: &'static str) -> Self {
        Self {
            credentials,
            region: region.into(),
            service,
        }
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn scope(&self, now: DateTime<Utc>) -> String {
        format!(
            "{}/{}/{}/aws4_request",
            short_date(now),
            self.region,
            self.service
        )
    }

    /// `<access key>/<scope>`, as used in `Credential=` and `X-Amz-Credential`.
    #[must_use]
    pub fn credential(&self, now: DateTime<Utc>) -> String {
        format!("{}/{}", self.credentials.access_key_id, self.scope(now))
    }

    fn signing_key(&self, now: DateTime<Utc>) -> Result<Vec<u8>, UpstreamError> {
        let secret = format!("AWS4{}", self.credentials.secret_access_key);
        let k_date = hmac_sha256(secret.as_bytes(), short_date(now).as_bytes())?;
        let k_region = hmac_sha256(&k_date, self.region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, self.service.as_bytes())?;
        hmac_sha256(&k_service, b"aws4_request")
    }

    /// Hex HMAC of `message` under the derived signing key.
    pub fn sign(&self, now: DateTime<Utc>, message: &str) -> Result<String, UpstreamError> {
        let key = self.signing_key(now)?;
        Ok(hex::encode(hmac_sha256(&key, message.as_bytes())?))
    }

    fn string_to_sign(&self, now: DateTime<Utc>, canonical_request: &str) -> String {
        format!(
            "{ALGORITHM}\n{}\n{}\n{}",
            amz_date(now),
            self.scope(now),
            sha256_hex(canonical_request.as_bytes())
        )
    }

    /// Signs a request with an `Authorization` header.
    ///
    /// Returns every header the caller must send besides `host`: the extra
    /// headers from `parts`, `x-amz-content-sha256`, `x-amz-date`, the
    /// session token when present, and `authorization`.
    pub fn authorize(
        &self,
        parts: &RequestParts<'_>,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, String)>, UpstreamError> {
        let mut headers: Vec<(String, String)> = parts
            .headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.trim().to_string()))
            .collect();
        headers.push((
            "x-amz-content-sha256".to_string(),
            parts.payload_hash.to_string(),
        ));
        headers.push(("x-amz-date".to_string(), amz_date(now)));
        if let Some(token) = &self.credentials.session_token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }

        let mut signed: Vec<(String, String)> = headers.clone();
        signed.push(("host".to_string(), parts.host.to_string()));
        signed.sort();

        let canonical_headers: String = signed.iter().map(|(k, v)| format!("{k}:{v}\n")).collect();
        let signed_headers = signed
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            parts.method,
            parts.canonical_uri,
            canonical_query(parts.query),
            canonical_headers,
            signed_headers,
            parts.payload_hash
        );
        let signature = self.sign(now, &self.string_to_sign(now, &canonical_request))?;

        headers.push((
            "authorization".to_string(),
            format!(
                "{ALGORITHM} Credential={}, SignedHeaders={signed_headers}, Signature={signature}",
                self.credential(now)
            ),
        ));
        Ok(headers)
    }

    /// Builds a query-string presigned URL for `GET {origin}{canonical_uri}`.
    pub fn presign_get(
        &self,
        origin: &str,
        host: &str,
        canonical_uri: &str,
        expires_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<String, UpstreamError> {
        let mut query = vec![
            ("X-Amz-Algorithm".to_string(), ALGORITHM.to_string()),
            ("X-Amz-Credential".to_string(), self.credential(now)),
            ("X-Amz-Date".to_string(), amz_date(now)),
            ("X-Amz-Expires".to_string(), expires_secs.to_string()),
            ("X-Amz-SignedHeaders".to_string(), "host".to_string()),
        ];
        if let Some(token) = &self.credentials.session_token {
            query.push(("X-Amz-Security-Token".to_string(), token.clone()));
        }
        let query_string = canonical_query(&query);

        let canonical_request =
            format!("GET\n{canonical_uri}\n{query_string}\nhost:{host}\n\nhost\n{UNSIGNED_PAYLOAD}");
        let signature = self.sign(now, &self.string_to_sign(now, &canonical_request))?;

        Ok(format!(
            "{origin}{canonical_uri}?{query_string}&X-Amz-Signature={signature}"
        ))
    }
}
