/**
 * AWS Signature Version 4
 *
 * Request signing for S3-compatible object storage. Two forms are supported:
 *
 * - Header signing (`Authorization: AWS4-HMAC-SHA256 ...`) for uploads
 * - Query-string presigning for time-limited GET URLs
 *
 * Callers build the request URL with an already percent-encoded path; the
 * path is used verbatim as the canonical URI.
 */

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const SERVICE: &str = "s3";
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Longest presign lifetime accepted by S3 (7 days)
pub const MAX_PRESIGN_EXPIRES: u64 = 604_800;

/// Signing credentials
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub region: &'a str,
}

/// HMAC key rejected by the MAC implementation
#[derive(Debug, thiserror::Error)]
#[error("invalid signing key")]
pub struct SigningError;

/// Lower-case hex SHA-256 of a payload
pub fn sha256_hex(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

fn hmac_sha256(key: &[u8], data: &str) -> Result<Vec<u8>, SigningError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SigningError)?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn signing_key(creds: &Credentials<'_>, date: &str) -> Result<Vec<u8>, SigningError> {
    let k_date = hmac_sha256(format!("AWS4{}", creds.secret_key).as_bytes(), date)?;
    let k_region = hmac_sha256(&k_date, creds.region)?;
    let k_service = hmac_sha256(&k_region, SERVICE)?;
    hmac_sha256(&k_service, "aws4_request")
}

/// `host[:port]` as it appears in the Host header
pub fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn canonical_query(pairs: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();
    encoded
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn scope(creds: &Credentials<'_>, date: &str) -> String {
    format!("{date}/{}/{SERVICE}/aws4_request", creds.region)
}

fn sign(
    creds: &Credentials<'_>,
    now: DateTime<Utc>,
    canonical_request: &str,
) -> Result<String, SigningError> {
    let date = now.format("%Y%m%d").to_string();
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{}\n{}",
        scope(creds, &date),
        sha256_hex(canonical_request.as_bytes())
    );
    let key = signing_key(creds, &date)?;
    Ok(hex::encode(hmac_sha256(&key, &string_to_sign)?))
}

/// Build the `Authorization` header value for a request
///
/// # Arguments
///
/// * `headers` - Every header to sign, keyed by lower-case name. Must include
///   `host` and `x-amz-date`.
/// * `payload_hash` - Hex SHA-256 of the body, or `UNSIGNED-PAYLOAD`
pub fn authorization_header(
    creds: &Credentials<'_>,
    method: &str,
    url: &Url,
    headers: &BTreeMap<String, String>,
    payload_hash: &str,
    now: DateTime<Utc>,
) -> Result<String, SigningError> {
    let query: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let canonical_headers: String = headers
        .iter()
        .map(|(k, v)| format!("{}:{}\n", k, v.trim()))
        .collect();
    let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

    let canonical_request = format!(
        "{method}\n{}\n{}\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
        url.path(),
        canonical_query(&query),
    );
    let signature = sign(creds, now, &canonical_request)?;

    Ok(format!(
        "{ALGORITHM} Credential={}/{}, SignedHeaders={signed_headers}, Signature={signature}",
        creds.access_key,
        scope(creds, &now.format("%Y%m%d").to_string()),
    ))
}

/// Build a query-string presigned URL
///
/// Only the `host` header is signed and the payload is unsigned, which is
/// what browsers and the Instagram fetcher can reproduce.
pub fn presign(
    creds: &Credentials<'_>,
    method: &str,
    url: &Url,
    expires: u64,
    now: DateTime<Utc>,
) -> Result<String, SigningError> {
    let expires = expires.clamp(1, MAX_PRESIGN_EXPIRES);
    let date = now.format("%Y%m%d").to_string();
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

    let mut query: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    query.extend([
        ("X-Amz-Algorithm".to_string(), ALGORITHM.to_string()),
        (
            "X-Amz-Credential".to_string(),
            format!("{}/{}", creds.access_key, scope(creds, &date)),
        ),
        ("X-Amz-Date".to_string(), amz_date),
        ("X-Amz-Expires".to_string(), expires.to_string()),
        ("X-Amz-SignedHeaders".to_string(), "host".to_string()),
    ]);
    let query = canonical_query(&query);

    let canonical_request = format!(
        "{method}\n{}\n{query}\nhost:{}\n\nhost\n{UNSIGNED_PAYLOAD}",
        url.path(),
        host_header(url),
    );
    let signature = sign(creds, now, &canonical_request)?;

    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    Ok(format!("{base}?{query}&X-Amz-Signature={signature}"))
}
