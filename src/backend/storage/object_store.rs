/**
 * Object Store Client
 *
 * Path-style client for an S3-compatible bucket (`{endpoint}/{bucket}/{key}`).
 * Uploads are header-signed; downloads go through a presigned URL so the
 * same code path serves both the server and the URLs handed to clients.
 */

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::Utc;
use reqwest::{Client, Url};

use crate::backend::storage::sigv4::{self, Credentials};
use crate::backend::storage::StorageError;
use crate::shared::config::StorageSettings;

/// S3-compatible object store
#[derive(Clone, Debug)]
pub struct ObjectStore {
    client: Client,
    settings: StorageSettings,
}

impl ObjectStore {
    pub fn new(client: Client, settings: StorageSettings) -> Self {
        Self { client, settings }
    }

    /// Default lifetime for presigned URLs
    pub fn default_expires(&self) -> u64 {
        self.settings.presign_expires
    }

    fn credentials(&self) -> Result<Credentials<'_>, StorageError> {
        match (&self.settings.access_key, &self.settings.secret_key) {
            (Some(access_key), Some(secret_key)) => Ok(Credentials {
                access_key,
                secret_key,
                region: &self.settings.region,
            }),
            _ => Err(StorageError::MissingCredentials),
        }
    }

    /// Path-style URL of an object, with the key percent-encoded per segment
    pub fn object_url(&self, key: &str) -> Result<Url, StorageError> {
        validate_key(key)?;
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let raw = format!(
            "{}/{}/{}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.bucket,
            encoded_key
        );
        Url::parse(&raw).map_err(|_| StorageError::InvalidKey(key.to_string()))
    }

    /// Upload an object
    ///
    /// # Errors
    ///
    /// * `MissingCredentials` - access/secret key not configured
    /// * `Http` - the store answered with a non-success status
    pub async fn put_object(
        &self,
        key: &str,
        body: impl Into<Bytes>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let creds = self.credentials()?;
        let url = self.object_url(key)?;
        let body: Bytes = body.into();
        let payload_hash = sigv4::sha256_hex(&body);
        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        headers.insert("host".to_string(), sigv4::host_header(&url));
        headers.insert("x-amz-content-sha256".to_string(), payload_hash.clone());
        headers.insert("x-amz-date".to_string(), amz_date.clone());
        let authorization =
            sigv4::authorization_header(&creds, "PUT", &url, &headers, &payload_hash, now)?;

        tracing::debug!(key, bytes = body.len(), "uploading object");
        let response = self
            .client
            .put(url)
            .header("Content-Type", content_type)
            .header("x-amz-content-sha256", payload_hash)
            .header("x-amz-date", amz_date)
            .header("Authorization", authorization)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(key, status = status.as_u16(), "object upload failed");
            return Err(StorageError::Http {
                status: status.as_u16(),
                key: key.to_string(),
                body,
            });
        }
        Ok(())
    }

    /// Presigned GET URL for an object
    ///
    /// `expires` falls back to the configured default and is clamped to the
    /// range S3 accepts.
    pub fn presigned_get(&self, key: &str, expires: Option<u64>) -> Result<String, StorageError> {
        let creds = self.credentials()?;
        let url = self.object_url(key)?;
        let expires = expires.unwrap_or(self.settings.presign_expires);
        Ok(sigv4::presign(&creds, "GET", &url, expires, Utc::now())?)
    }

    /// Download an object
    pub async fn get_object(&self, key: &str) -> Result<Bytes, StorageError> {
        let url = self.presigned_get(key, Some(60))?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(key, status = status.as_u16(), "object download failed");
            return Err(StorageError::Http {
                status: status.as_u16(),
                key: key.to_string(),
                body,
            });
        }
        Ok(response.bytes().await?)
    }
}

/// Reject keys that are empty, absolute, or escape their prefix
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.len() > 1024
        || key.chars().any(|c| c.is_control())
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
