/**
 * Business Registration Verification
 *
 * Checks a business registration number against the National Tax Service
 * status API before an account is created.
 *
 * # Request
 *
 * ```http
 * POST {NTS_API_BASE}/validate?serviceKey=KEY
 * Content-Type: application/json
 *
 * {"businesses":[{"b_no":"1234567890","start_dt":"20200101","p_nm":"홍길동"}]}
 * ```
 *
 * The business is valid when `status_code == "OK"` and the first result
 * carries `valid == "01"`.
 */

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::shared::config::NtsSettings;

/// Verification failures
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("NTS_API_KEY is not configured")]
    MissingApiKey,
    #[error("business registration number must be 10 digits")]
    InvalidNumber,
    #[error("opening date must be YYYY-MM-DD or YYYYMMDD")]
    InvalidDate,
    #[error("representative name is required")]
    MissingRepresentative,
    #[error("{0}")]
    Rejected(String),
    #[error("verification service returned HTTP {status}")]
    Http { status: u16, body: String },
    #[error("verification service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Result of a successful check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The tax service confirmed the business
    Valid,
    /// Verification is disabled (`NTS_VALIDATE=false`)
    Skipped,
}

/// Normalized inputs sent to the tax service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessIdentity {
    pub b_no: String,
    pub start_dt: String,
    pub p_nm: String,
}

impl BusinessIdentity {
    /// Normalize raw registration form values
    ///
    /// Hyphens in the number are ignored; the opening date is converted to
    /// `YYYYMMDD`.
    pub fn normalize(
        number: &str,
        opening_date: &str,
        representative: &str,
    ) -> Result<Self, VerificationError> {
        let b_no: String = number.trim().chars().filter(|c| *c != '-').collect();
        if b_no.len() != 10 || !b_no.chars().all(|c| c.is_ascii_digit()) {
            return Err(VerificationError::InvalidNumber);
        }

        let start_dt = normalize_date(opening_date)?;

        let p_nm = representative.trim().to_string();
        if p_nm.is_empty() {
            return Err(VerificationError::MissingRepresentative);
        }

        Ok(Self { b_no, start_dt, p_nm })
    }
}

fn normalize_date(raw: &str) -> Result<String, VerificationError> {
    let raw = raw.trim();
    if raw.len() == 8 && raw.chars().all(|c| c.is_ascii_digit()) {
        NaiveDate::parse_from_str(raw, "%Y%m%d").map_err(|_| VerificationError::InvalidDate)?;
        return Ok(raw.to_string());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%Y%m%d").to_string())
        .map_err(|_| VerificationError::InvalidDate)
}

#[derive(Serialize)]
struct ValidateRequest<'a> {
    businesses: [&'a BusinessIdentity; 1],
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    status_code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    data: Vec<Value>,
}

/// Client for the business status API
#[derive(Clone, Debug)]
pub struct BusinessVerifier {
    client: reqwest::Client,
    settings: NtsSettings,
}

impl BusinessVerifier {
    pub fn new(client: reqwest::Client, settings: NtsSettings) -> Self {
        Self { client, settings }
    }

    /// Verify a business registration
    ///
    /// Inputs are validated even when the upstream check is disabled.
    pub async fn verify(
        &self,
        number: &str,
        opening_date: &str,
        representative: &str,
    ) -> Result<(BusinessIdentity, VerificationOutcome), VerificationError> {
        let identity = BusinessIdentity::normalize(number, opening_date, representative)?;

        if !self.settings.validate {
            tracing::debug!("Business verification disabled, skipping {}", identity.b_no);
            return Ok((identity, VerificationOutcome::Skipped));
        }

        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(VerificationError::MissingApiKey)?;

        let url = format!("{}/validate", self.settings.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .query(&[("serviceKey", api_key)])
            .json(&ValidateRequest { businesses: [&identity] })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("NTS validate returned {}: {}", status, body);
            return Err(VerificationError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ValidateResponse = response.json().await?;
        let first = parsed.data.first();

        if parsed.status_code.as_deref() != Some("OK") || first.is_none() {
            let message = parsed
                .message
                .unwrap_or_else(|| "no result returned".to_string());
            return Err(VerificationError::Rejected(message));
        }

        let result = first.cloned().unwrap_or(Value::Null);
        let valid = result.get("valid").and_then(Value::as_str).map(str::trim);
        if valid == Some("01") {
            tracing::info!("Business {} verified", identity.b_no);
            return Ok((identity, VerificationOutcome::Valid));
        }

        let message = result
            .get("valid_msg")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or("invalid business registration")
            .to_string();
        Err(VerificationError::Rejected(message))
    }
}
