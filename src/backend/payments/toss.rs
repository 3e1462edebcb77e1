//! Toss Payments API client
//!
//! All calls authenticate with `Basic base64(secret_key + ":")`. Calls that
//! move money carry an `Idempotency-Key`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use thiserror::Error;

use crate::shared::config::TossSettings;

#[derive(Debug, Error)]
pub enum TossError {
    #[error("TOSS_SECRET_KEY is not configured")]
    MissingSecretKey,
    #[error("Toss answered HTTP {status}: {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        body: Value,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Clone, Debug)]
pub struct TossClient {
    client: reqwest::Client,
    settings: TossSettings,
}

impl TossClient {
    pub fn new(client: reqwest::Client, settings: TossSettings) -> Self {
        if settings.secret_key.is_none() {
            tracing::warn!("TOSS_SECRET_KEY not set, payment calls will fail");
        }
        Self { client, settings }
    }

    fn authorization(&self) -> Result<String, TossError> {
        let secret = self
            .settings
            .secret_key
            .as_deref()
            .ok_or(TossError::MissingSecretKey)?;
        Ok(format!("Basic {}", STANDARD.encode(format!("{secret}:"))))
    }

    async fn post(
        &self,
        path: &str,
        idempotency_key: Option<&str>,
        body: &Value,
    ) -> Result<Value, TossError> {
        let url = format!("{}{}", self.settings.api_base.trim_end_matches('/'), path);
        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization()?)
            .json(body);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        tracing::debug!("[Toss] POST {}", path);
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if status != reqwest::StatusCode::OK {
            let field = |name: &str| {
                body.get(name)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            let (code, message) = (field("code"), field("message"));
            tracing::warn!("[Toss] {} failed ({}): {} {}", path, status, code, message);
            return Err(TossError::Api {
                status: status.as_u16(),
                code: if code.is_empty() { format!("HTTP_{}", status.as_u16()) } else { code },
                message,
                body,
            });
        }
        Ok(body)
    }

    /// `POST /v1/payments/confirm`
    pub async fn confirm_payment(
        &self,
        payment_key: &str,
        order_id: &str,
        amount: i64,
    ) -> Result<Value, TossError> {
        self.post(
            "/v1/payments/confirm",
            Some(&format!("{order_id}:{payment_key}")),
            &json!({"paymentKey": payment_key, "orderId": order_id, "amount": amount}),
        )
        .await
    }

    /// `POST /v1/payments/{paymentKey}/cancel`
    pub async fn cancel_payment(
        &self,
        payment_key: &str,
        reason: &str,
        amount: Option<i64>,
    ) -> Result<Value, TossError> {
        let mut body = json!({"cancelReason": reason});
        if let Some(amount) = amount {
            body["cancelAmount"] = json!(amount);
        }
        self.post(
            &format!("/v1/payments/{}/cancel", urlencoding::encode(payment_key)),
            None,
            &body,
        )
        .await
    }

    /// `POST /v1/billing/authorizations/issue`
    pub async fn issue_billing_key(&self, auth_key: &str, customer_key: &str) -> Result<Value, TossError> {
        self.post(
            "/v1/billing/authorizations/issue",
            None,
            &json!({"authKey": auth_key, "customerKey": customer_key}),
        )
        .await
    }

    /// `POST /v1/billing/{billingKey}`
    pub async fn charge_billing_key(
        &self,
        billing_key: &str,
        customer_key: &str,
        amount: i64,
        order_id: &str,
        order_name: &str,
    ) -> Result<Value, TossError> {
        self.post(
            &format!("/v1/billing/{}", urlencoding::encode(billing_key)),
            Some(&format!("{order_id}:{billing_key}")),
            &json!({
                "amount": amount,
                "orderId": order_id,
                "customerKey": customer_key,
                "orderName": order_name,
            }),
        )
        .await
    }
}
