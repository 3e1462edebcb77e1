//! In-memory payment ledger
//!
//! Orders, subscriptions and billing keys live in process memory and are
//! lost on restart. Each map sits behind its own `Arc<RwLock<..>>` so the
//! ledger can be cloned into every handler.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Interval between subscription charges
pub const BILLING_PERIOD_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Ready,
    Paid,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub amount: i64,
    pub status: OrderStatus,
    pub payment_key: Option<String>,
    pub order_name: String,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan: String,
    pub amount: i64,
    pub interval: String,
    pub next_billing_at: Option<DateTime<Utc>>,
    pub user_id: Option<i64>,
}

impl Subscription {
    pub fn monthly(plan: impl Into<String>, amount: i64, user_id: Option<i64>) -> Self {
        Self {
            plan: plan.into(),
            amount,
            interval: "MONTH".to_string(),
            next_billing_at: None,
            user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingEntry {
    pub billing_key: String,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentLedger {
    orders: Arc<RwLock<HashMap<String, Order>>>,
    subscriptions: Arc<RwLock<HashMap<String, Subscription>>>,
    billing: Arc<RwLock<HashMap<String, BillingEntry>>>,
}

impl PaymentLedger {
    /// Record a new READY order, replacing any order with the same id
    pub async fn create_order(
        &self,
        order_id: &str,
        amount: i64,
        order_name: &str,
        user_id: Option<i64>,
    ) -> Order {
        let order = Order {
            order_id: order_id.to_string(),
            amount,
            status: OrderStatus::Ready,
            payment_key: None,
            order_name: order_name.to_string(),
            user_id,
        };
        self.orders
            .write()
            .await
            .insert(order_id.to_string(), order.clone());
        order
    }

    pub async fn order(&self, order_id: &str) -> Option<Order> {
        self.orders.read().await.get(order_id).cloned()
    }

    pub async fn order_by_payment_key(&self, payment_key: &str) -> Option<Order> {
        self.orders
            .read()
            .await
            .values()
            .find(|order| order.payment_key.as_deref() == Some(payment_key))
            .cloned()
    }

    pub async fn mark_paid(&self, order_id: &str, payment_key: &str) -> Option<Order> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(order_id)?;
        order.status = OrderStatus::Paid;
        order.payment_key = Some(payment_key.to_string());
        Some(order.clone())
    }

    pub async fn mark_canceled(&self, order_id: &str) -> Option<Order> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(order_id)?;
        order.status = OrderStatus::Canceled;
        Some(order.clone())
    }

    /// Store a pending subscription
    ///
    /// Fails with the current owner when the customer key already belongs
    /// to a different user, through its subscription or its billing key.
    pub async fn put_subscription(
        &self,
        customer_key: &str,
        subscription: Subscription,
    ) -> Result<(), i64> {
        let mut subscriptions = self.subscriptions.write().await;
        let owners = [
            subscriptions.get(customer_key).and_then(|s| s.user_id),
            self.billing.read().await.get(customer_key).and_then(|b| b.user_id),
        ];
        if let Some(owner) = owners
            .into_iter()
            .flatten()
            .find(|owner| Some(*owner) != subscription.user_id)
        {
            return Err(owner);
        }

        subscriptions.insert(customer_key.to_string(), subscription);
        Ok(())
    }

    pub async fn subscription(&self, customer_key: &str) -> Option<Subscription> {
        self.subscriptions.read().await.get(customer_key).cloned()
    }

    /// Store an issued billing key
    ///
    /// The owner is taken from the pending subscription. A subscription is
    /// created when none exists, and the next charge is scheduled one
    /// billing period after `now`.
    pub async fn enroll_billing(
        &self,
        customer_key: &str,
        billing_key: &str,
        now: DateTime<Utc>,
    ) -> Subscription {
        let mut subscriptions = self.subscriptions.write().await;
        let subscription = subscriptions
            .entry(customer_key.to_string())
            .or_insert_with(|| Subscription::monthly("UNKNOWN", 0, None));
        subscription.next_billing_at = Some(now + Duration::days(BILLING_PERIOD_DAYS));

        self.billing.write().await.insert(
            customer_key.to_string(),
            BillingEntry {
                billing_key: billing_key.to_string(),
                user_id: subscription.user_id,
            },
        );
        subscription.clone()
    }

    pub async fn billing(&self, customer_key: &str) -> Option<BillingEntry> {
        self.billing.read().await.get(customer_key).cloned()
    }

    /// Move the next charge one billing period after `now`
    pub async fn advance_billing(&self, customer_key: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut subscriptions = self.subscriptions.write().await;
        let subscription = subscriptions.get_mut(customer_key)?;
        let next = now + Duration::days(BILLING_PERIOD_DAYS);
        subscription.next_billing_at = Some(next);
        Some(next)
    }
}
