//! Payments Module
//!
//! Toss Payments checkout and card-on-file subscriptions. Orders,
//! subscriptions and billing keys are kept in an in-memory ledger; webhooks
//! are not handled.
//!
//! ```text
//! payments/
//! ├── mod.rs       - Exports
//! ├── ledger.rs    - In-memory orders, subscriptions, billing keys
//! ├── toss.rs      - Toss API client
//! └── handlers.rs  - /api/payments/toss/* endpoints
//! ```

pub mod ledger;

pub mod toss;

pub mod handlers;

pub use handlers::{
    billing_auth_fail, billing_auth_success, billing_start, cancel_payment, charge_now,
    create_order, payment_fail, payment_success,
};
pub use ledger::PaymentLedger;
pub use toss::{TossClient, TossError};
