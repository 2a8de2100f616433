//! Payment attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::{GatewayError, Result};
use crate::ids::{OrderId, TransactionId};
use crate::order::Order;
use crate::status::{PaymentOutcome, PaymentStatus};

/// Payment method recorded when none is given.
pub const DEFAULT_PAYMENT_METHOD: &str = "UPI";

/// UPI apps offered on the checkout page.
pub const KNOWN_UPI_APPS: [&str; 4] = ["gpay", "phonepe", "paytm", "bhim"];

const MAX_UPI_APP_LEN: usize = 32;

/// One payment attempt against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Time-ordered transaction ID.
    pub transaction_id: TransactionId,

    /// The order this attempt pays for.
    pub order_id: OrderId,

    /// Amount copied from the order when the attempt started.
    pub amount: Amount,

    /// Current status of the attempt.
    pub status: PaymentStatus,

    /// UPI app chosen by the customer (e.g. `gpay`).
    pub upi_app: Option<String>,

    /// Payment method label.
    pub payment_method: String,

    /// Customer email copied from the order.
    pub customer_email: Option<String>,

    /// Merchant name copied from the order.
    pub merchant_name: Option<String>,

    /// When the attempt started.
    pub created_at: DateTime<Utc>,

    /// When the attempt was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Start a pending payment attempt for `order`.
    ///
    /// `created_at` is taken from the generated ULID so that ID order and
    /// creation order agree.
    #[must_use]
    pub fn start(order: &Order, upi_app: Option<String>) -> Self {
        let transaction_id = TransactionId::generate();
        let created_at = transaction_id.created_at();
        Self {
            transaction_id,
            order_id: order.order_id.clone(),
            amount: order.amount,
            status: PaymentStatus::Pending,
            upi_app,
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            customer_email: Some(order.customer_email.clone()),
            merchant_name: Some(order.merchant_name.clone()),
            created_at,
            updated_at: created_at,
        }
    }

    /// Resolve the attempt to a final outcome.
    ///
    /// Returns `Ok(false)` when the attempt already has this outcome, leaving
    /// it untouched, and `Ok(true)` when the status changed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] if the attempt was already
    /// resolved to the other outcome.
    pub fn resolve(&mut self, outcome: PaymentOutcome, now: DateTime<Utc>) -> Result<bool> {
        let next = PaymentStatus::from(outcome);
        if self.status == next {
            return Ok(false);
        }
        if self.status.is_terminal() || !self.status.can_transition_to(next) {
            return Err(GatewayError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(true)
    }
}

/// Normalize and validate a UPI app label.
///
/// Labels are lowercased. Any short label of letters, digits, `-` or `_` is
/// accepted so new apps do not need a release; see [`KNOWN_UPI_APPS`].
///
/// # Errors
///
/// Returns [`GatewayError::InvalidField`] naming `upiApp`.
pub fn normalize_upi_app(raw: &str) -> Result<String> {
    let app = raw.trim().to_ascii_lowercase();
    let valid = !app.is_empty()
        && app.len() <= MAX_UPI_APP_LEN
        && app
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(app)
    } else {
        Err(GatewayError::invalid_field("upiApp", "must be a short app identifier"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::NewOrder;

    fn order() -> Order {
        Order::new(
            NewOrder {
                order_id: "FP1001".parse().unwrap(),
                amount: "1299.00".parse().unwrap(),
                merchant_name: "TechStore Pro".to_string(),
                description: None,
                customer_email: "a@b.com".to_string(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn start_copies_order_fields() {
        let order = order();
        let tx = Transaction::start(&order, Some("gpay".to_string()));
        assert_eq!(tx.order_id, order.order_id);
        assert_eq!(tx.amount, order.amount);
        assert_eq!(tx.status, PaymentStatus::Pending);
        assert_eq!(tx.payment_method, DEFAULT_PAYMENT_METHOD);
        assert_eq!(tx.merchant_name.as_deref(), Some("TechStore Pro"));
        assert_eq!(tx.created_at, tx.transaction_id.created_at());
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut tx = Transaction::start(&order(), None);
        let first = Utc::now();
        assert!(tx.resolve(PaymentOutcome::Success, first).unwrap());
        let snapshot = tx.clone();
        assert!(!tx.resolve(PaymentOutcome::Success, Utc::now()).unwrap());
        assert_eq!(tx, snapshot);
    }

    #[test]
    fn resolve_rejects_conflicting_outcome() {
        let mut tx = Transaction::start(&order(), None);
        tx.resolve(PaymentOutcome::Failed, Utc::now()).unwrap();
        let err = tx.resolve(PaymentOutcome::Success, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            GatewayError::InvalidTransition {
                from: PaymentStatus::Failed,
                to: PaymentStatus::Success,
            }
        );
    }

    #[test]
    fn upi_app_normalization() {
        assert_eq!(normalize_upi_app(" GPay ").unwrap(), "gpay");
        for app in KNOWN_UPI_APPS {
            assert_eq!(normalize_upi_app(app).unwrap(), app);
        }
        assert!(normalize_upi_app("").is_err());
        assert!(normalize_upi_app("google pay").is_err());
    }
}
