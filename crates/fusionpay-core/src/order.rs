//! Merchant orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::{GatewayError, Result};
use crate::ids::OrderId;
use crate::status::{PaymentOutcome, PaymentStatus};

/// Maximum length of a merchant name.
pub const MAX_MERCHANT_NAME_LEN: usize = 255;

/// Maximum length of an order description.
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// Maximum length of an email address.
pub const MAX_EMAIL_LEN: usize = 254;

/// Fields supplied by a merchant when creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Merchant-chosen order ID.
    pub order_id: OrderId,
    /// Amount to collect.
    pub amount: Amount,
    /// Display name of the merchant.
    pub merchant_name: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Email address of the paying customer.
    pub customer_email: String,
}

/// A billing intent awaiting payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Merchant-chosen order ID, immutable once created.
    pub order_id: OrderId,

    /// Amount to collect.
    pub amount: Amount,

    /// Display name of the merchant.
    pub merchant_name: String,

    /// Optional free-text description.
    pub description: Option<String>,

    /// Email address of the paying customer.
    pub customer_email: String,

    /// Current payment status.
    pub status: PaymentStatus,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Validate a [`NewOrder`] and build a pending order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidField`] for a zero amount, an empty
    /// merchant name, an oversized description or a malformed customer email.
    pub fn new(new: NewOrder, now: DateTime<Utc>) -> Result<Self> {
        if !new.amount.is_positive() {
            return Err(GatewayError::invalid_field("amount", "must be greater than zero"));
        }

        let merchant_name = new.merchant_name.trim().to_string();
        if merchant_name.is_empty() {
            return Err(GatewayError::invalid_field("merchantName", "must not be empty"));
        }
        if merchant_name.len() > MAX_MERCHANT_NAME_LEN {
            return Err(GatewayError::invalid_field("merchantName", "too long"));
        }

        let description = new
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if description
            .as_ref()
            .is_some_and(|d| d.len() > MAX_DESCRIPTION_LEN)
        {
            return Err(GatewayError::invalid_field("description", "too long"));
        }

        let customer_email = new.customer_email.trim().to_string();
        validate_email(&customer_email)?;

        Ok(Self {
            order_id: new.order_id,
            amount: new.amount,
            merchant_name,
            description,
            customer_email,
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Prepare the order for a new payment attempt.
    ///
    /// A failed order moves back to pending. Returns `true` if the status changed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::OrderAlreadyPaid`] if the order has succeeded.
    pub fn reopen_for_payment(&mut self, now: DateTime<Utc>) -> Result<bool> {
        if self.status == PaymentStatus::Pending {
            return Ok(false);
        }
        if !self.status.can_transition_to(PaymentStatus::Pending) {
            return Err(GatewayError::OrderAlreadyPaid {
                order_id: self.order_id.to_string(),
            });
        }
        self.status = PaymentStatus::Pending;
        self.updated_at = now;
        Ok(true)
    }

    /// Apply the outcome of one of this order's payment attempts.
    ///
    /// A paid order stays paid, while a failed order still settles if a
    /// concurrent attempt succeeds. Returns `true` if the status changed.
    pub fn record_outcome(&mut self, outcome: PaymentOutcome, now: DateTime<Utc>) -> bool {
        let next = PaymentStatus::from(outcome);
        if self.status == next || !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        self.updated_at = now;
        true
    }
}

/// Minimal structural email check: `local@domain.tld` without whitespace.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidField`] naming `customerEmail`.
pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || GatewayError::invalid_field("customerEmail", "must be a valid email address");

    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels_ok = domain.split('.').count() >= 2 && domain.split('.').all(|label| !label.is_empty());
    if !labels_ok {
        return Err(invalid());
    }
    Ok(())
}
