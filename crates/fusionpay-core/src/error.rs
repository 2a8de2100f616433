//! Error types for FusionPay domain rules.

use crate::amount::AmountError;
use crate::ids::IdError;
use crate::status::PaymentStatus;

/// Result type for FusionPay domain operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors raised by entity constructors and status transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Amount could not be parsed or is out of range.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// A field failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field (camelCase, as on the wire).
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The requested status change is not allowed.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: PaymentStatus,
        /// Requested status.
        to: PaymentStatus,
    },

    /// The order has already been paid and cannot take a new payment attempt.
    #[error("order already paid: {order_id}")]
    OrderAlreadyPaid {
        /// The paid order.
        order_id: String,
    },

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}

impl GatewayError {
    pub(crate) fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
