//! Error types for FusionPay storage.

use fusionpay_core::{GatewayError, PaymentStatus};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An order with this ID already exists.
    #[error("duplicate order ID: {order_id}")]
    DuplicateOrderId {
        /// The order ID that already exists.
        order_id: String,
    },

    /// The referenced order does not exist.
    #[error("order not found: {order_id}")]
    OrderNotFound {
        /// The missing order ID.
        order_id: String,
    },

    /// The referenced transaction does not exist.
    #[error("transaction not found: {transaction_id}")]
    TransactionNotFound {
        /// The missing transaction ID.
        transaction_id: String,
    },

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity type (e.g., "user", "api key").
        entity: &'static str,
        /// The identifier that was not found.
        id: String,
    },

    /// A record with a unique attribute already exists.
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        /// The entity type.
        entity: &'static str,
        /// The conflicting identifier.
        id: String,
    },

    /// The order is already paid.
    #[error("order already paid: {order_id}")]
    OrderAlreadyPaid {
        /// The paid order ID.
        order_id: String,
    },

    /// The requested status change is not allowed.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: PaymentStatus,
        /// Requested status.
        to: PaymentStatus,
    },

    /// The record failed a domain rule.
    #[error("invalid record: {0}")]
    Invalid(GatewayError),
}

impl From<GatewayError> for StoreError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::OrderAlreadyPaid { order_id } => Self::OrderAlreadyPaid { order_id },
            GatewayError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            other => Self::Invalid(other),
        }
    }
}
