//! API handlers.

pub mod admin;
pub mod health;
pub mod orders;
pub mod payments;
pub mod users;
pub mod webhooks;

use fusionpay_core::{OrderId, TransactionId};

use crate::error::ApiError;

/// Parse an order id from a path segment. Malformed ids cannot name an order.
pub(crate) fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("order not found".into()))
}

/// Parse a transaction id from a path segment or payload.
pub(crate) fn parse_transaction_id(raw: &str) -> Result<TransactionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("transaction not found".into()))
}
