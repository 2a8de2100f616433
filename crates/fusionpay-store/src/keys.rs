//! Key encoding utilities for `RocksDB`.

use fusionpay_core::{ApiKeyId, OrderId, TransactionId, UserId};

/// Separator between the order ID and transaction ID in index keys.
///
/// Order IDs never contain NUL, so a prefix scan on `order_id || 0x00`
/// cannot match a longer order ID.
const ORDER_INDEX_SEPARATOR: u8 = 0;

/// Create a user key from a user ID.
#[must_use]
pub fn user_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a username index key.
#[must_use]
pub fn username_key(username: &str) -> Vec<u8> {
    username.as_bytes().to_vec()
}

/// Create an order key from an order ID.
#[must_use]
pub fn order_key(order_id: &OrderId) -> Vec<u8> {
    order_id.as_str().as_bytes().to_vec()
}

/// Create a transaction key from a transaction ID.
#[must_use]
pub fn transaction_key(transaction_id: &TransactionId) -> Vec<u8> {
    transaction_id.to_bytes().to_vec()
}

/// Create an order-transaction index key.
///
/// Format: `order_id || 0x00 || transaction_id (16 bytes)`
///
/// Since ULIDs are time-ordered, transactions for an order sort by time.
#[must_use]
pub fn order_transaction_key(order_id: &OrderId, transaction_id: &TransactionId) -> Vec<u8> {
    let mut key = order_transactions_prefix(order_id);
    key.extend_from_slice(&transaction_id.to_bytes());
    key
}

/// Create a prefix for iterating all transactions for an order.
#[must_use]
pub fn order_transactions_prefix(order_id: &OrderId) -> Vec<u8> {
    let raw = order_id.as_str().as_bytes();
    let mut key = Vec::with_capacity(raw.len() + 17);
    key.extend_from_slice(raw);
    key.push(ORDER_INDEX_SEPARATOR);
    key
}

/// Extract the transaction ID from an order-transaction index key.
///
/// Returns `None` if the key is shorter than a transaction ID.
#[must_use]
pub fn extract_transaction_id_from_order_key(key: &[u8]) -> Option<TransactionId> {
    let start = key.len().checked_sub(16)?;
    let bytes: [u8; 16] = key[start..].try_into().ok()?;
    Some(TransactionId::from_bytes(bytes))
}

/// Create an API key record key.
#[must_use]
pub fn api_key_key(key_id: &ApiKeyId) -> Vec<u8> {
    key_id.as_str().as_bytes().to_vec()
}
