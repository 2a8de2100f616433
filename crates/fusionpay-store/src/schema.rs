//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User records, keyed by `user_id`.
    pub const USERS: &str = "users";

    /// Index: usernames to user IDs. Value is the 16-byte `user_id`.
    pub const USERS_BY_USERNAME: &str = "users_by_username";

    /// Orders, keyed by the merchant order ID.
    pub const ORDERS: &str = "orders";

    /// Payment attempts, keyed by `transaction_id` (ULID, time-ordered).
    pub const TRANSACTIONS: &str = "transactions";

    /// Index: transactions by order, keyed by `order_id || 0x00 || transaction_id`.
    /// Value is empty (index only).
    pub const TRANSACTIONS_BY_ORDER: &str = "transactions_by_order";

    /// API keys, keyed by the key string.
    pub const API_KEYS: &str = "api_keys";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::USERS,
        cf::USERS_BY_USERNAME,
        cf::ORDERS,
        cf::TRANSACTIONS,
        cf::TRANSACTIONS_BY_ORDER,
        cf::API_KEYS,
    ]
}
