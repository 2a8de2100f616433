//! Storage layer for FusionPay.
//!
//! This crate provides persistent storage for users, orders, payment attempts and
//! API keys. Two backends implement the [`Store`] trait:
//!
//! - [`RocksStore`] (feature `rocksdb-backend`, on by default): `RocksDB` with one
//!   column family per record type and CBOR-encoded values.
//! - [`MemoryStore`]: `BTreeMap`s behind a lock, for tests and throwaway demos.
//!
//! # Architecture
//!
//! The `RocksDB` backend uses the following column families:
//!
//! - `users`: User records, keyed by `user_id`
//! - `users_by_username`: Index from username to `user_id`
//! - `orders`: Orders, keyed by the merchant order ID
//! - `transactions`: Payment attempts, keyed by `transaction_id` (ULID)
//! - `transactions_by_order`: Index for listing the attempts of an order
//! - `api_keys`: API keys, keyed by the key string
//!
//! The two payment operations, [`Store::initiate_payment`] and
//! [`Store::resolve_payment`], read and write an order and a transaction
//! together. Both backends apply them atomically and serialize them against
//! each other.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use fusionpay_core::{NewOrder, Order, PaymentOutcome};
//! use fusionpay_store::{RocksStore, Store};
//!
//! let store = RocksStore::open("/tmp/fusionpay-db").unwrap();
//!
//! let order = Order::new(
//!     NewOrder {
//!         order_id: "FP1001".parse().unwrap(),
//!         amount: "1299.00".parse().unwrap(),
//!         merchant_name: "TechStore Pro".into(),
//!         description: None,
//!         customer_email: "a@b.com".into(),
//!     },
//!     Utc::now(),
//! )
//! .unwrap();
//! store.create_order(&order).unwrap();
//!
//! let attempt = store.initiate_payment(&order.order_id, Some("gpay".into())).unwrap();
//! let resolved = store
//!     .resolve_payment(&attempt.transaction.transaction_id, PaymentOutcome::Success)
//!     .unwrap();
//! assert!(resolved.changed);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
#[cfg(feature = "rocksdb-backend")]
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;

#[cfg(test)]
mod conformance;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use chrono::{DateTime, Utc};
use fusionpay_core::{
    ApiKey, ApiKeyId, Order, OrderId, PaymentOutcome, Transaction, TransactionId, User, UserId,
};

/// Result of [`Store::initiate_payment`].
#[derive(Debug, Clone)]
pub struct PaymentAttempt {
    /// The order after any retry reset.
    pub order: Order,
    /// The new pending transaction.
    pub transaction: Transaction,
}

/// Result of [`Store::resolve_payment`].
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The transaction after resolution.
    pub transaction: Transaction,
    /// The transaction's order after resolution.
    pub order: Order,
    /// Whether anything was written. `false` for a repeated outcome.
    pub changed: bool,
}

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the username is taken.
    fn create_user(&self, user: &User) -> Result<()>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    // =========================================================================
    // Order Operations
    // =========================================================================

    /// Insert a new order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateOrderId` if the order ID exists.
    fn create_order(&self, order: &Order) -> Result<()>;

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>>;

    // =========================================================================
    // Transaction Operations
    // =========================================================================

    /// Get a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Transaction>>;

    /// List the most recent transactions across all orders (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_recent_transactions(&self, limit: usize) -> Result<Vec<Transaction>>;

    /// List the transactions of one order (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_order(&self, order_id: &OrderId) -> Result<Vec<Transaction>>;

    /// The newest transaction of an order, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn latest_transaction_for_order(&self, order_id: &OrderId) -> Result<Option<Transaction>> {
        Ok(self.list_transactions_by_order(order_id)?.into_iter().next())
    }

    // =========================================================================
    // Compound Payment Operations
    // =========================================================================

    /// Start a payment attempt for an order.
    ///
    /// A failed order is moved back to pending. The order update and the new
    /// transaction are written atomically.
    ///
    /// # Errors
    ///
    /// - `StoreError::OrderNotFound` if the order doesn't exist. No transaction is created.
    /// - `StoreError::OrderAlreadyPaid` if the order has succeeded.
    fn initiate_payment(&self, order_id: &OrderId, upi_app: Option<String>)
        -> Result<PaymentAttempt>;

    /// Resolve a payment attempt and propagate the outcome to its order.
    ///
    /// Repeating the outcome a transaction already has writes nothing and
    /// returns `changed == false`. A paid order is never downgraded.
    ///
    /// # Errors
    ///
    /// - `StoreError::TransactionNotFound` if the transaction doesn't exist.
    /// - `StoreError::InvalidTransition` if it was resolved to the other outcome.
    fn resolve_payment(
        &self,
        transaction_id: &TransactionId,
        outcome: PaymentOutcome,
    ) -> Result<Resolution>;

    // =========================================================================
    // API Key Operations
    // =========================================================================

    /// Insert a new API key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` on a key collision.
    fn create_api_key(&self, key: &ApiKey) -> Result<()>;

    /// Get an API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_api_key(&self, key_id: &ApiKeyId) -> Result<Option<ApiKey>>;

    /// List all API keys (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_api_keys(&self) -> Result<Vec<ApiKey>>;

    /// Record a successful use of a key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the key doesn't exist.
    fn touch_api_key(&self, key_id: &ApiKeyId, at: DateTime<Utc>) -> Result<ApiKey>;

    /// Mark a key as revoked. Revoking twice is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the key doesn't exist.
    fn revoke_api_key(&self, key_id: &ApiKeyId) -> Result<ApiKey>;

    /// Permanently delete a key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the key doesn't exist.
    fn delete_api_key(&self, key_id: &ApiKeyId) -> Result<()>;
}

/// Apply an outcome to a transaction and its order in memory.
///
/// Shared by both backends so they agree on idempotency and downgrade rules.
pub(crate) fn apply_outcome(
    mut transaction: Transaction,
    mut order: Order,
    outcome: PaymentOutcome,
    now: DateTime<Utc>,
) -> Result<Resolution> {
    let changed = transaction.resolve(outcome, now)?;
    if changed {
        order.record_outcome(outcome, now);
    }
    Ok(Resolution {
        transaction,
        order,
        changed,
    })
}
