//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use fusionpay_core::{
    ApiKey, ApiKeyId, KeyStatus, Order, OrderId, PaymentOutcome, Transaction, TransactionId, User,
    UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{apply_outcome, PaymentAttempt, Resolution, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    /// Serializes read-modify-write operations.
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Database("write lock poisoned".into()))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get_value<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn put_value<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let value = Self::serialize(value)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Load an API key, apply `update`, and write it back under the write lock.
    fn update_api_key(
        &self,
        key_id: &ApiKeyId,
        update: impl FnOnce(&mut ApiKey),
    ) -> Result<ApiKey> {
        let _guard = self.lock()?;
        let key = keys::api_key_key(key_id);
        let mut record: ApiKey = self
            .get_value(cf::API_KEYS, &key)?
            .ok_or_else(|| api_key_not_found(key_id))?;
        update(&mut record);
        self.put_value(cf::API_KEYS, &key, &record)?;
        Ok(record)
    }
}

fn api_key_not_found(key_id: &ApiKeyId) -> StoreError {
    StoreError::NotFound {
        entity: "api key",
        id: key_id.to_string(),
    }
}

impl Store for RocksStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    fn create_user(&self, user: &User) -> Result<()> {
        let _guard = self.lock()?;
        let cf_users = self.cf(cf::USERS)?;
        let cf_by_name = self.cf(cf::USERS_BY_USERNAME)?;
        let name_key = keys::username_key(&user.username);

        let taken = self
            .db
            .get_cf(&cf_by_name, &name_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        if taken {
            return Err(StoreError::AlreadyExists {
                entity: "user",
                id: user.username.clone(),
            });
        }

        let value = Self::serialize(user)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_users, keys::user_key(&user.user_id), &value);
        batch.put_cf(&cf_by_name, &name_key, user.user_id.as_bytes());

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        self.get_value(cf::USERS, &keys::user_key(user_id))
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let cf_by_name = self.cf(cf::USERS_BY_USERNAME)?;
        let Some(raw) = self
            .db
            .get_cf(&cf_by_name, keys::username_key(username))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let bytes: [u8; 16] = raw
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Database("corrupt username index entry".into()))?;
        self.get_user(&UserId::from_bytes(bytes))
    }

    // =========================================================================
    // Order Operations
    // =========================================================================

    fn create_order(&self, order: &Order) -> Result<()> {
        let _guard = self.lock()?;
        let key = keys::order_key(&order.order_id);
        if self.get_value::<Order>(cf::ORDERS, &key)?.is_some() {
            return Err(StoreError::DuplicateOrderId {
                order_id: order.order_id.to_string(),
            });
        }
        self.put_value(cf::ORDERS, &key, order)?;

        tracing::debug!(order_id = %order.order_id, "Order stored");
        Ok(())
    }

    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>> {
        self.get_value(cf::ORDERS, &keys::order_key(order_id))
    }

    // =========================================================================
    // Transaction Operations
    // =========================================================================

    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Transaction>> {
        self.get_value(cf::TRANSACTIONS, &keys::transaction_key(transaction_id))
    }

    fn list_recent_transactions(&self, limit: usize) -> Result<Vec<Transaction>> {
        let cf = self.cf(cf::TRANSACTIONS)?;

        // ULID keys sort by creation time, so iterating from the end yields newest first.
        let mut transactions = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::End).take(limit) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            transactions.push(Self::deserialize(&value)?);
        }

        Ok(transactions)
    }

    fn list_transactions_by_order(&self, order_id: &OrderId) -> Result<Vec<Transaction>> {
        let cf_by_order = self.cf(cf::TRANSACTIONS_BY_ORDER)?;
        let prefix = keys::order_transactions_prefix(order_id);

        let mut ids = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf_by_order, IteratorMode::From(&prefix, Direction::Forward));
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            if let Some(tx_id) = keys::extract_transaction_id_from_order_key(&key) {
                ids.push(tx_id);
            }
        }

        // Reverse to get newest first
        ids.reverse();

        let mut transactions = Vec::with_capacity(ids.len());
        for tx_id in ids {
            if let Some(tx) = self.get_transaction(&tx_id)? {
                transactions.push(tx);
            }
        }

        Ok(transactions)
    }

    // =========================================================================
    // Compound Payment Operations
    // =========================================================================

    fn initiate_payment(
        &self,
        order_id: &OrderId,
        upi_app: Option<String>,
    ) -> Result<PaymentAttempt> {
        let _guard = self.lock()?;

        let mut order = self
            .get_order(order_id)?
            .ok_or_else(|| StoreError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;
        order.reopen_for_payment(Utc::now())?;
        let transaction = Transaction::start(&order, upi_app);

        let cf_orders = self.cf(cf::ORDERS)?;
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_tx_by_order = self.cf(cf::TRANSACTIONS_BY_ORDER)?;

        let order_value = Self::serialize(&order)?;
        let tx_value = Self::serialize(&transaction)?;

        // Write atomically
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_orders, keys::order_key(order_id), &order_value);
        batch.put_cf(
            &cf_tx,
            keys::transaction_key(&transaction.transaction_id),
            &tx_value,
        );
        batch.put_cf(
            &cf_tx_by_order,
            keys::order_transaction_key(order_id, &transaction.transaction_id),
            [],
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!(
            order_id = %order_id,
            transaction_id = %transaction.transaction_id,
            "Payment initiated"
        );

        Ok(PaymentAttempt { order, transaction })
    }

    fn resolve_payment(
        &self,
        transaction_id: &TransactionId,
        outcome: PaymentOutcome,
    ) -> Result<Resolution> {
        let _guard = self.lock()?;

        let transaction = self.get_transaction(transaction_id)?.ok_or_else(|| {
            StoreError::TransactionNotFound {
                transaction_id: transaction_id.to_string(),
            }
        })?;
        let order = self
            .get_order(&transaction.order_id)?
            .ok_or_else(|| StoreError::OrderNotFound {
                order_id: transaction.order_id.to_string(),
            })?;

        let resolution = apply_outcome(transaction, order, outcome, Utc::now())?;

        if resolution.changed {
            let cf_orders = self.cf(cf::ORDERS)?;
            let cf_tx = self.cf(cf::TRANSACTIONS)?;

            let order_value = Self::serialize(&resolution.order)?;
            let tx_value = Self::serialize(&resolution.transaction)?;

            // Write atomically
            let mut batch = WriteBatch::default();
            batch.put_cf(
                &cf_orders,
                keys::order_key(&resolution.order.order_id),
                &order_value,
            );
            batch.put_cf(&cf_tx, keys::transaction_key(transaction_id), &tx_value);

            self.db
                .write(batch)
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        tracing::debug!(
            transaction_id = %transaction_id,
            outcome = %outcome,
            changed = resolution.changed,
            "Payment resolved"
        );

        Ok(resolution)
    }

    // =========================================================================
    // API Key Operations
    // =========================================================================

    fn create_api_key(&self, key: &ApiKey) -> Result<()> {
        let _guard = self.lock()?;
        let raw = keys::api_key_key(&key.key_id);
        if self.get_value::<ApiKey>(cf::API_KEYS, &raw)?.is_some() {
            return Err(StoreError::AlreadyExists {
                entity: "api key",
                id: key.masked(),
            });
        }
        self.put_value(cf::API_KEYS, &raw, key)
    }

    fn get_api_key(&self, key_id: &ApiKeyId) -> Result<Option<ApiKey>> {
        self.get_value(cf::API_KEYS, &keys::api_key_key(key_id))
    }

    fn list_api_keys(&self) -> Result<Vec<ApiKey>> {
        let cf = self.cf(cf::API_KEYS)?;

        let mut api_keys: Vec<ApiKey> = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            api_keys.push(Self::deserialize(&value)?);
        }
        api_keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(api_keys)
    }

    fn touch_api_key(&self, key_id: &ApiKeyId, at: DateTime<Utc>) -> Result<ApiKey> {
        self.update_api_key(key_id, |key| key.last_used = Some(at))
    }

    fn revoke_api_key(&self, key_id: &ApiKeyId) -> Result<ApiKey> {
        self.update_api_key(key_id, |key| key.status = KeyStatus::Revoked)
    }

    fn delete_api_key(&self, key_id: &ApiKeyId) -> Result<()> {
        let _guard = self.lock()?;
        let cf = self.cf(cf::API_KEYS)?;
        let raw = keys::api_key_key(key_id);

        // Check if the key exists
        if self.get_value::<ApiKey>(cf::API_KEYS, &raw)?.is_none() {
            return Err(api_key_not_found(key_id));
        }

        self.db
            .delete_cf(&cf, raw)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance;
    use fusionpay_core::{NewOrder, PaymentStatus};
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn user_operations() {
        let (store, _dir) = create_test_store();
        conformance::user_operations(&store);
    }

    #[test]
    fn order_round_trip() {
        let (store, _dir) = create_test_store();
        conformance::order_round_trip(&store);
    }

    #[test]
    fn duplicate_order_rejected() {
        let (store, _dir) = create_test_store();
        conformance::duplicate_order_rejected(&store);
    }

    #[test]
    fn initiate_unknown_order() {
        let (store, _dir) = create_test_store();
        conformance::initiate_unknown_order(&store);
    }

    #[test]
    fn resolve_success_flow() {
        let (store, _dir) = create_test_store();
        conformance::resolve_success_flow(&store);
    }

    #[test]
    fn resolve_is_idempotent() {
        let (store, _dir) = create_test_store();
        conformance::resolve_is_idempotent(&store);
    }

    #[test]
    fn conflicting_outcome_rejected() {
        let (store, _dir) = create_test_store();
        conformance::conflicting_outcome_rejected(&store);
    }

    #[test]
    fn retry_after_failure() {
        let (store, _dir) = create_test_store();
        conformance::retry_after_failure(&store);
    }

    #[test]
    fn paid_order_not_downgraded() {
        let (store, _dir) = create_test_store();
        conformance::paid_order_not_downgraded(&store);
    }

    #[test]
    fn concurrent_attempts_settle_order() {
        let (store, _dir) = create_test_store();
        conformance::concurrent_attempts_settle_order(&store);
    }

    #[test]
    fn recent_transactions_ordering() {
        let (store, _dir) = create_test_store();
        conformance::recent_transactions_ordering(&store);
    }

    #[test]
    fn api_key_lifecycle() {
        let (store, _dir) = create_test_store();
        conformance::api_key_lifecycle(&store);
    }

    #[test]
    fn concurrent_order_creation() {
        let (store, _dir) = create_test_store();
        conformance::concurrent_order_creation(Arc::new(store));
    }

    #[test]
    fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let order_id: OrderId = "FP1001".parse().unwrap();
        let tx_id = {
            let store = RocksStore::open(dir.path()).unwrap();
            let order = Order::new(
                NewOrder {
                    order_id: order_id.clone(),
                    amount: "1299.00".parse().unwrap(),
                    merchant_name: "TechStore Pro".into(),
                    description: None,
                    customer_email: "a@b.com".into(),
                },
                Utc::now(),
            )
            .unwrap();
            store.create_order(&order).unwrap();
            let attempt = store.initiate_payment(&order_id, Some("gpay".into())).unwrap();
            store
                .resolve_payment(&attempt.transaction.transaction_id, PaymentOutcome::Success)
                .unwrap();
            attempt.transaction.transaction_id
        };

        let store = RocksStore::open(dir.path()).unwrap();
        let order = store.get_order(&order_id).unwrap().unwrap();
        assert_eq!(order.status, PaymentStatus::Success);
        assert_eq!(order.amount.to_string(), "1299.00");
        let tx = store.get_transaction(&tx_id).unwrap().unwrap();
        assert_eq!(tx.status, PaymentStatus::Success);
        assert_eq!(store.list_transactions_by_order(&order_id).unwrap().len(), 1);
    }
}
