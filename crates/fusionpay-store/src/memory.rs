//! In-memory storage implementation.
//!
//! All records live in ordered maps behind one `RwLock`; compound operations
//! take the write lock for their whole read-modify-write.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use fusionpay_core::{
    ApiKey, ApiKeyId, KeyStatus, Order, OrderId, PaymentOutcome, Transaction, TransactionId, User,
    UserId,
};

use crate::error::{Result, StoreError};
use crate::{apply_outcome, PaymentAttempt, Resolution, Store};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    users_by_username: HashMap<String, UserId>,
    orders: HashMap<OrderId, Order>,
    transactions: BTreeMap<TransactionId, Transaction>,
    transactions_by_order: BTreeSet<(OrderId, TransactionId)>,
    api_keys: HashMap<ApiKeyId, ApiKey>,
}

/// Storage backed by process memory. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Database("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Database("memory store lock poisoned".into()))
    }
}

fn key_not_found(key_id: &ApiKeyId) -> StoreError {
    StoreError::NotFound {
        entity: "api key",
        id: key_id.to_string(),
    }
}

impl Store for MemoryStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    fn create_user(&self, user: &User) -> Result<()> {
        let mut tables = self.write()?;
        if tables.users_by_username.contains_key(&user.username) {
            return Err(StoreError::AlreadyExists {
                entity: "user",
                id: user.username.clone(),
            });
        }
        tables
            .users_by_username
            .insert(user.username.clone(), user.user_id);
        tables.users.insert(user.user_id, user.clone());
        Ok(())
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        Ok(self.read()?.users.get(user_id).cloned())
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.read()?;
        Ok(tables
            .users_by_username
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    // =========================================================================
    // Order Operations
    // =========================================================================

    fn create_order(&self, order: &Order) -> Result<()> {
        let mut tables = self.write()?;
        if tables.orders.contains_key(&order.order_id) {
            return Err(StoreError::DuplicateOrderId {
                order_id: order.order_id.to_string(),
            });
        }
        tables.orders.insert(order.order_id.clone(), order.clone());
        Ok(())
    }

    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>> {
        Ok(self.read()?.orders.get(order_id).cloned())
    }

    // =========================================================================
    // Transaction Operations
    // =========================================================================

    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Transaction>> {
        Ok(self.read()?.transactions.get(transaction_id).cloned())
    }

    fn list_recent_transactions(&self, limit: usize) -> Result<Vec<Transaction>> {
        Ok(self
            .read()?
            .transactions
            .values()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    fn list_transactions_by_order(&self, order_id: &OrderId) -> Result<Vec<Transaction>> {
        let tables = self.read()?;
        Ok(tables
            .transactions_by_order
            .range(
                (order_id.clone(), TransactionId::MIN)..=(order_id.clone(), TransactionId::MAX),
            )
            .rev()
            .filter_map(|(_, tx_id)| tables.transactions.get(tx_id).cloned())
            .collect())
    }

    // =========================================================================
    // Compound Payment Operations
    // =========================================================================

    fn initiate_payment(
        &self,
        order_id: &OrderId,
        upi_app: Option<String>,
    ) -> Result<PaymentAttempt> {
        let mut tables = self.write()?;
        let mut order = tables
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| StoreError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;

        order.reopen_for_payment(Utc::now())?;
        let transaction = Transaction::start(&order, upi_app);

        tables.orders.insert(order.order_id.clone(), order.clone());
        tables
            .transactions_by_order
            .insert((order.order_id.clone(), transaction.transaction_id));
        tables
            .transactions
            .insert(transaction.transaction_id, transaction.clone());

        tracing::debug!(
            order_id = %order.order_id,
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
        let mut tables = self.write()?;
        let transaction = tables
            .transactions
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| StoreError::TransactionNotFound {
                transaction_id: transaction_id.to_string(),
            })?;
        let order = tables
            .orders
            .get(&transaction.order_id)
            .cloned()
            .ok_or_else(|| StoreError::OrderNotFound {
                order_id: transaction.order_id.to_string(),
            })?;

        let resolution = apply_outcome(transaction, order, outcome, Utc::now())?;
        if resolution.changed {
            tables.orders.insert(
                resolution.order.order_id.clone(),
                resolution.order.clone(),
            );
            tables
                .transactions
                .insert(*transaction_id, resolution.transaction.clone());
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
        let mut tables = self.write()?;
        if tables.api_keys.contains_key(&key.key_id) {
            return Err(StoreError::AlreadyExists {
                entity: "api key",
                id: key.masked(),
            });
        }
        tables.api_keys.insert(key.key_id.clone(), key.clone());
        Ok(())
    }

    fn get_api_key(&self, key_id: &ApiKeyId) -> Result<Option<ApiKey>> {
        Ok(self.read()?.api_keys.get(key_id).cloned())
    }

    fn list_api_keys(&self) -> Result<Vec<ApiKey>> {
        let mut keys: Vec<ApiKey> = self.read()?.api_keys.values().cloned().collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(keys)
    }

    fn touch_api_key(&self, key_id: &ApiKeyId, at: DateTime<Utc>) -> Result<ApiKey> {
        let mut tables = self.write()?;
        let key = tables
            .api_keys
            .get_mut(key_id)
            .ok_or_else(|| key_not_found(key_id))?;
        key.last_used = Some(at);
        Ok(key.clone())
    }

    fn revoke_api_key(&self, key_id: &ApiKeyId) -> Result<ApiKey> {
        let mut tables = self.write()?;
        let key = tables
            .api_keys
            .get_mut(key_id)
            .ok_or_else(|| key_not_found(key_id))?;
        key.status = KeyStatus::Revoked;
        Ok(key.clone())
    }

    fn delete_api_key(&self, key_id: &ApiKeyId) -> Result<()> {
        self.write()?
            .api_keys
            .remove(key_id)
            .map(|_| ())
            .ok_or_else(|| key_not_found(key_id))
    }
}
