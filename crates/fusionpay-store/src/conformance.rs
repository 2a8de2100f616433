//! Behavior shared by every `Store` backend, run against each one.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use fusionpay_core::{
    ApiKey, KeyStatus, NewOrder, Order, OrderId, PaymentOutcome, PaymentStatus, Permission,
    TransactionId, User,
};

use crate::{Store, StoreError};

fn order(id: &str, amount: &str) -> Order {
    Order::new(
        NewOrder {
            order_id: id.parse().unwrap(),
            amount: amount.parse().unwrap(),
            merchant_name: "TechStore Pro".to_string(),
            description: Some("Premium Wireless Headphones".to_string()),
            customer_email: "a@b.com".to_string(),
        },
        Utc::now(),
    )
    .unwrap()
}

fn order_id(id: &str) -> OrderId {
    id.parse().unwrap()
}

pub fn user_operations(store: &dyn Store) {
    let user = User::new("admin@example.com".into(), "$argon2id$stub".into(), Utc::now());
    store.create_user(&user).unwrap();

    let by_id = store.get_user(&user.user_id).unwrap().unwrap();
    assert_eq!(by_id.username, "admin@example.com");
    let by_name = store.get_user_by_username("admin@example.com").unwrap().unwrap();
    assert_eq!(by_name.user_id, user.user_id);
    assert!(store.get_user_by_username("nobody").unwrap().is_none());

    let clash = User::new("admin@example.com".into(), "other".into(), Utc::now());
    assert!(matches!(
        store.create_user(&clash),
        Err(StoreError::AlreadyExists { entity: "user", .. })
    ));
}

pub fn order_round_trip(store: &dyn Store) {
    let created = order("FP1001", "1299.00");
    store.create_order(&created).unwrap();

    let fetched = store.get_order(&order_id("FP1001")).unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.status, PaymentStatus::Pending);
    assert_eq!(fetched.amount.paise(), 129_900);
    assert_eq!(fetched.merchant_name, "TechStore Pro");
    assert!(store.get_order(&order_id("FP404")).unwrap().is_none());
}

pub fn duplicate_order_rejected(store: &dyn Store) {
    store.create_order(&order("FP1", "10")).unwrap();
    let result = store.create_order(&order("FP1", "20"));
    assert!(matches!(result, Err(StoreError::DuplicateOrderId { .. })));
    assert_eq!(
        store.get_order(&order_id("FP1")).unwrap().unwrap().amount.paise(),
        1000
    );
}

pub fn initiate_unknown_order(store: &dyn Store) {
    let result = store.initiate_payment(&order_id("missing"), Some("gpay".into()));
    assert!(matches!(result, Err(StoreError::OrderNotFound { .. })));
    assert!(store.list_recent_transactions(10).unwrap().is_empty());
}

pub fn resolve_success_flow(store: &dyn Store) {
    store.create_order(&order("FP1001", "1299.00")).unwrap();
    let attempt = store
        .initiate_payment(&order_id("FP1001"), Some("gpay".into()))
        .unwrap();
    assert_eq!(attempt.transaction.status, PaymentStatus::Pending);
    assert_eq!(attempt.transaction.upi_app.as_deref(), Some("gpay"));
    assert_eq!(attempt.transaction.amount, attempt.order.amount);

    let tx_id = attempt.transaction.transaction_id;
    let resolution = store.resolve_payment(&tx_id, PaymentOutcome::Success).unwrap();
    assert!(resolution.changed);
    assert_eq!(resolution.order.status, PaymentStatus::Success);

    let order = store.get_order(&order_id("FP1001")).unwrap().unwrap();
    assert_eq!(order.status, PaymentStatus::Success);
    let tx = store.get_transaction(&tx_id).unwrap().unwrap();
    assert_eq!(tx.status, PaymentStatus::Success);

    let latest = store
        .latest_transaction_for_order(&order_id("FP1001"))
        .unwrap()
        .unwrap();
    assert_eq!(latest.transaction_id, tx_id);

    let missing = store.resolve_payment(&TransactionId::generate(), PaymentOutcome::Success);
    assert!(matches!(missing, Err(StoreError::TransactionNotFound { .. })));
}

pub fn resolve_is_idempotent(store: &dyn Store) {
    store.create_order(&order("FP2", "50")).unwrap();
    let attempt = store.initiate_payment(&order_id("FP2"), None).unwrap();
    let tx_id = attempt.transaction.transaction_id;

    store.resolve_payment(&tx_id, PaymentOutcome::Failed).unwrap();
    let tx_before = store.get_transaction(&tx_id).unwrap().unwrap();
    let order_before = store.get_order(&order_id("FP2")).unwrap().unwrap();

    let again = store.resolve_payment(&tx_id, PaymentOutcome::Failed).unwrap();
    assert!(!again.changed);
    assert_eq!(store.get_transaction(&tx_id).unwrap().unwrap(), tx_before);
    assert_eq!(store.get_order(&order_id("FP2")).unwrap().unwrap(), order_before);
}

pub fn conflicting_outcome_rejected(store: &dyn Store) {
    store.create_order(&order("FP3", "50")).unwrap();
    let attempt = store.initiate_payment(&order_id("FP3"), None).unwrap();
    let tx_id = attempt.transaction.transaction_id;

    store.resolve_payment(&tx_id, PaymentOutcome::Success).unwrap();
    let result = store.resolve_payment(&tx_id, PaymentOutcome::Failed);
    assert!(matches!(
        result,
        Err(StoreError::InvalidTransition {
            from: PaymentStatus::Success,
            to: PaymentStatus::Failed,
        })
    ));
}

pub fn retry_after_failure(store: &dyn Store) {
    store.create_order(&order("FP4", "75")).unwrap();
    let first = store.initiate_payment(&order_id("FP4"), Some("paytm".into())).unwrap();
    store
        .resolve_payment(&first.transaction.transaction_id, PaymentOutcome::Failed)
        .unwrap();
    assert_eq!(
        store.get_order(&order_id("FP4")).unwrap().unwrap().status,
        PaymentStatus::Failed
    );

    std::thread::sleep(std::time::Duration::from_millis(2));
    let retry = store.initiate_payment(&order_id("FP4"), Some("bhim".into())).unwrap();
    assert_ne!(retry.transaction.transaction_id, first.transaction.transaction_id);
    assert_eq!(retry.order.status, PaymentStatus::Pending);

    let old = store
        .get_transaction(&first.transaction.transaction_id)
        .unwrap()
        .unwrap();
    assert_eq!(old.status, PaymentStatus::Failed);

    let history = store.list_transactions_by_order(&order_id("FP4")).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].transaction_id, retry.transaction.transaction_id);

    store
        .resolve_payment(&retry.transaction.transaction_id, PaymentOutcome::Success)
        .unwrap();
    let paid = store.initiate_payment(&order_id("FP4"), None);
    assert!(matches!(paid, Err(StoreError::OrderAlreadyPaid { .. })));
    assert_eq!(store.list_transactions_by_order(&order_id("FP4")).unwrap().len(), 2);
}

pub fn paid_order_not_downgraded(store: &dyn Store) {
    store.create_order(&order("FP5", "75")).unwrap();
    let a = store.initiate_payment(&order_id("FP5"), None).unwrap();
    let b = store.initiate_payment(&order_id("FP5"), None).unwrap();

    store
        .resolve_payment(&a.transaction.transaction_id, PaymentOutcome::Success)
        .unwrap();
    let late = store
        .resolve_payment(&b.transaction.transaction_id, PaymentOutcome::Failed)
        .unwrap();
    assert!(late.changed);
    assert_eq!(late.transaction.status, PaymentStatus::Failed);
    assert_eq!(late.order.status, PaymentStatus::Success);
    assert_eq!(
        store.get_order(&order_id("FP5")).unwrap().unwrap().status,
        PaymentStatus::Success
    );
}

pub fn concurrent_attempts_settle_order(store: &dyn Store) {
    store.create_order(&order("FP8", "40")).unwrap();
    store.create_order(&order("FP9", "40")).unwrap();
    let a = store.initiate_payment(&order_id("FP8"), None).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = store.initiate_payment(&order_id("FP8"), None).unwrap();
    store.initiate_payment(&order_id("FP9"), None).unwrap();

    let first = store
        .resolve_payment(&a.transaction.transaction_id, PaymentOutcome::Failed)
        .unwrap();
    assert_eq!(first.order.status, PaymentStatus::Failed);

    let second = store
        .resolve_payment(&b.transaction.transaction_id, PaymentOutcome::Success)
        .unwrap();
    assert!(second.changed);
    assert!(first.order.status.can_transition_to(second.order.status));
    assert_eq!(second.order.status, PaymentStatus::Success);

    let history = store.list_transactions_by_order(&order_id("FP8")).unwrap();
    let statuses: Vec<_> = history.iter().map(|tx| tx.status).collect();
    assert_eq!(statuses, [PaymentStatus::Success, PaymentStatus::Failed]);
    assert_eq!(history[0].transaction_id, b.transaction.transaction_id);

    let result = store.resolve_payment(&a.transaction.transaction_id, PaymentOutcome::Success);
    assert!(matches!(
        result,
        Err(StoreError::InvalidTransition {
            from: PaymentStatus::Failed,
            to: PaymentStatus::Success,
        })
    ));
}

pub fn recent_transactions_ordering(store: &dyn Store) {
    store.create_order(&order("FP6", "10")).unwrap();
    store.create_order(&order("FP7", "10")).unwrap();

    let mut created = Vec::new();
    for i in 0..5 {
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id = if i % 2 == 0 { "FP6" } else { "FP7" };
        created.push(store.initiate_payment(&order_id(id), None).unwrap().transaction);
    }

    let recent = store.list_recent_transactions(3).unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].transaction_id, created[4].transaction_id);
    assert_eq!(recent[1].transaction_id, created[3].transaction_id);
    assert_eq!(recent[2].transaction_id, created[2].transaction_id);
    assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    assert_eq!(store.list_recent_transactions(100).unwrap().len(), 5);
    assert!(store.list_recent_transactions(0).unwrap().is_empty());

    let fp6 = store.list_transactions_by_order(&order_id("FP6")).unwrap();
    assert_eq!(fp6.len(), 3);
    assert!(fp6.iter().all(|tx| tx.order_id.as_str() == "FP6"));
}

pub fn api_key_lifecycle(store: &dyn Store) {
    let first = ApiKey::new("API Key 1".into(), BTreeSet::new(), Utc::now());
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = ApiKey::new(
        "API Key 2".into(),
        BTreeSet::from([Permission::Read, Permission::Write]),
        Utc::now(),
    );
    store.create_api_key(&first).unwrap();
    store.create_api_key(&second).unwrap();
    assert!(matches!(
        store.create_api_key(&first),
        Err(StoreError::AlreadyExists { .. })
    ));

    let listed = store.list_api_keys().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].key_id, second.key_id);

    let used_at = Utc::now();
    let touched = store.touch_api_key(&first.key_id, used_at).unwrap();
    assert_eq!(touched.last_used, Some(used_at));
    assert_eq!(
        store.get_api_key(&first.key_id).unwrap().unwrap().last_used,
        Some(used_at)
    );

    let revoked = store.revoke_api_key(&first.key_id).unwrap();
    assert_eq!(revoked.status, KeyStatus::Revoked);
    assert!(store.revoke_api_key(&first.key_id).is_ok());

    store.delete_api_key(&first.key_id).unwrap();
    assert!(store.get_api_key(&first.key_id).unwrap().is_none());
    assert!(matches!(
        store.delete_api_key(&first.key_id),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.touch_api_key(&first.key_id, Utc::now()),
        Err(StoreError::NotFound { .. })
    ));
}

pub fn concurrent_order_creation<S: Store + 'static>(store: Arc<S>) {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.create_order(&order("RACE", &format!("{}", i + 1))))
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(Result::is_ok)
        .count();
    assert_eq!(successes, 1);
}
