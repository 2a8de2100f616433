//! Admin dashboard integration tests.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use common::{test_config, TestHarness, ADMIN_EMAIL, ADMIN_PASSWORD};
use serde_json::{json, Value};

use fusionpay_core::{PaymentOutcome, User};
use fusionpay_service::crypto::hash_password;
use fusionpay_service::{bootstrap_admin, create_router, AppState, ServiceConfig};
use fusionpay_store::{MemoryStore, Store};

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_success_returns_token() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/admin/login")
        .json(&json!({ "email": "Admin@FusionPay.in", "password": ADMIN_PASSWORD }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert!(body["expiresAt"].is_string());
    let token = body["token"].as_str().unwrap();

    harness
        .server
        .get("/api/admin/stats")
        .add_header("authorization", format!("Bearer {token}"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn login_wrong_password_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/admin/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong-password" }))
        .await;

    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "invalid_credentials");
    assert_eq!(body["error"]["message"], "invalid credentials");
}

#[tokio::test]
async fn non_admin_email_rejected_identically() {
    let harness = TestHarness::new();
    // A real user that is not on the allow-list, with a correct password.
    harness
        .server
        .post("/api/auth/signup")
        .json(&json!({ "username": "merchant@shop.in", "password": ADMIN_PASSWORD }))
        .await
        .assert_status(StatusCode::CREATED);

    let wrong: Value = harness
        .server
        .post("/api/admin/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": "nope-nope" }))
        .await
        .json();

    for password in [ADMIN_PASSWORD, "anything-else"] {
        let response = harness
            .server
            .post("/api/admin/login")
            .json(&json!({ "email": "merchant@shop.in", "password": password }))
            .await;
        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body, wrong);
    }
}

#[tokio::test]
async fn login_unavailable_without_token_secret() {
    let harness = TestHarness::with_config(ServiceConfig {
        admin_token_secret: None,
        ..test_config()
    });

    let response = harness
        .server
        .post("/api/admin/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Admin Auth
// ============================================================================

#[tokio::test]
async fn admin_routes_require_token() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/api/admin/stats")
        .await
        .assert_status_unauthorized();
    harness
        .server
        .get("/api/admin/transactions")
        .add_header("authorization", "Bearer not-a-jwt")
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn removed_admin_is_forbidden() {
    let harness = TestHarness::new();
    let header = harness.admin_auth_header();

    // Same secret, but the email has left the allow-list.
    let other = TestHarness::with_config(ServiceConfig {
        admin_emails: vec!["someone@else.in".into()],
        ..test_config()
    });

    other
        .server
        .get("/api/admin/stats")
        .add_header("authorization", header)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

// ============================================================================
// Bootstrap
// ============================================================================

const BOOTSTRAP_PASSWORD: &str = "bootstrap-pass-123";

fn bootstrap_state(
    store: &Arc<MemoryStore>,
    email: Option<&str>,
    password: Option<&str>,
) -> AppState {
    let config = ServiceConfig {
        admin_bootstrap_email: email.map(Into::into),
        admin_bootstrap_password: password.map(Into::into),
        ..test_config()
    };
    AppState::new(store.clone(), config)
}

async fn login_status(state: AppState, password: &str) -> StatusCode {
    let server = TestServer::new(create_router(state)).unwrap();
    server
        .post("/api/admin/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": password }))
        .await
        .status_code()
}

#[tokio::test]
async fn bootstrap_creates_admin_once() {
    let store = Arc::new(MemoryStore::new());
    let state = bootstrap_state(&store, Some(" Admin@FusionPay.in "), Some(BOOTSTRAP_PASSWORD));

    bootstrap_admin(&state).await.unwrap();
    let first = store.get_user_by_username(ADMIN_EMAIL).unwrap().unwrap();

    bootstrap_admin(&state).await.unwrap();
    let second = store.get_user_by_username(ADMIN_EMAIL).unwrap().unwrap();
    assert_eq!(first.user_id, second.user_id);
    assert_eq!(first.password_hash, second.password_hash);

    assert_eq!(login_status(state, BOOTSTRAP_PASSWORD).await, StatusCode::OK);
}

#[tokio::test]
async fn bootstrap_without_credentials_is_noop() {
    let store = Arc::new(MemoryStore::new());

    bootstrap_admin(&bootstrap_state(&store, None, None)).await.unwrap();
    bootstrap_admin(&bootstrap_state(&store, Some(ADMIN_EMAIL), None)).await.unwrap();
    bootstrap_admin(&bootstrap_state(&store, None, Some(BOOTSTRAP_PASSWORD))).await.unwrap();

    assert!(store.get_user_by_username(ADMIN_EMAIL).unwrap().is_none());
}

#[tokio::test]
async fn bootstrap_keeps_existing_account() {
    let store = Arc::new(MemoryStore::new());
    let existing = User::new(
        ADMIN_EMAIL.into(),
        hash_password(ADMIN_PASSWORD).unwrap(),
        Utc::now(),
    );
    store.create_user(&existing).unwrap();

    let state = bootstrap_state(&store, Some(ADMIN_EMAIL), Some(BOOTSTRAP_PASSWORD));
    bootstrap_admin(&state).await.unwrap();

    let stored = store.get_user_by_username(ADMIN_EMAIL).unwrap().unwrap();
    assert_eq!(stored.user_id, existing.user_id);
    assert_eq!(login_status(state, ADMIN_PASSWORD).await, StatusCode::OK);
}

#[tokio::test]
async fn bootstrap_outside_allow_list_cannot_log_in() {
    let store = Arc::new(MemoryStore::new());
    let state = bootstrap_state(&store, Some("ops@fusionpay.in"), Some(BOOTSTRAP_PASSWORD));

    bootstrap_admin(&state).await.unwrap();
    assert!(store.get_user_by_username("ops@fusionpay.in").unwrap().is_some());

    let server = TestServer::new(create_router(state)).unwrap();
    server
        .post("/api/admin/login")
        .json(&json!({ "email": "ops@fusionpay.in", "password": BOOTSTRAP_PASSWORD }))
        .await
        .assert_status_unauthorized();
}

// ============================================================================
// Stats and Transactions
// ============================================================================

#[tokio::test]
async fn stats_reflect_transactions() {
    let harness = TestHarness::new();
    harness.create_order("FP1", "100.00").await;
    harness.create_order("FP2", "50.00").await;
    let paid = harness.process_payment("FP1", "100.00").await;
    let failed = harness.process_payment("FP2", "50.00").await;
    for (tx, outcome) in [(paid, PaymentOutcome::Success), (failed, PaymentOutcome::Failed)] {
        let id = tx["transactionId"].as_str().unwrap().parse().unwrap();
        harness.store.resolve_payment(&id, outcome).unwrap();
    }

    let response = harness
        .server
        .get("/api/admin/stats")
        .add_header("authorization", harness.admin_auth_header())
        .await;

    response.assert_status_ok();
    let stats: Vec<Value> = response.json();
    assert_eq!(stats.len(), 4);
    assert_eq!(stats[0]["title"], "Total Revenue");
    assert_eq!(stats[0]["value"], "₹100.00");
    assert_eq!(stats[1]["title"], "Transactions");
    assert_eq!(stats[1]["value"], "2");
    assert_eq!(stats[2]["title"], "Success Rate");
    assert_eq!(stats[2]["value"], "50.0%");
    assert_eq!(stats[3]["title"], "Active API Keys");
    assert_eq!(stats[3]["value"], "2");
}

#[tokio::test]
async fn recent_transactions_are_limited_and_ordered() {
    let harness = TestHarness::new();
    for i in 0..4 {
        let id = format!("FP{i}");
        harness.create_order(&id, "10.00").await;
        tokio::time::sleep(Duration::from_millis(2)).await;
        harness.process_payment(&id, "10.00").await;
    }

    let response = harness
        .server
        .get("/api/admin/transactions?limit=3")
        .add_header("authorization", harness.admin_auth_header())
        .await;

    response.assert_status_ok();
    let rows: Vec<Value> = response.json();
    let order_ids: Vec<&str> = rows.iter().map(|r| r["orderId"].as_str().unwrap()).collect();
    assert_eq!(order_ids, ["FP3", "FP2", "FP1"]);
}

// ============================================================================
// API Keys
// ============================================================================

#[tokio::test]
async fn api_keys_masked_unless_revealed() {
    let harness = TestHarness::new();
    let auth = harness.admin_auth_header();

    let masked: Vec<Value> = harness
        .server
        .get("/api/admin/api-keys")
        .add_header("authorization", auth.clone())
        .await
        .json();
    assert_eq!(masked.len(), 2);
    for key in &masked {
        assert!(key.get("key").is_none());
        let shown = key["maskedKey"].as_str().unwrap();
        assert!(shown.starts_with("fp_live_"));
        assert!(shown.contains("..."));
    }

    let revealed: Vec<Value> = harness
        .server
        .get("/api/admin/api-keys?reveal=true")
        .add_header("authorization", auth)
        .await
        .json();
    let keys: Vec<&str> = revealed.iter().map(|k| k["key"].as_str().unwrap()).collect();
    assert!(keys.contains(&harness.write_key.as_str()));
    assert!(keys.contains(&harness.read_key.as_str()));
}

#[tokio::test]
async fn create_key_shows_full_key_once() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/admin/api-keys")
        .add_header("authorization", harness.admin_auth_header())
        .json(&json!({ "permissions": ["read", "write"] }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["name"], "API Key 3");
    assert_eq!(body["status"], "active");
    assert_eq!(body["permissions"], json!(["read", "write"]));
    let key = body["key"].as_str().unwrap();

    harness
        .server
        .post("/api/orders")
        .add_header("x-api-key", key.to_string())
        .json(&json!({
            "orderId": "FP1",
            "amount": "10.00",
            "merchantName": "Shop",
            "customerEmail": "a@b.com"
        }))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn revoke_then_delete_key() {
    let harness = TestHarness::new();
    let auth = harness.admin_auth_header();
    let key = harness.write_key.clone();

    let response = harness
        .server
        .post(&format!("/api/admin/api-keys/{key}/revoke"))
        .add_header("authorization", auth.clone())
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "revoked");
    assert!(body.get("key").is_none());

    harness
        .server
        .delete(&format!("/api/admin/api-keys/{key}"))
        .add_header("authorization", auth.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    harness
        .server
        .delete(&format!("/api/admin/api-keys/{key}"))
        .add_header("authorization", auth)
        .await
        .assert_status_not_found();

    assert!(harness.store.get_api_key(&key.parse().unwrap()).unwrap().is_none());
}
