//! Common test utilities for fusionpay integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{json, Value};

use fusionpay_core::{ApiKey, Permission, User};
use fusionpay_service::auth::issue_admin_token;
use fusionpay_service::crypto::{hash_password, hmac_sha256_hex};
use fusionpay_service::{create_router, AppState, ServiceConfig, SimulationConfig};
use fusionpay_store::{MemoryStore, Store};

pub const ADMIN_EMAIL: &str = "admin@fusionpay.in";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";
pub const WEBHOOK_SECRET: &str = "whsec_test";
pub const TOKEN_SECRET: &str = "test-token-secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct access to the backing store.
    pub store: Arc<MemoryStore>,
    /// The configuration the server was built with.
    pub config: ServiceConfig,
    /// Key with read and write permissions.
    pub write_key: String,
    /// Key with read permission only.
    pub read_key: String,
}

impl TestHarness {
    /// Create a harness with the simulator disabled.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a harness from a custom configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        Self::build(config, true)
    }

    /// Create a harness whose store has no admin account yet.
    pub fn without_admin() -> Self {
        Self::build(test_config(), false)
    }

    fn build(config: ServiceConfig, seed_admin: bool) -> Self {
        let store = Arc::new(MemoryStore::new());

        if seed_admin {
            let admin = User::new(
                ADMIN_EMAIL.into(),
                hash_password(ADMIN_PASSWORD).expect("Failed to hash password"),
                Utc::now(),
            );
            store.create_user(&admin).expect("Failed to create admin");
        }

        let write_key = ApiKey::new(
            "Merchant server".into(),
            BTreeSet::from([Permission::Read, Permission::Write]),
            Utc::now(),
        );
        let read_key = ApiKey::new("Reporting".into(), BTreeSet::new(), Utc::now());
        store.create_api_key(&write_key).expect("Failed to create key");
        store.create_api_key(&read_key).expect("Failed to create key");

        let state = AppState::new(store.clone(), config.clone());
        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            config,
            write_key: write_key.key_id.to_string(),
            read_key: read_key.key_id.to_string(),
        }
    }

    /// Authorization header value for the admin account.
    pub fn admin_auth_header(&self) -> String {
        let (token, _) =
            issue_admin_token(&self.config, ADMIN_EMAIL, Utc::now()).expect("Failed to sign");
        format!("Bearer {token}")
    }

    /// Create an order through the merchant API and return its JSON.
    pub async fn create_order(&self, order_id: &str, amount: &str) -> Value {
        let response = self
            .server
            .post("/api/orders")
            .add_header("x-api-key", self.write_key.clone())
            .json(&json!({
                "orderId": order_id,
                "amount": amount,
                "merchantName": "TechStore Pro",
                "description": "Premium Wireless Headphones",
                "customerEmail": "a@b.com"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }

    /// Start a payment for an order and return the transaction JSON.
    pub async fn process_payment(&self, order_id: &str, amount: &str) -> Value {
        let response = self
            .server
            .post("/api/payment/process")
            .json(&json!({ "orderId": order_id, "upiApp": "gpay", "amount": amount }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }

    /// Sign a webhook body with the configured secret.
    pub fn sign(body: &str) -> String {
        hmac_sha256_hex(WEBHOOK_SECRET.as_bytes(), body.as_bytes()).expect("HMAC accepts any key")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration used by most tests.
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        admin_emails: vec![ADMIN_EMAIL.into()],
        admin_token_secret: Some(TOKEN_SECRET.into()),
        webhook_secret: Some(WEBHOOK_SECRET.into()),
        simulation: SimulationConfig {
            enabled: false,
            ..SimulationConfig::default()
        },
        ..ServiceConfig::default()
    }
}
