//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, health, orders, payments, users, webhooks};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for the public checkout endpoints.
/// Customers poll these while a payment is pending.
const CHECKOUT_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /api/auth/signup` - Register a user
///
/// ## Checkout (public, rate-limited)
/// - `GET /api/payment/initiate/:orderId` - Load order for the payment page
/// - `POST /api/payment/process` - Start a payment attempt
/// - `GET /api/payment/status/:orderId` - Order payment status
/// - `GET /api/payment/transactions/:transactionId` - Poll a payment attempt
///
/// ## Merchant (API key auth)
/// - `POST /api/orders` - Create order (`write`)
/// - `GET /api/orders/:orderId` - Get order (`read`)
///
/// ## Admin (bearer JWT)
/// - `POST /api/admin/login` - Sign in
/// - `GET /api/admin/stats` - Dashboard stats
/// - `GET /api/admin/transactions` - Recent transactions
/// - `GET /api/admin/api-keys` - List keys
/// - `POST /api/admin/api-keys` - Create key
/// - `POST /api/admin/api-keys/:keyId/revoke` - Revoke key
/// - `DELETE /api/admin/api-keys/:keyId` - Delete key
///
/// ## Webhooks (Signature verification)
/// - `POST /webhooks/payment` - Payment results from the processor
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let checkout_routes = Router::new()
        .route("/initiate/:order_id", get(payments::initiate))
        .route("/process", post(payments::process))
        .route("/status/:order_id", get(payments::status))
        .route("/transactions/:transaction_id", get(payments::get_transaction))
        .layer(ConcurrencyLimitLayer::new(CHECKOUT_MAX_CONCURRENT_REQUESTS));

    let admin_routes = Router::new()
        .route("/login", post(admin::login))
        .route("/stats", get(admin::stats))
        .route("/transactions", get(admin::list_transactions))
        .route(
            "/api-keys",
            get(admin::list_api_keys).post(admin::create_api_key),
        )
        .route("/api-keys/:key_id/revoke", post(admin::revoke_api_key))
        .route("/api-keys/:key_id", delete(admin::delete_api_key));

    let api_routes = Router::new()
        .route("/auth/signup", post(users::signup))
        .route("/orders", post(orders::create_order))
        .route("/orders/:order_id", get(orders::get_order))
        .nest("/admin", admin_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS))
        // Checkout routes carry their own concurrency limit
        .nest("/payment", checkout_routes);

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        // Webhooks (no rate limit - controlled by the processor)
        .route("/webhooks/payment", post(webhooks::payment_webhook))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(origins)
    }
}
