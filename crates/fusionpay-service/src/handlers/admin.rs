//! Admin dashboard handlers.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fusionpay_core::{
    compute_stats, mask_key, ApiKey, ApiKeyId, DashboardStat, KeyStatus, Permission, Transaction,
};

use crate::auth::{issue_admin_token, AdminAuth};
use crate::crypto::verify_password;
use crate::error::ApiError;
use crate::handlers::users::create_user;
use crate::state::AppState;

/// Default number of rows in the recent transactions view.
pub const DEFAULT_TRANSACTIONS_LIMIT: usize = 10;

/// Largest page of recent transactions.
pub const MAX_TRANSACTIONS_LIMIT: usize = 100;

// ============================================================================
// Session
// ============================================================================

/// Admin login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Admin email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Admin login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for admin routes.
    pub token: String,
    /// The signed-in email.
    pub email: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Sign in as an admin.
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = body?;

    if state.config.admin_token_secret.is_none() {
        return Err(ApiError::ServiceUnavailable(
            "admin login is not configured".into(),
        ));
    }

    let email = request.email.trim().to_ascii_lowercase();
    if !state.config.is_admin_email(&email) {
        tracing::warn!(email = %email, "Admin login attempt for email outside allow-list");
        return Err(ApiError::InvalidCredentials);
    }

    let user = state
        .store
        .get_user_by_username(&email)?
        .ok_or(ApiError::InvalidCredentials)?;

    let password = request.password;
    let valid =
        tokio::task::spawn_blocking(move || verify_password(&password, &user.password_hash))
            .await
            .map_err(|e| ApiError::Internal(format!("password check task failed: {e}")))?;

    if !valid {
        tracing::warn!(email = %email, "Admin login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let (token, expires_at) = issue_admin_token(&state.config, &email, Utc::now())?;
    tracing::info!(email = %email, "Admin signed in");

    Ok(Json(LoginResponse {
        token,
        email,
        expires_at,
    }))
}

/// Create the configured bootstrap admin account if it does not exist yet.
pub async fn bootstrap_admin(state: &AppState) -> Result<(), ApiError> {
    let (Some(email), Some(password)) = (
        &state.config.admin_bootstrap_email,
        &state.config.admin_bootstrap_password,
    ) else {
        return Ok(());
    };

    let email = email.trim().to_ascii_lowercase();
    if state.store.get_user_by_username(&email)?.is_some() {
        tracing::debug!(email = %email, "Bootstrap admin already exists");
        return Ok(());
    }

    if !state.config.is_admin_email(&email) {
        tracing::warn!(email = %email, "Bootstrap admin email is not in ADMIN_EMAILS");
    }

    create_user(state, email.clone(), password.clone()).await?;
    tracing::info!(email = %email, "Bootstrap admin created");
    Ok(())
}

// ============================================================================
// Dashboard
// ============================================================================

/// Dashboard stats over all stored transactions and keys.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
) -> Result<Json<Vec<DashboardStat>>, ApiError> {
    let transactions = state.store.list_recent_transactions(usize::MAX)?;
    let keys = state.store.list_api_keys()?;
    Ok(Json(compute_stats(&transactions, &keys, Utc::now())))
}

/// Query parameters for the recent transactions view.
#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    /// Maximum rows (default 10, capped at 100).
    pub limit: Option<usize>,
}

/// Most recent transactions, newest first.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_TRANSACTIONS_LIMIT)
        .min(MAX_TRANSACTIONS_LIMIT);
    Ok(Json(state.store.list_recent_transactions(limit)?))
}

// ============================================================================
// API keys
// ============================================================================

/// An API key as shown on the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    /// Full key; present only when revealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Key masked for display.
    pub masked_key: String,
    /// Label.
    pub name: String,
    /// Active or revoked.
    pub status: KeyStatus,
    /// Granted permissions.
    pub permissions: BTreeSet<Permission>,
    /// Last successful use.
    pub last_used: Option<DateTime<Utc>>,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

impl ApiKeyResponse {
    fn new(key: ApiKey, reveal: bool) -> Self {
        Self {
            masked_key: mask_key(key.key_id.as_str(), false),
            key: reveal.then(|| key.key_id.to_string()),
            name: key.name,
            status: key.status,
            permissions: key.permissions,
            last_used: key.last_used,
            created_at: key.created_at,
        }
    }
}

/// Query parameters for the key listing.
#[derive(Debug, Deserialize)]
pub struct ListKeysQuery {
    /// Include full keys.
    #[serde(default)]
    pub reveal: bool,
}

/// List API keys, newest first.
pub async fn list_api_keys(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Query(query): Query<ListKeysQuery>,
) -> Result<Json<Vec<ApiKeyResponse>>, ApiError> {
    if query.reveal {
        tracing::info!(admin = %admin.email, "API keys revealed");
    }
    let keys = state
        .store
        .list_api_keys()?
        .into_iter()
        .map(|key| ApiKeyResponse::new(key, query.reveal))
        .collect();
    Ok(Json(keys))
}

/// Create API key request.
#[derive(Debug, Default, Deserialize)]
pub struct CreateKeyRequest {
    /// Label; defaults to "API Key N".
    pub name: Option<String>,
    /// Permissions; defaults to read only.
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
}

/// Create an API key. The full key is returned only in this response.
pub async fn create_api_key(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    body: Result<Json<CreateKeyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiKeyResponse>), ApiError> {
    let Json(request) = body?;

    let name = match request.name.map(|n| n.trim().to_string()) {
        Some(name) if !name.is_empty() => name,
        _ => format!("API Key {}", state.store.list_api_keys()?.len() + 1),
    };

    let key = ApiKey::new(name, request.permissions, Utc::now());
    state.store.create_api_key(&key)?;

    tracing::info!(
        admin = %admin.email,
        key = %key.masked(),
        permissions = ?key.permissions,
        "API key created"
    );

    Ok((StatusCode::CREATED, Json(ApiKeyResponse::new(key, true))))
}

/// Revoke an API key. Revoking twice is harmless.
pub async fn revoke_api_key(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Path(key_id): Path<String>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    let key_id = parse_key_id(&key_id)?;
    let key = state.store.revoke_api_key(&key_id)?;
    tracing::info!(admin = %admin.email, key = %key.masked(), "API key revoked");
    Ok(Json(ApiKeyResponse::new(key, false)))
}

/// Delete an API key.
pub async fn delete_api_key(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Path(key_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let key_id = parse_key_id(&key_id)?;
    state.store.delete_api_key(&key_id)?;
    tracing::info!(admin = %admin.email, key = %mask_key(key_id.as_str(), false), "API key deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn parse_key_id(raw: &str) -> Result<ApiKeyId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("api key not found".into()))
}
