//! Authentication extractors.
//!
//! This module provides extractors for:
//! - `ApiKeyRead` / `ApiKeyWrite` - Merchant access via the `X-API-Key` header
//! - `AdminAuth` - Admin sessions via a bearer JWT issued by `/api/admin/login`

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use fusionpay_core::{ApiKey, ApiKeyId, KeyStatus, Permission};

use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the merchant API key.
pub const API_KEY_HEADER: &str = "x-api-key";

// ============================================================================
// Merchant API keys
// ============================================================================

/// A merchant request authenticated by a key with `read` permission.
#[derive(Debug, Clone)]
pub struct ApiKeyRead(pub ApiKey);

/// A merchant request authenticated by a key with `write` permission.
#[derive(Debug, Clone)]
pub struct ApiKeyWrite(pub ApiKey);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ApiKeyRead {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate_key(parts, state, Permission::Read).map(Self)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ApiKeyWrite {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate_key(parts, state, Permission::Write).map(Self)
    }
}

/// Look up the presented key, check it grants `permission` and record the use.
fn authenticate_key(
    parts: &Parts,
    state: &AppState,
    permission: Permission,
) -> Result<ApiKey, ApiError> {
    let raw = parts
        .headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let key_id: ApiKeyId = raw.trim().parse().map_err(|_| ApiError::Unauthorized)?;

    let key = state
        .store
        .get_api_key(&key_id)?
        .ok_or(ApiError::Unauthorized)?;

    if key.status == KeyStatus::Revoked {
        tracing::debug!(key = %key.masked(), "Revoked API key presented");
        return Err(ApiError::Unauthorized);
    }

    if !key.allows(permission) {
        tracing::debug!(key = %key.masked(), %permission, "API key lacks permission");
        return Err(ApiError::Forbidden);
    }

    Ok(state.store.touch_api_key(&key.key_id, Utc::now())?)
}

// ============================================================================
// Admin sessions
// ============================================================================

/// JWT claims of an admin session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Subject (admin email).
    pub sub: String,
    /// Issued at.
    pub iat: i64,
    /// Expiration time.
    pub exp: i64,
}

/// An authenticated admin.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// Admin email (for audit logging).
    pub email: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let claims = verify_admin_token(&state.config, token)?;

        // The allow-list may have changed since the token was issued.
        if !state.config.is_admin_email(&claims.sub) {
            tracing::warn!(email = %claims.sub, "Admin token for email no longer allowed");
            return Err(ApiError::Forbidden);
        }

        tracing::debug!(email = %claims.sub, "Admin authenticated");

        Ok(AdminAuth { email: claims.sub })
    }
}

/// Issue a signed admin session token for `email`.
///
/// Returns the token and its expiry.
pub fn issue_admin_token(
    config: &ServiceConfig,
    email: &str,
    now: DateTime<Utc>,
) -> Result<(String, DateTime<Utc>), ApiError> {
    let secret = config
        .admin_token_secret
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("admin login is not configured".into()))?;

    let expires_at = i64::try_from(config.admin_token_ttl_seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| ApiError::Internal("admin token TTL out of range".into()))?;

    let claims = AdminClaims {
        sub: email.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign admin token: {e}")))?;

    Ok((token, expires_at))
}

/// Validate an admin session token and return its claims.
pub fn verify_admin_token(config: &ServiceConfig, token: &str) -> Result<AdminClaims, ApiError> {
    let secret = config
        .admin_token_secret
        .as_ref()
        .ok_or(ApiError::Unauthorized)?;

    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Admin token validation failed");
        ApiError::Unauthorized
    })?;

    Ok(token_data.claims)
}
