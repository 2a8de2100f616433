//! User signup.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fusionpay_core::User;

use crate::crypto::hash_password;
use crate::error::ApiError;
use crate::state::AppState;

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 254;

/// Signup request.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Desired username.
    pub username: String,
    /// Plain-text password; only its hash is stored.
    pub password: String,
}

/// A user as returned by the API (never includes the password hash).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID.
    pub user_id: String,
    /// Username.
    pub username: String,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.to_string(),
            username: user.username.clone(),
            created_at: user.created_at,
        }
    }
}

/// Register a user.
///
/// Usernames are stored lowercase. Emails on the admin allow-list are refused.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(request) = body?;

    let username = request.username.trim().to_ascii_lowercase();
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(ApiError::Validation {
            field: "username".into(),
            message: format!("username must be 1 to {MAX_USERNAME_LEN} characters"),
        });
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation {
            field: "password".into(),
            message: format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        });
    }

    // Admin accounts are only created by `bootstrap_admin`.
    if state.config.is_admin_email(&username) {
        tracing::warn!("Rejected signup for an admin email");
        return Err(ApiError::Forbidden);
    }

    let user = create_user(&state, username, request.password).await?;
    tracing::info!(user_id = %user.user_id, "User signed up");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Hash `password` off the async runtime and store a new user.
pub(crate) async fn create_user(
    state: &AppState,
    username: String,
    password: String,
) -> Result<User, ApiError> {
    if state.store.get_user_by_username(&username)?.is_some() {
        return Err(ApiError::Conflict("username already taken".into()));
    }

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let user = User::new(username, password_hash, Utc::now());
    state.store.create_user(&user)?;
    Ok(user)
}
