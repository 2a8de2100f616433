//! Payment processor webhook.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use fusionpay_core::PaymentOutcome;

use crate::crypto::verify_signature;
use crate::error::ApiError;
use crate::handlers::parse_transaction_id;
use crate::state::AppState;

/// Header carrying the hex HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "x-fusionpay-signature";

/// Payment result reported by the processor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWebhook {
    /// The attempt being resolved.
    pub transaction_id: String,
    /// Final outcome.
    pub status: PaymentOutcome,
}

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was processed.
    pub received: bool,
    /// Whether stored state changed (false for redelivered events).
    pub changed: bool,
}

/// Handle payment result webhooks.
pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    if let Some(secret) = &state.config.webhook_secret {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::BadRequest("Missing webhook signature".into()))?;

        if !verify_signature(secret, body.as_bytes(), signature) {
            tracing::warn!("Invalid payment webhook signature");
            return Err(ApiError::BadRequest("Invalid webhook signature".into()));
        }
    } else {
        tracing::warn!("Webhook secret not configured - skipping signature verification");
    }

    let webhook: PaymentWebhook =
        serde_json::from_str(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let transaction_id = parse_transaction_id(&webhook.transaction_id)?;

    tracing::info!(
        transaction_id = %transaction_id,
        outcome = %webhook.status,
        "Received payment webhook"
    );

    let resolution = state.store.resolve_payment(&transaction_id, webhook.status)?;

    if !resolution.changed {
        tracing::debug!(transaction_id = %transaction_id, "Webhook already applied");
    }

    Ok(Json(WebhookResponse {
        received: true,
        changed: resolution.changed,
    }))
}
