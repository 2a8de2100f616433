//! Customer checkout handlers.
//!
//! These routes are public: the customer reaches them from the payment page
//! with nothing but the order id.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use fusionpay_core::{normalize_upi_app, Amount, Order, OrderId, PaymentStatus, Transaction};

use crate::error::ApiError;
use crate::handlers::{parse_order_id, parse_transaction_id};
use crate::state::AppState;

/// Load the order behind a checkout page.
pub async fn initiate(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&order_id)?;
    let order = state
        .store
        .get_order(&order_id)?
        .ok_or_else(|| ApiError::NotFound("order not found".into()))?;
    Ok(Json(order))
}

/// Payment submission from the checkout page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    /// Order being paid.
    pub order_id: OrderId,
    /// UPI app chosen by the customer.
    #[serde(default)]
    pub upi_app: Option<String>,
    /// Amount shown to the customer; must match the order.
    pub amount: Amount,
}

/// Start a payment attempt for an order.
pub async fn process(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ProcessPaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let Json(request) = body?;

    let order = state
        .store
        .get_order(&request.order_id)?
        .ok_or_else(|| ApiError::NotFound("order not found".into()))?;

    if request.amount != order.amount {
        tracing::warn!(
            order_id = %order.order_id,
            expected = %order.amount,
            submitted = %request.amount,
            "Payment amount does not match order"
        );
        return Err(ApiError::BadRequest("amount does not match order".into()));
    }

    let upi_app = request
        .upi_app
        .as_deref()
        .map(normalize_upi_app)
        .transpose()?;

    let attempt = state.store.initiate_payment(&order.order_id, upi_app)?;
    let transaction = attempt.transaction;

    tracing::info!(
        order_id = %transaction.order_id,
        transaction_id = %transaction.transaction_id,
        upi_app = ?transaction.upi_app,
        "Payment initiated"
    );

    if let Some(simulator) = &state.simulator {
        simulator.schedule(Arc::clone(&state.store), transaction.transaction_id);
    }

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Payment status of an order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    /// The order.
    pub order_id: String,
    /// Current order status.
    pub status: PaymentStatus,
    /// Most recent attempt, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// Current payment status of an order.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<PaymentStatusResponse>, ApiError> {
    let order_id = parse_order_id(&order_id)?;
    let order = state
        .store
        .get_order(&order_id)?
        .ok_or_else(|| ApiError::NotFound("order not found".into()))?;
    let latest = state.store.latest_transaction_for_order(&order_id)?;

    Ok(Json(PaymentStatusResponse {
        order_id: order.order_id.to_string(),
        status: order.status,
        transaction_id: latest.map(|tx| tx.transaction_id.to_string()),
    }))
}

/// Fetch a single payment attempt, for status polling.
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction_id = parse_transaction_id(&transaction_id)?;
    let transaction = state
        .store
        .get_transaction(&transaction_id)?
        .ok_or_else(|| ApiError::NotFound("transaction not found".into()))?;
    Ok(Json(transaction))
}
