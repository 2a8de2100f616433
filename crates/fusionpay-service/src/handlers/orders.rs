//! Merchant order handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use fusionpay_core::{NewOrder, Order};

use crate::auth::{ApiKeyRead, ApiKeyWrite};
use crate::error::ApiError;
use crate::handlers::parse_order_id;
use crate::state::AppState;

/// Create an order awaiting payment.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    ApiKeyWrite(key): ApiKeyWrite,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let Json(new_order) = body?;
    let order = Order::new(new_order, Utc::now())?;

    state.store.create_order(&order)?;

    tracing::info!(
        order_id = %order.order_id,
        amount = %order.amount,
        key = %key.masked(),
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// Fetch an order by id.
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    _key: ApiKeyRead,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&order_id)?;
    let order = state
        .store
        .get_order(&order_id)?
        .ok_or_else(|| ApiError::NotFound("order not found".into()))?;
    Ok(Json(order))
}
