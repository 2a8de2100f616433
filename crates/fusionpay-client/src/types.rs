//! Request and response types for the FusionPay client.

use serde::{Deserialize, Serialize};

use fusionpay_core::{Amount, OrderId, PaymentStatus};

/// Payment submission for an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    /// Order being paid.
    pub order_id: OrderId,
    /// UPI app chosen by the customer.
    pub upi_app: String,
    /// Amount shown to the customer.
    pub amount: Amount,
}

/// Payment status of an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    /// The order.
    pub order_id: String,
    /// Current order status.
    pub status: PaymentStatus,
    /// Most recent payment attempt, if any.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// API error response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorDetail,
}

/// API error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Additional details.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
