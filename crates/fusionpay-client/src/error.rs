//! Client error types.

use std::time::Duration;

/// Errors that can occur when using the FusionPay client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The order does not exist.
    #[error("order not found")]
    OrderNotFound,

    /// The order has already been paid.
    #[error("order already paid")]
    OrderAlreadyPaid,

    /// The API key is missing, unknown or revoked.
    #[error("unauthorized")]
    Unauthorized,

    /// The payment did not reach a final status in time.
    #[error("payment {transaction_id} still pending after {waited:?}")]
    Timeout {
        /// The polled transaction.
        transaction_id: String,
        /// How long the client waited.
        waited: Duration,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
