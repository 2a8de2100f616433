//! FusionPay HTTP client implementation.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use tokio::time::Instant;

use fusionpay_core::{Amount, NewOrder, Order, OrderId, Transaction, TransactionId};

use crate::error::ClientError;
use crate::types::{ApiErrorResponse, PaymentStatusResponse, ProcessPaymentRequest};

/// FusionPay API client.
///
/// Merchant calls (`create_order`, `get_order`) send the configured API key.
/// Checkout calls are public and work with any key, including an empty one.
#[derive(Debug, Clone)]
pub struct FusionPayClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FusionPayClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the FusionPay service (e.g., `"http://fusionpay:8080"`)
    /// * `api_key` - Merchant API key
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::with_options(base_url, api_key, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| {
                ClientError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    // ========================================================================
    // Merchant
    // ========================================================================

    /// Create an order awaiting payment. Requires a key with `write` permission.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ClientError> {
        let url = format!("{}/api/orders", self.base_url);
        let response = self.merchant(self.client.post(&url)).json(order).send().await?;
        self.handle_response(response).await
    }

    /// Fetch an order. Requires a key with `read` permission.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::OrderNotFound` if the order does not exist.
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Order, ClientError> {
        let url = format!("{}/api/orders/{order_id}", self.base_url);
        let response = self.merchant(self.client.get(&url)).send().await?;
        self.handle_response(response).await
    }

    // ========================================================================
    // Checkout
    // ========================================================================

    /// Load the order behind a checkout page.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::OrderNotFound` if the order does not exist.
    pub async fn initiate_payment(&self, order_id: &OrderId) -> Result<Order, ClientError> {
        let url = format!("{}/api/payment/initiate/{order_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Start a payment attempt.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::OrderAlreadyPaid` if the order is already paid,
    /// or an API error if `amount` does not match the order.
    pub async fn process_payment(
        &self,
        order_id: &OrderId,
        upi_app: &str,
        amount: Amount,
    ) -> Result<Transaction, ClientError> {
        let url = format!("{}/api/payment/process", self.base_url);
        let request = ProcessPaymentRequest {
            order_id: order_id.clone(),
            upi_app: upi_app.to_string(),
            amount,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        self.handle_response(response).await
    }

    /// Current payment status of an order.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::OrderNotFound` if the order does not exist.
    pub async fn get_payment_status(
        &self,
        order_id: &OrderId,
    ) -> Result<PaymentStatusResponse, ClientError> {
        let url = format!("{}/api/payment/status/{order_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Fetch a payment attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Transaction, ClientError> {
        let url = format!("{}/api/payment/transactions/{transaction_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Poll a payment attempt until it succeeds or fails.
    ///
    /// The attempt is re-read every `options.interval`. Request errors end the
    /// wait immediately; they are not retried.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Timeout` if the attempt is still pending after
    /// `options.timeout`.
    pub async fn wait_for_payment(
        &self,
        transaction_id: &TransactionId,
        options: PollOptions,
    ) -> Result<Transaction, ClientError> {
        let started = Instant::now();

        loop {
            let transaction = self.get_transaction(transaction_id).await?;
            if transaction.status.is_terminal() {
                tracing::debug!(
                    transaction_id = %transaction_id,
                    status = %transaction.status,
                    "Payment settled"
                );
                return Ok(transaction);
            }

            let waited = started.elapsed();
            if waited + options.interval > options.timeout {
                return Err(ClientError::Timeout {
                    transaction_id: transaction_id.to_string(),
                    waited,
                });
            }

            tracing::trace!(transaction_id = %transaction_id, "Payment pending, polling again");
            tokio::time::sleep(options.interval).await;
        }
    }

    fn merchant(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("x-api-key", &self.api_key)
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let message = api_error.error.message;

                match code {
                    "not_found" if message == "order not found" => Err(ClientError::OrderNotFound),
                    "conflict" if message.starts_with("order already paid") => {
                        Err(ClientError::OrderAlreadyPaid)
                    }
                    "unauthorized" => Err(ClientError::Unauthorized),
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self { timeout_seconds: 30 }
    }
}

/// How `wait_for_payment` polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between reads (default: 1s).
    pub interval: Duration,
    /// Give up after this long (default: 60s).
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }
}
