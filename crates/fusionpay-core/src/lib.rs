//! Core types for the FusionPay UPI gateway.
//!
//! This crate holds the domain model shared by the store, service and client:
//!
//! - **Identifiers**: `UserId`, `OrderId`, `TransactionId`, `ApiKeyId`
//! - **Money**: `Amount`, held as integer paise
//! - **Payments**: `Order`, `Transaction`, `PaymentStatus`, `PaymentOutcome`
//! - **Access**: `User`, `ApiKey`, `Permission`, key masking
//! - **Dashboard**: `DashboardStat`, `compute_stats`
//!
//! # Status model
//!
//! Orders and transactions move `pending -> success | failed`. A failed order
//! may go back to `pending` when the customer retries, which always starts a
//! fresh transaction. A paid order is never downgraded.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod amount;
pub mod api_key;
pub mod error;
pub mod ids;
pub mod order;
pub mod stats;
pub mod status;
pub mod transaction;
pub mod user;

pub use amount::{Amount, AmountError, MAX_AMOUNT_PAISE};
pub use api_key::{default_permissions, mask_key, ApiKey, KeyStatus, Permission};
pub use error::{GatewayError, Result};
pub use ids::{ApiKeyId, IdError, OrderId, TransactionId, UserId, API_KEY_PREFIX};
pub use order::{validate_email, NewOrder, Order};
pub use stats::{compute_stats, DashboardStat, Trend};
pub use status::{PaymentOutcome, PaymentStatus, UnknownStatus};
pub use transaction::{normalize_upi_app, Transaction, DEFAULT_PAYMENT_METHOD, KNOWN_UPI_APPS};
pub use user::User;
