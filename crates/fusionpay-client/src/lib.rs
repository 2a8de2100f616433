//! FusionPay Client SDK.
//!
//! This crate provides a client library for merchant servers and checkout
//! pages to talk to the FusionPay API.
//!
//! # Example
//!
//! ```no_run
//! use fusionpay_client::{FusionPayClient, PollOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FusionPayClient::new("http://fusionpay:8080", "fp_live_0123456789abcdef")?;
//!
//! let order = client
//!     .create_order(&fusionpay_client::NewOrder {
//!         order_id: "FP1001".parse()?,
//!         amount: "1299.00".parse()?,
//!         merchant_name: "TechStore Pro".to_string(),
//!         description: None,
//!         customer_email: "a@b.com".to_string(),
//!     })
//!     .await?;
//!
//! let tx = client
//!     .process_payment(&order.order_id, "gpay", order.amount)
//!     .await?;
//!
//! let settled = client
//!     .wait_for_payment(&tx.transaction_id, PollOptions::default())
//!     .await?;
//! println!("Payment {}: {}", settled.transaction_id, settled.status);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, FusionPayClient, PollOptions};
pub use error::ClientError;
pub use fusionpay_core::{Amount, NewOrder, Order, OrderId, PaymentStatus, Transaction, TransactionId};
pub use types::*;
