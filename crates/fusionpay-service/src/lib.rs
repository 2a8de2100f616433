//! FusionPay HTTP API Service.
//!
//! This crate provides the HTTP API for the FusionPay UPI gateway:
//!
//! - Merchant order creation
//! - The customer checkout flow (initiate, process, poll)
//! - Payment result webhooks and the demo payment simulator
//! - The admin dashboard (stats, transactions, API keys)
//!
//! # Authentication
//!
//! 1. **API keys** (`X-API-Key`) - For merchant servers, scoped by `read`/`write`
//! 2. **Admin JWT** - Issued by `/api/admin/login` to allow-listed emails
//!
//! Checkout routes are public and webhooks are authenticated by an HMAC
//! signature over the body.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)]

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod simulator;
pub mod state;

pub use config::{ServiceConfig, SimulationConfig};
pub use error::ApiError;
pub use handlers::admin::bootstrap_admin;
pub use routes::create_router;
pub use simulator::Simulator;
pub use state::AppState;
