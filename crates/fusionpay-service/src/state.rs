//! Application state.

use std::sync::Arc;

use fusionpay_store::Store;

use crate::config::ServiceConfig;
use crate::simulator::Simulator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Demo payment simulator (when enabled).
    pub simulator: Option<Simulator>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let simulator = config.simulation.enabled.then(|| {
            tracing::info!(
                success_rate = config.simulation.success_rate,
                delay_ms = config.simulation.delay_ms,
                "Payment simulator enabled"
            );
            Simulator::new(&config.simulation)
        });

        if config.webhook_secret.is_none() {
            tracing::warn!(
                "PAYMENT_WEBHOOK_SECRET not configured - webhook signatures will not be verified"
            );
        }

        if config.admin_token_secret.is_none() {
            tracing::warn!("ADMIN_TOKEN_SECRET not configured - admin login is disabled");
        }

        Self {
            store,
            config,
            simulator,
        }
    }
}
