//! Demo payment simulator.
//!
//! Stands in for a real payment processor: after a fixed delay it resolves a
//! pending transaction with a random outcome drawn at the configured success
//! rate.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;

use fusionpay_core::{PaymentOutcome, TransactionId};
use fusionpay_store::Store;

use crate::config::SimulationConfig;

/// Resolves payments after a delay with a random outcome.
#[derive(Debug, Clone)]
pub struct Simulator {
    success_rate: f64,
    delay: Duration,
}

impl Simulator {
    /// Create a simulator from its configuration.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            success_rate: crate::config::sanitize_rate(config.success_rate),
            delay: config.delay(),
        }
    }

    /// Draw an outcome.
    #[must_use]
    pub fn draw(&self) -> PaymentOutcome {
        if rand::thread_rng().gen_bool(self.success_rate) {
            PaymentOutcome::Success
        } else {
            PaymentOutcome::Failed
        }
    }

    /// Resolve `transaction_id` after the configured delay on a background task.
    ///
    /// The outcome is drawn before spawning. A transaction that was resolved
    /// in the meantime (e.g. by a webhook) is left as it is.
    pub fn schedule(&self, store: Arc<dyn Store>, transaction_id: TransactionId) -> JoinHandle<()> {
        let outcome = self.draw();
        let delay = self.delay;

        tracing::debug!(
            transaction_id = %transaction_id,
            outcome = %outcome,
            delay_ms = delay.as_millis(),
            "Simulated payment scheduled"
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match store.resolve_payment(&transaction_id, outcome) {
                Ok(resolution) => tracing::info!(
                    transaction_id = %transaction_id,
                    order_id = %resolution.order.order_id,
                    status = %resolution.transaction.status,
                    changed = resolution.changed,
                    "Simulated payment resolved"
                ),
                Err(e) => tracing::warn!(
                    transaction_id = %transaction_id,
                    error = %e,
                    "Simulated payment could not be resolved"
                ),
            }
        })
    }
}
