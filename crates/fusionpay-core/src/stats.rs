//! Dashboard statistics.
//!
//! Stats are computed from stored transactions and keys. Each one compares
//! the last 24 hours with the 24 hours before to produce `change` and `trend`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::api_key::{ApiKey, KeyStatus};
use crate::status::PaymentStatus;
use crate::transaction::Transaction;

/// Direction of a stat compared with the previous window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Same or better than the previous window.
    Up,
    /// Worse than the previous window.
    Down,
}

impl Trend {
    fn compare(current: f64, previous: f64) -> Self {
        if current >= previous {
            Self::Up
        } else {
            Self::Down
        }
    }
}

/// One card on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStat {
    /// Card title.
    pub title: String,
    /// Formatted value.
    pub value: String,
    /// Formatted change against the previous window, e.g. `+12.5%`.
    pub change: String,
    /// Direction of the change.
    pub trend: Trend,
    /// Short explanation.
    pub description: String,
}

/// Totals over one time window.
#[derive(Debug, Default, Clone, Copy)]
struct Window {
    revenue: Amount,
    count: u64,
    succeeded: u64,
    failed: u64,
}

impl Window {
    fn add(&mut self, tx: &Transaction) {
        self.count += 1;
        match tx.status {
            PaymentStatus::Success => {
                self.succeeded += 1;
                self.revenue = self.revenue.saturating_add(tx.amount);
            }
            PaymentStatus::Failed => self.failed += 1,
            PaymentStatus::Pending => {}
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn success_rate(&self) -> f64 {
        let resolved = self.succeeded + self.failed;
        if resolved == 0 {
            0.0
        } else {
            self.succeeded as f64 / resolved as f64 * 100.0
        }
    }
}

/// Compute the dashboard stats at instant `now`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_stats(
    transactions: &[Transaction],
    keys: &[ApiKey],
    now: DateTime<Utc>,
) -> Vec<DashboardStat> {
    let day_ago = now - Duration::hours(24);
    let two_days_ago = now - Duration::hours(48);

    let mut total = Window::default();
    let mut current = Window::default();
    let mut previous = Window::default();
    for tx in transactions {
        total.add(tx);
        if tx.created_at > day_ago && tx.created_at <= now {
            current.add(tx);
        } else if tx.created_at > two_days_ago && tx.created_at <= day_ago {
            previous.add(tx);
        }
    }

    let active_keys = keys
        .iter()
        .filter(|k| k.status == KeyStatus::Active)
        .count();
    let keys_current = keys
        .iter()
        .filter(|k| k.created_at > day_ago && k.created_at <= now)
        .count();
    let keys_previous = keys
        .iter()
        .filter(|k| k.created_at > two_days_ago && k.created_at <= day_ago)
        .count();

    let revenue_now = current.revenue.paise() as f64;
    let revenue_before = previous.revenue.paise() as f64;
    let rate_now = current.success_rate();
    let rate_before = previous.success_rate();

    vec![
        DashboardStat {
            title: "Total Revenue".to_string(),
            value: format!("₹{}", total.revenue),
            change: format_percent(percent_change(revenue_now, revenue_before)),
            trend: Trend::compare(revenue_now, revenue_before),
            description: "Sum of successful payments".to_string(),
        },
        DashboardStat {
            title: "Transactions".to_string(),
            value: total.count.to_string(),
            change: format_percent(percent_change(current.count as f64, previous.count as f64)),
            trend: Trend::compare(current.count as f64, previous.count as f64),
            description: "Payment attempts across all orders".to_string(),
        },
        DashboardStat {
            title: "Success Rate".to_string(),
            value: format!("{:.1}%", total.success_rate()),
            change: format_percent(rate_now - rate_before),
            trend: Trend::compare(rate_now, rate_before),
            description: "Successful out of resolved payments".to_string(),
        },
        DashboardStat {
            title: "Active API Keys".to_string(),
            value: active_keys.to_string(),
            change: format!("+{keys_current}"),
            trend: Trend::compare(keys_current as f64, keys_previous as f64),
            description: "Keys created in the last 24 hours".to_string(),
        },
    ]
}

fn percent_change(current: f64, previous: f64) -> f64 {
    if previous.abs() < f64::EPSILON {
        if current.abs() < f64::EPSILON {
            0.0
        } else {
            100.0
        }
    } else {
        (current - previous) / previous * 100.0
    }
}

fn format_percent(value: f64) -> String {
    format!("{value:+.1}%")
}
