//! Payment status machine shared by orders and transactions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of an order or a payment attempt.
///
/// Allowed transitions are `pending -> success`, `pending -> failed` and the
/// retry `failed -> pending`. An order may also go `failed -> success` when a
/// concurrent attempt succeeds after an earlier one failed. A single attempt
/// never leaves a terminal status. Re-applying the current status is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting resolution.
    #[default]
    Pending,

    /// Paid.
    Success,

    /// Payment attempt failed.
    Failed,
}

impl PaymentStatus {
    /// Whether moving from `self` to `next` is permitted.
    ///
    /// Staying in the same status is always permitted.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, _)
                | (Self::Success, Self::Success)
                | (Self::Failed, _)
        )
    }

    /// Whether this status is final for a single payment attempt.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// The final result reported for a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    /// The payment went through.
    Success,

    /// The payment was declined or abandoned.
    Failed,
}

impl From<PaymentOutcome> for PaymentStatus {
    fn from(outcome: PaymentOutcome) -> Self {
        match outcome {
            PaymentOutcome::Success => Self::Success,
            PaymentOutcome::Failed => Self::Failed,
        }
    }
}

impl fmt::Display for PaymentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        PaymentStatus::from(*self).fmt(f)
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment status: {0:?}")]
pub struct UnknownStatus(pub String);
