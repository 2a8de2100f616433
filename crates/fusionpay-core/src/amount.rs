//! Monetary amounts.
//!
//! Amounts are stored as integer paise (1 rupee = 100 paise) to avoid floating
//! point drift. On the wire they accept either a JSON number or a decimal
//! string with at most two fractional digits, and always serialize as a
//! two-decimal string such as `"1299.00"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest representable amount in paise (`99_999_999.99`).
pub const MAX_AMOUNT_PAISE: i64 = 9_999_999_999;

/// Maximum number of digits before the decimal point.
const MAX_INTEGER_DIGITS: usize = 8;

/// A non-negative amount of money in paise.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "AmountRepr", into = "String")]
pub struct Amount(i64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Create an amount from paise.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative or above [`MAX_AMOUNT_PAISE`].
    pub fn from_paise(paise: i64) -> Result<Self, AmountError> {
        if paise < 0 {
            return Err(AmountError::Negative);
        }
        if paise > MAX_AMOUNT_PAISE {
            return Err(AmountError::TooLarge);
        }
        Ok(Self(paise))
    }

    /// The amount in paise.
    #[must_use]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Add two amounts, saturating at `i64::MAX` paise.
    ///
    /// Used for aggregates (revenue totals) that may exceed a single order's limit.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        if s.starts_with('-') {
            return Err(AmountError::Negative);
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountError::Malformed(s.to_string()));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AmountError::Malformed(s.to_string()));
        }
        if frac_part.len() > 2 {
            return Err(AmountError::TooPrecise);
        }

        let int_digits = int_part.trim_start_matches('0');
        if int_digits.len() > MAX_INTEGER_DIGITS {
            return Err(AmountError::TooLarge);
        }

        let rupees: i64 = if int_digits.is_empty() {
            0
        } else {
            int_digits
                .parse()
                .map_err(|_| AmountError::Malformed(s.to_string()))?
        };
        let paise: i64 = match frac_part.len() {
            0 => 0,
            1 => i64::from(frac_part.as_bytes()[0] - b'0') * 10,
            _ => frac_part
                .parse()
                .map_err(|_| AmountError::Malformed(s.to_string()))?,
        };

        Self::from_paise(rupees * 100 + paise)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({self})")
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

/// Accepted wire representations of an amount.
#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Text(String),
    Number(f64),
}

impl TryFrom<AmountRepr> for Amount {
    type Error = AmountError;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Text(s) => s.parse(),
            // Display of f64 is the shortest exact round-trip form, so
            // `1299.5` parses as text without binary rounding artifacts.
            AmountRepr::Number(n) if n.is_finite() => n.to_string().parse(),
            AmountRepr::Number(n) => Err(AmountError::Malformed(n.to_string())),
        }
    }
}

/// Errors that can occur when parsing amounts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// No digits were supplied.
    #[error("amount is empty")]
    Empty,

    /// The input is not a decimal number.
    #[error("malformed amount: {0:?}")]
    Malformed(String),

    /// More than two fractional digits.
    #[error("amount has more than two decimal places")]
    TooPrecise,

    /// The amount is below zero.
    #[error("amount must not be negative")]
    Negative,

    /// The amount exceeds the supported range.
    #[error("amount exceeds 99999999.99")]
    TooLarge,
}
