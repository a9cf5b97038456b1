//! Monetary amounts in minor units
//!
//! Amounts arrive as decimal text from forms and are stored as integer
//! cents. Parsing is exact: no floating point is involved, so `19.99`
//! always becomes `1999`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sign>[+-])?(?P<whole>[0-9]*)(?:\.(?P<frac>[0-9]*))?$")
        .expect("decimal pattern is valid")
});

/// Reasons an amount string is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is required")]
    Empty,

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' is too large")]
    Overflow(String),
}

/// An amount in minor currency units (cents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// `None` when the sum leaves the `i64` range
    pub fn checked_add(self, rhs: Cents) -> Option<Cents> {
        self.0.checked_add(rhs.0).map(Cents)
    }

    /// Parse a major-unit decimal (`"19.99"`) into cents.
    ///
    /// Digits past the second fractional place round half away from zero.
    pub fn parse_major(input: &str) -> Result<Self, AmountError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(AmountError::Empty);
        }

        let caps = DECIMAL
            .captures(text)
            .ok_or_else(|| AmountError::NotANumber(text.to_string()))?;

        let whole = caps.name("whole").map_or("", |m| m.as_str());
        let frac = caps.name("frac").map_or("", |m| m.as_str());
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::NotANumber(text.to_string()));
        }

        let overflow = || AmountError::Overflow(text.to_string());

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };

        let mut frac_digits = frac.bytes().map(|b| i64::from(b - b'0'));
        let tenths = frac_digits.next().unwrap_or(0);
        let hundredths = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().is_some_and(|d| d >= 5);

        let magnitude = whole_value
            .checked_mul(100)
            .and_then(|v| v.checked_add(tenths * 10 + hundredths))
            .and_then(|v| v.checked_add(i64::from(round_up)))
            .ok_or_else(overflow)?;

        let negative = caps.name("sign").is_some_and(|m| m.as_str() == "-");
        Ok(Cents(if negative { -magnitude } else { magnitude }))
    }
}

impl FromStr for Cents {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cents::parse_major(s)
    }
}

impl From<Cents> for i64 {
    fn from(cents: Cents) -> Self {
        cents.0
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}
