//! Amount type for handling the non-negative monetary values of account book records.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may be written with thousands separators, e.g. `15,000`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents the amount of an income or expense record. It is never negative: whether money
/// came in or went out is carried by the record's `Kind`, not by the sign.
///
/// # Examples
///
/// Parsing with thousands separators:
/// ```
/// # use accountbook::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("15,000").unwrap();
/// assert_eq!(amount.to_string(), "15,000");
/// ```
///
/// Negative values are rejected:
/// ```
/// # use accountbook::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("-50").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new `Amount`, rejecting negative values.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_zero() {
            return Ok(Self::ZERO);
        }
        if value.is_sign_negative() {
            return Err(AmountError::Negative(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Adds two amounts, returning `None` when the sum does not fit in a `Decimal`.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }
}

/// An error that can occur when turning user input into an `Amount`.
pub enum AmountError {
    Empty,
    Parse(rust_decimal::Error),
    Negative(Decimal),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "AmountError::Empty"),
            AmountError::Parse(e) => Debug::fmt(e, f),
            AmountError::Negative(v) => write!(f, "AmountError::Negative({v})"),
        }
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "An amount is required"),
            AmountError::Parse(e) => write!(f, "Invalid amount: {e}"),
            AmountError::Negative(v) => write!(
                f,
                "Amounts cannot be negative, got {v}. Use the income or expense kind instead"
            ),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // Remove commas (thousand separators)
        let without_commas = trimmed.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError::Parse)?;
        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut value = self.0;
        if value.fract().is_zero() {
            value.rescale(0);
        } else {
            value = value.round_dp(2);
            value.rescale(2);
        }
        let digits = value.to_string();
        match digits.split_once('.') {
            Some((whole, cents)) => write!(f, "{}.{cents}", group_thousands(whole)),
            None => write!(f, "{}", group_thousands(&digits)),
        }
    }
}

/// Inserts a comma between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Plain digits so that JSON and CSV output stays machine readable
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
