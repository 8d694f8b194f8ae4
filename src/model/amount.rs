//! Amount type for handling monetary values with an optional currency prefix.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles
//! parsing values that may or may not include an `R$` prefix and thousands
//! separators.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents how amounts were (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ currency: true, commas: true }` -> `R$ 60,000.00`
///  - `AmountFormat{ currency: false, commas: true }` -> `60,000.00`
///  - `AmountFormat{ currency: false, commas: false }` -> `60000.00`
///  - `AmountFormat{ currency: true, commas: false }` -> `R$ 60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// Whether an `R$` prefix is present in the formatting.
    currency: bool,
    /// Whether commas are present as thousands separators in the formatting.
    commas: bool,
}

impl Default for AmountFormat {
    fn default() -> Self {
        DEFAULT_FORMAT
    }
}

/// The default format is bare decimal text, e.g. `60000.00`. This is the format the ledger files
/// use, and the one legacy files were written in.
const DEFAULT_FORMAT: AmountFormat = AmountFormat {
    currency: false,
    commas: false,
};

/// Represents a monetary amount.
///
/// This type wraps `Decimal` and provides custom serialization/deserialization
/// to handle amounts that may be formatted with or without an `R$` prefix or commas.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// # Examples
///
/// Parsing with currency prefix:
/// ```
/// # use renda_track::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("R$ 50.00").unwrap();
/// assert_eq!(amount.to_string(), "R$ 50.00");
/// ```
///
/// Parsing without currency prefix:
/// ```
/// # use renda_track::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("50.00").unwrap();
/// assert_ne!(amount.to_string(), "R$ 50.00");
/// assert_eq!(amount.to_string(), "50.00");
/// ```
///
/// Value equivalency, but not absolute equivalency
/// ```
/// # use renda_track::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("5000.00").unwrap();
/// let b = Amount::from_str("R$ 5,000.00").unwrap();
/// assert_ne!(a, b);
/// assert_ne!(a.to_string(), b.to_string());
/// assert_eq!(a.value(), b.value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with default `String` formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: DEFAULT_FORMAT,
        }
    }

    /// Creates a new Amount from a Decimal value with the specified formatting.
    pub const fn new_with_format(value: Decimal, format: AmountFormat) -> Self {
        Self { value, format }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.value().is_sign_negative() && !self.is_zero()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(String);

impl AmountError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // An income row without an amount is malformed; there is no meaningful default.
        if trimmed.is_empty() {
            return Err(AmountError::new("an amount cannot be empty"));
        }

        // Remove the currency prefix if present. Both "R$ 50.00" and "R$50.00" are accepted, and
        // a sign may precede the prefix ("-R$ 50.00") or follow it ("R$ -50.00").
        let mut currency = false;
        let (sign, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", trimmed),
        };
        let unsigned = if let Some(rest) = unsigned.strip_prefix("R$") {
            currency = true;
            rest.trim_start()
        } else {
            unsigned
        };
        let (sign, unsigned) = match (sign, unsigned.strip_prefix('-')) {
            ("", Some(rest)) => ("-", rest),
            _ => (sign, unsigned),
        };

        // Remove commas (thousands separators)
        let without_commas = unsigned.replace(',', "");
        let commas = without_commas.len() < unsigned.len();

        let value = Decimal::from_str(&format!("{sign}{without_commas}"))
            .map_err(|e| AmountError::new(format!("'{s}' is not a valid amount: {e}")))?;
        Ok(Amount {
            value,
            format: AmountFormat { currency, commas },
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.is_negative() {
            (String::from("-"), self.value().abs())
        } else {
            (String::new(), self.value())
        };

        let cur = if self.format.currency { "R$ " } else { "" };

        if self.format.commas {
            write!(
                f,
                "{sign}{cur}{}",
                format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
            )
        } else {
            write!(f, "{sign}{cur}{num}")
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Serialize as a string in the preserved format
        serializer.serialize_str(&self.to_string())
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

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
