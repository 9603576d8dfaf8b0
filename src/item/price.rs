//! Exact decimal prices
//!
//! A price is kept as the JSON number literal the client sent. With
//! `serde_json`'s `arbitrary_precision` feature the literal is never routed
//! through an `f64`, so `19.99` is stored and returned as `19.99` and `100`
//! as `100`.
//!
//! The accepted envelope matches the numeric type of the key-value table the
//! service was modelled on: at most 38 significant digits, and a magnitude
//! between 1E-130 and 9.99..E+125 (or exactly zero).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// Maximum number of significant decimal digits in a price.
pub const MAX_SIGNIFICANT_DIGITS: usize = 38;

/// Smallest allowed decimal exponent of a non-zero price (scientific form).
pub const MIN_EXPONENT: i64 = -130;

/// Largest allowed decimal exponent of a price (scientific form).
pub const MAX_EXPONENT: i64 = 125;

/// Reasons a value cannot be used as a price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("expected a number")]
    NotANumber,

    #[error("malformed number literal '{0}'")]
    Malformed(String),

    #[error("{digits} significant digits exceed the maximum of {}", MAX_SIGNIFICANT_DIGITS)]
    TooPrecise { digits: usize },

    #[error("magnitude outside 1E{}..1E{}", MIN_EXPONENT, MAX_EXPONENT + 1)]
    OutOfRange,
}

/// An exact decimal price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Number", into = "Number")]
pub struct Price(Number);

impl Price {
    /// Validate a JSON value as a price.
    pub fn from_value(value: &Value) -> Result<Self, PriceError> {
        match value {
            Value::Number(n) => Self::from_number(n.clone()),
            _ => Err(PriceError::NotANumber),
        }
    }

    /// Validate a JSON number as a price.
    pub fn from_number(number: Number) -> Result<Self, PriceError> {
        let literal = number.to_string();
        let shape = DecimalShape::parse(&literal)?;

        if shape.significant_digits > MAX_SIGNIFICANT_DIGITS {
            return Err(PriceError::TooPrecise {
                digits: shape.significant_digits,
            });
        }
        if let Some(exponent) = shape.exponent {
            if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
                return Err(PriceError::OutOfRange);
            }
        }

        Ok(Self(number))
    }

    /// Convert into a JSON value without changing its literal form.
    pub fn to_value(&self) -> Value {
        Value::Number(self.0.clone())
    }
}

impl TryFrom<Number> for Price {
    type Error = PriceError;

    fn try_from(number: Number) -> Result<Self, Self::Error> {
        Self::from_number(number)
    }
}

impl From<Price> for Number {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: Number =
            serde_json::from_str(s).map_err(|_| PriceError::Malformed(s.to_string()))?;
        Self::from_number(number)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Digit structure of a JSON number literal.
struct DecimalShape {
    significant_digits: usize,
    /// Exponent in scientific notation; `None` for zero.
    exponent: Option<i64>,
}

impl DecimalShape {
    fn parse(literal: &str) -> Result<Self, PriceError> {
        let malformed = || PriceError::Malformed(literal.to_string());

        let unsigned = literal.strip_prefix('-').unwrap_or(literal);
        let (mantissa, exp_part) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
            Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
            None => (unsigned, None),
        };
        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (mantissa, ""),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() || !all_digits(int_part) || !all_digits(frac_part) {
            return Err(malformed());
        }
        if mantissa.contains('.') && frac_part.is_empty() {
            return Err(malformed());
        }

        let digits: Vec<u8> = int_part.bytes().chain(frac_part.bytes()).collect();
        let leading = digits.iter().take_while(|&&d| d == b'0').count();
        if leading == digits.len() {
            return Ok(Self {
                significant_digits: 0,
                exponent: None,
            });
        }
        let trailing = digits.iter().rev().take_while(|&&d| d == b'0').count();

        let explicit_exponent = match exp_part {
            None => 0,
            Some(raw) => {
                let body = raw.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(raw);
                if body.is_empty() || !all_digits(body) {
                    return Err(malformed());
                }
                // An exponent too large for i64 is out of range, not malformed.
                raw.strip_prefix('+')
                    .unwrap_or(raw)
                    .parse::<i64>()
                    .map_err(|_| PriceError::OutOfRange)?
            }
        };

        let adjusted = (int_part.len() as i64 - leading as i64 - 1)
            .checked_add(explicit_exponent)
            .ok_or(PriceError::OutOfRange)?;

        Ok(Self {
            significant_digits: digits.len() - leading - trailing,
            exponent: Some(adjusted),
        })
    }
}
