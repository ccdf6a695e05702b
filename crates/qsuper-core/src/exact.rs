//! Exact numbers for distance values.
//!
//! Distances travel over a text wire format and must survive the trip
//! without rounding. Three regimes are kept apart:
//!
//! | Variant | Wire token | Accepted input |
//! |---------|------------|----------------|
//! | [`ExactNumber::Finite`] | `7`, `-3/4` | integers, decimals (`1.25`, `2e-3`), fractions (`p/q`) |
//! | [`ExactNumber::PositiveInfinity`] | `inf` | `inf` |
//! | [`ExactNumber::Undefined`] | `nan` | `nan`, `0/0` |
//!
//! Matching is case-insensitive. Only `Finite` values are ordered; see
//! [`ExactNumber::finite_cmp`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

/// Largest decimal exponent accepted in a literal.
const MAX_EXPONENT: u64 = 4096;

/// An exact rational, positive infinity, or the undefined marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExactNumber {
    /// Exact rational in lowest terms with a positive denominator.
    Finite(BigRational),
    /// Positive infinity.
    PositiveInfinity,
    /// Not a number (`0/0`).
    Undefined,
}

impl ExactNumber {
    /// Parse a textual literal.
    ///
    /// The input is trimmed and compared case-insensitively: `nan` and `0/0`
    /// give [`Undefined`](Self::Undefined), `inf` gives
    /// [`PositiveInfinity`](Self::PositiveInfinity), anything else must be an
    /// exact rational literal.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let text = input.trim();
        match text.to_ascii_lowercase().as_str() {
            "nan" | "0/0" => Ok(Self::Undefined),
            "inf" => Ok(Self::PositiveInfinity),
            _ => parse_rational(text).map(Self::Finite),
        }
    }

    /// Build a finite value from a numerator and a non-zero denominator.
    pub fn from_ratio(numer: i64, denom: i64) -> CoreResult<Self> {
        if denom == 0 {
            return Err(CoreError::Parse(format!(
                "zero denominator in {numer}/{denom}"
            )));
        }
        Ok(Self::Finite(BigRational::new(numer.into(), denom.into())))
    }

    /// Whether this is a finite rational.
    pub fn is_finite(&self) -> bool {
        matches!(self, Self::Finite(_))
    }

    /// The rational value, if finite.
    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Self::Finite(r) => Some(r),
            _ => None,
        }
    }

    /// Compare two values when both are finite.
    ///
    /// Infinity and the undefined marker are exempt from ordering and always
    /// yield `None`.
    pub fn finite_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Parse `a/b` or a plain decimal literal.
fn parse_rational(text: &str) -> CoreResult<BigRational> {
    match text.split_once('/') {
        Some((numer, denom)) => {
            let numer = parse_decimal(numer)?;
            let denom = parse_decimal(denom)?;
            if denom.is_zero() {
                return Err(CoreError::Parse(format!("zero denominator in '{text}'")));
            }
            Ok(numer / denom)
        }
        None => parse_decimal(text),
    }
}

/// Parse `[+-]digits[.digits][e[+-]digits]` exactly.
///
/// No whitespace is allowed inside a literal, including around `/`.
fn parse_decimal(text: &str) -> CoreResult<BigRational> {
    let err = || CoreError::Parse(format!("not a rational literal: '{text}'"));

    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => {
            let exp: i64 = body[i + 1..].parse().map_err(|_| err())?;
            (&body[..i], exp)
        }
        None => (body, 0),
    };
    if exponent.unsigned_abs() > MAX_EXPONENT {
        return Err(err());
    }

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
    {
        return Err(err());
    }

    let mut numer: BigInt = format!("{int_part}{frac_part}")
        .parse()
        .map_err(|_| err())?;
    if negative {
        numer = -numer;
    }

    let scale = exponent - i64::try_from(frac_part.len()).map_err(|_| err())?;
    let magnitude = u32::try_from(scale.unsigned_abs()).map_err(|_| err())?;
    let power = BigInt::from(10u32).pow(magnitude);
    if scale >= 0 {
        Ok(BigRational::from_integer(numer * power))
    } else {
        Ok(BigRational::new(numer, power))
    }
}

impl fmt::Display for ExactNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(r) if r.denom().is_one() => write!(f, "{}", r.numer()),
            Self::Finite(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Self::PositiveInfinity => f.write_str("inf"),
            Self::Undefined => f.write_str("nan"),
        }
    }
}

impl FromStr for ExactNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}

impl From<i64> for ExactNumber {
    fn from(value: i64) -> Self {
        Self::Finite(BigRational::from_integer(value.into()))
    }
}

impl From<u64> for ExactNumber {
    fn from(value: u64) -> Self {
        Self::Finite(BigRational::from_integer(value.into()))
    }
}

impl From<BigRational> for ExactNumber {
    fn from(value: BigRational) -> Self {
        Self::Finite(value)
    }
}

impl TryFrom<f64> for ExactNumber {
    type Error = CoreError;

    /// Floats go through their shortest decimal rendering, so `0.1` becomes
    /// exactly `1/10`, `f64::INFINITY` becomes `inf` and NaN becomes `nan`.
    fn try_from(value: f64) -> CoreResult<Self> {
        Self::parse(&value.to_string())
    }
}

impl Serialize for ExactNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExactNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExactVisitor;

        impl Visitor<'_> for ExactVisitor {
            type Value = ExactNumber;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or an exact number token")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ExactNumber, E> {
                ExactNumber::parse(v).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ExactNumber, E> {
                Ok(v.into())
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ExactNumber, E> {
                Ok(v.into())
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ExactNumber, E> {
                ExactNumber::try_from(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ExactVisitor)
    }
}

/// A loosely typed numeric input: text or a native number.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberInput {
    /// Literal to be parsed.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// Floating-point value, interpreted through its decimal rendering.
    Float(f64),
    /// Already parsed value.
    Exact(ExactNumber),
}

impl NumberInput {
    /// Resolve to an exact number.
    pub fn to_exact(&self) -> CoreResult<ExactNumber> {
        match self {
            Self::Text(s) => ExactNumber::parse(s),
            Self::Integer(i) => Ok((*i).into()),
            Self::Float(f) => ExactNumber::try_from(*f),
            Self::Exact(e) => Ok(e.clone()),
        }
    }

    /// Interpret a JSON scalar. Strings and numbers are accepted.
    pub fn from_json(value: &serde_json::Value) -> CoreResult<Self> {
        use serde_json::Value;
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Self::Text(u.to_string()))
                } else {
                    // Finite JSON numbers always convert to f64.
                    Ok(Self::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            other => Err(CoreError::Parse(format!("not a number: {other}"))),
        }
    }
}

impl From<&str> for NumberInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for NumberInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for NumberInput {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for NumberInput {
    fn from(v: i32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<u32> for NumberInput {
    fn from(v: u32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<f64> for NumberInput {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<ExactNumber> for NumberInput {
    fn from(v: ExactNumber) -> Self {
        Self::Exact(v)
    }
}
