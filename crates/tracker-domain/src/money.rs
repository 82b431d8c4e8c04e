//! Fixed-point monetary amounts stored as integer cents.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{
    de::{self, Deserializer, Visitor},
    Deserialize, Serialize, Serializer,
};
use thiserror::Error;

/// A signed amount of money with two-decimal precision.
///
/// Arithmetic happens on whole cents so sums never drift the way repeated
/// floating-point additions do. Documents still carry amounts as plain JSON
/// numbers (`12.5`), which is what `Serialize`/`Deserialize` produce and accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Converts a decimal amount into cents, rounding half away from zero.
    ///
    /// Returns `None` for NaN, infinities and values outside the `i64` cent range.
    pub fn from_major(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents >= i64::MAX as f64 || cents <= i64::MIN as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Multiplies by an integer factor; used to apply a `-1/0/+1` sign.
    pub fn times(self, factor: i64) -> Self {
        Self(self.0.saturating_mul(factor))
    }

    /// Ratio of `self` to `other` as a float. `None` when `other` is zero.
    pub fn ratio_to(self, other: Money) -> Option<f64> {
        if other.0 == 0 {
            None
        } else {
            Some(self.0 as f64 / other.0 as f64)
        }
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, value| acc + value)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        f.pad(&format!("{sign}{}.{:02}", abs / 100, abs % 100))
    }
}

/// Errors produced when parsing textual amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("amount is empty")]
    Empty,
    #[error("`{0}` is not a valid amount")]
    Invalid(String),
    #[error("`{0}` has more than two decimal places")]
    TooPrecise(String),
    #[error("`{0}` is too large")]
    Overflow(String),
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        let (negative, body) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (body, ""),
        };
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(MoneyParseError::Invalid(trimmed.to_string()));
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(trimmed.to_string()));
        }

        let overflow = || MoneyParseError::Overflow(trimmed.to_string());
        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| overflow())? * 10,
            _ => fraction.parse().map_err(|_| overflow())?,
        };
        let cents = whole_value
            .checked_mul(100)
            .and_then(|value| value.checked_add(fraction_value))
            .ok_or_else(overflow)?;
        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as a number or string")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Money, E> {
        Money::from_major(value).ok_or_else(|| E::custom(format!("invalid amount {value}")))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Money, E> {
        value
            .checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom(format!("amount {value} is too large")))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Money, E> {
        i64::try_from(value)
            .map_err(|_| E::custom(format!("amount {value} is too large")))
            .and_then(|value| self.visit_i64(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Money, E> {
        value.parse().map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_two_decimals_and_sign() {
        assert_eq!(Money::from_cents(6000).to_string(), "60.00");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::from_cents(123_456).to_string(), "1234.56");
        assert_eq!(format!("{:>8}", Money::from_cents(150)), "    1.50");
    }

    #[test]
    fn parses_decimal_strings_without_float_rounding() {
        assert_eq!("12.3".parse::<Money>(), Ok(Money::from_cents(1230)));
        assert_eq!(".5".parse::<Money>(), Ok(Money::from_cents(50)));
        assert_eq!("-0.07".parse::<Money>(), Ok(Money::from_cents(-7)));
        assert_eq!("40".parse::<Money>(), Ok(Money::from_cents(4000)));
        assert!(matches!(
            "1.234".parse::<Money>(),
            Err(MoneyParseError::TooPrecise(_))
        ));
        assert!(matches!("abc".parse::<Money>(), Err(MoneyParseError::Invalid(_))));
        assert_eq!("  ".parse::<Money>(), Err(MoneyParseError::Empty));
    }

    #[test]
    fn from_major_rounds_to_nearest_cent() {
        assert_eq!(Money::from_major(0.1 + 0.2), Some(Money::from_cents(30)));
        assert_eq!(Money::from_major(19.999), Some(Money::from_cents(2000)));
        assert_eq!(Money::from_major(f64::NAN), None);
        assert_eq!(Money::from_major(f64::INFINITY), None);
    }

    #[test]
    fn deserializes_numbers_and_numeric_strings() {
        let from_float: Money = serde_json::from_str("40.5").unwrap();
        let from_int: Money = serde_json::from_str("100").unwrap();
        let from_text: Money = serde_json::from_str("\"7.25\"").unwrap();
        assert_eq!(from_float, Money::from_cents(4050));
        assert_eq!(from_int, Money::from_cents(10_000));
        assert_eq!(from_text, Money::from_cents(725));
        assert!(serde_json::from_str::<Money>("\"lots\"").is_err());
        assert_eq!(serde_json::to_string(&from_float).unwrap(), "40.5");
    }

    #[test]
    fn sums_are_exact() {
        let total: Money = std::iter::repeat(Money::from_cents(10)).take(10).sum();
        assert_eq!(total, Money::from_cents(100));
    }
}
