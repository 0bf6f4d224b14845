use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::EngineError;

/// Money amount in the base currency, represented as **integer cents**.
///
/// Records, caps and every aggregate use this type so that summing many
/// entries never drifts the way repeated floating-point additions do.
///
/// On the wire the amount is a plain JSON number in major units (`1000`,
/// `12.5`), which keeps stored and exported files readable by other tools.
///
/// # Examples
///
/// ```rust
/// use fintrack_engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (rejects > 2 decimals and signs):
///
/// ```rust
/// use fintrack_engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
/// assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest magnitude accepted from outside, in whole units. Leaves room
    /// for summing many such amounts without leaving `i64`.
    pub const MAX_MAJOR: i64 = 10_000_000_000_000;

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates a new amount from whole base-currency units.
    #[must_use]
    pub const fn from_major(units: i64) -> Self {
        Self(units * 100)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns the value in base-currency units.
    #[must_use]
    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    fn from_major_f64(value: f64) -> Self {
        Self((value * 100.0).round() as i64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        if cents == 0 {
            write!(f, "{sign}{units}")
        } else {
            write!(f, "{sign}{units}.{cents:02}")
        }
    }
}

// Arithmetic saturates at the `i64` bounds.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
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

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a non-negative decimal string into cents.
    ///
    /// Validation rules:
    /// - digits with an optional `.` and at most 2 fractional digits
    /// - no sign, no exponent, no thousands separator
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {s:?}"));
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        let (units_str, frac_str) = match trimmed.split_once('.') {
            Some((units, frac)) => (units, Some(frac)),
            None => (trimmed, None),
        };

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let units: i64 = units_str.parse().map_err(|_| overflow())?;

        let cents: i64 = match frac_str {
            None => 0,
            Some(frac) => {
                if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => {
                        return Err(EngineError::InvalidAmount(
                            "too many decimals".to_string(),
                        ));
                    }
                }
            }
        };

        if units > Money::MAX_MAJOR {
            return Err(overflow());
        }
        units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .map(Money)
            .ok_or_else(overflow)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.to_major())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() {
            return Err(serde::de::Error::custom("amount must be finite"));
        }
        if value.abs() > Money::MAX_MAJOR as f64 {
            return Err(serde::de::Error::custom(format!(
                "amount {value} is out of range"
            )));
        }
        Ok(Money::from_major_f64(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_drops_zero_cents() {
        assert_eq!(Money::new(0).to_string(), "0");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(1050).to_string(), "10.50");
        assert_eq!(Money::new(100_000).to_string(), "1000");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_plain_decimals() {
        assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("0.01".parse::<Money>().unwrap().cents(), 1);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_signs_separators_and_extra_decimals() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("-1".parse::<Money>().is_err());
        assert!("1,5".parse::<Money>().is_err());
        assert!("1.".parse::<Money>().is_err());
        assert!(".5".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn json_uses_major_units() {
        assert_eq!(serde_json::to_string(&Money::new(100_000)).unwrap(), "1000");
        assert_eq!(serde_json::to_string(&Money::new(1250)).unwrap(), "12.5");
        let parsed: Money = serde_json::from_str("12.34").unwrap();
        assert_eq!(parsed.cents(), 1234);
        let parsed: Money = serde_json::from_str("2000").unwrap();
        assert_eq!(parsed, Money::from_major(2000));
    }

    #[test]
    fn sums_amounts() {
        let total: Money = [Money::new(150), Money::new(250)].iter().sum();
        assert_eq!(total, Money::new(400));
    }

    #[test]
    fn arithmetic_saturates_instead_of_overflowing() {
        let big = Money::new(i64::MAX - 1);
        assert_eq!(big + Money::new(10), Money::new(i64::MAX));
        assert_eq!(Money::new(i64::MIN) - Money::new(1), Money::new(i64::MIN));
        let total: Money = [big, big, big].iter().sum();
        assert_eq!(total, Money::new(i64::MAX));
        assert_eq!(big.checked_add(Money::new(10)), None);
        assert_eq!(Money::new(5).checked_sub(Money::new(2)), Some(Money::new(3)));
    }

    #[test]
    fn out_of_range_amounts_are_rejected() {
        assert!(serde_json::from_str::<Money>("9e16").is_err());
        assert!(serde_json::from_str::<Money>("-9e16").is_err());
        let max: Money = serde_json::from_str("10000000000000").unwrap();
        assert_eq!(max, Money::from_major(Money::MAX_MAJOR));
        assert!("10000000000001".parse::<Money>().is_err());
    }
}
