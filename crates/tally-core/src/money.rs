//! # Money Module
//!
//! Provides the `Money` and `Percentage` types for handling monetary values
//! safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (2 fixed decimal places)             │
//! │    15.00 × 2 = 1500 × 2 = 3000 cents, exactly                          │
//! │    Every rounding step is explicit and happens in integer math         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::{Money, Percentage};
//!
//! let price = Money::from_cents(1500);      // 15.00
//! let line = price * 2;                     // 30.00
//! let discount = Money::from_cents(6000).percentage_of(Percentage::from_bps(1000));
//! assert_eq!(line.cents(), 3000);
//! assert_eq!(discount.cents(), 600);        // 10% of 60.00
//! ```
//!
//! ## Wire Format
//! ```text
//! JSON                      Rust
//! ───────────────────────   ─────────────────────────────
//! "payment_amount": 100.00  Money(10000)        cents
//! "payment_amount": "54.5"  Money(5450)         strings accepted too
//! "discount_percentage": 10 Percentage(1000)    basis points
//! "payment_amount": 1.005   rejected            third decimal place
//! ```

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor units (cents), i.e. a fixed-point decimal with
/// exactly two fractional digits.
///
/// Serialized as a decimal JSON number (`54.0` = 5400 cents) and stored as
/// an SQLite `INTEGER` of cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(15, 0).cents(), 1500);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Multiplies a unit price by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.checked_mul_quantity(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Returns `self × rate`, rounded half away from zero to the cent.
    ///
    /// ## Implementation
    /// Integer math in i128: `(amount × bps ± 5000) / 10000`.
    /// The ±5000 (half of 10000) provides the rounding.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::{Money, Percentage};
    ///
    /// let subtotal = Money::from_cents(1005);              // 10.05
    /// let pct = Percentage::from_bps(1000);                // 10%
    /// assert_eq!(subtotal.percentage_of(pct).cents(), 101); // 1.005 → 1.01
    /// ```
    pub fn percentage_of(&self, rate: Percentage) -> Money {
        let product = self.0 as i128 * rate.bps() as i128;
        let rounded = if product >= 0 {
            (product + 5000) / 10000
        } else {
            (product - 5000) / 10000
        };
        // |rate| ≤ 100% for every caller, so the result fits back into i64
        Money(rounded as i64)
    }

    /// Returns `max(self, 0)`.
    #[inline]
    pub const fn clamp_non_negative(self) -> Money {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }
}

// =============================================================================
// Percentage Type
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so `12.5%` is exactly `1250` and no
/// fractional percentage needs a float.
///
/// On the wire it is a plain percent (`10` or `12.5`), 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Percentage(#[ts(type = "number")] u32);

impl Percentage {
    /// 100% in basis points.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Creates a percentage from whole percent (`10` → 10%).
    #[inline]
    pub const fn from_whole(pct: u32) -> Self {
        Percentage(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    /// Checks if the percentage is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::zero()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Wire Format
// =============================================================================

/// Reads a decimal number with at most two fractional digits as hundredths.
struct HundredthsVisitor(&'static str);

impl<'de> Visitor<'de> for HundredthsVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with at most two decimal places", self.0)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        v.checked_mul(100)
            .ok_or_else(|| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .ok_or_else(|| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        // Display prints the shortest decimal that round-trips, so 0.1 reads
        // back as "0.1" and never as 0.1000000000000000055
        parse_hundredths(&v.to_string())
            .ok_or_else(|| E::invalid_value(Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        parse_hundredths(v).ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
    }
}

/// Parses `"-12.5"` as `-1250`. Trailing zeros past the second decimal are
/// fine; any other third decimal is not.
fn parse_hundredths(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    let frac = frac.trim_end_matches('0');

    if whole.is_empty()
        || frac.len() > 2
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse().ok()?,
    };
    let value = whole.checked_mul(100)?.checked_add(frac)?;
    Some(if negative { -value } else { value })
}

/// `hundredths / 100` is the nearest f64 to the decimal, which serde_json
/// prints back as that decimal.
#[inline]
fn hundredths_as_f64(hundredths: i64) -> f64 {
    hundredths as f64 / 100.0
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(hundredths_as_f64(self.0))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(HundredthsVisitor("an amount"))
            .map(Money)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(hundredths_as_f64(self.0 as i64))
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bps = deserializer.deserialize_any(HundredthsVisitor("a percentage"))?;
        u32::try_from(bps)
            .map(Percentage)
            .map_err(|_| de::Error::custom("percentage must not be negative"))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// For logs and receipts only. The API never ships formatted strings.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(5400).to_string(), "54.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
        assert_eq!(Percentage::from_bps(1250).to_string(), "12.50%");
    }

    #[test]
    fn test_percentage_of_rounds_half_up() {
        // 10% of 60.00 = 6.00
        assert_eq!(
            Money::from_cents(6000).percentage_of(Percentage::from_whole(10)),
            Money::from_cents(600)
        );
        // 12.5% of 0.04 = 0.005 → 0.01
        assert_eq!(
            Money::from_cents(4).percentage_of(Percentage::from_bps(1250)),
            Money::from_cents(1)
        );
        // 33.33% of 0.10 = 0.03333 → 0.03
        assert_eq!(
            Money::from_cents(10).percentage_of(Percentage::from_bps(3333)),
            Money::from_cents(3)
        );
    }

    #[test]
    fn test_full_percentage_is_identity() {
        let amount = Money::from_cents(123_456);
        assert_eq!(
            amount.percentage_of(Percentage::from_bps(Percentage::MAX_BPS)),
            amount
        );
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(
            Money::from_cents(1).checked_add(Money::from_cents(2)),
            Some(Money::from_cents(3))
        );
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_cents(-1).clamp_non_negative(), Money::zero());
        assert_eq!(Money::from_cents(42).clamp_non_negative(), Money::from_cents(42));
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 50].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 400);
    }

    #[test]
    fn test_serializes_as_decimal_number() {
        assert_eq!(serde_json::to_string(&Money::from_cents(5400)).unwrap(), "54.0");
        assert_eq!(serde_json::to_string(&Money::from_cents(1005)).unwrap(), "10.05");
        assert_eq!(serde_json::to_string(&Money::from_cents(7)).unwrap(), "0.07");
        assert_eq!(serde_json::to_string(&Money::from_cents(-550)).unwrap(), "-5.5");
        assert_eq!(serde_json::to_string(&Percentage::from_bps(1250)).unwrap(), "12.5");
    }

    #[test]
    fn test_deserializes_decimal_amounts() {
        let read = |json: &str| serde_json::from_str::<Money>(json).map(|m| m.cents());

        assert_eq!(read("100").unwrap(), 10000);
        assert_eq!(read("100.00").unwrap(), 10000);
        assert_eq!(read("54.5").unwrap(), 5450);
        assert_eq!(read("0.1").unwrap(), 10);
        assert_eq!(read("19.99").unwrap(), 1999);
        assert_eq!(read("-5.5").unwrap(), -550);
        assert_eq!(read("\"54.50\"").unwrap(), 5450);

        assert!(read("1.005").is_err());
        assert!(read("\"12,50\"").is_err());
        assert!(read("1e300").is_err());
        assert!(read("true").is_err());
    }

    #[test]
    fn test_deserializes_whole_and_decimal_percent() {
        let read = |json: &str| serde_json::from_str::<Percentage>(json).map(|p| p.bps());

        assert_eq!(read("10").unwrap(), 1000);
        assert_eq!(read("12.5").unwrap(), 1250);
        assert_eq!(read("0").unwrap(), 0);
        assert_eq!(read("100").unwrap(), 10_000);

        assert!(read("-1").is_err());
        assert!(read("33.333").is_err());
    }
}
