//! Exact base-10 numbers for the error-analysis engine.
//!
//! [`Decimal`] wraps a [`BigRational`], so sums, differences and products are
//! exact. Only division and explicit [`DecimalContext::round`] calls lose
//! digits, and both round half-even to the context precision.
//!
//! ```ignore
//! let ctx = DecimalContext::default();
//! let x: Decimal = "1234.5".parse()?;
//! assert_eq!(x.to_fixed(2, Rounding::HalfEven, true), "1,234.50");
//! let third = ctx.div(&Decimal::from(1), &Decimal::from(3))?;
//! ```
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use nom::{
    IResult, Parser,
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map_res, opt, recognize},
    sequence::{delimited, pair, preceded},
};
use num::{BigInt, BigRational, Integer, One, Signed, ToPrimitive, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{Display, EnumString};

use crate::errors::{EngineError, EngineResult};

/// Largest decimal exponent accepted by the parser.
const MAX_EXPONENT: i32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Rounding {
    /// toward zero
    Down,
    /// ties away from zero
    HalfUp,
    /// ties to the even neighbour
    #[default]
    HalfEven,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Decimal(BigRational);

fn pow10(exp: i32) -> BigRational {
    let p = num::pow(BigInt::from(10), exp.unsigned_abs() as usize);
    if exp >= 0 {
        BigRational::from_integer(p)
    } else {
        BigRational::new(BigInt::one(), p)
    }
}

fn round_integer(v: &BigRational, rounding: Rounding) -> BigRational {
    match rounding {
        Rounding::Down => v.trunc(),
        Rounding::HalfUp => v.round(),
        Rounding::HalfEven => {
            let floor = v.floor();
            let frac = v - &floor;
            let half = BigRational::new(BigInt::one(), BigInt::from(2));
            match frac.cmp(&half) {
                Ordering::Less => floor,
                Ordering::Greater => floor + BigRational::one(),
                Ordering::Equal => {
                    if floor.to_integer().is_even() {
                        floor
                    } else {
                        floor + BigRational::one()
                    }
                }
            }
        }
    }
}

/// Number of decimal places needed to print `r` exactly, `None` if its
/// expansion does not terminate.
fn terminating_places(r: &BigRational) -> Option<u32> {
    let mut d = r.denom().clone();
    let (two, five) = (BigInt::from(2), BigInt::from(5));
    let (mut twos, mut fives) = (0u32, 0u32);
    while d.is_multiple_of(&two) {
        d /= &two;
        twos += 1;
    }
    while d.is_multiple_of(&five) {
        d /= &five;
        fives += 1;
    }
    d.is_one().then_some(twos.max(fives))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl Decimal {
    pub fn zero() -> Self {
        Decimal(BigRational::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    pub fn as_rational(&self) -> &BigRational {
        &self.0
    }

    /// From the shortest decimal text that round-trips the float, so `0.1`
    /// becomes exactly one tenth. `None` for NaN and infinities.
    pub fn from_f64(x: f64) -> Option<Self> {
        if !x.is_finite() {
            return None;
        }
        format!("{x}").parse().ok()
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    /// Exact quotient, `None` when `rhs` is zero.
    pub fn checked_div(&self, rhs: &Decimal) -> Option<Decimal> {
        if rhs.is_zero() {
            None
        } else {
            Some(Decimal(&self.0 / &rhs.0))
        }
    }

    /// Round to `decimals` places after the point (negative values round to
    /// tens, hundreds ...).
    pub fn quantize(&self, decimals: i32, rounding: Rounding) -> Decimal {
        let scale = pow10(decimals);
        let scaled = &self.0 * &scale;
        Decimal(round_integer(&scaled, rounding) / scale)
    }

    /// Fixed-point text with exactly `decimals` places, optionally grouped
    /// with `,` every three integer digits.
    pub fn to_fixed(&self, decimals: u32, rounding: Rounding, thousands: bool) -> String {
        let places = decimals.min(MAX_EXPONENT as u32) as i32;
        let q = self.quantize(places, rounding);
        let scaled = (&q.0 * pow10(places)).to_integer();
        let negative = scaled.is_negative();
        let mut digits = scaled.abs().to_string();
        let width = places as usize + 1;
        if digits.len() < width {
            digits = format!("{}{digits}", "0".repeat(width - digits.len()));
        }
        let (int_part, frac_part) = digits.split_at(digits.len() - places as usize);
        let int_part = if thousands {
            group_thousands(int_part)
        } else {
            int_part.to_string()
        };
        let sign = if negative { "-" } else { "" };
        if places == 0 {
            format!("{sign}{int_part}")
        } else {
            format!("{sign}{int_part}.{frac_part}")
        }
    }

    /// Position of the leading significant digit: `floor(log10(|self|))`.
    fn adjusted_exponent(&self) -> Option<i32> {
        if self.is_zero() {
            return None;
        }
        let v = self.0.abs();
        let digits = |n: &BigInt| n.to_string().len() as i32;
        let mut e = digits(v.numer()) - digits(v.denom());
        while pow10(e) > v {
            e -= 1;
        }
        while pow10(e + 1) <= v {
            e += 1;
        }
        Some(e)
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Decimal::zero()
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal(BigRational::from_integer(BigInt::from(value)))
    }
}

impl From<BigRational> for Decimal {
    fn from(value: BigRational) -> Self {
        Decimal(value)
    }
}

/// Exact text when the expansion terminates, otherwise 28 significant digits.
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = match terminating_places(&self.0) {
            Some(places) => self.to_fixed(places, Rounding::HalfEven, false),
            None => {
                let rounded = DecimalContext::default().round(self);
                let places = terminating_places(&rounded.0).unwrap_or(0);
                rounded.to_fixed(places, Rounding::HalfEven, false)
            }
        };
        f.write_str(&shown)
    }
}

fn sign(input: &str) -> IResult<&str, Option<char>> {
    opt(one_of("+-")).parse(input)
}

fn exponent(input: &str) -> IResult<&str, i32> {
    preceded(
        one_of("eE"),
        map_res(recognize(pair(opt(one_of("+-")), digit1)), |s: &str| {
            s.parse::<i32>()
        }),
    )
    .parse(input)
}

/// `[sign] digits [. digits] [e [sign] digits]`
fn literal(input: &str) -> IResult<&str, (Option<char>, &str, Option<&str>, Option<i32>)> {
    delimited(
        multispace0,
        (sign, digit0, opt(preceded(char('.'), digit0)), opt(exponent)),
        multispace0,
    )
    .parse(input)
}

impl FromStr for Decimal {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::validation(format!("invalid decimal: '{s}'"));
        let (_, (sign, int_digits, frac_digits, exp)) =
            all_consuming(literal).parse(s).map_err(|_| invalid())?;
        let frac_digits = frac_digits.unwrap_or("");
        let mantissa = format!("{int_digits}{frac_digits}");
        if mantissa.is_empty() {
            return Err(invalid());
        }
        let exp = exp.unwrap_or(0);
        if exp.abs() > MAX_EXPONENT {
            return Err(EngineError::validation(format!(
                "decimal exponent out of range: '{s}'"
            )));
        }
        let mantissa: BigInt = mantissa.parse().map_err(|_| invalid())?;
        let scale = exp - frac_digits.len() as i32;
        let value = BigRational::from_integer(mantissa) * pow10(scale);
        Ok(Decimal(if sign == Some('-') { -value } else { value }))
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal number or a string holding one")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal(BigRational::from_integer(BigInt::from(v))))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        Decimal::from_f64(v).ok_or_else(|| E::custom(format!("non-finite decimal {v}")))
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }
}

macro_rules! exact_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Decimal {
            type Output = Decimal;
            fn $method(self, rhs: Decimal) -> Decimal {
                Decimal(self.0 $op rhs.0)
            }
        }

        impl<'a> $trait<&'a Decimal> for &'a Decimal {
            type Output = Decimal;
            fn $method(self, rhs: &'a Decimal) -> Decimal {
                Decimal(&self.0 $op &rhs.0)
            }
        }
    };
}

exact_op!(Add, add, +);
exact_op!(Sub, sub, -);
exact_op!(Mul, mul, *);

impl Neg for Decimal {
    type Output = Decimal;
    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::zero(), |acc, x| acc + x)
    }
}

/// Largest significant-digit count a [`DecimalContext`] accepts.
pub const MAX_PRECISION: u32 = 28;

/// Largest number of decimal places a caller may ask to see.
pub const MAX_DISPLAY_DECIMALS: u32 = 28;

/// `decimals` as a quantize exponent, rejected above [`MAX_DISPLAY_DECIMALS`].
pub fn decimal_places(name: &str, decimals: u32) -> EngineResult<i32> {
    if decimals > MAX_DISPLAY_DECIMALS {
        return Err(EngineError::validation(format!(
            "{name} must be at most {MAX_DISPLAY_DECIMALS}, got {decimals}"
        )));
    }
    i32::try_from(decimals)
        .map_err(|_| EngineError::validation(format!("{name} out of range: {decimals}")))
}

/// Precision for the operations that cannot stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalContext {
    /// significant digits
    pub precision: u32,
}

impl Default for DecimalContext {
    fn default() -> Self {
        DecimalContext {
            precision: MAX_PRECISION,
        }
    }
}

impl DecimalContext {
    pub fn new(precision: u32) -> EngineResult<Self> {
        if precision == 0 || precision > MAX_PRECISION {
            return Err(EngineError::validation(format!(
                "decimal precision must be between 1 and {MAX_PRECISION} digits"
            )));
        }
        Ok(DecimalContext { precision })
    }

    /// Half-even rounding to `precision` significant digits.
    pub fn round(&self, value: &Decimal) -> Decimal {
        match value.adjusted_exponent() {
            None => Decimal::zero(),
            Some(e) => value.quantize(self.precision as i32 - 1 - e, Rounding::HalfEven),
        }
    }

    pub fn mul(&self, a: &Decimal, b: &Decimal) -> Decimal {
        self.round(&(a * b))
    }

    pub fn div(&self, a: &Decimal, b: &Decimal) -> EngineResult<Decimal> {
        a.checked_div(b)
            .map(|q| self.round(&q))
            .ok_or_else(|| EngineError::validation("decimal division by zero"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn parses_plain_and_scientific_text() {
        assert_eq!(d("1.50"), d("1.5"));
        assert_eq!(d("-0.25").to_string(), "-0.25");
        assert_eq!(d("1e3"), Decimal::from(1000));
        assert_eq!(d("2.5E-2").to_string(), "0.025");
        assert_eq!(d(".5").to_string(), "0.5");
        assert_eq!(d(" +7 ").to_string(), "7");
        assert!("".parse::<Decimal>().is_err());
        assert!("1.2.3".parse::<Decimal>().is_err());
        assert!("abc".parse::<Decimal>().is_err());
        assert!("1e99999".parse::<Decimal>().is_err());
    }

    #[test]
    fn arithmetic_is_exact() {
        assert_eq!(d("0.1") + d("0.2"), d("0.3"));
        assert_eq!(d("1.1") * d("1.1"), d("1.21"));
        assert_eq!(d("5") - d("7.5"), d("-2.5"));
        let total: Decimal = vec![d("0.1"); 10].into_iter().sum();
        assert_eq!(total, Decimal::from(1));
    }

    #[test]
    fn quantize_modes() {
        assert_eq!(d("2.345").quantize(2, Rounding::Down), d("2.34"));
        assert_eq!(d("2.345").quantize(2, Rounding::HalfUp), d("2.35"));
        assert_eq!(d("2.345").quantize(2, Rounding::HalfEven), d("2.34"));
        assert_eq!(d("2.355").quantize(2, Rounding::HalfEven), d("2.36"));
        assert_eq!(d("-2.345").quantize(2, Rounding::HalfUp), d("-2.35"));
        assert_eq!(d("-2.349").quantize(2, Rounding::Down), d("-2.34"));
        assert_eq!(d("1250").quantize(-2, Rounding::HalfEven), d("1200"));
    }

    #[test]
    fn fixed_point_text() {
        assert_eq!(d("1234.5").to_fixed(6, Rounding::HalfEven, true), "1,234.500000");
        assert_eq!(d("1234567").to_fixed(0, Rounding::HalfEven, true), "1,234,567");
        assert_eq!(d("-0.004").to_fixed(2, Rounding::HalfEven, false), "0.00");
        assert_eq!(d("-0.006").to_fixed(2, Rounding::HalfEven, false), "-0.01");
        assert_eq!(d("0.05").to_fixed(3, Rounding::HalfEven, true), "0.050");
        assert_eq!(d("-123456.789").to_fixed(1, Rounding::HalfUp, true), "-123,456.8");
    }

    #[test]
    fn context_division() {
        let ctx = DecimalContext::default();
        let third = ctx.div(&Decimal::from(1), &Decimal::from(3)).unwrap();
        assert_eq!(third.to_string(), format!("0.{}", "3".repeat(28)));
        let two_thirds = ctx.div(&Decimal::from(2), &Decimal::from(3)).unwrap();
        assert!(two_thirds.to_string().ends_with("67"));
        assert!(ctx.div(&Decimal::from(1), &Decimal::zero()).is_err());

        let short = DecimalContext::new(3).unwrap();
        assert_eq!(short.round(&d("123456")), d("123000"));
        assert_eq!(short.round(&d("0.00123456")), d("0.00123"));
        assert!(DecimalContext::new(0).is_err());
    }

    #[test]
    fn display_places_are_bounded() {
        assert_eq!(decimal_places("decimals", 0).unwrap(), 0);
        assert_eq!(decimal_places("decimals", MAX_DISPLAY_DECIMALS).unwrap(), 28);
        let err = decimal_places("approx_decimals", u32::MAX).unwrap_err();
        assert!(err.to_string().contains("approx_decimals must be at most 28"));
    }

    #[test]
    fn context_precision_is_bounded() {
        assert_eq!(DecimalContext::new(MAX_PRECISION).unwrap(), DecimalContext::default());
        let err = DecimalContext::new(MAX_PRECISION + 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation error: decimal precision must be between 1 and 28 digits"
        );
        assert!(DecimalContext::new(u32::MAX).is_err());
    }

    #[test]
    fn floats_become_their_shortest_text() {
        assert_eq!(Decimal::from_f64(0.1).unwrap(), d("0.1"));
        assert_eq!(Decimal::from_f64(-2.5).unwrap().to_f64(), -2.5);
        assert!(Decimal::from_f64(f64::NAN).is_none());
    }

    #[test]
    fn serde_accepts_strings_and_numbers() {
        let from_str: Decimal = serde_json::from_str(r#""1000.25""#).unwrap();
        let from_num: Decimal = serde_json::from_str("1000.25").unwrap();
        let from_int: Decimal = serde_json::from_str("-3").unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(from_int, Decimal::from(-3));
        assert_eq!(serde_json::to_string(&from_str).unwrap(), r#""1000.25""#);
    }
}
