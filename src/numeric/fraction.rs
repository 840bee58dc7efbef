//! Exact pretty printing of floating point values.
//!
//! A value within [`TOL`] of an integer prints as that integer; anything else
//! prints as the closest fraction whose denominator does not exceed
//! [`MAX_DENOMINATOR`]. The fraction is found by continued-fraction reduction of
//! the exact binary value of the float, so the output is deterministic.
use nalgebra::DMatrix;
use num::{BigInt, BigRational, Integer, One, Signed, Zero};

use crate::numeric::TOL;

pub const MAX_DENOMINATOR: i64 = 1_000_000;

/// Closest rational to `x` with denominator at most `max_denominator`.
/// Returns `None` for NaN and infinities.
pub fn limit_denominator(x: f64, max_denominator: i64) -> Option<BigRational> {
    let exact = BigRational::from_float(x)?;
    let max_den = BigInt::from(max_denominator.max(1));
    if exact.denom() <= &max_den {
        return Some(exact);
    }
    let (mut p0, mut q0, mut p1, mut q1) =
        (BigInt::zero(), BigInt::one(), BigInt::one(), BigInt::zero());
    let mut n = exact.numer().clone();
    let mut d = exact.denom().clone();
    loop {
        let a = n.div_floor(&d);
        let q2 = &q0 + &a * &q1;
        if q2 > max_den {
            break;
        }
        let p2 = &p0 + &a * &p1;
        p0 = std::mem::replace(&mut p1, p2);
        q0 = std::mem::replace(&mut q1, q2);
        let r = &n - &a * &d;
        n = std::mem::replace(&mut d, r);
        if d.is_zero() {
            break;
        }
    }
    let k = (&max_den - &q0).div_floor(&q1);
    let bound1 = BigRational::new(&p0 + &k * &p1, &q0 + &k * &q1);
    let bound2 = BigRational::new(p1, q1);
    if (&bound2 - &exact).abs() <= (&bound1 - &exact).abs() {
        Some(bound2)
    } else {
        Some(bound1)
    }
}

/// Integer string or reduced fraction `p/q`.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let rounded = x.round();
    if (x - rounded).abs() < TOL {
        if rounded == 0.0 {
            return "0".to_string();
        }
        return format!("{:.0}", rounded);
    }
    match limit_denominator(x, MAX_DENOMINATOR) {
        Some(r) if r.is_integer() => r.numer().to_string(),
        Some(r) => format!("{}/{}", r.numer(), r.denom()),
        None => x.to_string(),
    }
}

pub fn matrix_as_fraction(m: &DMatrix<f64>) -> Vec<Vec<String>> {
    m.row_iter()
        .map(|row| row.iter().map(|&v| format_number(v)).collect())
        .collect()
}

/// `[a, b, c]` with every entry pretty printed.
pub fn vec_pretty(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|&x| format_number(x)).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_print_without_fraction() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(4.0 + 1e-13), "4");
    }

    #[test]
    fn simple_fractions() {
        assert_eq!(format_number(0.8), "4/5");
        assert_eq!(format_number(1.4), "7/5");
        assert_eq!(format_number(-0.5), "-1/2");
        assert_eq!(format_number(1.0 / 3.0), "1/3");
        assert_eq!(format_number(-2.0 / 7.0), "-2/7");
    }

    #[test]
    fn denominator_is_bounded() {
        let r = limit_denominator(std::f64::consts::PI, MAX_DENOMINATOR).unwrap();
        assert!(r.denom() <= &BigInt::from(MAX_DENOMINATOR));
        // classic best approximation below one million
        assert_eq!(r, BigRational::new(BigInt::from(3_126_535), BigInt::from(995_207)));
        let r = limit_denominator(std::f64::consts::PI, 1000).unwrap();
        assert_eq!(r, BigRational::new(BigInt::from(355), BigInt::from(113)));
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "inf");
        assert_eq!(format_number(f64::NEG_INFINITY), "-inf");
        assert!(limit_denominator(f64::NAN, 10).is_none());
    }

    #[test]
    fn matrix_and_vector_rendering() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, -0.25, 2.0]);
        assert_eq!(
            matrix_as_fraction(&m),
            vec![vec!["1", "1/2"], vec!["-1/4", "2"]]
        );
        assert_eq!(vec_pretty(&[0.8, 1.4]), "[4/5, 7/5]");
    }
}
