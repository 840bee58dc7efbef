//! Cofactor (Laplace) expansion along the first row.
//!
//! A minor is identified by the set of columns it keeps: the rows are always
//! the last `popcount(mask)` rows of the matrix, so a `u64` bitmask is a
//! complete key. Minors are evaluated bottom-up from an explicit stack and
//! memoized, which turns the `n!` recursion into `n·2^n` work and never
//! materializes sub-matrices except for the logged top-level ones.
use std::collections::HashMap;

use log::{debug, info};

use crate::errors::{EngineError, EngineResult};
use crate::numeric::{Matrix, clone_with, format_number, is_zero, require_square};
use crate::steps::{StepEvidence, StepLog, StepRecorder, StepTag};

/// Largest order representable with a `u64` column mask.
pub const MAX_ORDER: usize = 63;

enum Frame {
    Enter(u64),
    Combine(u64),
}

fn columns(mask: u64, n: usize) -> impl Iterator<Item = usize> {
    (0..n).filter(move |&j| mask & (1u64 << j) != 0)
}

fn without(mask: u64, j: usize) -> u64 {
    mask & !(1u64 << j)
}

fn sign(position: usize) -> f64 {
    if position % 2 == 0 { 1.0 } else { -1.0 }
}

/// 1x1 and 2x2 minors, read straight from the matrix.
fn base_case(m: &Matrix, n: usize, mask: u64) -> f64 {
    let cols: Vec<usize> = columns(mask, n).collect();
    let r = n - cols.len();
    match cols.as_slice() {
        [j] => m[(r, *j)],
        [j1, j2] => m[(r, *j1)] * m[(r + 1, *j2)] - m[(r, *j2)] * m[(r + 1, *j1)],
        _ => 0.0,
    }
}

/// Determinants of every minor reachable from the full column set.
fn minor_table(m: &Matrix, n: usize) -> EngineResult<HashMap<u64, f64>> {
    if n > MAX_ORDER {
        return Err(EngineError::validation(format!(
            "cofactor expansion supports up to {MAX_ORDER}x{MAX_ORDER} matrices, got {n}x{n}"
        )));
    }
    let full = (1u64 << n) - 1;
    let mut memo: HashMap<u64, f64> = HashMap::new();
    let mut stack = vec![Frame::Enter(full)];
    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(mask) => {
                if memo.contains_key(&mask) {
                    continue;
                }
                if mask.count_ones() <= 2 {
                    memo.insert(mask, base_case(m, n, mask));
                    continue;
                }
                stack.push(Frame::Combine(mask));
                for j in columns(mask, n) {
                    let sub = without(mask, j);
                    if !memo.contains_key(&sub) {
                        stack.push(Frame::Enter(sub));
                    }
                }
            }
            Frame::Combine(mask) => {
                let r = n - mask.count_ones() as usize;
                let mut total = 0.0;
                for (p, j) in columns(mask, n).enumerate() {
                    let minor = memo.get(&without(mask, j)).copied().ok_or_else(|| {
                        EngineError::validation(format!("minor {:#b} was not evaluated", without(mask, j)))
                    })?;
                    total += sign(p) * m[(r, j)] * minor;
                }
                memo.insert(mask, total);
            }
        }
    }
    debug!("cofactor expansion of order {n} evaluated {} minors", memo.len());
    Ok(memo)
}

/// Determinant by cofactor expansion, without a step log.
pub fn cofactor_value(a: &Matrix) -> EngineResult<f64> {
    let n = require_square(a, "cofactors")?;
    let m = clone_with(a);
    let memo = minor_table(&m, n)?;
    let det = memo.get(&((1u64 << n) - 1)).copied().unwrap_or(0.0);
    Ok(if is_zero(det) { 0.0 } else { det })
}

/// Determinant by cofactor expansion along the first row, with steps.
///
/// Only the first level of the expansion is logged: for each column `j` the
/// minor `M1j`, its value (as a `minor_2x2` record when it is 2x2) and the
/// cofactor `(-1)^(1+j) a1j det(M1j)`.
pub fn determinant_cofactors(a: &Matrix) -> EngineResult<(f64, StepLog)> {
    let n = require_square(a, "cofactors")?;
    let m = clone_with(a);
    let memo = minor_table(&m, n)?;
    let full = (1u64 << n) - 1;

    let mut rec = StepRecorder::new();
    rec.snapshot(StepTag::Initial, "Initial matrix", &m);
    rec.narrate(format!("Cofactor expansion along the first row ({n}x{n})"));

    if n == 2 {
        let (a11, a12, a21, a22) = (m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]);
        let det = a11 * a22 - a12 * a21;
        rec.push(
            StepTag::Minor2x2,
            format!(
                "det = ({})({}) - ({})({}) = {}",
                format_number(a11),
                format_number(a22),
                format_number(a12),
                format_number(a21),
                format_number(det)
            ),
            None,
            None,
            Some(StepEvidence::Minor {
                a: a11,
                b: a12,
                c: a21,
                d: a22,
                det,
            }),
        );
    }

    if n >= 3 {
        for j in 0..n {
            let minor_det = memo.get(&without(full, j)).copied().unwrap_or(0.0);
            let minor = m.clone().remove_row(0).remove_column(j);
            rec.push(
                StepTag::CofactorMinor,
                format!("Minor M1{} (delete row 1 and column {})", j + 1, j + 1),
                Some(&minor),
                None,
                None,
            );
            if n == 3 {
                let (a, b, c, d) = (minor[(0, 0)], minor[(0, 1)], minor[(1, 0)], minor[(1, 1)]);
                rec.push(
                    StepTag::Minor2x2,
                    format!(
                        "det(M1{}) = ({})({}) - ({})({}) = {}",
                        j + 1,
                        format_number(a),
                        format_number(d),
                        format_number(b),
                        format_number(c),
                        format_number(minor_det)
                    ),
                    None,
                    None,
                    Some(StepEvidence::Minor {
                        a,
                        b,
                        c,
                        d,
                        det: minor_det,
                    }),
                );
            }
            let s = if j % 2 == 0 { 1 } else { -1 };
            let entry = m[(0, j)];
            let cofactor = f64::from(s) * entry * minor_det;
            let line = format!(
                "C1{} = (-1)^(1+{}) · ({}) · det(M1{}) = {}",
                j + 1,
                j + 1,
                format_number(entry),
                j + 1,
                format_number(cofactor)
            );
            rec.push(
                StepTag::CofactorValue,
                line.clone(),
                None,
                None,
                Some(StepEvidence::Cofactor {
                    row: 0,
                    col: j,
                    sign: s,
                    entry,
                    minor_det,
                    cofactor,
                }),
            );
            rec.narrate(line);
        }
    }

    let raw = memo.get(&full).copied().unwrap_or(0.0);
    let det = if is_zero(raw) { 0.0 } else { raw };
    let line = format!("det (cofactors) = {}", format_number(det));
    rec.push(
        StepTag::Result,
        line.clone(),
        None,
        None,
        Some(StepEvidence::Value {
            value: det,
            pretty: format_number(det),
        }),
    );
    rec.narrate(line);
    info!("cofactor determinant of a {n}x{n} matrix = {}", format_number(det));
    Ok((det, rec.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    #[test]
    fn small_orders() {
        let one = DMatrix::from_row_slice(1, 1, &[-7.0]);
        assert_eq!(cofactor_value(&one).unwrap(), -7.0);
        let (det, log) = determinant_cofactors(&DMatrix::from_row_slice(2, 2, &[3.0, 8.0, 4.0, 6.0])).unwrap();
        assert_eq!(det, -14.0);
        assert_eq!(log.count_tag(StepTag::Minor2x2), 1);
        assert_eq!(log.count_tag(StepTag::CofactorMinor), 0);
    }

    #[test]
    fn three_by_three_logs_top_level_only() {
        let a = DMatrix::from_row_slice(3, 3, &[2.0, -3.0, 1.0, 2.0, 0.0, -1.0, 1.0, 4.0, 5.0]);
        let (det, log) = determinant_cofactors(&a).unwrap();
        assert_relative_eq!(det, 49.0);
        assert_eq!(log.count_tag(StepTag::CofactorMinor), 3);
        assert_eq!(log.count_tag(StepTag::Minor2x2), 3);
        assert_eq!(log.count_tag(StepTag::CofactorValue), 3);
        let second = log
            .states()
            .iter()
            .filter(|s| s.tag == StepTag::CofactorValue)
            .nth(1)
            .unwrap();
        match second.evidence.as_ref().unwrap() {
            StepEvidence::Cofactor { sign, minor_det, cofactor, .. } => {
                assert_eq!(*sign, -1);
                assert_relative_eq!(*minor_det, 11.0);
                assert_relative_eq!(*cofactor, 33.0);
            }
            other => panic!("unexpected evidence {other:?}"),
        }
    }

    #[test]
    fn four_by_four() {
        let a = DMatrix::from_row_slice(
            4,
            4,
            &[1.0, 0.0, 2.0, -1.0, 3.0, 0.0, 0.0, 5.0, 2.0, 1.0, 4.0, -3.0, 1.0, 0.0, 5.0, 0.0],
        );
        let (det, log) = determinant_cofactors(&a).unwrap();
        assert_relative_eq!(det, 30.0, epsilon = 1e-9);
        assert_eq!(log.count_tag(StepTag::CofactorMinor), 4);
        assert_eq!(log.count_tag(StepTag::Minor2x2), 0);
    }

    #[test]
    fn non_square_is_rejected() {
        let err = cofactor_value(&DMatrix::<f64>::zeros(2, 3)).unwrap_err();
        assert_eq!(err.code(), "DIMENSION_ERROR");
        let err = cofactor_value(&DMatrix::<f64>::zeros(0, 0)).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
