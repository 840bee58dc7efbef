//! Entry-by-entry operations: sums, differences, scalar multiples, transpose.
use itertools::Itertools;
use log::info;

use crate::errors::{EngineError, EngineResult};
use crate::numeric::{Matrix, format_number, shape};
use crate::steps::StepLog;

fn same_shape(operation: &str, a: &Matrix, b: &Matrix) -> EngineResult<()> {
    if shape(a) != shape(b) {
        return Err(EngineError::shape_mismatch(operation, shape(a), shape(b)));
    }
    Ok(())
}

/// One line per row, each entry written as `term = value`.
fn row_lines(c: &Matrix, term: impl Fn(usize, usize) -> String) -> Vec<String> {
    (0..c.nrows())
        .map(|i| {
            let entries = (0..c.ncols())
                .map(|j| format!("{} = {}", term(i, j), format_number(c[(i, j)])))
                .join(" | ");
            format!("Row {}: {entries}", i + 1)
        })
        .collect()
}

pub fn add(a: &Matrix, b: &Matrix) -> EngineResult<(Matrix, StepLog)> {
    same_shape("add", a, b)?;
    let c = a + b;
    let lines = row_lines(&c, |i, j| {
        format!("({}) + ({})", format_number(a[(i, j)]), format_number(b[(i, j)]))
    });
    Ok((c, StepLog::flat(lines)))
}

pub fn sub(a: &Matrix, b: &Matrix) -> EngineResult<(Matrix, StepLog)> {
    same_shape("sub", a, b)?;
    let c = a - b;
    let lines = row_lines(&c, |i, j| {
        format!("({}) - ({})", format_number(a[(i, j)]), format_number(b[(i, j)]))
    });
    Ok((c, StepLog::flat(lines)))
}

pub fn scalar_mult(alpha: f64, a: &Matrix) -> EngineResult<(Matrix, StepLog)> {
    if !alpha.is_finite() {
        return Err(EngineError::validation("the scalar must be a finite number"));
    }
    let c = a * alpha;
    let lines = row_lines(&c, |i, j| {
        format!("{}·({})", format_number(alpha), format_number(a[(i, j)]))
    });
    Ok((c, StepLog::flat(lines)))
}

/// Exact: entries are moved, never recomputed.
pub fn transpose(a: &Matrix) -> (Matrix, StepLog) {
    let t = a.transpose();
    let lines = (0..a.ncols())
        .map(|j| {
            let moved = (0..a.nrows())
                .map(|i| format!("a_{}{}→t_{}{}", i + 1, j + 1, j + 1, i + 1))
                .join(", ");
            format!("Column {} of A becomes row {} of Aᵀ ({moved})", j + 1, j + 1)
        })
        .collect();
    (t, StepLog::flat(lines))
}

fn check_many(operation: &str, mats: &[Matrix]) -> EngineResult<()> {
    if mats.len() < 2 {
        return Err(EngineError::validation(format!(
            "{operation} needs at least 2 matrices, got {}",
            mats.len()
        )));
    }
    for m in &mats[1..] {
        same_shape(operation, &mats[0], m)?;
    }
    Ok(())
}

/// `M1 + M2 + ... + Mk`, entry by entry.
pub fn sum_many(mats: &[Matrix]) -> EngineResult<(Matrix, StepLog)> {
    check_many("sum_many", mats)?;
    let (m, n) = shape(&mats[0]);
    let mut c = Matrix::zeros(m, n);
    let mut lines = Vec::with_capacity(m * n);
    for i in 0..m {
        for j in 0..n {
            let val: f64 = mats.iter().map(|x| x[(i, j)]).sum();
            c[(i, j)] = val;
            let terms = mats.iter().map(|x| format_number(x[(i, j)])).join(" + ");
            lines.push(format!("s_{}{} = {terms} = {}", i + 1, j + 1, format_number(val)));
        }
    }
    info!("sum of {} matrices of shape {m}x{n}", mats.len());
    Ok((c, StepLog::flat(lines)))
}

/// `M1 - M2 - ... - Mk`, entry by entry.
pub fn sub_many(mats: &[Matrix]) -> EngineResult<(Matrix, StepLog)> {
    check_many("sub_many", mats)?;
    let (m, n) = shape(&mats[0]);
    let mut c = Matrix::zeros(m, n);
    let mut lines = Vec::with_capacity(m * n);
    for i in 0..m {
        for j in 0..n {
            let rest: f64 = mats[1..].iter().map(|x| x[(i, j)]).sum();
            let val = mats[0][(i, j)] - rest;
            c[(i, j)] = val;
            let terms = std::iter::once(format_number(mats[0][(i, j)]))
                .chain(mats[1..].iter().map(|x| format!("({})", format_number(x[(i, j)]))))
                .join(" - ");
            lines.push(format!("r_{}{} = {terms} = {}", i + 1, j + 1, format_number(val)));
        }
    }
    info!("difference of {} matrices of shape {m}x{n}", mats.len());
    Ok((c, StepLog::flat(lines)))
}
