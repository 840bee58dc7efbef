//! Forward elimination to upper form and backward reduction to RREF.
//!
//! Both passes mutate the augmented matrix in place and, when given a
//! recorder, log every swap, pivot and row operation with a snapshot.
use log::debug;

use crate::config::Pivoting;
use crate::numeric::{Matrix, format_number, is_close, normalize_neg_zero, shape};
use crate::reduce::analysis::Pivot;
use crate::steps::{StepEvidence, StepRecorder, StepTag};

pub fn log_initial(rec: &mut StepRecorder, ab: &Matrix) {
    let (m, n1) = shape(ab);
    rec.push(
        StepTag::Initial,
        "Initial",
        Some(ab),
        Some(format!("initial augmented matrix ({m}x{n1})")),
        None,
    );
}

fn log_pivot(rec: &mut StepRecorder, row: usize, col: usize, value: f64) {
    let text = format!("Pivot @ ({},{}) = {}", row + 1, col + 1, format_number(value));
    rec.push(
        StepTag::Pivot,
        text.clone(),
        None,
        None,
        Some(StepEvidence::Pivot {
            row,
            col,
            value,
            value_pretty: format_number(value),
        }),
    );
    rec.narrate(text);
}

/// `R_target <- R_target - factor * R_source` over columns `from..`.
pub(crate) fn subtract_row(ab: &mut Matrix, target: usize, source: usize, factor: f64, from: usize) {
    for c in from..ab.ncols() {
        let v = ab[(source, c)];
        ab[(target, c)] -= factor * v;
    }
    normalize_neg_zero(ab);
}

fn log_row_op(rec: Option<&mut StepRecorder>, ab: &Matrix, target: usize, source: usize, factor: f64) {
    if let Some(rec) = rec {
        let text = format!(
            "R{} ← R{} - ({})·R{}",
            target + 1,
            target + 1,
            format_number(factor),
            source + 1
        );
        rec.push(
            StepTag::RowOp,
            text.clone(),
            Some(ab),
            None,
            Some(StepEvidence::RowOp {
                target,
                source,
                factor,
            }),
        );
        rec.narrate(text);
    }
}

/// Row to pivot on in `col`, searching from `start_row` down.
/// Partial pivoting takes the largest magnitude (first row on ties);
/// `None` takes the first entry that is not zero.
pub fn select_pivot_row(
    ab: &Matrix,
    start_row: usize,
    col: usize,
    pivoting: Pivoting,
    tol: f64,
) -> Option<usize> {
    let m = ab.nrows();
    match pivoting {
        Pivoting::Partial => {
            let mut best = 0.0;
            let mut sel = None;
            for r in start_row..m {
                let v = ab[(r, col)].abs();
                if v > best && !is_close(v, 0.0, tol) {
                    best = v;
                    sel = Some(r);
                }
            }
            sel
        }
        Pivoting::None => (start_row..m).find(|&r| !is_close(ab[(r, col)], 0.0, tol)),
    }
}

/// Reduce `ab` to upper (row echelon) form; returns the pivots in order.
/// Columns without a usable pivot are skipped.
pub fn forward_elimination(
    ab: &mut Matrix,
    rec: &mut StepRecorder,
    pivoting: Pivoting,
    tol: f64,
) -> Vec<Pivot> {
    let (m, n1) = shape(ab);
    let n = n1.saturating_sub(1);
    let mut row = 0;
    let mut pivots = Vec::new();
    for col in 0..n {
        if row >= m {
            break;
        }
        let Some(pivot_row) = select_pivot_row(ab, row, col, pivoting, tol) else {
            debug!("column {} has no usable pivot", col + 1);
            continue;
        };
        if pivot_row != row {
            ab.swap_rows(row, pivot_row);
            let text = format!("Swap rows: R{} <-> R{}", row + 1, pivot_row + 1);
            rec.push(
                StepTag::SwapRows,
                text.clone(),
                Some(ab),
                None,
                Some(StepEvidence::Swap { i: row, j: pivot_row }),
            );
            rec.narrate(text);
        }
        let pivot_val = ab[(row, col)];
        log_pivot(rec, row, col, pivot_val);
        for r in (row + 1)..m {
            if is_close(ab[(r, col)], 0.0, tol) {
                continue;
            }
            let factor = ab[(r, col)] / pivot_val;
            subtract_row(ab, r, row, factor, col);
            log_row_op(Some(&mut *rec), ab, r, row, factor);
        }
        pivots.push(Pivot { row, col });
        row += 1;
    }
    pivots
}

/// From upper form: scale every pivot row to 1 and clear the column above it,
/// walking the pivots bottom-up. Leaves `ab` in RREF.
pub fn backward_to_rref(
    ab: &mut Matrix,
    pivots: &[Pivot],
    tol: f64,
    mut rec: Option<&mut StepRecorder>,
) {
    for &Pivot { row: r, col: c } in pivots.iter().rev() {
        let pv = ab[(r, c)];
        if is_close(pv, 0.0, tol) {
            continue;
        }
        if !is_close(pv, 1.0, tol) {
            for j in c..ab.ncols() {
                ab[(r, j)] /= pv;
            }
            normalize_neg_zero(ab);
            if let Some(rec) = rec.as_deref_mut() {
                let text = format!("R{} ← R{} / {}", r + 1, r + 1, format_number(pv));
                rec.push(
                    StepTag::Scale,
                    text.clone(),
                    Some(ab),
                    None,
                    Some(StepEvidence::Value {
                        value: pv,
                        pretty: format_number(pv),
                    }),
                );
                rec.narrate(text);
            }
        }
        for rr in 0..r {
            if is_close(ab[(rr, c)], 0.0, tol) {
                continue;
            }
            let factor = ab[(rr, c)];
            subtract_row(ab, rr, r, factor, c);
            log_row_op(rec.as_deref_mut(), ab, rr, r, factor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn partial_pivoting_takes_largest_and_first_on_ties() {
        let ab = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, -3.0, 0.0, 3.0, 0.0]);
        assert_eq!(select_pivot_row(&ab, 0, 0, Pivoting::Partial, 1e-12), Some(1));
        assert_eq!(select_pivot_row(&ab, 0, 0, Pivoting::None, 1e-12), Some(0));
        assert_eq!(select_pivot_row(&ab, 0, 1, Pivoting::Partial, 1e-12), None);
    }

    #[test]
    fn forward_elimination_logs_swap_pivot_and_row_ops() {
        let mut ab = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0]);
        let mut rec = StepRecorder::new();
        let pivots = forward_elimination(&mut ab, &mut rec, Pivoting::Partial, 1e-12);
        assert_eq!(pivots, vec![Pivot { row: 0, col: 0 }]);
        assert_eq!(ab.row(1).iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0, 0.0]);
        let ops: Vec<&str> = rec.states().iter().map(|s| s.operation.as_str()).collect();
        assert_eq!(
            ops,
            vec!["Swap rows: R1 <-> R2", "Pivot @ (1,1) = 2", "R2 ← R2 - (1/2)·R1"]
        );
    }

    #[test]
    fn backward_pass_reaches_rref() {
        let mut ab = DMatrix::from_row_slice(2, 3, &[2.0, 1.0, 3.0, 0.0, 2.5, 3.5]);
        let pivots = vec![Pivot { row: 0, col: 0 }, Pivot { row: 1, col: 1 }];
        let mut rec = StepRecorder::new();
        backward_to_rref(&mut ab, &pivots, 1e-12, Some(&mut rec));
        approx::assert_relative_eq!(ab[(0, 2)], 0.8, epsilon = 1e-12);
        approx::assert_relative_eq!(ab[(1, 2)], 1.4, epsilon = 1e-12);
        assert_eq!(ab[(0, 1)], 0.0);
        assert_eq!(rec.states()[0].operation, "R2 ← R2 / 5/2");
        // silent variant produces the same matrix
        let mut silent = DMatrix::from_row_slice(2, 3, &[2.0, 1.0, 3.0, 0.0, 2.5, 3.5]);
        backward_to_rref(&mut silent, &pivots, 1e-12, None);
        assert_eq!(silent, ab);
    }
}
