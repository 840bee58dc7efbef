//! Inverse by Gauss-Jordan elimination on `[A | I]`.
//!
//! The log holds a snapshot after every swap, scale and elimination sub-step,
//! a `pivot` state once a column is finished, and the inverse itself as the
//! `result` state. Narration carries the row operations as text.
use log::{info, warn};
use nalgebra::DMatrix;

use crate::config::Pivoting;
use crate::errors::{EngineError, EngineResult};
use crate::matrix_ops::gaussian_determinant::gaussian_determinant;
use crate::numeric::{Matrix, format_number, normalize_neg_zero, require_square};
use crate::reduce::elimination::{select_pivot_row, subtract_row};
use crate::steps::{StepEvidence, StepLog, StepRecorder, StepTag};

pub fn inverse(a: &Matrix, tol: f64) -> EngineResult<(Matrix, StepLog)> {
    let n = require_square(a, "inverse")?;
    let det = gaussian_determinant(a, tol)?;
    if det.abs() <= tol {
        warn!("inverse requested for a singular {n}x{n} matrix");
        return Err(EngineError::SingularMatrix { determinant: det });
    }

    let mut m = DMatrix::from_fn(n, 2 * n, |i, j| {
        if j < n {
            a[(i, j)]
        } else if j - n == i {
            1.0
        } else {
            0.0
        }
    });
    normalize_neg_zero(&mut m);
    let mut rec = StepRecorder::new();
    rec.push(
        StepTag::Initial,
        "[A | I]",
        Some(&m),
        Some(format!("augmented with the identity ({n}x{})", 2 * n)),
        None,
    );

    for col in 0..n {
        let row = col;
        let sel = select_pivot_row(&m, row, col, Pivoting::Partial, tol)
            .ok_or(EngineError::SingularMatrix { determinant: det })?;
        if sel != row {
            m.swap_rows(row, sel);
            let text = format!("Swap rows: R{} <-> R{}", row + 1, sel + 1);
            rec.push(
                StepTag::SwapRows,
                text.clone(),
                Some(&m),
                None,
                Some(StepEvidence::Swap { i: row, j: sel }),
            );
            rec.narrate(text);
        }

        let pivot = m[(row, col)];
        if (pivot - 1.0).abs() > tol {
            for j in col..2 * n {
                m[(row, j)] /= pivot;
            }
            normalize_neg_zero(&mut m);
            let text = format!("R{} ← R{} / {}", row + 1, row + 1, format_number(pivot));
            rec.push(StepTag::Scale, text.clone(), Some(&m), None, None);
            rec.narrate(text);
        }

        for r in 0..n {
            if r == row {
                continue;
            }
            let factor = m[(r, col)];
            if factor.abs() <= tol {
                continue;
            }
            subtract_row(&mut m, r, row, factor, col);
            let text = format!(
                "R{} ← R{} - ({})·R{}",
                r + 1,
                r + 1,
                format_number(factor),
                row + 1
            );
            rec.push(
                StepTag::Elimination,
                text.clone(),
                Some(&m),
                None,
                Some(StepEvidence::RowOp {
                    target: r,
                    source: row,
                    factor,
                }),
            );
            rec.narrate(text);
        }

        rec.push(
            StepTag::Pivot,
            format!("Column {} reduced", col + 1),
            Some(&m),
            None,
            Some(StepEvidence::Pivot {
                row,
                col,
                value: pivot,
                value_pretty: format_number(pivot),
            }),
        );
    }

    let inv = m.columns(n, n).into_owned();
    rec.push(StepTag::Result, "A⁻¹", Some(&inv), None, None);
    info!("inverse of a {n}x{n} matrix, det = {}", format_number(det));
    Ok((inv, rec.finish()))
}
