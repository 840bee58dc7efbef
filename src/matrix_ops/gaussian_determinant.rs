use crate::errors::EngineResult;
use crate::numeric::{Matrix, is_close, normalize_neg_zero, require_square};
use crate::reduce::elimination::subtract_row;

/// Determinant by Gauss-Jordan elimination with partial pivoting.
///
/// The product of the pivots, negated once per row swap. A column with no
/// usable pivot is skipped; the result is clamped to 0 within `tol`.
pub fn gaussian_determinant(a: &Matrix, tol: f64) -> EngineResult<f64> {
    let n = require_square(a, "determinant")?;
    let mut m = a.clone();
    let mut det = 1.0;
    let mut swaps = 0usize;
    let mut row = 0;
    for col in 0..n {
        if row >= n {
            break;
        }
        let (sel, best) = (row..n)
            .map(|r| (r, m[(r, col)].abs()))
            .fold((row, -1.0), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
        if best <= tol {
            continue;
        }
        if sel != row {
            m.swap_rows(row, sel);
            swaps += 1;
        }
        let pivot = m[(row, col)];
        det *= pivot;
        if !is_close(pivot, 1.0, tol) {
            for j in col..n {
                m[(row, j)] /= pivot;
            }
            normalize_neg_zero(&mut m);
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
        }
        row += 1;
    }
    // a skipped column leaves fewer than n pivots: the matrix is singular
    if row < n {
        return Ok(0.0);
    }
    if swaps % 2 == 1 {
        det = -det;
    }
    Ok(if det.abs() <= tol { 0.0 } else { det })
}
