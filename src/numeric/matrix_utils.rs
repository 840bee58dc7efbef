//! Conversions between row vectors and `DMatrix`, shape helpers and signed zero cleanup.
use nalgebra::DMatrix;

use crate::errors::{EngineError, EngineResult};
use crate::numeric::TOL;

pub type Matrix = DMatrix<f64>;

pub fn shape(m: &Matrix) -> (usize, usize) {
    if m.is_empty() { (0, 0) } else { m.shape() }
}

/// Entries within tolerance of zero become exactly `0.0` (also removes `-0.0`).
pub fn normalize_neg_zero(m: &mut Matrix) {
    for v in m.iter_mut() {
        if v.abs() < TOL {
            *v = 0.0;
        }
    }
}

/// Owned copy with signed zeros normalized. Engines never mutate caller data.
pub fn clone_with(m: &Matrix) -> Matrix {
    let mut copy = m.clone();
    normalize_neg_zero(&mut copy);
    copy
}

/// Build a matrix from rows; rejects ragged input.
pub fn from_rows(rows: &[Vec<f64>]) -> EngineResult<Matrix> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        return Err(EngineError::validation(format!(
            "row {} has {} entries, expected {}",
            i + 1,
            row.len(),
            n_cols
        )));
    }
    if n_rows > 0 && n_cols == 0 {
        return Err(EngineError::validation("matrix rows must not be empty"));
    }
    Ok(DMatrix::from_fn(n_rows, n_cols, |i, j| rows[i][j]))
}

pub fn to_rows(m: &Matrix) -> Vec<Vec<f64>> {
    m.row_iter().map(|row| row.iter().copied().collect()).collect()
}

/// `[A | b]`. The number of rows of `A` must equal the length of `b`.
pub fn to_augmented(a: &[Vec<f64>], b: &[f64]) -> EngineResult<Matrix> {
    if a.len() != b.len() {
        return Err(EngineError::dimension(
            "augment",
            format!("A has {} rows but b has {} entries", a.len(), b.len()),
        ));
    }
    let a = from_rows(a)?;
    let (m, n) = shape(&a);
    Ok(DMatrix::from_fn(m, n + 1, |i, j| if j < n { a[(i, j)] } else { b[i] }))
}

/// Require a non-empty square matrix; returns its order.
pub fn require_square(m: &Matrix, operation: &str) -> EngineResult<usize> {
    let (rows, cols) = shape(m);
    if rows == 0 {
        return Err(EngineError::validation(format!("{operation}: matrix is empty")));
    }
    if rows != cols {
        return Err(EngineError::dimension(
            operation,
            format!("matrix must be square, got {rows}x{cols}"),
        ));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_rejected() {
        let err = from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn rows_roundtrip_keeps_order() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let m = from_rows(&rows).unwrap();
        assert_eq!(shape(&m), (2, 3));
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(to_rows(&m), rows);
    }

    #[test]
    fn augmented_requires_matching_rhs() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let ab = to_augmented(&a, &[3.0, 5.0]).unwrap();
        assert_eq!(shape(&ab), (2, 3));
        assert_eq!(ab[(1, 2)], 5.0);
        assert!(matches!(
            to_augmented(&a, &[1.0]),
            Err(EngineError::Dimension { .. })
        ));
    }

    #[test]
    fn signed_zero_cleanup() {
        let m = DMatrix::from_row_slice(1, 3, &[-0.0, 1e-14, -2.0]);
        let c = clone_with(&m);
        assert!(c[(0, 0)].is_sign_positive());
        assert_eq!(c[(0, 1)], 0.0);
        assert_eq!(c[(0, 2)], -2.0);
    }

    #[test]
    fn square_check() {
        let m = DMatrix::<f64>::zeros(2, 3);
        assert!(require_square(&m, "det").is_err());
        assert!(require_square(&DMatrix::<f64>::zeros(0, 0), "det").is_err());
        assert_eq!(require_square(&DMatrix::<f64>::identity(3, 3), "det").unwrap(), 3);
    }
}
