use log::warn;
use serde::Serialize;

use crate::determinants::cofactor::cofactor_value;
use crate::numeric::{Matrix, TOL, format_number, is_close, is_zero};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZeroRowOrCol {
    pub applies: bool,
    pub message: String,
    pub zero_row: bool,
    pub zero_col: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EqualRowsOrCols {
    pub applies: bool,
    pub message: String,
    pub equal_rows: bool,
    pub equal_cols: bool,
}

/// Rows 0 and 1 swapped and the determinant recomputed. `applies` is `None`
/// for a 1x1 matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapRowsSign {
    pub applies: Option<bool>,
    pub message: String,
    pub det_original: String,
    pub det_after_swap: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarMultipleColumn {
    pub applies: bool,
    pub message: String,
    /// first pair `(i, j)` with `col_j = k · col_i`
    pub columns: Option<(usize, usize)>,
    pub factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consistency {
    pub inferred_zero: bool,
    pub det_is_zero: bool,
    pub consistent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeterminantProperties {
    pub zero_row_or_col: ZeroRowOrCol,
    pub equal_rows_or_cols: EqualRowsOrCols,
    pub swap_rows_sign: SwapRowsSign,
    pub scalar_multiple_column: ScalarMultipleColumn,
    pub consistency: Consistency,
}

fn has_zero_row(a: &Matrix) -> bool {
    a.row_iter().any(|row| row.iter().all(|&x| is_zero(x)))
}

fn has_equal_rows(a: &Matrix) -> bool {
    let m = a.nrows();
    (0..m).any(|i| {
        (i + 1..m).any(|j| {
            a.row(i)
                .iter()
                .zip(a.row(j).iter())
                .all(|(&x, &y)| is_close(x, y, TOL))
        })
    })
}

/// `k` with `col_j = k · col_i`, if it exists. Rows where `col_i` is zero must
/// also be zero in `col_j`; an all-zero `col_i` never qualifies.
fn column_ratio(a: &Matrix, i: usize, j: usize) -> Option<f64> {
    let mut k: Option<f64> = None;
    for r in 0..a.nrows() {
        let (x, y) = (a[(r, i)], a[(r, j)]);
        if is_zero(x) {
            if !is_zero(y) {
                return None;
            }
            continue;
        }
        let ratio = y / x;
        match k {
            None => k = Some(ratio),
            Some(prev) if !is_close(prev, ratio, TOL) => return None,
            Some(_) => {}
        }
    }
    k
}

fn scalar_multiple_pair(a: &Matrix) -> Option<(usize, usize, f64)> {
    let n = a.ncols();
    for i in 0..n {
        for j in i + 1..n {
            if let Some(k) = column_ratio(a, i, j) {
                return Some((i, j, k));
            }
        }
    }
    None
}

/// Check the textbook properties that force or predict a determinant value
/// and whether `det` agrees with them.
pub fn validate_determinant_properties(a: &Matrix, det: f64) -> DeterminantProperties {
    let zero_row = has_zero_row(a);
    let zero_col = has_zero_row(&a.transpose());
    let equal_rows = has_equal_rows(a);
    let equal_cols = has_equal_rows(&a.transpose());

    let (swap_applies, det_after_swap) = if a.nrows() > 1 {
        let mut swapped = a.clone();
        swapped.swap_rows(0, 1);
        match cofactor_value(&swapped) {
            Ok(d) => (Some(is_close(d, -det, TOL)), Some(format_number(d))),
            Err(_) => (Some(false), None),
        }
    } else {
        (None, None)
    };

    let pair = scalar_multiple_pair(a);
    let inferred_zero = zero_row || zero_col || equal_rows || equal_cols || pair.is_some();
    let det_is_zero = is_zero(det);
    let consistent = !inferred_zero || det_is_zero;
    if !consistent {
        warn!(
            "det = {} although a property implies a zero determinant",
            format_number(det)
        );
    }

    DeterminantProperties {
        zero_row_or_col: ZeroRowOrCol {
            applies: zero_row || zero_col,
            message: "If a row or a column is all zeros, the determinant is 0.".to_string(),
            zero_row,
            zero_col,
        },
        equal_rows_or_cols: EqualRowsOrCols {
            applies: equal_rows || equal_cols,
            message: "If two rows or two columns are equal, the determinant is 0.".to_string(),
            equal_rows,
            equal_cols,
        },
        swap_rows_sign: SwapRowsSign {
            applies: swap_applies,
            message: "Swapping two rows changes the sign of the determinant.".to_string(),
            det_original: format_number(det),
            det_after_swap,
        },
        scalar_multiple_column: ScalarMultipleColumn {
            applies: pair.is_some(),
            message: "If a column is a scalar multiple of another, the determinant is 0."
                .to_string(),
            columns: pair.map(|(i, j, _)| (i, j)),
            factor: pair.map(|(_, _, k)| k),
        },
        consistency: Consistency {
            inferred_zero,
            det_is_zero,
            consistent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn regular_matrix_has_no_zero_property() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let p = validate_determinant_properties(&a, -2.0);
        assert!(!p.zero_row_or_col.applies);
        assert!(!p.equal_rows_or_cols.applies);
        assert!(!p.scalar_multiple_column.applies);
        assert_eq!(p.swap_rows_sign.applies, Some(true));
        assert_eq!(p.swap_rows_sign.det_after_swap.as_deref(), Some("2"));
        assert!(p.consistency.consistent);
    }

    #[test]
    fn scalar_multiple_columns_are_found() {
        let a = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 1.0, 3.0, 6.0, 2.0]);
        let p = validate_determinant_properties(&a, 0.0);
        assert!(p.scalar_multiple_column.applies);
        assert_eq!(p.scalar_multiple_column.columns, Some((0, 1)));
        assert_eq!(p.scalar_multiple_column.factor, Some(2.0));
        assert!(p.consistency.inferred_zero && p.consistency.consistent);
    }

    #[test]
    fn zero_column_needs_matching_zeros() {
        // col 0 is zero where col 2 is not: no ratio exists
        let a = DMatrix::from_row_slice(2, 3, &[0.0, 1.0, 5.0, 0.0, 2.0, 0.0]);
        assert_eq!(column_ratio(&a, 0, 2), None);
        assert_eq!(column_ratio(&a, 0, 1), None);
        assert!(has_zero_row(&a.transpose()));
    }

    #[test]
    fn wrong_determinant_is_flagged_inconsistent() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let p = validate_determinant_properties(&a, 3.0);
        assert!(p.equal_rows_or_cols.equal_rows);
        assert!(!p.consistency.consistent);
    }

    #[test]
    fn one_by_one_has_no_swap() {
        let a = DMatrix::from_row_slice(1, 1, &[4.0]);
        let p = validate_determinant_properties(&a, 4.0);
        assert_eq!(p.swap_rows_sign.applies, None);
        assert_eq!(p.swap_rows_sign.det_after_swap, None);
    }
}
