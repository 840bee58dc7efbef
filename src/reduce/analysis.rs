//! Rank, pivot columns and consistency of a reduced augmented matrix.
use log::warn;
use serde::Serialize;
use strum_macros::Display;

use crate::numeric::{Matrix, is_close, shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pivot {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    Inconsistent,
    Unique,
    Infinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Dependence {
    Independent,
    Dependent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// equations
    pub m: usize,
    /// unknowns
    pub n: usize,
    pub rank: usize,
    pub pivots: Vec<Pivot>,
    pub basic_vars: Vec<usize>,
    pub free_vars: Vec<usize>,
    pub inconsistent_rows: Vec<usize>,
    pub status: SolutionStatus,
}

impl Analysis {
    fn from_pivots(ab: &Matrix, pivots: Vec<Pivot>, tol: f64) -> Self {
        let (m, n1) = shape(ab);
        let n = n1.saturating_sub(1);
        let mut pivot_cols = vec![false; n];
        for p in &pivots {
            pivot_cols[p.col] = true;
        }
        // 0 ... 0 | d with d != 0
        let inconsistent_rows: Vec<usize> = (0..m)
            .filter(|&r| {
                (0..n).all(|c| is_close(ab[(r, c)], 0.0, tol)) && !is_close(ab[(r, n)], 0.0, tol)
            })
            .collect();
        let rank = pivots.len();
        let basic_vars: Vec<usize> = (0..n).filter(|&c| pivot_cols[c]).collect();
        let free_vars: Vec<usize> = (0..n).filter(|&c| !pivot_cols[c]).collect();
        let status = if !inconsistent_rows.is_empty() {
            warn!(
                "system is inconsistent: rank(A) = {rank} < rank(A|b), rows {:?}",
                inconsistent_rows.iter().map(|r| r + 1).collect::<Vec<_>>()
            );
            SolutionStatus::Inconsistent
        } else if rank == n {
            SolutionStatus::Unique
        } else {
            SolutionStatus::Infinite
        };
        Self {
            m,
            n,
            rank,
            pivots,
            basic_vars,
            free_vars,
            inconsistent_rows,
            status,
        }
    }

    pub fn rank_ab(&self) -> usize {
        self.rank + usize::from(!self.inconsistent_rows.is_empty())
    }

    pub fn dependence(&self) -> Dependence {
        if self.rank == self.n {
            Dependence::Independent
        } else {
            Dependence::Dependent
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.status != SolutionStatus::Inconsistent
    }
}

/// Pivot of each row of an upper form is its first non-zero coefficient.
pub fn analyze_from_upper(u: &Matrix, tol: f64) -> Analysis {
    let (m, n1) = shape(u);
    let n = n1.saturating_sub(1);
    let pivots = (0..m)
        .filter_map(|r| {
            (0..n)
                .find(|&c| !is_close(u[(r, c)], 0.0, tol))
                .map(|c| Pivot { row: r, col: c })
        })
        .collect();
    Analysis::from_pivots(u, pivots, tol)
}

/// In RREF a pivot is a 1 with zeros to its left and everywhere else in its column.
pub fn analyze_rref(ab: &Matrix, tol: f64) -> Analysis {
    let (m, n1) = shape(ab);
    let n = n1.saturating_sub(1);
    let pivots = (0..m)
        .filter_map(|r| {
            (0..n)
                .find(|&c| is_rref_pivot(ab, r, c, tol))
                .map(|c| Pivot { row: r, col: c })
        })
        .collect();
    Analysis::from_pivots(ab, pivots, tol)
}

pub(crate) fn is_rref_pivot(ab: &Matrix, r: usize, c: usize, tol: f64) -> bool {
    is_close(ab[(r, c)], 1.0, tol)
        && (0..c).all(|k| is_close(ab[(r, k)], 0.0, tol))
        && (0..ab.nrows())
            .filter(|&k| k != r)
            .all(|k| is_close(ab[(k, c)], 0.0, tol))
}

/// Back substitution on an upper form with every free variable set to 0.
pub fn back_substitution_particular(u: &Matrix, pivots: &[Pivot], tol: f64) -> Vec<f64> {
    let n = u.ncols().saturating_sub(1);
    let mut x = vec![0.0; n];
    let mut sorted = pivots.to_vec();
    sorted.sort_by_key(|p| p.row);
    for &Pivot { row: r, col: c } in sorted.iter().rev() {
        let s = ((c + 1)..n).fold(u[(r, n)], |acc, j| acc - u[(r, j)] * x[j]);
        let pv = u[(r, c)];
        x[c] = if is_close(pv, 0.0, tol) { 0.0 } else { s / pv };
    }
    x
}

/// Free variables at 0; basic variables read from the RHS of their pivot row.
pub fn particular_solution_from_rref(ab: &Matrix, analysis: &Analysis) -> Option<Vec<f64>> {
    if !analysis.is_consistent() {
        return None;
    }
    let n = analysis.n;
    let mut x = vec![0.0; n];
    for p in &analysis.pivots {
        x[p.col] = ab[(p.row, n)];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn upper_form_with_free_column() {
        // x + 2y = 3, 0 = 0
        let u = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
        let a = analyze_from_upper(&u, 1e-12);
        assert_eq!(a.rank, 1);
        assert_eq!(a.basic_vars, vec![0]);
        assert_eq!(a.free_vars, vec![1]);
        assert_eq!(a.status, SolutionStatus::Infinite);
        assert_eq!(a.dependence(), Dependence::Dependent);
        assert_eq!(back_substitution_particular(&u, &a.pivots, 1e-12), vec![3.0, 0.0]);
    }

    #[test]
    fn inconsistent_row_raises_rank_of_augmented() {
        let u = DMatrix::from_row_slice(2, 3, &[1.0, 1.0, 1.0, 0.0, 0.0, 1.0]);
        let a = analyze_from_upper(&u, 1e-12);
        assert_eq!(a.status, SolutionStatus::Inconsistent);
        assert_eq!(a.inconsistent_rows, vec![1]);
        assert_eq!(a.rank_ab(), 2);
        assert!(particular_solution_from_rref(&u, &a).is_none());
    }

    #[test]
    fn rref_pivots_need_clean_columns() {
        let r = DMatrix::from_row_slice(2, 4, &[1.0, 0.0, 2.0, 5.0, 0.0, 1.0, -1.0, 4.0]);
        let a = analyze_rref(&r, 1e-12);
        assert_eq!(a.pivots, vec![Pivot { row: 0, col: 0 }, Pivot { row: 1, col: 1 }]);
        assert_eq!(a.free_vars, vec![2]);
        assert_eq!(particular_solution_from_rref(&r, &a), Some(vec![5.0, 4.0, 0.0]));
        assert_eq!(SolutionStatus::Infinite.to_string(), "infinite");
    }
}
