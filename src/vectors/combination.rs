//! Is `b` a linear combination of the columns of `A`?
//!
//! The question is the vector equation `x1·a1 + ... + xn·an = b`, i.e. the
//! system `A x = b`. Gauss-Jordan answers it; a particular solution, when there
//! is one, is multiplied back to confirm `A x = b`.
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::EngineOptions;
use crate::errors::EngineResult;
use crate::numeric::{format_number, is_close, matrix_as_fraction};
use crate::reduce::{LinearSystem, RowReductionResult, SolutionStatus, gauss_jordan_solve};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearCombinationRequest {
    pub a: Vec<Vec<f64>>,
    pub b: Vec<f64>,
    #[serde(default)]
    pub options: EngineOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationInput {
    pub a: Vec<Vec<f64>>,
    pub b: Vec<f64>,
    pub a_pretty: Vec<Vec<String>>,
    pub b_pretty: Vec<String>,
}

/// `A·x_part` against `b`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationCheck {
    pub ax: Vec<f64>,
    pub ax_pretty: Option<Vec<String>>,
    pub b_pretty: Vec<String>,
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationVerdict {
    pub is_linear_combination: bool,
    pub solution_type: SolutionStatus,
    pub coefficients_particular: Option<Vec<f64>>,
    pub coefficients_particular_pretty: Option<Vec<String>>,
    pub columns_statement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearCombinationResult {
    pub input: CombinationInput,
    pub gauss_jordan: RowReductionResult,
    pub check: CombinationCheck,
    pub result: CombinationVerdict,
}

fn pretty_all(v: &[f64]) -> Vec<String> {
    v.iter().map(|&x| format_number(x)).collect()
}

pub fn linear_combination(
    a: &[Vec<f64>],
    b: &[f64],
    options: &EngineOptions,
) -> EngineResult<LinearCombinationResult> {
    let system = LinearSystem::new(a, b)?;
    let gj = gauss_jordan_solve(&system, options)?;
    let tol = options.tolerance;
    let sol_type = gj.summary.solution_type;
    let x_part = gj.particular().map(<[f64]>::to_vec);

    let (ax, ok) = match &x_part {
        Some(x) => {
            let coeffs = system.coefficients();
            let ax: Vec<f64> = coeffs
                .row_iter()
                .map(|row| row.iter().zip(x).map(|(aij, xj)| aij * xj).sum())
                .collect();
            let ok = ax.len() == b.len() && ax.iter().zip(b).all(|(&l, &r)| is_close(l, r, tol));
            (ax, ok)
        }
        None => (Vec::new(), false),
    };

    let is_lin_comb = matches!(sol_type, SolutionStatus::Unique | SolutionStatus::Infinite);
    let columns_statement = if is_lin_comb {
        "b is a linear combination of the columns of A"
    } else {
        "b is NOT a linear combination of the columns of A"
    }
    .to_string();
    info!("linear combination: {sol_type}, check ok = {ok}");

    Ok(LinearCombinationResult {
        input: CombinationInput {
            a: a.to_vec(),
            b: b.to_vec(),
            a_pretty: matrix_as_fraction(&system.coefficients()),
            b_pretty: pretty_all(b),
        },
        check: CombinationCheck {
            ax_pretty: (!ax.is_empty()).then(|| pretty_all(&ax)),
            ax,
            b_pretty: pretty_all(b),
            ok,
        },
        result: CombinationVerdict {
            is_linear_combination: is_lin_comb,
            solution_type: sol_type,
            coefficients_particular_pretty: x_part.as_deref().map(pretty_all),
            coefficients_particular: x_part,
            columns_statement,
        },
        gauss_jordan: gj,
    })
}

pub fn linear_combination_api(
    request: &LinearCombinationRequest,
) -> EngineResult<LinearCombinationResult> {
    linear_combination(&request.a, &request.b, &request.options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unique_coefficients_are_checked() {
        let a = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let res = linear_combination(&a, &[5.0, 6.0], &EngineOptions::default()).unwrap();
        assert!(res.result.is_linear_combination);
        assert_eq!(res.result.solution_type, SolutionStatus::Unique);
        let x = res.result.coefficients_particular.as_ref().unwrap();
        assert_relative_eq!(x[0], -4.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 4.5, epsilon = 1e-9);
        assert!(res.check.ok);
        assert_eq!(res.check.ax_pretty.as_ref().unwrap(), &vec!["5", "6"]);
        assert_eq!(
            res.result.coefficients_particular_pretty.as_ref().unwrap(),
            &vec!["-4", "9/2"]
        );
    }

    #[test]
    fn dependent_columns_still_span_b() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let res = linear_combination(&a, &[3.0, 6.0], &EngineOptions::default()).unwrap();
        assert_eq!(res.result.solution_type, SolutionStatus::Infinite);
        assert!(res.result.is_linear_combination);
        assert!(res.check.ok);
    }

    #[test]
    fn outside_the_span() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let res = linear_combination(&a, &[3.0, 7.0], &EngineOptions::default()).unwrap();
        assert_eq!(res.result.solution_type, SolutionStatus::Inconsistent);
        assert!(!res.result.is_linear_combination);
        assert!(!res.check.ok);
        assert!(res.check.ax_pretty.is_none());
        assert!(res.result.columns_statement.contains("NOT"));
    }

    #[test]
    fn shape_errors_surface() {
        let a = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        assert!(linear_combination(&a, &[1.0], &EngineOptions::default()).is_err());
    }
}
