//! Parametric description of the solution set read off an RREF matrix.
//!
//! Free columns become parameters `s1, s2, ...` in column order. A basic
//! variable equals its pivot row RHS minus the free columns weighted by that
//! row's entries.
use serde::Serialize;

use crate::numeric::{Matrix, format_number, is_close, shape};
use crate::reduce::analysis::{Analysis, is_rref_pivot};

/// `x` followed by the subscript digits of `i`: `xsub(12) == "x₁₂"`.
pub fn xsub(i: usize) -> String {
    let digits: String = i
        .to_string()
        .chars()
        .filter_map(|d| d.to_digit(10))
        .filter_map(|d| char::from_u32(0x2080 + d))
        .collect();
    format!("x{digits}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParametricTerm {
    pub param: String,
    pub coef: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParametricVar {
    pub col: usize,
    pub constant: String,
    pub terms: Vec<ParametricTerm>,
    pub pretty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ParametricForm {
    pub params: Vec<String>,
    pub vars: Vec<ParametricVar>,
    pub pretty: Vec<String>,
}

pub fn parametric_from_rref(
    rref: &Matrix,
    analysis: &Analysis,
    param_base: &str,
    tol: f64,
) -> ParametricForm {
    let (m, n1) = shape(rref);
    let n = n1.saturating_sub(1);
    let params: Vec<String> = (1..=analysis.free_vars.len())
        .map(|k| format!("{param_base}{k}"))
        .collect();
    let param_of_col = |col: usize| {
        analysis
            .free_vars
            .iter()
            .position(|&c| c == col)
            .map(|k| &params[k])
    };

    let mut vars = Vec::with_capacity(n);
    for col in 0..n {
        if let Some(pname) = param_of_col(col) {
            vars.push(ParametricVar {
                col,
                constant: "0".to_string(),
                terms: vec![ParametricTerm {
                    param: pname.clone(),
                    coef: 1.0,
                }],
                pretty: format!("{} = {}", xsub(col + 1), pname),
            });
            continue;
        }
        let Some(r) = (0..m).find(|&r| is_rref_pivot(rref, r, col, tol)) else {
            vars.push(ParametricVar {
                col,
                constant: "0".to_string(),
                terms: Vec::new(),
                pretty: format!("{} = 0", xsub(col + 1)),
            });
            continue;
        };
        let constant = rref[(r, n)];
        let mut pieces = vec![format_number(constant)];
        let mut terms = Vec::new();
        for j in (0..n).filter(|&j| j != col) {
            let a = rref[(r, j)];
            if is_close(a, 0.0, tol) {
                continue;
            }
            let sign = if a > 0.0 { "-" } else { "+" };
            let mag = a.abs();
            let name = param_of_col(j).cloned().unwrap_or_else(|| xsub(j + 1));
            if (mag - 1.0).abs() <= tol {
                pieces.push(format!("{sign} {name}"));
            } else {
                pieces.push(format!("{sign} {} {name}", format_number(mag)));
            }
            terms.push(ParametricTerm {
                param: name,
                coef: -a,
            });
        }
        vars.push(ParametricVar {
            col,
            constant: format_number(constant),
            terms,
            pretty: format!("{} = {}", xsub(col + 1), pieces.join(" ")),
        });
    }
    let pretty = vars.iter().map(|v| v.pretty.clone()).collect();
    ParametricForm {
        params,
        vars,
        pretty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::analysis::analyze_rref;
    use nalgebra::DMatrix;

    #[test]
    fn subscripts() {
        assert_eq!(xsub(1), "x₁");
        assert_eq!(xsub(10), "x₁₀");
    }

    #[test]
    fn one_free_variable() {
        // x1 + 2 x3 = 5, x2 - x3 = 4
        let r = DMatrix::from_row_slice(2, 4, &[1.0, 0.0, 2.0, 5.0, 0.0, 1.0, -1.0, 4.0]);
        let a = analyze_rref(&r, 1e-12);
        let p = parametric_from_rref(&r, &a, "s", 1e-12);
        assert_eq!(p.params, vec!["s1"]);
        assert_eq!(p.pretty, vec!["x₁ = 5 - 2 s1", "x₂ = 4 + s1", "x₃ = s1"]);
        assert_eq!(p.vars[0].terms, vec![ParametricTerm { param: "s1".into(), coef: -2.0 }]);
        assert_eq!(p.vars[1].terms[0].coef, 1.0);
    }

    #[test]
    fn unique_solution_has_no_parameters() {
        let r = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 0.8, 0.0, 1.0, 1.4]);
        let a = analyze_rref(&r, 1e-12);
        let p = parametric_from_rref(&r, &a, "s", 1e-12);
        assert!(p.params.is_empty());
        assert_eq!(p.pretty, vec!["x₁ = 4/5", "x₂ = 7/5"]);
    }
}
