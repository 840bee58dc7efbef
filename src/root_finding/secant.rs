use log::debug;
use serde::Serialize;
use tabled::Tabled;

use crate::errors::{EngineError, EngineResult};
use crate::root_finding::common::{
    IterationDetail, IterationsEstimate, RootFindingConfig, RootFindingMethod, RootFindingResult,
    conclusion, eval_at,
};
use crate::symbolic::expression::Expression;

const METHOD: RootFindingMethod = RootFindingMethod::Secant;

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct SecantRow {
    pub iteration: usize,
    pub x_prev: f64,
    pub x_curr: f64,
    pub x_next: f64,
    pub f_prev: f64,
    pub f_curr: f64,
    pub f_next: f64,
    #[serde(rename = "Ea")]
    #[tabled(rename = "Ea")]
    pub ea: f64,
    #[serde(rename = "Ea_lt_E")]
    #[tabled(rename = "Ea < E")]
    pub ea_lt_tol: bool,
}

fn detail_lines(f_latex: &str, row: &SecantRow, tol: f64) -> Vec<String> {
    let SecantRow {
        iteration,
        x_prev,
        x_curr,
        x_next,
        f_prev,
        f_curr,
        f_next,
        ea,
        ea_lt_tol,
    } = *row;
    let mut lines = vec![
        format!(r"\textbf{{Iteration {iteration}:}}"),
        format!(r"x_{{k-1}} = {x_prev:.6},\quad x_k = {x_curr:.6}"),
        format!(r"f(x_{{k-1}}) = {f_latex}\big|_{{x={x_prev:.4}}} = {f_prev:+.6}"),
        format!(r"f(x_k) = {f_latex}\big|_{{x={x_curr:.4}}} = {f_curr:+.6}"),
        format!(
            r"x_{{k+1}} = x_k - \frac{{f(x_k)(x_k - x_{{k-1}})}}{{f(x_k) - f(x_{{k-1}})}} = {x_curr:.6} - \frac{{({f_curr:+.6})({x_curr:.6} - {x_prev:.6})}}{{({f_curr:+.6}) - ({f_prev:+.6})}} = {x_next:.6}"
        ),
        format!(r"f(x_{{k+1}}) = {f_next:+.6}"),
    ];
    if iteration == 1 {
        lines.push(r"E_a = 0".to_string());
    } else {
        let cmp = if ea_lt_tol { "<" } else { r"\ge" };
        lines.push(format!(
            r"E_a = |x_{{k+1}} - x_k| = {ea:.6} {cmp} {tol:e}"
        ));
    }
    lines
}

fn flat_secant(iteration: usize) -> EngineError {
    EngineError::degenerate(
        &METHOD.to_string(),
        Some(iteration),
        "f(x_k) - f(x_{k-1}) = 0, the secant formula divides by zero",
    )
}

/// Secant method from the seeds `x0`, `x1`.
///
/// The seeds must differ and have different function values; the same check
/// is repeated before every step. Stops like Newton-Raphson, on
/// `|x_{k+1} - x_k| < tol` from the second iteration.
pub fn secant<E: Expression>(
    f: &E,
    x0: f64,
    x1: f64,
    config: &RootFindingConfig,
) -> EngineResult<RootFindingResult<SecantRow>> {
    config.validate(METHOD)?;
    let tol = config.tolerance;
    let max_iter = config.cap(METHOD, 50);
    if x0 == x1 {
        return Err(EngineError::degenerate(
            &METHOD.to_string(),
            None,
            "the two initial points must be different",
        ));
    }
    let f_latex = f.to_latex();
    let (mut x_prev, mut x_curr) = (x0, x1);
    let mut f_prev = eval_at(f, x_prev, METHOD, 1)?;
    let mut f_curr = eval_at(f, x_curr, METHOD, 1)?;
    if f_curr == f_prev {
        return Err(EngineError::degenerate(
            &METHOD.to_string(),
            None,
            "f(x1) - f(x0) = 0, the initial secant slope is zero",
        ));
    }

    let mut table: Vec<SecantRow> = Vec::new();
    let mut details = Vec::new();
    let mut converged = false;

    for k in 1..=max_iter {
        let den = f_curr - f_prev;
        if den == 0.0 {
            return Err(flat_secant(k));
        }
        let x_next = x_curr - f_curr * (x_curr - x_prev) / den;
        let f_next = eval_at(f, x_next, METHOD, k)?;
        let (ea, ea_lt_tol) = if k == 1 {
            (0.0, false)
        } else {
            let ea = (x_next - x_curr).abs();
            (ea, ea < tol)
        };
        let row = SecantRow {
            iteration: k,
            x_prev,
            x_curr,
            x_next,
            f_prev,
            f_curr,
            f_next,
            ea,
            ea_lt_tol,
        };
        debug!("secant k={k} x_next={x_next} Ea={ea}");
        details.push(IterationDetail {
            iteration: k,
            lines: detail_lines(&f_latex, &row, tol),
        });
        table.push(row);
        if ea_lt_tol {
            converged = true;
            break;
        }
        (x_prev, x_curr) = (x_curr, x_next);
        (f_prev, f_curr) = (f_curr, f_next);
    }

    let last = table.last().ok_or_else(|| {
        EngineError::degenerate(&METHOD.to_string(), None, "no iteration was performed")
    })?;
    let root = last.x_next;
    let last_error = last.ea;
    let iterations = table.len();
    let formula_substitution = if iterations > 1 {
        format!(
            r"E_a = \left|{:.6} - {:.6}\right| = {last_error:.6}",
            last.x_next, last.x_curr
        )
    } else {
        r"E_a = 0".to_string()
    };
    let iterations_estimate = IterationsEstimate {
        formula_general: r"x_{k+1} = x_k - \frac{f(x_k)(x_k - x_{k-1})}{f(x_k) - f(x_{k-1})},\quad E_a = |x_{k+1} - x_k|"
            .to_string(),
        formula_substitution,
        formula_numeric: format!(r"E_a \approx {last_error:.6}"),
        tolerance: tol,
        estimate: None,
        n_min: None,
        last_error: Some(last_error),
        iterations,
    };
    Ok(RootFindingResult {
        method: METHOD,
        iterations_estimate,
        table,
        details,
        conclusion: conclusion(
            METHOD,
            root,
            iterations,
            "|x_{k+1} - x_k| < tolerance",
            converged,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::expression::BoundExpression;
    use approx::assert_relative_eq;

    #[test]
    fn converges_from_one_and_two() {
        let f = BoundExpression::parse("x^2 - 2", "x").unwrap();
        let res = secant(&f, 1.0, 2.0, &RootFindingConfig::new(1e-8)).unwrap();
        assert!(res.conclusion.converged);
        assert_relative_eq!(res.root(), 2f64.sqrt(), epsilon = 1e-10);
        // 2 - 2·(2 - 1)/(2 - (-1)) = 4/3
        assert_relative_eq!(res.table[0].x_next, 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn equal_function_values_are_rejected() {
        let f = BoundExpression::parse("x^2 - 2", "x").unwrap();
        let err = secant(&f, -1.0, 1.0, &RootFindingConfig::new(1e-8)).unwrap_err();
        assert_eq!(err.code(), "DEGENERATE_METHOD");
        assert!(err.to_string().contains("initial secant slope"));
        let err = secant(&f, 1.0, 1.0, &RootFindingConfig::new(1e-8)).unwrap_err();
        assert!(err.to_string().contains("must be different"));
    }

    #[test]
    fn flat_step_names_the_iteration() {
        assert!(flat_secant(3).to_string().ends_with("(iteration 3)"));
    }

    #[test]
    fn flat_step_is_checked_every_iteration() {
        // x0 = 1, x1 = -2 gives x2 = 2, and f(2) = f(-2)
        let f = BoundExpression::parse("x^2", "x").unwrap();
        let err = secant(&f, 1.0, -2.0, &RootFindingConfig::new(1e-8)).unwrap_err();
        assert_eq!(err, flat_secant(2));
        assert_eq!(
            err,
            EngineError::DegenerateMethod {
                method: "secant".to_string(),
                iteration: Some(2),
                reason: "f(x_k) - f(x_{k-1}) = 0, the secant formula divides by zero".to_string(),
            }
        );
    }

    #[test]
    fn cap_is_not_an_error() {
        // no real root: the iterates cycle 0, -0.5, 2, -4/3 ...
        let f = BoundExpression::parse("x^2 + 1", "x").unwrap();
        let cfg = RootFindingConfig::new(1e-12).with_max_iterations(4);
        let res = secant(&f, 0.5, 2.0, &cfg).unwrap();
        assert_eq!(res.conclusion.iterations, 4);
        assert_eq!(res.table.len(), 4);
        assert!(!res.conclusion.converged);
        assert_relative_eq!(res.table[2].x_next, 2.0, epsilon = 1e-12);
    }
}
