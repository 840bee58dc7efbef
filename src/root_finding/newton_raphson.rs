use log::debug;
use serde::Serialize;
use tabled::Tabled;

use crate::errors::{EngineError, EngineResult};
use crate::root_finding::common::{
    IterationDetail, IterationsEstimate, RootFindingConfig, RootFindingMethod, RootFindingResult,
    conclusion, eval_at, substitution,
};
use crate::symbolic::expression::Expression;

const METHOD: RootFindingMethod = RootFindingMethod::NewtonRaphson;

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct NewtonRow {
    pub iteration: usize,
    pub xk: f64,
    pub fxk: f64,
    pub fprimexk: f64,
    pub x_next: f64,
    /// absolute error |x_{k+1} - x_k|, 0 on the first iteration
    #[serde(rename = "Ea")]
    #[tabled(rename = "Ea")]
    pub ea: f64,
    #[serde(rename = "Ea_lt_E")]
    #[tabled(rename = "Ea < E")]
    pub ea_lt_tol: bool,
}

fn detail_lines(f_latex: &str, df_latex: &str, row: &NewtonRow, tol: f64) -> Vec<String> {
    let NewtonRow {
        iteration,
        xk,
        fxk,
        fprimexk,
        x_next,
        ea,
        ea_lt_tol,
    } = *row;
    let mut lines = vec![
        format!(r"\textbf{{Iteration {iteration}:}}"),
        format!(r"x_k = {xk:.6}"),
        substitution("f(x_k)", &format!("{xk:.6}"), f_latex, xk, fxk),
        format!(r"f'(x_k) = {df_latex}\big|_{{x={xk:.4}}} = {fprimexk:+.6}"),
        format!(
            r"x_{{k+1}} = x_k - \frac{{f(x_k)}}{{f'(x_k)}} = {xk:.6} - \frac{{{fxk:+.6}}}{{{fprimexk:+.6}}} = {x_next:.6}"
        ),
    ];
    if iteration == 1 {
        lines.push(r"E_a = 0".to_string());
    } else {
        let cmp = if ea_lt_tol { "<" } else { r"\ge" };
        lines.push(format!(
            r"E_a = |x_{{k+1}} - x_k| = |{x_next:.6} - {xk:.6}| = {ea:.6} {cmp} {tol:e}"
        ));
    }
    lines
}

/// Newton-Raphson from `x0`.
///
/// The derivative is taken symbolically once. The loop stops when
/// `|x_{k+1} - x_k| < tol`, which is never checked on the first iteration.
pub fn newton_raphson<E: Expression>(
    f: &E,
    x0: f64,
    config: &RootFindingConfig,
) -> EngineResult<RootFindingResult<NewtonRow>> {
    config.validate(METHOD)?;
    let tol = config.tolerance;
    let max_iter = config.cap(METHOD, 50);
    let df = f.derivative();
    if df.is_identically_zero() {
        return Err(EngineError::degenerate(
            &METHOD.to_string(),
            None,
            "the derivative is identically zero, f is constant",
        ));
    }
    let f_latex = f.to_latex();
    let df_latex = df.to_latex();

    let mut table: Vec<NewtonRow> = Vec::new();
    let mut details = Vec::new();
    let mut xk = x0;
    let mut converged = false;

    for k in 1..=max_iter {
        let fxk = eval_at(f, xk, METHOD, k)?;
        let fprimexk = eval_at(&df, xk, METHOD, k)?;
        if fprimexk == 0.0 {
            return Err(EngineError::degenerate(
                &METHOD.to_string(),
                Some(k),
                format!("f'(x_k) = 0 at x_k = {xk}"),
            ));
        }
        let x_next = xk - fxk / fprimexk;
        let (ea, ea_lt_tol) = if k == 1 {
            (0.0, false)
        } else {
            let ea = (x_next - xk).abs();
            (ea, ea < tol)
        };
        let row = NewtonRow {
            iteration: k,
            xk,
            fxk,
            fprimexk,
            x_next,
            ea,
            ea_lt_tol,
        };
        debug!("newton k={k} x_next={x_next} Ea={ea}");
        details.push(IterationDetail {
            iteration: k,
            lines: detail_lines(&f_latex, &df_latex, &row, tol),
        });
        table.push(row);
        if ea_lt_tol {
            converged = true;
            break;
        }
        xk = x_next;
    }

    let last = table.last().ok_or_else(|| {
        EngineError::degenerate(&METHOD.to_string(), None, "no iteration was performed")
    })?;
    let root = last.x_next;
    let last_error = last.ea;
    let iterations = table.len();
    let formula_substitution = match table.as_slice() {
        [.., prev, last] => format!(
            r"E_a = \left|{:.6} - {:.6}\right| = {last_error:.6}",
            last.x_next, prev.x_next
        ),
        _ => r"E_a = 0".to_string(),
    };
    let iterations_estimate = IterationsEstimate {
        formula_general: r"x_{k+1} = x_k - \frac{f(x_k)}{f'(x_k)},\quad E_a = |x_{k+1} - x_k|"
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
    fn square_root_of_two_in_few_steps() {
        let f = BoundExpression::parse("x^2 - 2", "x").unwrap();
        let res = newton_raphson(&f, 1.0, &RootFindingConfig::new(1e-8)).unwrap();
        assert!(res.conclusion.iterations < 10);
        assert!(res.conclusion.converged);
        assert_relative_eq!(res.root(), 2f64.sqrt(), epsilon = 1e-12);
        assert_eq!(res.table[0].x_next, 1.5);
        assert_eq!(res.table[0].ea, 0.0);
        assert!(res.details[1].lines.last().unwrap().starts_with("E_a = |x_{k+1} - x_k|"));
    }

    #[test]
    fn zero_slope_at_the_start() {
        let f = BoundExpression::parse("x^3", "x").unwrap();
        let err = newton_raphson(&f, 0.0, &RootFindingConfig::new(1e-8)).unwrap_err();
        match err {
            EngineError::DegenerateMethod { iteration, .. } => assert_eq!(iteration, Some(1)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn constant_function_is_rejected() {
        let f = BoundExpression::parse("5", "x").unwrap();
        let err = newton_raphson(&f, 1.0, &RootFindingConfig::new(1e-8)).unwrap_err();
        assert_eq!(err.code(), "DEGENERATE_METHOD");
    }

    #[test]
    fn cap_is_not_an_error() {
        let f = BoundExpression::parse("x^2 + 1", "x").unwrap();
        let cfg = RootFindingConfig::new(1e-10).with_max_iterations(5);
        let res = newton_raphson(&f, 0.5, &cfg).unwrap();
        assert_eq!(res.conclusion.iterations, 5);
        assert!(!res.conclusion.converged);
    }
}
