use log::debug;
use serde::Serialize;
use tabled::Tabled;

use crate::errors::{EngineError, EngineResult};
use crate::root_finding::common::{
    IterationDetail, IterationsEstimate, RootFindingConfig, RootFindingMethod, RootFindingResult,
    conclusion, eval_at, relative_error_percent, substitution,
};
use crate::symbolic::expression::Expression;

const METHOD: RootFindingMethod = RootFindingMethod::FalsePosition;

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct FalsePositionRow {
    pub iteration: usize,
    pub xl: f64,
    pub xu: f64,
    pub xr: f64,
    #[serde(rename = "Ea")]
    #[tabled(rename = "Ea")]
    pub ea: f64,
    pub yl: f64,
    pub yu: f64,
    pub yr: f64,
    #[serde(rename = "Ea_lt_E")]
    #[tabled(rename = "Ea < E")]
    pub ea_lt_tol: bool,
}

fn detail_lines(f_latex: &str, row: &FalsePositionRow, is_first: bool) -> Vec<String> {
    let FalsePositionRow {
        iteration,
        xl,
        xu,
        xr,
        ea,
        yl,
        yu,
        yr,
        ..
    } = *row;
    let mut lines = vec![
        format!(r"\textbf{{Iteration {iteration}:}}"),
        format!(r"x_l = {xl:.4},\quad x_u = {xu:.4}"),
        substitution("v_l", &format!("{xl:.4}"), f_latex, xl, yl),
        substitution("v_u", &format!("{xu:.4}"), f_latex, xu, yu),
        format!(
            r"x_r = x_u - \frac{{f(x_u)(x_l - x_u)}}{{f(x_l) - f(x_u)}} = {xu:.4} - \frac{{({yu:+.6})({xl:.4} - {xu:.4})}}{{({yl:+.6}) - ({yu:+.6})}} = {xr:.6}"
        ),
        substitution("v_r", &format!("{xr:.4}"), f_latex, xr, yr),
    ];
    if is_first {
        lines.push(r"E_a = 0.0000".to_string());
    } else {
        lines.push(format!(
            r"E_a = \left|\frac{{x_r^{{(k)}} - x_r^{{(k-1)}}}}{{x_r^{{(k)}}}}\right|\cdot 100 = {ea:.4}\%"
        ));
    }
    let prod = yl * yr;
    if prod < 0.0 {
        lines.push(format!(
            r"f(x_l) f(x_r) < 0 \Rightarrow x_u \leftarrow x_r = {xr:.6}"
        ));
    } else if prod > 0.0 {
        lines.push(format!(
            r"f(x_l) f(x_r) > 0 \Rightarrow x_l \leftarrow x_r = {xr:.6}"
        ));
    } else {
        lines.push(r"f(x_r) = 0 \Rightarrow x_r \text{ is an exact root}".to_string());
    }
    lines
}

/// Regula falsi on `[xl, xu]`: the new estimate is where the chord through
/// `(xl, f(xl))` and `(xu, f(xu))` crosses zero. Stops when the relative
/// percent error drops below `tol` (never on the first iteration) or when
/// `f(xr)` is exactly 0.
pub fn false_position<E: Expression>(
    f: &E,
    xl: f64,
    xu: f64,
    config: &RootFindingConfig,
) -> EngineResult<RootFindingResult<FalsePositionRow>> {
    config.validate(METHOD)?;
    let tol = config.tolerance;
    let max_iter = config.cap(METHOD, 100);
    let f_latex = f.to_latex();

    let mut table: Vec<FalsePositionRow> = Vec::new();
    let mut details = Vec::new();
    let (mut a, mut b) = (xl, xu);
    let mut xr_prev: Option<f64> = None;
    let mut converged = false;

    for k in 1..=max_iter {
        let yl = eval_at(f, a, METHOD, k)?;
        let yu = eval_at(f, b, METHOD, k)?;
        let denominator = yl - yu;
        if denominator == 0.0 {
            return Err(EngineError::degenerate(
                &METHOD.to_string(),
                Some(k),
                "f(x_l) = f(x_u), the chord formula divides by zero",
            ));
        }
        let xr = b - yu * (a - b) / denominator;
        let yr = eval_at(f, xr, METHOD, k)?;
        let ea = xr_prev.map_or(0.0, |prev| relative_error_percent(xr, prev));
        let ea_lt_tol = xr_prev.is_some() && ea < tol;
        let row = FalsePositionRow {
            iteration: k,
            xl: a,
            xu: b,
            xr,
            ea,
            yl,
            yu,
            yr,
            ea_lt_tol,
        };
        debug!("false position k={k} xr={xr} Ea={ea}");
        details.push(IterationDetail {
            iteration: k,
            lines: detail_lines(&f_latex, &row, xr_prev.is_none()),
        });
        table.push(row);

        if ea_lt_tol {
            converged = true;
            break;
        }
        let prod = yl * yr;
        if prod < 0.0 {
            b = xr;
        } else if prod > 0.0 {
            a = xr;
        } else {
            converged = true;
            break;
        }
        xr_prev = Some(xr);
    }

    let last = table.last().ok_or_else(|| {
        EngineError::degenerate(&METHOD.to_string(), None, "no iteration was performed")
    })?;
    let root = last.xr;
    let last_error = last.ea;
    let iterations = table.len();
    let formula_substitution = if iterations > 1 {
        format!(
            r"E_a = \left|\frac{{x_r^{{({iterations})}} - x_r^{{({})}}}}{{x_r^{{({iterations})}}}}\right|\cdot 100",
            iterations - 1
        )
    } else {
        r"E_a = 0".to_string()
    };
    let iterations_estimate = IterationsEstimate {
        formula_general: r"E_a = \left|\frac{x_r^{(k)} - x_r^{(k-1)}}{x_r^{(k)}}\right|\cdot 100"
            .to_string(),
        formula_substitution,
        formula_numeric: format!(r"E_a \approx {last_error:.4}\%"),
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
            "E_a < tolerance (relative percent error)",
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
    fn converges_on_a_cubic() {
        let f = BoundExpression::parse("x^3 - x - 2", "x").unwrap();
        let res = false_position(&f, 1.0, 2.0, &RootFindingConfig::new(1e-4)).unwrap();
        assert!(res.conclusion.converged);
        assert_relative_eq!(res.root(), 1.5213797068, epsilon = 1e-5);
        // first estimate: 2 - 4·(1 - 2)/(-2 - 4) = 4/3
        assert_relative_eq!(res.table[0].xr, 4.0 / 3.0, epsilon = 1e-12);
        assert!(!res.table[0].ea_lt_tol);
        assert!(res.table.last().unwrap().ea_lt_tol);
    }

    #[test]
    fn exact_root_stops_immediately() {
        let f = BoundExpression::parse("2x - 1", "x").unwrap();
        let res = false_position(&f, 0.0, 1.0, &RootFindingConfig::new(1e-6)).unwrap();
        assert_eq!(res.conclusion.iterations, 1);
        assert_eq!(res.root(), 0.5);
        assert!(res.conclusion.converged);
    }

    #[test]
    fn flat_chord_names_the_iteration() {
        let f = BoundExpression::parse("x^2", "x").unwrap();
        let err = false_position(&f, -1.0, 1.0, &RootFindingConfig::new(1e-6)).unwrap_err();
        assert_eq!(
            err,
            EngineError::DegenerateMethod {
                method: "false_position".to_string(),
                iteration: Some(1),
                reason: "f(x_l) = f(x_u), the chord formula divides by zero".to_string(),
            }
        );
    }

    #[test]
    fn cap_is_not_an_error() {
        let f = BoundExpression::parse("x^3 - x - 2", "x").unwrap();
        let cfg = RootFindingConfig::new(1e-14).with_max_iterations(3);
        let res = false_position(&f, 1.0, 2.0, &cfg).unwrap();
        assert_eq!(res.conclusion.iterations, 3);
        assert!(!res.conclusion.converged);
        assert!(!res.table.last().unwrap().ea_lt_tol);
    }

    #[test]
    fn default_cap_is_one_hundred() {
        // x^10 - 1 on [0, 1.5] creeps towards 1 from the left
        let f = BoundExpression::parse("x^10 - 1", "x").unwrap();
        let res = false_position(&f, 0.0, 1.5, &RootFindingConfig::new(1e-6)).unwrap();
        assert_eq!(res.conclusion.iterations, 100);
        assert!(!res.conclusion.converged);
        assert!(res.root() < 1.0);
        assert!(res.table.iter().all(|row| row.xu == 1.5));
    }
}
