use log::{debug, warn};
use serde::Serialize;
use tabled::Tabled;

use crate::errors::{EngineError, EngineResult};
use crate::root_finding::common::{
    IterationDetail, IterationsEstimate, RootFindingConfig, RootFindingMethod, RootFindingResult,
    conclusion, eval_at, relative_error_percent, substitution,
};
use crate::symbolic::expression::Expression;

const METHOD: RootFindingMethod = RootFindingMethod::Bisection;

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct BisectionRow {
    pub iteration: usize,
    pub xl: f64,
    pub xu: f64,
    pub xr: f64,
    /// relative percent error
    #[serde(rename = "Ea")]
    #[tabled(rename = "Ea")]
    pub ea: f64,
    pub yl: f64,
    pub yu: f64,
    pub yr: f64,
    pub interval_length: f64,
}

fn detail_lines(f_latex: &str, row: &BisectionRow, is_first: bool) -> Vec<String> {
    let BisectionRow {
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
        format!(
            r"x_r = \frac{{x_l + x_u}}{{2}} \Rightarrow x_r = \frac{{{xl:.4} + {xu:.4}}}{{2}} = {xr:.4}"
        ),
    ];
    if is_first {
        lines.push(r"E_a = 0.0000".to_string());
    } else {
        lines.push(format!(
            r"E_a = \left|\frac{{x_r^{{(k)}} - x_r^{{(k-1)}}}}{{x_r^{{(k)}}}}\right|\cdot 100 = {ea:.4}\%"
        ));
    }
    lines.push(substitution("v_l", &format!("{xl:.4}"), f_latex, xl, yl));
    lines.push(substitution("v_u", &format!("{xu:.4}"), f_latex, xu, yu));
    lines.push(substitution("v_r", &format!("{xr:.4}"), f_latex, xr, yr));
    if yl * yr < 0.0 {
        lines.push(format!(
            r"f(x_l) f(x_r) = ({yl:+.4})({yr:+.4}) < 0 \Rightarrow \text{{the root lies in }}[x_l, x_r]."
        ));
        lines.push(format!(
            r"\text{{New interval: }}[x_l, x_u] \leftarrow [{xl:.4}, {xr:.4}]"
        ));
    } else {
        lines.push(format!(
            r"f(x_l) f(x_r) = ({yl:+.4})({yr:+.4}) \ge 0 \Rightarrow \text{{the root lies in }}[x_r, x_u]."
        ));
        lines.push(format!(
            r"\text{{New interval: }}[x_l, x_u] \leftarrow [{xr:.4}, {xu:.4}]"
        ));
    }
    lines
}

/// Bisection on `[xl, xu]`.
///
/// The number of halvings needed for an interval of length `L` is
/// `n_min = max(1, ceil(log2(L / tol)))`; it is also the default cap.
/// The loop stops once the current interval is shorter than `tol`.
pub fn bisection<E: Expression>(
    f: &E,
    xl: f64,
    xu: f64,
    config: &RootFindingConfig,
) -> EngineResult<RootFindingResult<BisectionRow>> {
    config.validate(METHOD)?;
    let tol = config.tolerance;
    let length0 = xu - xl;
    if !length0.is_finite() || length0 <= 0.0 {
        return Err(EngineError::degenerate(
            &METHOD.to_string(),
            None,
            format!("invalid interval [{xl}, {xu}]: its length must be positive"),
        ));
    }
    let estimate = (length0 / tol).log2();
    let n_min = (estimate.ceil() as i64).max(1) as usize;
    let max_iter = config.cap(METHOD, n_min);

    let f_latex = f.to_latex();
    if eval_at(f, xl, METHOD, 1)? * eval_at(f, xu, METHOD, 1)? > 0.0 {
        warn!("bisection: f has the same sign at both ends of [{xl}, {xu}]");
    }

    let mut table: Vec<BisectionRow> = Vec::new();
    let mut details = Vec::new();
    let (mut a, mut b) = (xl, xu);
    let mut xr_prev: Option<f64> = None;
    let mut stopped = false;

    for k in 1..=max_iter {
        let xr = 0.5 * (a + b);
        let yl = eval_at(f, a, METHOD, k)?;
        let yu = eval_at(f, b, METHOD, k)?;
        let yr = eval_at(f, xr, METHOD, k)?;
        let ea = xr_prev.map_or(0.0, |prev| relative_error_percent(xr, prev));
        let row = BisectionRow {
            iteration: k,
            xl: a,
            xu: b,
            xr,
            ea,
            yl,
            yu,
            yr,
            interval_length: b - a,
        };
        debug!("bisection k={k} xr={xr} Ea={ea}");
        details.push(IterationDetail {
            iteration: k,
            lines: detail_lines(&f_latex, &row, xr_prev.is_none()),
        });
        table.push(row);

        if b - a < tol {
            stopped = true;
            break;
        }
        if yl * yr < 0.0 {
            b = xr;
        } else {
            a = xr;
        }
        xr_prev = Some(xr);
    }

    let last = table.last().ok_or_else(|| {
        EngineError::degenerate(&METHOD.to_string(), None, "no iteration was performed")
    })?;
    let root = last.xr;
    let iterations = table.len();
    // the bracket left after the last halving bounds the error
    let converged = stopped || b - a <= tol;

    let iterations_estimate = IterationsEstimate {
        formula_general: r"n \ge \log_{2}\!\left(\frac{b-a}{E}\right)".to_string(),
        formula_substitution: format!(
            r"n \ge \log_2\left(\frac{{{length0:.4}}}{{{tol:e}}}\right)"
        ),
        formula_numeric: format!(r"n \ge {estimate:.4}"),
        tolerance: tol,
        estimate: Some(estimate),
        n_min: Some(n_min),
        last_error: None,
        iterations,
    };
    Ok(RootFindingResult {
        method: METHOD,
        iterations_estimate,
        table,
        details,
        conclusion: conclusion(METHOD, root, iterations, "interval length < tolerance", converged),
    })
}
