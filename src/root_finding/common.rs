//! Pieces shared by the four root finders: configuration, the four result
//! sections and the small formatting helpers used in the LaTeX details.
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tabled::Tabled;

use crate::Utils::logger::save_rows_to_csv;
use crate::Utils::tables::render_rows;
use crate::errors::{EngineError, EngineResult};
use crate::symbolic::expression::Expression;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RootFindingMethod {
    Bisection,
    FalsePosition,
    NewtonRaphson,
    Secant,
}

impl RootFindingMethod {
    /// Iteration cap used when the caller gives none. Bisection computes its
    /// own from the interval and the tolerance.
    pub fn default_max_iterations(&self) -> Option<usize> {
        match self {
            RootFindingMethod::Bisection => None,
            RootFindingMethod::FalsePosition => Some(100),
            RootFindingMethod::NewtonRaphson | RootFindingMethod::Secant => Some(50),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootFindingConfig {
    pub tolerance: f64,
    pub max_iterations: Option<usize>,
}

impl RootFindingConfig {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            max_iterations: None,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub(crate) fn validate(&self, method: RootFindingMethod) -> EngineResult<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(EngineError::degenerate(
                &method.to_string(),
                None,
                format!("tolerance must be positive, got {}", self.tolerance),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(EngineError::validation("max_iterations must be at least 1"));
        }
        Ok(())
    }

    /// Explicit cap, else the method default, else `fallback`.
    pub(crate) fn cap(&self, method: RootFindingMethod, fallback: usize) -> usize {
        self.max_iterations
            .or(method.default_max_iterations())
            .unwrap_or(fallback)
    }
}

/// First section: how many iterations are needed, or how the error is measured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationsEstimate {
    pub formula_general: String,
    pub formula_substitution: String,
    pub formula_numeric: String,
    pub tolerance: f64,
    /// bisection only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_min: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<f64>,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationDetail {
    pub iteration: usize,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conclusion {
    pub latex: String,
    pub root: f64,
    pub iterations: usize,
    pub stopping_criterion: String,
    /// false when the iteration cap was reached before the stopping criterion
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootFindingResult<R> {
    pub method: RootFindingMethod,
    pub iterations_estimate: IterationsEstimate,
    pub table: Vec<R>,
    pub details: Vec<IterationDetail>,
    pub conclusion: Conclusion,
}

impl<R: Tabled + Serialize> RootFindingResult<R> {
    pub fn root(&self) -> f64 {
        self.conclusion.root
    }

    pub fn render_table(&self) -> String {
        render_rows(&self.table)
    }

    pub fn save_table_csv(&self, path: impl AsRef<Path>) -> EngineResult<()> {
        save_rows_to_csv(&self.table, path)
    }
}

pub(crate) fn conclusion(
    method: RootFindingMethod,
    root: f64,
    iterations: usize,
    stopping_criterion: &str,
    converged: bool,
) -> Conclusion {
    let latex = if converged {
        info!("{method} converged to {root} in {iterations} iterations");
        format!(
            r"\text{{The method converges in }} {iterations} \text{{ iterations. The approximate root is }} x_r = {root:.6}."
        )
    } else {
        warn!("{method} stopped after {iterations} iterations without meeting: {stopping_criterion}");
        format!(
            r"\text{{The method did not converge in }} {iterations} \text{{ iterations. Last approximation: }} x_r = {root:.6}."
        )
    };
    Conclusion {
        latex,
        root,
        iterations,
        stopping_criterion: stopping_criterion.to_string(),
        converged,
    }
}

/// Evaluate `f`, failing when the value is not a finite number.
pub(crate) fn eval_at<E: Expression>(
    f: &E,
    x: f64,
    method: RootFindingMethod,
    iteration: usize,
) -> EngineResult<f64> {
    let y = f.evaluate(x);
    if !y.is_finite() {
        return Err(EngineError::degenerate(
            &method.to_string(),
            Some(iteration),
            format!("f({x}) is not a finite number"),
        ));
    }
    Ok(y)
}

/// `|(current - previous) / current| · 100`, 0 when `current` is 0.
pub(crate) fn relative_error_percent(current: f64, previous: f64) -> f64 {
    if current == 0.0 {
        0.0
    } else {
        ((current - previous) / current).abs() * 100.0
    }
}

/// `f|_{x=..}` substitution line used by every detail block.
pub(crate) fn substitution(name: &str, arg: &str, f_latex: &str, x: f64, y: f64) -> String {
    format!(r"{name} = f({arg}) = {f_latex}\big|_{{x={x:.4}}} = {y:+.6}")
}
