//! # Root-finding engine
//!
//! Closed (bracketing) methods: bisection and false position.
//! Open methods: Newton-Raphson and secant.
//!
//! Every method works on anything implementing [`Expression`] and returns the
//! same four sections: an iteration estimate, a numeric table, LaTeX details per
//! iteration and a conclusion. Hitting the iteration cap is reported through
//! `conclusion.converged`, never as an error.
//!
//! ```ignore
//! let f = BoundExpression::parse_latex("x^{2} - 2", "x")?;
//! let res = newton_raphson(&f, 1.0, &RootFindingConfig::new(1e-8))?;
//! println!("{}", res.render_table());
//! ```
pub mod bisection;
pub mod common;
pub mod false_position;
pub mod newton_raphson;
pub mod secant;

use log::info;
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};
use crate::symbolic::expression::{BoundExpression, Expression};

pub use bisection::{BisectionRow, bisection};
pub use common::{
    Conclusion, IterationDetail, IterationsEstimate, RootFindingConfig, RootFindingMethod,
    RootFindingResult,
};
pub use false_position::{FalsePositionRow, false_position};
pub use newton_raphson::{NewtonRow, newton_raphson};
pub use secant::{SecantRow, secant};

fn default_variable() -> String {
    "x".to_string()
}

/// Boundary request: the function arrives as LaTeX and is bound here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootFindingRequest {
    pub method: RootFindingMethod,
    pub latex: String,
    #[serde(default = "default_variable")]
    pub variable: String,
    /// lower bound for bracketing methods, first seed for open methods
    pub a: f64,
    /// upper bound for bracketing methods, second seed for the secant method
    #[serde(default)]
    pub b: Option<f64>,
    pub tolerance: f64,
    #[serde(default)]
    pub max_iterations: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RootFindingOutput {
    Bisection(RootFindingResult<BisectionRow>),
    FalsePosition(RootFindingResult<FalsePositionRow>),
    NewtonRaphson(RootFindingResult<NewtonRow>),
    Secant(RootFindingResult<SecantRow>),
}

impl RootFindingOutput {
    pub fn conclusion(&self) -> &Conclusion {
        match self {
            RootFindingOutput::Bisection(r) => &r.conclusion,
            RootFindingOutput::FalsePosition(r) => &r.conclusion,
            RootFindingOutput::NewtonRaphson(r) => &r.conclusion,
            RootFindingOutput::Secant(r) => &r.conclusion,
        }
    }

    pub fn render_table(&self) -> String {
        match self {
            RootFindingOutput::Bisection(r) => r.render_table(),
            RootFindingOutput::FalsePosition(r) => r.render_table(),
            RootFindingOutput::NewtonRaphson(r) => r.render_table(),
            RootFindingOutput::Secant(r) => r.render_table(),
        }
    }
}

/// Run any method on an already bound expression.
pub fn find_root<E: Expression>(
    f: &E,
    method: RootFindingMethod,
    a: f64,
    b: Option<f64>,
    config: &RootFindingConfig,
) -> EngineResult<RootFindingOutput> {
    let second = |what: &str| {
        b.ok_or_else(|| EngineError::validation(format!("{method} requires {what}")))
    };
    let out = match method {
        RootFindingMethod::Bisection => {
            RootFindingOutput::Bisection(bisection(f, a, second("an upper bound")?, config)?)
        }
        RootFindingMethod::FalsePosition => RootFindingOutput::FalsePosition(false_position(
            f,
            a,
            second("an upper bound")?,
            config,
        )?),
        RootFindingMethod::NewtonRaphson => {
            RootFindingOutput::NewtonRaphson(newton_raphson(f, a, config)?)
        }
        RootFindingMethod::Secant => {
            RootFindingOutput::Secant(secant(f, a, second("a second seed")?, config)?)
        }
    };
    Ok(out)
}

pub fn root_finding_api(request: &RootFindingRequest) -> EngineResult<RootFindingOutput> {
    info!(
        "{} on {} (variable {})",
        request.method, request.latex, request.variable
    );
    let f = BoundExpression::parse_latex(&request.latex, &request.variable)?;
    let config = RootFindingConfig {
        tolerance: request.tolerance,
        max_iterations: request.max_iterations,
    };
    find_root(&f, request.method, request.a, request.b, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> RootFindingRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn api_binds_latex_and_dispatches() {
        let req = request(
            r#"{"method": "bisection", "latex": "$x^{2} - 2$", "a": 1, "b": 2, "tolerance": 1e-6}"#,
        );
        let out = root_finding_api(&req).unwrap();
        assert!((out.conclusion().root - 2f64.sqrt()).abs() < 1e-6);
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["method"], "bisection");
        assert_eq!(json["iterations_estimate"]["n_min"], 20);
        assert!(json["table"][0].get("Ea").is_some());
        assert!(out.render_table().contains("interval_length"));
    }

    #[test]
    fn api_open_methods() {
        let req = request(
            r#"{"method": "newton_raphson", "latex": "\\cos\\left(t\\right) - t", "variable": "t", "a": 1, "tolerance": 1e-10}"#,
        );
        let out = root_finding_api(&req).unwrap();
        assert!((out.conclusion().root - 0.7390851332151607).abs() < 1e-9);

        let req = request(
            r#"{"method": "secant", "latex": "x^{3} - x - 1", "a": 1, "tolerance": 1e-8}"#,
        );
        assert_eq!(root_finding_api(&req).unwrap_err().code(), "VALIDATION_ERROR");
    }

    #[test]
    fn api_rejects_foreign_variables() {
        let req = request(
            r#"{"method": "secant", "latex": "x + y", "a": 0, "b": 1, "tolerance": 1e-8}"#,
        );
        assert_eq!(root_finding_api(&req).unwrap_err().code(), "EXPRESSION_ERROR");
    }
}
