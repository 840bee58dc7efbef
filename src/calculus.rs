//! Symbolic first derivative and indefinite integral of a single-variable
//! expression.
use log::info;
use serde::{Deserialize, Serialize};

use crate::errors::EngineResult;
use crate::symbolic::latex_input::parse_latex_for_variable;
use crate::symbolic::symbolic_engine::Expr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivativeRequest {
    pub function_latex: String,
    #[serde(default = "default_variable")]
    pub variable: String,
}

fn default_variable() -> String {
    "x".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivativeResult {
    pub variable: String,
    pub function_latex: String,
    pub result_latex: String,
    pub result_text: String,
    #[serde(skip)]
    pub derivative: Expr,
}

/// `d expr / d var`, simplified.
pub fn compute_derivative(expr: &Expr, var: &str) -> DerivativeResult {
    let derivative = expr.diff(var).simplify();
    info!("d/d{var} ({expr}) = {derivative}");
    DerivativeResult {
        variable: var.to_string(),
        function_latex: expr.to_latex(),
        result_latex: derivative.to_latex(),
        result_text: derivative.to_string(),
        derivative,
    }
}

pub fn derivative_api(request: &DerivativeRequest) -> EngineResult<DerivativeResult> {
    let expr = parse_latex_for_variable(&request.function_latex, &request.variable)?;
    Ok(compute_derivative(&expr, &request.variable))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegralRequest {
    pub function_latex: String,
    #[serde(default = "default_variable")]
    pub variable: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegralResult {
    pub variable: String,
    pub function_latex: String,
    /// antiderivative, without the constant of integration
    pub result_latex: String,
    pub result_text: String,
    #[serde(skip)]
    pub integral: Expr,
}

/// `∫ expr d var`, simplified. Integrands outside the rule table are an
/// expression error.
pub fn compute_integral(expr: &Expr, var: &str) -> EngineResult<IntegralResult> {
    let integral = expr.integrate(var)?.simplify();
    info!("integral of ({expr}) d{var} = {integral}");
    Ok(IntegralResult {
        variable: var.to_string(),
        function_latex: expr.to_latex(),
        result_latex: integral.to_latex(),
        result_text: integral.to_string(),
        integral,
    })
}

pub fn integral_api(request: &IntegralRequest) -> EngineResult<IntegralResult> {
    let expr = parse_latex_for_variable(&request.function_latex, &request.variable)?;
    compute_integral(&expr, &request.variable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::parse_expression;
    use approx::assert_relative_eq;

    #[test]
    fn polynomial_derivative_evaluates() {
        let expr = parse_expression("x^3 - 2x + 1").unwrap();
        let res = compute_derivative(&expr, "x");
        assert_eq!(res.variable, "x");
        assert_relative_eq!(res.derivative.eval("x", 2.0), 10.0);
        assert!(!res.result_latex.is_empty());
        assert!(!res.result_text.contains('y'));
    }

    #[test]
    fn derivative_of_a_constant_is_zero() {
        let expr = parse_expression("42").unwrap();
        assert!(compute_derivative(&expr, "x").derivative.is_zero());
    }

    #[test]
    fn api_takes_latex() {
        let req: DerivativeRequest =
            serde_json::from_str(r#"{"function_latex": "\\sin\\left(t\\right)", "variable": "t"}"#)
                .unwrap();
        let res = derivative_api(&req).unwrap();
        assert_relative_eq!(res.derivative.eval("t", 0.0), 1.0);
        let json = serde_json::to_value(&res).unwrap();
        assert!(json.get("derivative").is_none());
        assert_eq!(json["variable"], "t");

        let req: DerivativeRequest =
            serde_json::from_str(r#"{"function_latex": "x + y"}"#).unwrap();
        assert!(derivative_api(&req).is_err());
    }

    #[test]
    fn integral_differentiates_back() {
        for text in ["x^3 - 2x + 1", "cos(2x)", "x*exp(x)", "1/(x + 2)"] {
            let expr = parse_expression(text).unwrap();
            let res = compute_integral(&expr, "x").unwrap();
            let back = compute_derivative(&res.integral, "x").derivative;
            for x in [0.25, 1.0, 2.5] {
                assert_relative_eq!(back.eval("x", x), expr.eval("x", x), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn integral_of_a_polynomial_is_readable() {
        let expr = parse_expression("3x^2 + 1").unwrap();
        let res = compute_integral(&expr, "x").unwrap();
        assert_eq!(res.result_text, "x^3 + x");
        assert_eq!(res.result_latex, "x^{3} + x");
    }

    #[test]
    fn integral_api_takes_latex() {
        let req: IntegralRequest =
            serde_json::from_str(r#"{"function_latex": "\\sin\\left(t\\right)", "variable": "t"}"#)
                .unwrap();
        let res = integral_api(&req).unwrap();
        assert_eq!(res.variable, "t");
        assert_relative_eq!(res.integral.eval("t", 0.0), -1.0);
        let json = serde_json::to_value(&res).unwrap();
        assert!(json.get("integral").is_none());
        assert!(json["result_latex"].as_str().unwrap().contains("\\cos"));

        let req: IntegralRequest =
            serde_json::from_str(r#"{"function_latex": "\\sin\\left(x^2\\right)"}"#).unwrap();
        let err = integral_api(&req).unwrap_err();
        assert_eq!(err.code(), "EXPRESSION_ERROR");
    }
}
