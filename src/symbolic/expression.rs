//! The capability the numerical engines need from a function of one variable.
//!
//! Root finding and error propagation never parse text: they receive something
//! that can be evaluated, differentiated and rendered. [`BoundExpression`] is
//! the implementation backed by the symbolic engine.
use crate::errors::{EngineError, EngineResult};
use crate::symbolic::latex_input::parse_latex_for_variable;
use crate::symbolic::parse_expr::parse_expression;
use crate::symbolic::symbolic_engine::Expr;

pub trait Expression: Clone {
    fn evaluate(&self, x: f64) -> f64;
    fn derivative(&self) -> Self;
    /// True when the expression is the constant 0 after simplification.
    fn is_identically_zero(&self) -> bool;
    fn to_latex(&self) -> String;
    fn variable(&self) -> &str;
}

/// An [`Expr`] together with the name of its single free variable.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundExpression {
    expr: Expr,
    variable: String,
}

impl BoundExpression {
    /// Bind `expr` to `variable`; any other free variable is rejected.
    pub fn new(expr: Expr, variable: &str) -> EngineResult<Self> {
        let others: Vec<String> = expr
            .free_variables()
            .into_iter()
            .filter(|v| v != variable)
            .collect();
        if !others.is_empty() {
            return Err(EngineError::Expression(format!(
                "unexpected variables {} in a function of {variable}",
                others.join(", ")
            )));
        }
        Ok(Self {
            expr,
            variable: variable.to_string(),
        })
    }

    pub fn parse(text: &str, variable: &str) -> EngineResult<Self> {
        Self::new(parse_expression(text)?, variable)
    }

    pub fn parse_latex(latex: &str, variable: &str) -> EngineResult<Self> {
        Self::new(parse_latex_for_variable(latex, variable)?, variable)
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl Expression for BoundExpression {
    fn evaluate(&self, x: f64) -> f64 {
        self.expr.eval(&self.variable, x)
    }

    fn derivative(&self) -> Self {
        Self {
            expr: self.expr.diff(&self.variable).simplify(),
            variable: self.variable.clone(),
        }
    }

    fn is_identically_zero(&self) -> bool {
        self.expr.simplify().is_zero()
    }

    fn to_latex(&self) -> String {
        self.expr.to_latex()
    }

    fn variable(&self) -> &str {
        &self.variable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bound_expression_evaluates_and_differentiates() {
        let f = BoundExpression::parse("x^3 - 2x", "x").unwrap();
        assert_relative_eq!(f.evaluate(2.0), 4.0);
        let df = f.derivative();
        assert_relative_eq!(df.evaluate(2.0), 10.0);
        assert_eq!(df.variable(), "x");
        assert!(!df.is_identically_zero());
        assert!(df.derivative().derivative().derivative().is_identically_zero());
    }

    #[test]
    fn foreign_variables_are_rejected() {
        assert!(BoundExpression::parse("x + y", "x").is_err());
        // constants are fine: they are functions of x that ignore it
        assert!(BoundExpression::parse("7", "x").unwrap().derivative().is_identically_zero());
    }

    #[test]
    fn latex_input_binds_variable() {
        let f = BoundExpression::parse_latex("$t^{2}$", "t").unwrap();
        assert_relative_eq!(f.evaluate(3.0), 9.0);
        assert_eq!(f.to_latex(), "t^{2}");
    }
}
