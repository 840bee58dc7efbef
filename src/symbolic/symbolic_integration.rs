//! # Symbolic integration
//!
//! Table-driven indefinite integrals for the functions a calculus exercise
//! uses. The constant of integration is omitted.
//!
//! ## Rules
//! - integrands free of the variable: `∫ c dx = c x`
//! - polynomials (sums, products and non-negative integer powers of
//!   polynomials are expanded first): term by term
//! - linearity: sums, differences, constant factors and constant divisors
//! - `∫ u^n dx`, `∫ 1/u dx`, `∫ c^u dx`, `∫ e^u dx`, `∫ ln(u) dx`,
//!   trigonometric and inverse trigonometric functions of a linear argument
//!   `u = a x + b` (the antiderivative in `u` divided by `a`)
//! - polynomial times `e^u` or `c^u`: repeated integration by parts
//! - `∫ f'/f dx = ln(f)`
//!
//! Anything else is an [`EngineError::Expression`].
use crate::errors::{EngineError, EngineResult};
use crate::symbolic::symbolic_engine::Expr;

/// Expanded polynomials above this degree are not worth the blow-up.
const MAX_EXPANDED_DEGREE: usize = 64;

fn trim(mut p: Vec<f64>) -> Vec<f64> {
    while p.len() > 1 && p.last() == Some(&0.0) {
        p.pop();
    }
    p
}

fn poly_add(p: &[f64], q: &[f64], sign: f64) -> Vec<f64> {
    let n = p.len().max(q.len());
    let at = |v: &[f64], i: usize| v.get(i).copied().unwrap_or(0.0);
    trim((0..n).map(|i| at(p, i) + sign * at(q, i)).collect())
}

fn poly_mul(p: &[f64], q: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; p.len() + q.len() - 1];
    for (i, a) in p.iter().enumerate() {
        for (j, b) in q.iter().enumerate() {
            out[i + j] += a * b;
        }
    }
    trim(out)
}

fn poly_derivative(p: &[f64]) -> Vec<f64> {
    if p.len() <= 1 {
        return vec![0.0];
    }
    p.iter()
        .enumerate()
        .skip(1)
        .map(|(i, c)| c * i as f64)
        .collect()
}

/// `c x^k`, with `c = 1` and `k = 1` left implicit.
fn monomial(c: f64, k: usize, var: &str) -> Expr {
    let x = Expr::var(var);
    let power = match k {
        0 => return Expr::Const(c),
        1 => x,
        _ => x.pow(Expr::Const(k as f64)),
    };
    if c == 1.0 { power } else { Expr::Const(c) * power }
}

/// Highest degree first.
fn polynomial_expr(coeffs: &[f64], var: &str) -> Expr {
    let mut terms = coeffs
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, c)| **c != 0.0)
        .map(|(k, &c)| monomial(c, k, var));
    match terms.next() {
        Some(first) => terms.fold(first, |acc, t| acc + t),
        None => Expr::Const(0.0),
    }
}

/// `∫ Σ c_k x^k dx`; a coefficient that does not divide evenly by `k + 1`
/// stays as a quotient so `x^3/3` is not printed as `0.333... x^3`.
fn integrate_polynomial(coeffs: &[f64], var: &str) -> Expr {
    let mut terms = coeffs
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, c)| **c != 0.0)
        .map(|(k, &c)| {
            let n = (k + 1) as f64;
            if (c / n).fract() == 0.0 {
                monomial(c / n, k + 1, var)
            } else {
                monomial(c, k + 1, var) / Expr::Const(n)
            }
        });
    match terms.next() {
        Some(first) => terms.fold(first, |acc, t| acc + t),
        None => Expr::Const(0.0),
    }
}

impl Expr {
    /// Numeric value of an expression without variables.
    fn constant_value(&self) -> Option<f64> {
        if !self.free_variables().is_empty() {
            return None;
        }
        let v = self.eval("", 0.0);
        v.is_finite().then_some(v)
    }

    /// Coefficients `c_k` of `Σ c_k var^k`, lowest degree first, if the
    /// expression is a polynomial in `var` with numeric coefficients.
    pub fn polynomial_coefficients(&self, var: &str) -> Option<Vec<f64>> {
        if let Some(c) = self.constant_value() {
            return Some(vec![c]);
        }
        let coeffs = match self {
            Expr::Var(name) if name == var => vec![0.0, 1.0],
            Expr::Add(l, r) => poly_add(
                &l.polynomial_coefficients(var)?,
                &r.polynomial_coefficients(var)?,
                1.0,
            ),
            Expr::Sub(l, r) => poly_add(
                &l.polynomial_coefficients(var)?,
                &r.polynomial_coefficients(var)?,
                -1.0,
            ),
            Expr::Mul(l, r) => poly_mul(
                &l.polynomial_coefficients(var)?,
                &r.polynomial_coefficients(var)?,
            ),
            Expr::Div(l, r) => {
                let d = r.constant_value().filter(|d| *d != 0.0)?;
                l.polynomial_coefficients(var)?
                    .into_iter()
                    .map(|c| c / d)
                    .collect()
            }
            Expr::Pow(base, exp) => {
                let n = exp.constant_value()?;
                if n < 0.0 || n.fract() != 0.0 || n > MAX_EXPANDED_DEGREE as f64 {
                    return None;
                }
                let p = base.polynomial_coefficients(var)?;
                let mut acc = vec![1.0];
                for _ in 0..n as usize {
                    acc = poly_mul(&acc, &p);
                    if acc.len() > MAX_EXPANDED_DEGREE + 1 {
                        return None;
                    }
                }
                acc
            }
            _ => return None,
        };
        (coeffs.len() <= MAX_EXPANDED_DEGREE + 1).then_some(coeffs)
    }

    /// `(a, b)` when the expression is `a var + b` with `a != 0`.
    pub fn linear_coefficients(&self, var: &str) -> Option<(f64, f64)> {
        match self.polynomial_coefficients(var)?.as_slice() {
            [b, a] if *a != 0.0 => Some((*a, *b)),
            _ => None,
        }
    }

    /// `k` such that `d/dx self = k self`: `e^u` and `c^u` with `u` linear.
    fn exponential_rate(&self, var: &str) -> Option<f64> {
        match self {
            Expr::Exp(u) => u.linear_coefficients(var).map(|(a, _)| a),
            Expr::Pow(base, u) => {
                let c = base.constant_value()?;
                if c <= 0.0 || c == 1.0 {
                    return None;
                }
                u.linear_coefficients(var).map(|(a, _)| a * c.ln())
            }
            _ => None,
        }
    }

    fn cannot_integrate(&self, var: &str) -> EngineError {
        EngineError::Expression(format!("cannot integrate {self} with respect to {var}"))
    }

    /// Indefinite integral with respect to `var`, not simplified.
    pub fn integrate(&self, var: &str) -> EngineResult<Expr> {
        let x = Expr::var(var);
        if !self.contains_variable(var) {
            return Ok(self.clone() * x);
        }
        if let Some(coeffs) = self.polynomial_coefficients(var) {
            return Ok(integrate_polynomial(&coeffs, var));
        }
        if let Some(k) = self.exponential_rate(var) {
            return Ok(self.clone() / Expr::Const(k));
        }
        match self {
            Expr::Add(l, r) => Ok(l.integrate(var)? + r.integrate(var)?),
            Expr::Sub(l, r) => Ok(l.integrate(var)? - r.integrate(var)?),
            Expr::Mul(l, r) => self.integrate_product(l, r, var),
            Expr::Div(l, r) => self.integrate_quotient(l, r, var),
            Expr::Pow(base, exp) => self.integrate_power(base, exp, var),
            other => {
                let u = other.unary_arg().ok_or_else(|| self.cannot_integrate(var))?;
                let (a, _) = u
                    .linear_coefficients(var)
                    .ok_or_else(|| self.cannot_integrate(var))?;
                let u = u.clone();
                let one = || Expr::Const(1.0);
                let antiderivative = match other {
                    // u ln u - u
                    Expr::Ln(_) => u.clone() * u.clone().ln() - u,
                    Expr::sin(_) => -Expr::cos(u.boxed()),
                    Expr::cos(_) => Expr::sin(u.boxed()),
                    // -ln(cos u), valid where cos u > 0
                    Expr::tg(_) => -Expr::cos(u.boxed()).ln(),
                    Expr::arcsin(_) => {
                        u.clone() * Expr::arcsin(u.clone().boxed())
                            + (one() - u.pow(Expr::Const(2.0))).pow(Expr::Const(0.5))
                    }
                    Expr::arccos(_) => {
                        u.clone() * Expr::arccos(u.clone().boxed())
                            - (one() - u.pow(Expr::Const(2.0))).pow(Expr::Const(0.5))
                    }
                    Expr::arctg(_) => {
                        u.clone() * Expr::arctg(u.clone().boxed())
                            - (one() + u.pow(Expr::Const(2.0))).ln() / Expr::Const(2.0)
                    }
                    _ => return Err(self.cannot_integrate(var)),
                };
                Ok(if a == 1.0 {
                    antiderivative
                } else {
                    antiderivative / Expr::Const(a)
                })
            }
        }
    }

    fn integrate_product(&self, lhs: &Expr, rhs: &Expr, var: &str) -> EngineResult<Expr> {
        if !lhs.contains_variable(var) {
            return Ok(lhs.clone() * rhs.integrate(var)?);
        }
        if !rhs.contains_variable(var) {
            return Ok(rhs.clone() * lhs.integrate(var)?);
        }
        for (poly, g) in [(lhs, rhs), (rhs, lhs)] {
            if let (Some(p), Some(k)) = (poly.polynomial_coefficients(var), g.exponential_rate(var))
            {
                return Ok(integrate_polynomial_times_exponential(&p, g, k, var));
            }
        }
        Err(self.cannot_integrate(var))
    }

    fn integrate_quotient(&self, lhs: &Expr, rhs: &Expr, var: &str) -> EngineResult<Expr> {
        if let Some(d) = rhs.constant_value() {
            if d == 0.0 {
                return Err(EngineError::Expression(format!("division by zero in {self}")));
            }
            return Ok(lhs.integrate(var)? / rhs.clone());
        }
        // ∫ f'/f dx = ln f
        if lhs.simplify() == rhs.diff(var).simplify() {
            return Ok(rhs.clone().ln());
        }
        if !lhs.contains_variable(var) {
            // c / u^n = c u^(-n)
            let reciprocal = match rhs {
                Expr::Pow(base, exp) => {
                    let n = exp.constant_value().ok_or_else(|| self.cannot_integrate(var))?;
                    base.as_ref().clone().pow(Expr::Const(-n))
                }
                _ => rhs.clone().pow(Expr::Const(-1.0)),
            };
            return Ok(lhs.clone() * reciprocal.integrate(var)?);
        }
        Err(self.cannot_integrate(var))
    }

    fn integrate_power(&self, base: &Expr, exp: &Expr, var: &str) -> EngineResult<Expr> {
        let n = exp.constant_value().ok_or_else(|| self.cannot_integrate(var))?;
        let (a, _) = base
            .linear_coefficients(var)
            .ok_or_else(|| self.cannot_integrate(var))?;
        let u = base.clone();
        let antiderivative = if n == -1.0 {
            u.ln()
        } else {
            u.pow(Expr::Const(n + 1.0)) / Expr::Const(n + 1.0)
        };
        Ok(if a == 1.0 {
            antiderivative
        } else {
            antiderivative / Expr::Const(a)
        })
    }
}

/// `∫ p(x) g(x) dx` with `g' = k g`:
/// `g Σ_j (-1)^j p^(j)(x) / k^(j+1)`.
fn integrate_polynomial_times_exponential(p: &[f64], g: &Expr, k: f64, var: &str) -> Expr {
    let mut sum = vec![0.0];
    let mut derivative = p.to_vec();
    let mut sign = 1.0;
    let mut k_power = k;
    while derivative.iter().any(|c| *c != 0.0) {
        let term: Vec<f64> = derivative.iter().map(|c| sign * c / k_power).collect();
        sum = poly_add(&sum, &term, 1.0);
        derivative = poly_derivative(&derivative);
        sign = -sign;
        k_power *= k;
    }
    g.clone() * polynomial_expr(&sum, var)
}
