//! # Symbolic engine
//!
//! A small expression tree for the closed-form univariate functions the
//! root-finding and error-propagation engines work with.
//!
//! ## Main structures and methods
//! - `Expr` - the tree: constants, variables, `+ - * / ^` and elementary functions
//! - `diff(var)` - analytical derivative (product, quotient, chain rules)
//! - `simplify()` - constant folding and the usual `x + 0`, `1 * x`, `x ^ 1` identities
//! - `eval(var, x)` - direct tree-walking evaluation
//! - `to_latex()` - LaTeX rendering used in the step narration
//!
//! Function variants keep mathematical names (`tg`, `arctg`) instead of `tan`, `atan`.
#![allow(non_camel_case_types)]

use std::collections::BTreeSet;
use std::f64::consts::{E, PI};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x")
    Var(String),
    /// Numerical constant value
    Const(f64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    /// base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    Exp(Box<Expr>),
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    tg(Box<Expr>),
    arcsin(Box<Expr>),
    arccos(Box<Expr>),
    arctg(Box<Expr>),
}

/// Binding strength used to decide where parentheses are needed when printing.
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(..) | Expr::Sub(..) => 1,
        Expr::Const(c) if *c < 0.0 => 2,
        Expr::Mul(..) | Expr::Div(..) => 2,
        Expr::Pow(..) => 3,
        _ => 4,
    }
}

/// `-c` constants and `-1 * x` products print with a leading minus.
fn is_negated(expr: &Expr) -> bool {
    match expr {
        Expr::Const(c) => *c < 0.0,
        Expr::Mul(lhs, _) => matches!(lhs.as_ref(), Expr::Const(c) if *c < 0.0),
        _ => false,
    }
}

pub(crate) fn fmt_const(c: f64) -> String {
    if c == 0.0 {
        "0".to_string()
    } else if c == PI {
        "pi".to_string()
    } else if c == E {
        "e".to_string()
    } else if c.fract() == 0.0 && c.abs() < 1e15 {
        format!("{:.0}", c)
    } else {
        format!("{}", c)
    }
}

fn paren_if(cond: bool, s: String) -> String {
    if cond { format!("({s})") } else { s }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", fmt_const(*val)),
            Expr::Add(lhs, rhs) => match rhs.as_ref() {
                Expr::Const(c) if *c < 0.0 => write!(f, "{} - {}", lhs, fmt_const(-c)),
                _ => write!(f, "{} + {}", lhs, rhs),
            },
            Expr::Sub(lhs, rhs) => {
                let r = paren_if(precedence(rhs) == 1 || is_negated(rhs), rhs.to_string());
                write!(f, "{} - {}", lhs, r)
            }
            Expr::Mul(lhs, rhs) => {
                if let Expr::Const(c) = lhs.as_ref() {
                    if *c == -1.0 {
                        return write!(f, "-{}", paren_if(precedence(rhs) < 3, rhs.to_string()));
                    }
                }
                let l = paren_if(precedence(lhs) < 2, lhs.to_string());
                let r = paren_if(precedence(rhs) <= 2, rhs.to_string());
                write!(f, "{}*{}", l, r)
            }
            Expr::Div(lhs, rhs) => {
                let l = paren_if(precedence(lhs) < 2, lhs.to_string());
                let r = paren_if(precedence(rhs) <= 2, rhs.to_string());
                write!(f, "{}/{}", l, r)
            }
            Expr::Pow(base, exp) => {
                let b = paren_if(precedence(base) <= 3, base.to_string());
                let e = paren_if(precedence(exp) < 3, exp.to_string());
                write!(f, "{}^{}", b, e)
            }
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tan({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctan({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// Argument of a one-argument function node.
    pub(crate) fn unary_arg(&self) -> Option<&Expr> {
        match self {
            Expr::Exp(a)
            | Expr::Ln(a)
            | Expr::sin(a)
            | Expr::cos(a)
            | Expr::tg(a)
            | Expr::arcsin(a)
            | Expr::arccos(a)
            | Expr::arctg(a) => Some(a),
            _ => None,
        }
    }

    /// Rebuild a one-argument function node around a new argument.
    fn with_unary_arg(&self, arg: Expr) -> Expr {
        let arg = arg.boxed();
        match self {
            Expr::Exp(_) => Expr::Exp(arg),
            Expr::Ln(_) => Expr::Ln(arg),
            Expr::sin(_) => Expr::sin(arg),
            Expr::cos(_) => Expr::cos(arg),
            Expr::tg(_) => Expr::tg(arg),
            Expr::arcsin(_) => Expr::arcsin(arg),
            Expr::arccos(_) => Expr::arccos(arg),
            Expr::arctg(_) => Expr::arctg(arg),
            other => other.clone(),
        }
    }

    fn apply_unary(&self, v: f64) -> f64 {
        match self {
            Expr::Exp(_) => v.exp(),
            Expr::Ln(_) => v.ln(),
            Expr::sin(_) => v.sin(),
            Expr::cos(_) => v.cos(),
            Expr::tg(_) => v.tan(),
            Expr::arcsin(_) => v.asin(),
            Expr::arccos(_) => v.acos(),
            Expr::arctg(_) => v.atan(),
            _ => f64::NAN,
        }
    }

    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) | Expr::Pow(l, r) => {
                l.contains_variable(var_name) || r.contains_variable(var_name)
            }
            other => other
                .unary_arg()
                .is_some_and(|a| a.contains_variable(var_name)),
        }
    }

    /// Sorted set of variable names appearing in the expression.
    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                vars.insert(name.clone());
            }
            Expr::Const(_) => {}
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) | Expr::Pow(l, r) => {
                l.collect_variables(vars);
                r.collect_variables(vars);
            }
            other => {
                if let Some(a) = other.unary_arg() {
                    a.collect_variables(vars);
                }
            }
        }
    }

    /// Substitutes a variable with a constant value throughout the expression.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        match self {
            Expr::Var(name) if name == var => Expr::Const(value),
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(l, r) => l.set_variable(var, value) + r.set_variable(var, value),
            Expr::Sub(l, r) => l.set_variable(var, value) - r.set_variable(var, value),
            Expr::Mul(l, r) => l.set_variable(var, value) * r.set_variable(var, value),
            Expr::Div(l, r) => l.set_variable(var, value) / r.set_variable(var, value),
            Expr::Pow(b, e) => b.set_variable(var, value).pow(e.set_variable(var, value)),
            other => match other.unary_arg() {
                Some(a) => other.with_unary_arg(a.set_variable(var, value)),
                None => other.clone(),
            },
        }
    }

    /// Evaluate with `var = x`. Any other variable evaluates to NaN.
    pub fn eval(&self, var: &str, x: f64) -> f64 {
        match self {
            Expr::Var(name) => {
                if name == var {
                    x
                } else {
                    f64::NAN
                }
            }
            Expr::Const(c) => *c,
            Expr::Add(l, r) => l.eval(var, x) + r.eval(var, x),
            Expr::Sub(l, r) => l.eval(var, x) - r.eval(var, x),
            Expr::Mul(l, r) => l.eval(var, x) * r.eval(var, x),
            Expr::Div(l, r) => l.eval(var, x) / r.eval(var, x),
            Expr::Pow(b, e) => {
                let base = b.eval(var, x);
                match e.as_ref() {
                    Expr::Const(n) if n.fract() == 0.0 && n.abs() < i32::MAX as f64 => {
                        base.powi(*n as i32)
                    }
                    _ => base.powf(e.eval(var, x)),
                }
            }
            other => match other.unary_arg() {
                Some(a) => other.apply_unary(a.eval(var, x)),
                None => f64::NAN,
            },
        }
    }

    /// Analytical derivative with respect to `var` (not simplified).
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => lhs.diff(var) + rhs.diff(var),
            Expr::Sub(lhs, rhs) => lhs.diff(var) - rhs.diff(var),
            Expr::Mul(lhs, rhs) => {
                lhs.diff(var) * *rhs.clone() + *lhs.clone() * rhs.diff(var)
            }
            Expr::Div(lhs, rhs) => (lhs.diff(var) * *rhs.clone() - *lhs.clone() * rhs.diff(var))
                / rhs.as_ref().clone().pow(Expr::Const(2.0)),
            Expr::Pow(base, exp) => {
                if exp.contains_variable(var) {
                    // d(b^e) = b^e * (e' ln b + e b'/b)
                    self.clone()
                        * (exp.diff(var) * base.as_ref().clone().ln()
                            + *exp.clone() * base.diff(var) / *base.clone())
                } else {
                    *exp.clone()
                        * base
                            .as_ref()
                            .clone()
                            .pow(*exp.clone() - Expr::Const(1.0))
                        * base.diff(var)
                }
            }
            Expr::Exp(expr) => self.clone() * expr.diff(var),
            Expr::Ln(expr) => expr.diff(var) / *expr.clone(),
            Expr::sin(expr) => Expr::cos(expr.clone()) * expr.diff(var),
            Expr::cos(expr) => -Expr::sin(expr.clone()) * expr.diff(var),
            Expr::tg(expr) => {
                expr.diff(var) / Expr::cos(expr.clone()).pow(Expr::Const(2.0))
            }
            Expr::arcsin(expr) => expr.diff(var)
                / (Expr::Const(1.0) - expr.as_ref().clone().pow(Expr::Const(2.0)))
                    .pow(Expr::Const(0.5)),
            Expr::arccos(expr) => -expr.diff(var)
                / (Expr::Const(1.0) - expr.as_ref().clone().pow(Expr::Const(2.0)))
                    .pow(Expr::Const(0.5)),
            Expr::arctg(expr) => expr.diff(var)
                / (Expr::Const(1.0) + expr.as_ref().clone().pow(Expr::Const(2.0))),
        }
    }

    /// Bottom-up algebraic cleanup: folds constants and drops neutral elements.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b),
                    (Expr::Const(a), _) if *a == 0.0 => rhs,
                    (_, Expr::Const(b)) if *b == 0.0 => lhs,
                    _ => lhs + rhs,
                }
            }
            Expr::Sub(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b),
                    (_, Expr::Const(b)) if *b == 0.0 => lhs,
                    (Expr::Const(a), _) if *a == 0.0 => (-rhs).simplify(),
                    _ if lhs == rhs => Expr::Const(0.0),
                    _ => lhs - rhs,
                }
            }
            Expr::Mul(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b),
                    (Expr::Const(a), _) | (_, Expr::Const(a)) if *a == 0.0 => Expr::Const(0.0),
                    (Expr::Const(a), _) if *a == 1.0 => rhs,
                    (_, Expr::Const(b)) if *b == 1.0 => lhs,
                    // constants move to the left and merge: c1 * (c2 * x) = (c1 c2) * x
                    (_, Expr::Const(_)) => (rhs * lhs).simplify(),
                    (Expr::Const(a), Expr::Mul(inner_l, inner_r)) => match inner_l.as_ref() {
                        Expr::Const(b) => (Expr::Const(a * b) * *inner_r.clone()).simplify(),
                        _ => lhs.clone() * rhs.clone(),
                    },
                    (Expr::Var(v1), Expr::Var(v2)) if v1 == v2 => {
                        Expr::Var(v1.clone()).pow(Expr::Const(2.0))
                    }
                    _ => lhs * rhs,
                }
            }
            Expr::Div(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) if *b != 0.0 => Expr::Const(a / b),
                    (Expr::Const(a), _) if *a == 0.0 => Expr::Const(0.0),
                    (_, Expr::Const(b)) if *b == 1.0 => lhs,
                    _ if lhs == rhs => Expr::Const(1.0),
                    _ => lhs / rhs,
                }
            }
            Expr::Pow(base, exp) => {
                let (base, exp) = (base.simplify(), exp.simplify());
                match (&base, &exp) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a.powf(*b)),
                    (_, Expr::Const(b)) if *b == 0.0 => Expr::Const(1.0),
                    (_, Expr::Const(b)) if *b == 1.0 => base,
                    (Expr::Const(a), _) if *a == 1.0 => Expr::Const(1.0),
                    _ => base.pow(exp),
                }
            }
            other => match other.unary_arg() {
                Some(a) => {
                    let arg = a.simplify();
                    if let Expr::Const(c) = arg {
                        let v = other.apply_unary(c);
                        if v.is_finite() {
                            return Expr::Const(v);
                        }
                    }
                    other.with_unary_arg(arg)
                }
                None => other.clone(),
            },
        }
    }

    /// LaTeX rendering used in step narration.
    pub fn to_latex(&self) -> String {
        match self {
            Expr::Var(name) => name.clone(),
            Expr::Const(c) => {
                if *c == PI {
                    "\\pi".to_string()
                } else {
                    fmt_const(*c)
                }
            }
            Expr::Add(lhs, rhs) => match rhs.as_ref() {
                Expr::Const(c) if *c < 0.0 => format!("{} - {}", lhs.to_latex(), fmt_const(-c)),
                _ => format!("{} + {}", lhs.to_latex(), rhs.to_latex()),
            },
            Expr::Sub(lhs, rhs) => {
                let r = if precedence(rhs) == 1 || is_negated(rhs) {
                    format!("\\left({}\\right)", rhs.to_latex())
                } else {
                    rhs.to_latex()
                };
                format!("{} - {}", lhs.to_latex(), r)
            }
            Expr::Mul(lhs, rhs) => {
                let wrap = |e: &Expr, cond: bool| {
                    if cond {
                        format!("\\left({}\\right)", e.to_latex())
                    } else {
                        e.to_latex()
                    }
                };
                if let Expr::Const(c) = lhs.as_ref() {
                    if *c == -1.0 {
                        return format!("-{}", wrap(rhs, precedence(rhs) < 3));
                    }
                    // 3x, 2\sin(x): a constant times a non-number needs no dot
                    if !matches!(rhs.as_ref(), Expr::Const(_)) && precedence(rhs) >= 3 {
                        return format!("{}{}", lhs.to_latex(), rhs.to_latex());
                    }
                }
                format!(
                    "{} \\cdot {}",
                    wrap(lhs, precedence(lhs) < 2),
                    wrap(rhs, precedence(rhs) <= 2)
                )
            }
            Expr::Div(lhs, rhs) => format!("\\frac{{{}}}{{{}}}", lhs.to_latex(), rhs.to_latex()),
            Expr::Pow(base, exp) => {
                if matches!(exp.as_ref(), Expr::Const(h) if *h == 0.5) {
                    return format!("\\sqrt{{{}}}", base.to_latex());
                }
                let b = if precedence(base) <= 3 {
                    format!("\\left({}\\right)", base.to_latex())
                } else {
                    base.to_latex()
                };
                format!("{}^{{{}}}", b, exp.to_latex())
            }
            Expr::Exp(expr) => format!("e^{{{}}}", expr.to_latex()),
            Expr::Ln(expr) => format!("\\ln\\left({}\\right)", expr.to_latex()),
            Expr::sin(expr) => format!("\\sin\\left({}\\right)", expr.to_latex()),
            Expr::cos(expr) => format!("\\cos\\left({}\\right)", expr.to_latex()),
            Expr::tg(expr) => format!("\\tan\\left({}\\right)", expr.to_latex()),
            Expr::arcsin(expr) => format!("\\arcsin\\left({}\\right)", expr.to_latex()),
            Expr::arccos(expr) => format!("\\arccos\\left({}\\right)", expr.to_latex()),
            Expr::arctg(expr) => format!("\\arctan\\left({}\\right)", expr.to_latex()),
        }
    }
}
