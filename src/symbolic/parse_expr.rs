//! Text to [`Expr`] parser.
//!
//! Grammar (lowest to highest binding):
//! ```text
//! expr    = term (('+' | '-') term)*
//! term    = unary (('*' | '/') unary | implicit)*
//! unary   = '-' unary | '+' unary | power
//! power   = primary ('^' unary)?          right associative
//! primary = number | function '(' expr ')' | constant | variable | '(' expr ')'
//! ```
//! `implicit` is a power starting with a letter or `(`, so `3x`, `2(x+1)` and
//! `x sin(x)` read as products.
use nom::{
    IResult, Parser,
    branch::alt,
    character::complete::{alpha1, alphanumeric0, char, digit0, digit1, multispace0, one_of, satisfy},
    combinator::{all_consuming, map, map_res, opt, peek, recognize},
    error::Error,
    multi::fold_many0,
    sequence::{delimited, pair, preceded},
};

use crate::errors::{EngineError, EngineResult};
use crate::symbolic::symbolic_engine::Expr;

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = Error<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn number(input: &str) -> IResult<&str, Expr> {
    map_res(
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        |s: &str| s.parse::<f64>().map(Expr::Const),
    )
    .parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, alphanumeric0)).parse(input)
}

fn function_node(name: &str, arg: Expr) -> Option<Expr> {
    let arg = arg.boxed();
    let node = match name {
        "sin" => Expr::sin(arg),
        "cos" => Expr::cos(arg),
        "tan" | "tg" => Expr::tg(arg),
        "arcsin" | "asin" => Expr::arcsin(arg),
        "arccos" | "acos" => Expr::arccos(arg),
        "arctan" | "atan" | "arctg" => Expr::arctg(arg),
        "exp" => Expr::Exp(arg),
        "ln" | "log" => Expr::Ln(arg),
        "sqrt" => Expr::Pow(arg, Box::new(Expr::Const(0.5))),
        _ => return None,
    };
    Some(node)
}

/// Function call, named constant or variable.
fn named(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = identifier(input)?;
    let call: IResult<&str, Expr> =
        preceded(multispace0, delimited(char('('), ws(expr), char(')'))).parse(rest);
    if let Ok((after, arg)) = call {
        if let Some(node) = function_node(name, arg) {
            return Ok((after, node));
        }
    }
    let leaf = match name {
        "pi" => Expr::Const(std::f64::consts::PI),
        "e" => Expr::Const(std::f64::consts::E),
        _ => Expr::Var(name.to_string()),
    };
    Ok((rest, leaf))
}

fn primary(input: &str) -> IResult<&str, Expr> {
    alt((
        number,
        named,
        delimited(char('('), ws(expr), char(')')),
        delimited(char('{'), ws(expr), char('}')),
    ))
    .parse(input)
}

fn power(input: &str) -> IResult<&str, Expr> {
    let (rest, base) = primary(input)?;
    let (rest, exponent) = opt(preceded(ws(char('^')), unary)).parse(rest)?;
    match exponent {
        Some(e) => Ok((rest, base.pow(e))),
        None => Ok((rest, base)),
    }
}

fn unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(ws(char('-')), unary), |e| match e {
            Expr::Const(c) => Expr::Const(-c),
            other => -other,
        }),
        preceded(ws(char('+')), unary),
        power,
    ))
    .parse(input)
}

/// A factor written without `*`: must start with a letter or an opening parenthesis.
fn implicit_factor(input: &str) -> IResult<&str, (char, Expr)> {
    let (rest, _) = preceded(
        multispace0,
        peek(satisfy(|c: char| c.is_alphabetic() || c == '(')),
    )
    .parse(input)?;
    map(power, |e| ('*', e)).parse(rest)
}

fn term(input: &str) -> IResult<&str, Expr> {
    let (rest, first) = unary(input)?;
    fold_many0(
        alt((pair(ws(one_of("*/")), unary), implicit_factor)),
        move || first.clone(),
        |acc, (op, rhs)| if op == '*' { acc * rhs } else { acc / rhs },
    )
    .parse(rest)
}

fn expr(input: &str) -> IResult<&str, Expr> {
    let (rest, first) = term(input)?;
    fold_many0(
        pair(ws(one_of("+-")), term),
        move || first.clone(),
        |acc, (op, rhs)| if op == '+' { acc + rhs } else { acc - rhs },
    )
    .parse(rest)
}

/// Parse a whole string into an expression tree.
pub fn parse_expression(input: &str) -> EngineResult<Expr> {
    if input.trim().is_empty() {
        return Err(EngineError::Expression("empty expression".to_string()));
    }
    match all_consuming(ws(expr)).parse(input) {
        Ok((_, e)) => Ok(e),
        Err(err) => Err(EngineError::Expression(format!(
            "cannot parse '{}': {}",
            input.trim(),
            err
        ))),
    }
}
