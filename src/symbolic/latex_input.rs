//! LaTeX front-end for expressions typed in a math editor.
//!
//! The input is rewritten into the plain syntax understood by
//! [`parse_expression`] and then parsed. Only the subset produced by common
//! WYSIWYG editors is handled: delimiters, `\left`/`\right`, `\frac`, `\sqrt`,
//! `\cdot`, `\times`, function macros and braces.
use regex::Regex;

use crate::errors::{EngineError, EngineResult};
use crate::symbolic::parse_expr::parse_expression;
use crate::symbolic::symbolic_engine::Expr;

fn rx(pattern: &str) -> EngineResult<Regex> {
    Regex::new(pattern).map_err(|e| EngineError::Expression(format!("bad pattern {pattern}: {e}")))
}

/// Apply `re` until the text stops changing (handles nested `\frac`).
fn replace_to_fixpoint(re: &Regex, text: String, rep: &str) -> String {
    let mut current = text;
    loop {
        let next = re.replace_all(&current, rep).into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Rewrite a LaTeX fragment into plain expression syntax.
pub fn latex_to_plain(latex: &str) -> EngineResult<String> {
    if latex.contains("\\%") {
        return Err(EngineError::Expression(
            "percent signs are not supported in expressions".to_string(),
        ));
    }
    let mut s = latex.trim().to_string();
    // math delimiters
    for (open, close) in [("$$", "$$"), ("$", "$"), ("\\(", "\\)"), ("\\[", "\\]")] {
        if s.starts_with(open) && s.ends_with(close) && s.len() >= open.len() + close.len() {
            s = s[open.len()..s.len() - close.len()].trim().to_string();
        }
    }
    s = s.replace("\\left", "").replace("\\right", "");
    s = s.replace("\\cdot", "*").replace("\\times", "*");
    s = s.replace("\\,", " ").replace("\\;", " ").replace("\\!", "");

    let frac = rx(r"\\[dt]?frac\s*\{([^{}]*)\}\s*\{([^{}]*)\}")?;
    s = replace_to_fixpoint(&frac, s, "(($1)/($2))");
    let sqrt = rx(r"\\sqrt\s*\{([^{}]*)\}")?;
    s = replace_to_fixpoint(&sqrt, s, "sqrt($1)");

    let macros = rx(r"\\(arcsin|arccos|arctan|sin|cos|tan|exp|ln|log|pi)")?;
    s = macros.replace_all(&s, "$1").into_owned();
    // f^{2}, e^{x}
    s = s.replace('{', "(").replace('}', ")");
    if let Some(bad) = rx(r"\\[A-Za-z]+")?.find(&s) {
        return Err(EngineError::Expression(format!(
            "unsupported LaTeX command {}",
            bad.as_str()
        )));
    }
    Ok(s)
}

pub fn parse_latex(latex: &str) -> EngineResult<Expr> {
    parse_expression(&latex_to_plain(latex)?)
}

/// Parse and require exactly one free variable, named `variable`.
pub fn parse_latex_for_variable(latex: &str, variable: &str) -> EngineResult<Expr> {
    let expr = parse_latex(latex)?;
    let vars = expr.free_variables();
    let only_expected = vars.len() == 1 && vars.contains(variable);
    if !only_expected {
        let found: Vec<&str> = vars.iter().map(String::as_str).collect();
        return Err(EngineError::Expression(format!(
            "expression must depend only on {variable}, found [{}]",
            found.join(", ")
        )));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn strips_delimiters_and_sizing() {
        assert_eq!(latex_to_plain("$x^{2}-2$").unwrap(), "x^(2)-2");
        assert_eq!(latex_to_plain("\\( \\left(x+1\\right)\\cdot 2 \\)").unwrap(), "(x+1)* 2");
    }

    #[test]
    fn nested_fractions_and_roots() {
        let e = parse_latex("\\frac{1}{\\frac{x}{2}} + \\sqrt{x}").unwrap();
        assert_relative_eq!(e.eval("x", 4.0), 2.5);
        let e = parse_latex("e^{-x} - \\sin\\left(x\\right)").unwrap();
        assert_relative_eq!(e.eval("x", 0.0), 1.0);
    }

    #[test]
    fn percent_and_unknown_commands_are_rejected() {
        assert!(latex_to_plain("50\\%").is_err());
        assert!(parse_latex("\\int x").is_err());
    }

    #[test]
    fn single_variable_requirement() {
        assert!(parse_latex_for_variable("x^{3} - x - 1", "x").is_ok());
        let err = parse_latex_for_variable("x + y", "x").unwrap_err();
        assert!(err.to_string().contains("x, y"));
        assert!(parse_latex_for_variable("t^{2}", "x").is_err());
        assert!(parse_latex_for_variable("2", "x").is_err());
    }
}
