use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error_analysis::decimal::{Decimal, DecimalContext, MAX_DISPLAY_DECIMALS, Rounding};

const NUMERATOR: &str = "m - m~";
const DENOMINATOR: &str = "m";

fn fmt(d: &Decimal, decimals: u32) -> String {
    d.to_fixed(decimals, Rounding::HalfEven, true)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsRelInput {
    pub true_value: Decimal,
    pub approx_value: Decimal,
    pub true_value_pretty: String,
    pub approx_value_pretty: String,
    pub decimals_display: u32,
}

/// Symbolic numerator / denominator of an error formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denominator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorStep {
    pub operation: Fraction,
    pub formula: Fraction,
    /// `None` when the error is undefined
    pub value: Option<Decimal>,
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ErrorStep {
    pub fn is_undefined(&self) -> bool {
        self.value.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsRelResult {
    pub input: AbsRelInput,
    pub absolute_error: ErrorStep,
    pub relative_error: ErrorStep,
}

/// `e_a = m - m~` and `e_r = e_a / m`.
///
/// The relative error is rounded half-up to `decimals_display` places. With
/// `m = 0` it is undefined: `value` and `result` are `None` and `note` says
/// why.
pub fn compute_abs_rel_error(
    true_value: &Decimal,
    approx_value: &Decimal,
    decimals_display: u32,
    ctx: &DecimalContext,
) -> AbsRelResult {
    let m = true_value;
    let m_tilde = approx_value;
    let ea = m - m_tilde;
    let numerator_text = format!("{} - {}", fmt(m, decimals_display), fmt(m_tilde, decimals_display));

    let absolute_error = ErrorStep {
        operation: Fraction {
            numerator: NUMERATOR.to_string(),
            denominator: None,
        },
        formula: Fraction {
            numerator: numerator_text.clone(),
            denominator: None,
        },
        result: Some(fmt(&ea, decimals_display)),
        value: Some(ea.clone()),
        note: None,
    };

    let operation = Fraction {
        numerator: NUMERATOR.to_string(),
        denominator: Some(DENOMINATOR.to_string()),
    };
    let formula = Fraction {
        numerator: numerator_text,
        denominator: Some(fmt(m, decimals_display)),
    };
    let relative_error = match ctx.div(&ea, m) {
        Ok(er) => {
            let places = decimals_display.min(MAX_DISPLAY_DECIMALS) as i32;
            let er = er.quantize(places, Rounding::HalfUp);
            ErrorStep {
                operation,
                formula,
                result: Some(fmt(&er, decimals_display)),
                value: Some(er),
                note: None,
            }
        }
        Err(_) => {
            warn!("relative error undefined: true value is 0");
            ErrorStep {
                operation,
                formula,
                value: None,
                result: None,
                note: Some("Undefined: true value m == 0 (division by zero)".to_string()),
            }
        }
    };
    info!(
        "absolute error {} relative error {}",
        absolute_error.result.as_deref().unwrap_or("-"),
        relative_error.result.as_deref().unwrap_or("undefined")
    );

    AbsRelResult {
        input: AbsRelInput {
            true_value: m.clone(),
            approx_value: m_tilde.clone(),
            true_value_pretty: fmt(m, decimals_display),
            approx_value_pretty: fmt(m_tilde, decimals_display),
            decimals_display,
        },
        absolute_error,
        relative_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn pi_approximated_by_22_over_7() {
        let ctx = DecimalContext::default();
        let res = compute_abs_rel_error(&d("3.1415926"), &d("3.1428571"), 6, &ctx);
        assert_eq!(res.absolute_error.value, Some(d("-0.0012645")));
        assert_eq!(res.absolute_error.result.as_deref(), Some("-0.001264"));
        assert_eq!(res.absolute_error.formula.numerator, "3.141593 - 3.142857");
        // -0.0012645 / 3.1415926 = -0.000402509...
        assert_eq!(res.relative_error.value, Some(d("-0.000403")));
        assert_eq!(res.relative_error.formula.denominator.as_deref(), Some("3.141593"));
        assert!(!res.relative_error.is_undefined());
    }

    #[test]
    fn large_values_use_thousands_separators() {
        let ctx = DecimalContext::default();
        let res = compute_abs_rel_error(&d("10000"), &d("9999"), 2, &ctx);
        assert_eq!(res.input.true_value_pretty, "10,000.00");
        assert_eq!(res.absolute_error.result.as_deref(), Some("1.00"));
        assert_eq!(res.relative_error.result.as_deref(), Some("0.00"));
    }

    #[test]
    fn zero_true_value_is_flagged_not_raised() {
        let ctx = DecimalContext::default();
        let res = compute_abs_rel_error(&d("0"), &d("0.5"), 4, &ctx);
        assert_eq!(res.absolute_error.result.as_deref(), Some("-0.5000"));
        assert!(res.relative_error.is_undefined());
        assert!(res.relative_error.note.as_deref().unwrap().starts_with("Undefined"));
        let json = serde_json::to_value(&res).unwrap();
        assert!(json["relative_error"]["result"].is_null());
        assert!(json["absolute_error"].get("note").is_none());
    }
}
