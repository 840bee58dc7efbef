use std::f64::consts::PI;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::{AngleMode, EngineOptions};
use crate::error_analysis::decimal::{Decimal, Rounding, decimal_places};
use crate::errors::{EngineError, EngineResult};
use crate::symbolic::expression::{BoundExpression, Expression};

const METHOD: &str = "propagation_error";

/// Half-up rounding of the float's decimal text to `decimals` places.
fn pretty(v: f64, decimals: u32) -> EngineResult<String> {
    Decimal::from_f64(v)
        .map(|d| d.to_fixed(decimals, Rounding::HalfUp, false))
        .ok_or_else(|| {
            EngineError::degenerate(METHOD, None, format!("non-finite intermediate value {v}"))
        })
}

fn default_variable() -> String {
    "x".to_string()
}

fn default_decimals() -> u32 {
    4
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationRequest {
    pub function_latex: String,
    #[serde(default = "default_variable")]
    pub variable: String,
    pub x0: f64,
    pub delta_x: f64,
    /// falls back to [`EngineOptions::angle_mode`]
    #[serde(default)]
    pub angle_mode: Option<AngleMode>,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropagationInput {
    pub function_latex: String,
    pub x0: String,
    pub delta_x: String,
    pub angle_mode: AngleMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropagationStep {
    pub operation: String,
    pub formula: Vec<String>,
    pub value: f64,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropagationSteps {
    pub derivative: PropagationStep,
    pub approx_delta_y: PropagationStep,
    pub exact_delta_y: PropagationStep,
    pub absolute_error: PropagationStep,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropagationSummary {
    pub delta_y_approx: String,
    pub delta_y_real: String,
    pub absolute_error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropagationResult {
    pub input: PropagationInput,
    pub steps: PropagationSteps,
    pub result: PropagationSummary,
}

/// Compare the differential estimate `Δy ≈ f'(x0)·Δx` with the exact change
/// `f(x0 + Δx) - f(x0)`.
///
/// In degree mode `x0` and `Δx` are converted with `π/180` before any
/// evaluation; the labels keep the degree values.
pub fn propagation_error<E: Expression>(
    f: &E,
    x0: f64,
    delta_x: f64,
    angle_mode: AngleMode,
    decimals: u32,
) -> EngineResult<PropagationResult> {
    if !x0.is_finite() || !delta_x.is_finite() {
        return Err(EngineError::validation("x0 and delta_x must be finite"));
    }
    decimal_places("decimals", decimals)?;
    let (x0_eval, dx_eval) = match angle_mode {
        AngleMode::Rad => (x0, delta_x),
        AngleMode::Deg => (x0 * PI / 180.0, delta_x * PI / 180.0),
    };
    let df = f.derivative();

    let f_x0 = f.evaluate(x0_eval);
    let f_x0_dx = f.evaluate(x0_eval + dx_eval);
    let df_x0 = df.evaluate(x0_eval);
    let dy_approx = df_x0 * dx_eval;
    let dy_real = f_x0_dx - f_x0;
    let error_abs = (dy_real - dy_approx).abs();
    debug!("f(x0) = {f_x0}, f(x0+dx) = {f_x0_dx}, f'(x0) = {df_x0}");

    let f_tex = f.to_latex();
    let df_tex = df.to_latex();
    let x0_str = pretty(x0, decimals)?;
    let dx_str = pretty(delta_x, decimals)?;
    let df_x0_str = pretty(df_x0, decimals)?;
    let f_x0_str = pretty(f_x0, decimals)?;
    let f_x0dx_str = pretty(f_x0_dx, decimals)?;
    let dy_approx_str = pretty(dy_approx, decimals)?;
    let dy_real_str = pretty(dy_real, decimals)?;
    let err_str = pretty(error_abs, decimals)?;

    let (x_label, x_plus_dx_label) = match angle_mode {
        AngleMode::Deg => (
            format!(r"{x0_str}^\circ"),
            format!(r"({x0_str} + {dx_str})^\circ"),
        ),
        AngleMode::Rad => (x0_str.clone(), format!("{x0_str} + {dx_str}")),
    };

    let steps = PropagationSteps {
        derivative: PropagationStep {
            operation: r"f'(x) = \frac{d}{dx} f(x)".to_string(),
            formula: vec![
                format!("f(x) = {f_tex}"),
                format!("f'(x) = {df_tex}"),
                format!(r"f'({x_label}) \approx {df_x0_str}"),
            ],
            value: df_x0,
            result: df_x0_str.clone(),
        },
        approx_delta_y: PropagationStep {
            operation: r"\Delta y_{\text{aprox}} \approx f'(x_0)\,\Delta x".to_string(),
            formula: vec![format!(
                r"\Delta y_{{\text{{aprox}}}} \approx {df_x0_str} \cdot {dx_str}"
            )],
            value: dy_approx,
            result: dy_approx_str.clone(),
        },
        exact_delta_y: PropagationStep {
            operation: r"\Delta y_{\text{real}} = f(x_0 + \Delta x) - f(x_0)".to_string(),
            formula: vec![format!(
                r"\Delta y_{{\text{{real}}}} = f({x_plus_dx_label}) - f({x_label}) = {f_x0dx_str} - {f_x0_str}"
            )],
            value: dy_real,
            result: dy_real_str.clone(),
        },
        absolute_error: PropagationStep {
            operation: r"e_a = |\Delta y_{\text{real}} - \Delta y_{\text{aprox}}|".to_string(),
            formula: vec![format!("|{dy_real_str} - {dy_approx_str}|")],
            value: error_abs,
            result: err_str.clone(),
        },
    };
    info!("propagation error of {f_tex} at {x_label}: e_a = {err_str}");

    Ok(PropagationResult {
        input: PropagationInput {
            function_latex: f_tex,
            x0: x0_str,
            delta_x: dx_str,
            angle_mode,
        },
        steps,
        result: PropagationSummary {
            delta_y_approx: dy_approx_str,
            delta_y_real: dy_real_str,
            absolute_error: err_str,
        },
    })
}

pub fn propagation_error_api(
    request: &PropagationRequest,
    options: &EngineOptions,
) -> EngineResult<PropagationResult> {
    let f = BoundExpression::parse_latex(&request.function_latex, &request.variable)?;
    propagation_error(
        &f,
        request.x0,
        request.delta_x,
        request.angle_mode.unwrap_or(options.angle_mode),
        request.decimals,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn square_near_two() {
        let f = BoundExpression::parse("x^2", "x").unwrap();
        let res = propagation_error(&f, 2.0, 0.1, AngleMode::Rad, 4).unwrap();
        // f'(2)·0.1 = 0.4, 2.1² - 2² = 0.41
        assert_relative_eq!(res.steps.approx_delta_y.value, 0.4, epsilon = 1e-12);
        assert_relative_eq!(res.steps.exact_delta_y.value, 0.41, epsilon = 1e-12);
        assert_eq!(res.result.delta_y_approx, "0.4000");
        assert_eq!(res.result.delta_y_real, "0.4100");
        assert_eq!(res.result.absolute_error, "0.0100");
        assert_eq!(res.steps.derivative.result, "4.0000");
        assert_eq!(res.steps.exact_delta_y.formula[0].matches("2.0000 + 0.1000").count(), 1);
    }

    #[test]
    fn degrees_use_pi_over_180() {
        let f = BoundExpression::parse("sin(x)", "x").unwrap();
        let res = propagation_error(&f, 30.0, 1.0, AngleMode::Deg, 6).unwrap();
        let x0 = PI / 6.0;
        let dx = PI / 180.0;
        assert_relative_eq!(res.steps.derivative.value, x0.cos(), epsilon = 1e-12);
        assert_relative_eq!(res.steps.approx_delta_y.value, x0.cos() * dx, epsilon = 1e-12);
        assert_relative_eq!(
            res.steps.exact_delta_y.value,
            (x0 + dx).sin() - x0.sin(),
            epsilon = 1e-12
        );
        assert_eq!(res.input.x0, "30.000000");
        assert!(res.steps.derivative.formula[2].starts_with(r"f'(30.000000^\circ)"));
    }

    #[test]
    fn api_parses_latex() {
        let req: PropagationRequest = serde_json::from_str(
            r#"{"function_latex": "\\sqrt{x}", "x0": 4, "delta_x": 0.5}"#,
        )
        .unwrap();
        let res = propagation_error_api(&req, &EngineOptions::default()).unwrap();
        assert_eq!(req.decimals, 4);
        assert_eq!(res.steps.derivative.result, "0.2500");
        assert_eq!(res.result.delta_y_approx, "0.1250");
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["input"]["angle_mode"], "rad");
    }

    #[test]
    fn angle_mode_falls_back_to_options() {
        let req: PropagationRequest = serde_json::from_str(
            r#"{"function_latex": "\\sin\\left(x\\right)", "x0": 30, "delta_x": 1}"#,
        )
        .unwrap();
        assert_eq!(req.angle_mode, None);
        let options = EngineOptions {
            angle_mode: AngleMode::Deg,
            ..EngineOptions::default()
        };
        let res = propagation_error_api(&req, &options).unwrap();
        assert_eq!(res.input.angle_mode, AngleMode::Deg);
        assert_relative_eq!(res.steps.derivative.value, (PI / 6.0).cos(), epsilon = 1e-12);

        let rad = PropagationRequest {
            angle_mode: Some(AngleMode::Rad),
            ..req
        };
        let res = propagation_error_api(&rad, &options).unwrap();
        assert_relative_eq!(res.steps.derivative.value, 30.0_f64.cos(), epsilon = 1e-12);
    }

    #[test]
    fn oversized_decimals_rejected() {
        let f = BoundExpression::parse("x^2", "x").unwrap();
        let err = propagation_error(&f, 2.0, 0.1, AngleMode::Rad, 1_000).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn non_finite_values_are_reported() {
        let f = BoundExpression::parse("ln(x)", "x").unwrap();
        let err = propagation_error(&f, -1.0, 0.1, AngleMode::Rad, 4).unwrap_err();
        assert_eq!(err.code(), "DEGENERATE_METHOD");
    }
}
