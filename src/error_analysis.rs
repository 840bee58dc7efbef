//! # Error analysis
//!
//! Absolute and relative error, propagation of an input error through a
//! function, and accumulation of rounding errors over compounding periods.
//! Monetary and error values are [`Decimal`]s, so nothing here is disturbed
//! by binary floating point. The `*_api` entry points build their
//! [`DecimalContext`] from [`EngineOptions::precision`] and fall back to the
//! options for any display setting a request leaves out.
pub mod abs_rel;
pub mod accumulation;
pub mod decimal;
pub mod propagation;

use serde::{Deserialize, Serialize};

use crate::config::{ApproxMode, EngineOptions};
use crate::errors::EngineResult;

pub use abs_rel::{AbsRelResult, ErrorStep, compute_abs_rel_error};
pub use accumulation::{
    AccumulationParams, AccumulationResult, AccumulationRow, accumulate_error_iterations,
};
pub use decimal::{Decimal, DecimalContext, Rounding, decimal_places};
pub use propagation::{
    PropagationRequest, PropagationResult, propagation_error, propagation_error_api,
};

fn four() -> u32 {
    4
}

fn two() -> u32 {
    2
}

fn default_rate() -> Decimal {
    accumulation::DEFAULT_RATE.parse().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsRelRequest {
    pub true_value: Decimal,
    pub approx_value: Decimal,
    /// falls back to [`EngineOptions::decimals_display`]
    #[serde(default)]
    pub decimals_display: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationRequest {
    pub initial_amount: Decimal,
    pub iterations: usize,
    /// falls back to [`EngineOptions::mode`]
    #[serde(default)]
    pub mode: Option<ApproxMode>,
    #[serde(default = "default_rate")]
    pub rate: Decimal,
    #[serde(default = "four")]
    pub interest_display_decimals: u32,
    #[serde(default = "two")]
    pub approx_decimals: u32,
}

impl AccumulationRequest {
    pub fn to_params(&self, options: &EngineOptions) -> AccumulationParams {
        AccumulationParams {
            initial_amount: self.initial_amount.clone(),
            iterations: self.iterations,
            mode: self.mode.unwrap_or(options.mode),
            rate: self.rate.clone(),
            interest_display_decimals: self.interest_display_decimals,
            approx_decimals: self.approx_decimals,
        }
    }
}

pub fn abs_rel_error_api(
    request: &AbsRelRequest,
    options: &EngineOptions,
) -> EngineResult<AbsRelResult> {
    let ctx = DecimalContext::new(options.precision)?;
    let decimals = request.decimals_display.unwrap_or(options.decimals_display);
    decimal_places("decimals_display", decimals)?;
    Ok(compute_abs_rel_error(
        &request.true_value,
        &request.approx_value,
        decimals,
        &ctx,
    ))
}

pub fn error_accumulation_api(
    request: &AccumulationRequest,
    options: &EngineOptions,
) -> EngineResult<AccumulationResult> {
    let ctx = DecimalContext::new(options.precision)?;
    accumulate_error_iterations(&request.to_params(options), &ctx)
}
