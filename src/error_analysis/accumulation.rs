use log::{debug, info};
use serde::Serialize;
use tabled::Tabled;

use crate::config::ApproxMode;
use crate::error_analysis::decimal::{Decimal, DecimalContext, Rounding, decimal_places};
use crate::errors::{EngineError, EngineResult};

pub const DEFAULT_RATE: &str = "0.0625";

#[derive(Debug, Clone, PartialEq)]
pub struct AccumulationParams {
    pub initial_amount: Decimal,
    pub iterations: usize,
    pub mode: ApproxMode,
    pub rate: Decimal,
    pub interest_display_decimals: u32,
    pub approx_decimals: u32,
}

impl AccumulationParams {
    pub fn new(initial_amount: Decimal, iterations: usize) -> Self {
        Self {
            initial_amount,
            iterations,
            mode: ApproxMode::Trunc,
            rate: DEFAULT_RATE.parse().unwrap_or_default(),
            interest_display_decimals: 4,
            approx_decimals: 2,
        }
    }

    pub fn with_mode(mut self, mode: ApproxMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.rate = rate;
        self
    }
}

/// One compounding period. The raw values are skipped in the rendered table.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct AccumulationRow {
    pub iteration: usize,
    #[tabled(skip)]
    pub prev_amount: Decimal,
    #[tabled(skip)]
    pub interest_real: Decimal,
    #[tabled(skip)]
    pub interest_approx: Decimal,
    #[tabled(skip)]
    pub amount_real: Decimal,
    #[tabled(skip)]
    pub amount_approx: Decimal,
    #[tabled(skip)]
    pub difference: Decimal,
    #[tabled(skip)]
    pub error_accum: Decimal,
    #[tabled(rename = "prev")]
    pub prev_amount_pretty: String,
    #[tabled(rename = "interest")]
    pub interest_real_pretty: String,
    #[tabled(rename = "interest~")]
    pub interest_approx_pretty: String,
    #[tabled(rename = "amount")]
    pub amount_real_pretty: String,
    #[tabled(rename = "amount~")]
    pub amount_approx_pretty: String,
    #[tabled(rename = "difference")]
    pub difference_pretty: String,
    #[tabled(rename = "error accum")]
    pub error_accum_pretty: String,
    #[tabled(skip)]
    pub approx_mode: ApproxMode,
    #[tabled(skip)]
    pub approx_operation_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccumulationSummary {
    pub iterations: usize,
    pub initial_amount_pretty: String,
    pub final_error_accum: Decimal,
    pub final_error_accum_pretty: String,
    pub rate: Decimal,
    pub mode: ApproxMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccumulationResult {
    pub rows: Vec<AccumulationRow>,
    pub summary: AccumulationSummary,
}

impl AccumulationResult {
    pub fn render_table(&self) -> String {
        crate::Utils::tables::render_rows(&self.rows)
    }
}

fn pretty(d: &Decimal, decimals: u32) -> String {
    d.to_fixed(decimals, Rounding::HalfEven, true)
}

/// Compound `initial_amount` at `rate` for `iterations` periods, cutting each
/// period's interest to `approx_decimals` places.
///
/// The approximate amount is carried into the next period, so the per-row
/// differences add up in `error_accum`.
pub fn accumulate_error_iterations(
    params: &AccumulationParams,
    ctx: &DecimalContext,
) -> EngineResult<AccumulationResult> {
    if params.iterations == 0 {
        return Err(EngineError::validation("iterations must be at least 1"));
    }
    let approx = params.approx_decimals;
    let approx_places = decimal_places("approx_decimals", approx)?;
    let display = params.interest_display_decimals;
    let display_places = decimal_places("interest_display_decimals", display)?;
    let (rounding, op_text) = match params.mode {
        ApproxMode::Trunc => (Rounding::Down, format!("truncate to {approx} decimals")),
        ApproxMode::Round => (Rounding::HalfUp, format!("round to {approx} decimals")),
    };

    let mut rows = Vec::with_capacity(params.iterations);
    let mut prev = params.initial_amount.clone();
    let mut error_accum = Decimal::zero();
    for i in 1..=params.iterations {
        let interest_real = ctx.mul(&prev, &params.rate);
        let interest_approx = interest_real.quantize(approx_places, rounding);
        let amount_real = &prev + &interest_real;
        let amount_approx = &prev + &interest_approx;
        let difference = &amount_real - &amount_approx;
        error_accum = &error_accum + &difference;
        debug!("period {i}: interest {interest_real} -> {interest_approx}, accum {error_accum}");

        rows.push(AccumulationRow {
            iteration: i,
            prev_amount_pretty: pretty(&prev, approx),
            interest_real_pretty: pretty(&interest_real.quantize(display_places, Rounding::HalfEven), display),
            interest_approx_pretty: pretty(&interest_approx, approx),
            amount_real_pretty: pretty(&amount_real.quantize(display_places, Rounding::HalfEven), display),
            amount_approx_pretty: pretty(&amount_approx, approx),
            difference_pretty: pretty(&difference, approx),
            error_accum_pretty: pretty(&error_accum, approx),
            prev_amount: prev,
            interest_real,
            interest_approx,
            amount_real,
            amount_approx: amount_approx.clone(),
            difference,
            error_accum: error_accum.clone(),
            approx_mode: params.mode,
            approx_operation_text: op_text.clone(),
        });
        prev = amount_approx;
    }

    let summary = AccumulationSummary {
        iterations: params.iterations,
        initial_amount_pretty: pretty(&params.initial_amount, approx),
        final_error_accum_pretty: pretty(&error_accum, approx),
        final_error_accum: error_accum,
        rate: params.rate.clone(),
        mode: params.mode,
    };
    info!(
        "{} periods ({}): accumulated error {}",
        summary.iterations, summary.mode, summary.final_error_accum_pretty
    );
    Ok(AccumulationResult { rows, summary })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn first_period_by_hand() {
        let params = AccumulationParams::new(d("1000"), 1).with_rate(d("0.0333"));
        let res = accumulate_error_iterations(&params, &DecimalContext::default()).unwrap();
        let row = &res.rows[0];
        assert_eq!(row.interest_real, d("33.3"));
        assert_eq!(row.interest_approx, d("33.30"));
        assert!(row.difference.is_zero());

        let params = AccumulationParams::new(d("1000.55"), 1);
        let res = accumulate_error_iterations(&params, &DecimalContext::default()).unwrap();
        let row = &res.rows[0];
        // 1000.55 · 0.0625 = 62.534375
        assert_eq!(row.interest_real, d("62.534375"));
        assert_eq!(row.interest_approx, d("62.53"));
        assert_eq!(row.difference, d("0.004375"));
        assert_eq!(row.interest_real_pretty, "62.5344");
        assert_eq!(row.amount_real_pretty, "1,063.0844");
        assert_eq!(row.amount_approx_pretty, "1,063.08");
        assert_eq!(row.approx_operation_text, "truncate to 2 decimals");
    }

    #[test]
    fn round_mode_rounds_half_up() {
        let params = AccumulationParams::new(d("100.1"), 1).with_mode(ApproxMode::Round);
        let res = accumulate_error_iterations(&params, &DecimalContext::default()).unwrap();
        // 100.1 · 0.0625 = 6.25625 -> 6.26
        assert_eq!(res.rows[0].interest_approx, d("6.26"));
        assert_eq!(res.rows[0].difference, d("-0.00375"));
    }

    #[test]
    fn accumulated_error_is_the_sum_of_differences() {
        let params = AccumulationParams::new(d("1234.567"), 12);
        let res = accumulate_error_iterations(&params, &DecimalContext::default()).unwrap();
        assert_eq!(res.rows.len(), 12);
        let independent: Decimal = res.rows.iter().map(|r| r.difference.clone()).sum();
        assert_eq!(res.summary.final_error_accum, independent);
        for pair in res.rows.windows(2) {
            assert_eq!(pair[1].prev_amount, pair[0].amount_approx);
        }
        assert!(res.rows.iter().all(|r| !r.difference.is_negative()));
        assert!(res.render_table().contains("error accum"));
    }

    #[test]
    fn zero_iterations_rejected() {
        let params = AccumulationParams::new(d("10"), 0);
        let err = accumulate_error_iterations(&params, &DecimalContext::default()).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn oversized_decimals_rejected() {
        let mut params = AccumulationParams::new(d("10"), 1);
        params.interest_display_decimals = u32::MAX;
        let err = accumulate_error_iterations(&params, &DecimalContext::default()).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("interest_display_decimals"));

        let mut params = AccumulationParams::new(d("10"), 1);
        params.approx_decimals = 29;
        assert!(accumulate_error_iterations(&params, &DecimalContext::default()).is_err());
        params.approx_decimals = 28;
        assert!(accumulate_error_iterations(&params, &DecimalContext::default()).is_ok());
    }

    #[test]
    fn summary_serializes_decimals_as_text() {
        let params = AccumulationParams::new(d("1000.55"), 2);
        let res = accumulate_error_iterations(&params, &DecimalContext::default()).unwrap();
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["summary"]["rate"], "0.0625");
        assert_eq!(json["summary"]["mode"], "trunc");
        assert_eq!(json["rows"][0]["interest_real"], "62.534375");
    }
}
