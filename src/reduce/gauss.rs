//! Gaussian elimination: forward pass to upper form, analysis on the upper
//! form, back substitution with free variables at 0.
use log::info;

use crate::config::EngineOptions;
use crate::errors::EngineResult;
use crate::numeric::{clone_with, matrix_as_fraction};
use crate::reduce::analysis::{analyze_from_upper, back_substitution_particular};
use crate::reduce::elimination::{backward_to_rref, forward_elimination, log_initial};
use crate::reduce::parametric::parametric_from_rref;
use crate::reduce::{
    LinearSystem, ReducedForm, ReductionMethod, RowReductionResult, SystemInput, SystemSummary,
};
use crate::steps::{StepRecorder, StepTag};

pub fn gauss_solve(system: &LinearSystem, options: &EngineOptions) -> EngineResult<RowReductionResult> {
    options.validate()?;
    let tol = options.tolerance;
    info!(
        "gauss: {} equations, {} unknowns, pivoting {}",
        system.equations(),
        system.unknowns(),
        options.pivoting
    );
    let mut ab = clone_with(system.augmented());
    let mut rec = StepRecorder::new();
    log_initial(&mut rec, &ab);

    let pivots = forward_elimination(&mut ab, &mut rec, options.pivoting, tol);
    rec.snapshot(StepTag::Upper, "Upper triangular form (U)", &ab);

    let analysis = analyze_from_upper(&ab, tol);
    debug_assert_eq!(analysis.rank, pivots.len());
    let (solution, rref, parametric) = if analysis.is_consistent() {
        let solution = back_substitution_particular(&ab, &analysis.pivots, tol);
        // the parametric form is read from a silent RREF copy of U
        let mut rref = clone_with(&ab);
        backward_to_rref(&mut rref, &analysis.pivots, tol, None);
        let parametric = parametric_from_rref(&rref, &analysis, "s", tol);
        (Some(solution), Some(rref), Some(parametric))
    } else {
        (None, None, None)
    };
    info!("gauss: rank {} -> {}", analysis.rank, analysis.status);

    let reduced_form = ReducedForm {
        upper: Some(matrix_as_fraction(&ab)),
        rref: rref.as_ref().map(matrix_as_fraction),
        note: "upper triangular form (U)".to_string(),
    };
    let summary = SystemSummary::build(system, &analysis, solution, parametric, reduced_form, tol);
    Ok(RowReductionResult {
        input: SystemInput::new(ReductionMethod::Gauss, system, options.pivoting),
        steps: rec.finish(),
        summary,
    })
}
