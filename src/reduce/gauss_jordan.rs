//! Gauss-Jordan reduction: forward pass, backward pass to RREF, analysis and
//! particular solution read straight from the RREF.
use log::info;

use crate::config::EngineOptions;
use crate::errors::EngineResult;
use crate::numeric::{clone_with, matrix_as_fraction};
use crate::reduce::analysis::{analyze_rref, particular_solution_from_rref};
use crate::reduce::elimination::{backward_to_rref, forward_elimination, log_initial};
use crate::reduce::parametric::parametric_from_rref;
use crate::reduce::{
    LinearSystem, ReducedForm, ReductionMethod, RowReductionResult, SystemInput, SystemSummary,
};
use crate::steps::{StepRecorder, StepTag};

pub fn gauss_jordan_solve(
    system: &LinearSystem,
    options: &EngineOptions,
) -> EngineResult<RowReductionResult> {
    options.validate()?;
    let tol = options.tolerance;
    info!(
        "gauss-jordan: {} equations, {} unknowns, pivoting {}",
        system.equations(),
        system.unknowns(),
        options.pivoting
    );
    let mut ab = clone_with(system.augmented());
    let mut rec = StepRecorder::new();
    log_initial(&mut rec, &ab);

    let pivots = forward_elimination(&mut ab, &mut rec, options.pivoting, tol);
    rec.snapshot(StepTag::Upper, "Upper triangular form (U)", &ab);
    let upper = matrix_as_fraction(&ab);

    backward_to_rref(&mut ab, &pivots, tol, Some(&mut rec));
    rec.snapshot(StepTag::Rref, "Reduced row echelon form (RREF)", &ab);

    let analysis = analyze_rref(&ab, tol);
    let solution = particular_solution_from_rref(&ab, &analysis);
    let parametric = analysis
        .is_consistent()
        .then(|| parametric_from_rref(&ab, &analysis, "s", tol));
    info!("gauss-jordan: rank {} -> {}", analysis.rank, analysis.status);

    let reduced_form = ReducedForm {
        upper: Some(upper),
        rref: Some(matrix_as_fraction(&clone_with(&ab))),
        note: "reduced row echelon form (RREF)".to_string(),
    };
    let summary = SystemSummary::build(system, &analysis, solution, parametric, reduced_form, tol);
    Ok(RowReductionResult {
        input: SystemInput::new(ReductionMethod::GaussJordan, system, options.pivoting),
        steps: rec.finish(),
        summary,
    })
}
