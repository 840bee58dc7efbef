//! # Row-reduction engine
//!
//! Gaussian elimination (upper form plus back substitution) and Gauss-Jordan
//! reduction (RREF) of a linear system `A x = b`, each returning the full step
//! log and a summary: ranks, classification, basic/free variables, a particular
//! solution and the parametric description of the solution set.
pub mod analysis;
pub mod elimination;
pub mod gauss;
pub mod gauss_jordan;
pub mod parametric;

use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::config::{EngineOptions, Pivoting};
use crate::errors::{EngineError, EngineResult};
use crate::numeric::{
    Matrix, format_number, from_rows, is_close, matrix_as_fraction, shape, to_augmented, to_rows,
};
use crate::steps::StepLog;

pub use analysis::{Analysis, Dependence, Pivot, SolutionStatus};
pub use gauss::gauss_solve;
pub use gauss_jordan::gauss_jordan_solve;
pub use parametric::{ParametricForm, xsub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReductionMethod {
    Gauss,
    #[strum(to_string = "gauss_jordan", serialize = "gauss-jordan")]
    GaussJordan,
}

/// A validated augmented system `[A | b]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    augmented: Matrix,
}

impl LinearSystem {
    pub fn new(a: &[Vec<f64>], b: &[f64]) -> EngineResult<Self> {
        if a.is_empty() {
            return Err(EngineError::validation("the system has no equations"));
        }
        Self::from_matrix(to_augmented(a, b)?)
    }

    /// Rows already carrying the RHS as their last entry.
    pub fn from_augmented(rows: &[Vec<f64>]) -> EngineResult<Self> {
        if rows.is_empty() {
            return Err(EngineError::validation("the system has no equations"));
        }
        Self::from_matrix(from_rows(rows)?)
    }

    fn from_matrix(augmented: Matrix) -> EngineResult<Self> {
        let (_, cols) = shape(&augmented);
        if cols < 2 {
            return Err(EngineError::dimension(
                "linear system",
                format!("augmented matrix needs at least 2 columns, got {cols}"),
            ));
        }
        if augmented.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::validation("matrix entries must be finite numbers"));
        }
        Ok(Self { augmented })
    }

    pub fn augmented(&self) -> &Matrix {
        &self.augmented
    }

    pub fn equations(&self) -> usize {
        self.augmented.nrows()
    }

    pub fn unknowns(&self) -> usize {
        self.augmented.ncols() - 1
    }

    pub fn rhs(&self) -> Vec<f64> {
        self.augmented.column(self.unknowns()).iter().copied().collect()
    }

    pub fn coefficients(&self) -> Matrix {
        self.augmented.columns(0, self.unknowns()).into_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInput {
    pub method: ReductionMethod,
    pub pivoting: Pivoting,
    pub augmented: Vec<Vec<f64>>,
    pub augmented_pretty: Vec<Vec<String>>,
}

impl SystemInput {
    fn new(method: ReductionMethod, system: &LinearSystem, pivoting: Pivoting) -> Self {
        Self {
            method,
            pivoting,
            augmented: to_rows(system.augmented()),
            augmented_pretty: matrix_as_fraction(system.augmented()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSplit {
    pub basic: Vec<usize>,
    pub free: Vec<usize>,
    pub basic_names: Vec<String>,
    pub free_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParametricSummary {
    /// true only for infinitely many solutions
    pub exists: bool,
    pub particular: Option<Vec<f64>>,
    pub particular_pretty: Option<Vec<String>>,
    pub pretty: Vec<String>,
    pub symbolic: Option<ParametricForm>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReducedForm {
    pub upper: Option<Vec<Vec<String>>>,
    pub rref: Option<Vec<Vec<String>>>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSummary {
    pub rank_a: usize,
    pub rank_ab: usize,
    pub solution_type: SolutionStatus,
    pub inconsistent_rows: Vec<usize>,
    pub homogeneous: bool,
    pub dependence: Dependence,
    pub trivial_solution: bool,
    pub variables: VariableSplit,
    pub parametric_form: ParametricSummary,
    pub reduced_form: ReducedForm,
}

impl SystemSummary {
    fn build(
        system: &LinearSystem,
        analysis: &Analysis,
        solution: Option<Vec<f64>>,
        parametric: Option<ParametricForm>,
        reduced_form: ReducedForm,
        tol: f64,
    ) -> Self {
        let homogeneous = system.rhs().iter().all(|&v| is_close(v, 0.0, tol));
        let trivial_solution = solution
            .as_ref()
            .is_some_and(|x| x.iter().all(|&v| is_close(v, 0.0, tol)));
        let names = |cols: &[usize]| cols.iter().map(|&c| xsub(c + 1)).collect::<Vec<_>>();
        Self {
            rank_a: analysis.rank,
            rank_ab: analysis.rank_ab(),
            solution_type: analysis.status,
            inconsistent_rows: analysis.inconsistent_rows.clone(),
            homogeneous,
            dependence: analysis.dependence(),
            trivial_solution,
            variables: VariableSplit {
                basic: analysis.basic_vars.clone(),
                free: analysis.free_vars.clone(),
                basic_names: names(&analysis.basic_vars),
                free_names: names(&analysis.free_vars),
            },
            parametric_form: ParametricSummary {
                exists: analysis.status == SolutionStatus::Infinite,
                particular_pretty: solution
                    .as_ref()
                    .map(|x| x.iter().map(|&v| format_number(v)).collect()),
                particular: solution,
                pretty: parametric.as_ref().map(|p| p.pretty.clone()).unwrap_or_default(),
                symbolic: parametric,
            },
            reduced_form,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowReductionResult {
    pub input: SystemInput,
    pub steps: StepLog,
    pub summary: SystemSummary,
}

impl RowReductionResult {
    pub fn particular(&self) -> Option<&[f64]> {
        self.summary.parametric_form.particular.as_deref()
    }
}

/// Solve with the requested method.
pub fn solve_linear_system(
    system: &LinearSystem,
    method: ReductionMethod,
    options: &EngineOptions,
) -> EngineResult<RowReductionResult> {
    match method {
        ReductionMethod::Gauss => gauss_solve(system, options),
        ReductionMethod::GaussJordan => gauss_jordan_solve(system, options),
    }
}
