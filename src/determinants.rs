//! # Determinant engine
//!
//! Rule of Sarrus (3x3), cofactor expansion (any order up to 63) and a check of
//! the classic determinant properties against the computed value.
//!
//! ```ignore
//! let res = determinant_api(&[vec![1.0, 2.0], vec![3.0, 4.0]], DeterminantMethod::Cofactors)?;
//! assert_eq!(res.result.determinant_pretty, "-2");
//! ```
pub mod cofactor;
pub mod properties;
pub mod sarrus;
#[cfg(test)]
mod determinants_tests;

use log::info;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::errors::EngineResult;
use crate::numeric::{Matrix, format_number, from_rows, matrix_as_fraction};
use crate::steps::StepLog;

pub use cofactor::{cofactor_value, determinant_cofactors};
pub use properties::{DeterminantProperties, validate_determinant_properties};
pub use sarrus::determinant_sarrus;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeterminantMethod {
    Sarrus,
    #[default]
    Cofactors,
    /// same expansion as `Cofactors`
    Cramer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeterminantInput {
    pub method: DeterminantMethod,
    pub a: Vec<Vec<f64>>,
    pub a_pretty: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeterminantValue {
    pub determinant: f64,
    pub determinant_pretty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeterminantResult {
    pub input: DeterminantInput,
    pub steps: StepLog,
    pub result: DeterminantValue,
    pub properties: DeterminantProperties,
}

pub fn determinant(a: &Matrix, method: DeterminantMethod) -> EngineResult<(f64, StepLog)> {
    match method {
        DeterminantMethod::Sarrus => determinant_sarrus(a),
        DeterminantMethod::Cofactors | DeterminantMethod::Cramer => determinant_cofactors(a),
    }
}

/// Determinant with steps and the property report.
pub fn determinant_api(a: &[Vec<f64>], method: DeterminantMethod) -> EngineResult<DeterminantResult> {
    let m = from_rows(a)?;
    info!("determinant of a {}x{} matrix by {method}", m.nrows(), m.ncols());
    let (det, steps) = determinant(&m, method)?;
    let properties = validate_determinant_properties(&m, det);
    Ok(DeterminantResult {
        input: DeterminantInput {
            method,
            a: a.to_vec(),
            a_pretty: matrix_as_fraction(&m),
        },
        steps,
        result: DeterminantValue {
            determinant: det,
            determinant_pretty: format_number(det),
        },
        properties,
    })
}
