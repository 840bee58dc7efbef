//! # Matrix algebra engine
//!
//! Sums, differences, scalar multiples, transpose, products (single and
//! chained), the Gaussian determinant and the inverse, each with its steps.
//! [`matrix_ops_api`] dispatches a [`MatrixOpRequest`] by operation name.
pub mod elementwise;
pub mod gaussian_determinant;
pub mod inverse;
pub mod product;
#[cfg(test)]
mod matrix_ops_tests;

use log::info;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::errors::{EngineError, EngineResult};
use crate::numeric::{Matrix, TOL, from_rows, matrix_as_fraction, to_rows};
use crate::steps::StepLog;

pub use elementwise::{add, scalar_mult, sub, sub_many, sum_many, transpose};
pub use gaussian_determinant::gaussian_determinant;
pub use inverse::inverse;
pub use product::{matmul, matmul_chain};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MatrixOperation {
    Add,
    Sub,
    Scalar,
    Transpose,
    Matmul,
    SumMany,
    SubMany,
    MatmulChain,
    Inverse,
}

/// Operands for one call; which fields are needed depends on `operation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixOpRequest {
    pub operation: MatrixOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrices: Option<Vec<Vec<Vec<f64>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<f64>,
}

impl MatrixOpRequest {
    pub fn new(operation: MatrixOperation) -> Self {
        Self {
            operation,
            a: None,
            b: None,
            matrices: None,
            scalar: None,
        }
    }

    pub fn with_a(mut self, a: Vec<Vec<f64>>) -> Self {
        self.a = Some(a);
        self
    }

    pub fn with_b(mut self, b: Vec<Vec<f64>>) -> Self {
        self.b = Some(b);
        self
    }

    pub fn with_matrices(mut self, matrices: Vec<Vec<Vec<f64>>>) -> Self {
        self.matrices = Some(matrices);
        self
    }

    pub fn with_scalar(mut self, scalar: f64) -> Self {
        self.scalar = Some(scalar);
        self
    }

    fn operand(&self, name: &str, rows: &Option<Vec<Vec<f64>>>) -> EngineResult<Matrix> {
        let rows = rows.as_ref().ok_or_else(|| {
            EngineError::validation(format!("{} requires matrix {name}", self.operation))
        })?;
        let m = from_rows(rows)?;
        if m.is_empty() {
            return Err(EngineError::validation(format!("matrix {name} is empty")));
        }
        Ok(m)
    }

    fn operand_list(&self) -> EngineResult<Vec<Matrix>> {
        let list = self.matrices.as_ref().ok_or_else(|| {
            EngineError::validation(format!("{} requires a list of matrices", self.operation))
        })?;
        list.iter().map(|rows| from_rows(rows)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixValue {
    pub matrix: Vec<Vec<f64>>,
    pub matrix_pretty: Vec<Vec<String>>,
}

impl From<&Matrix> for MatrixValue {
    fn from(m: &Matrix) -> Self {
        Self {
            matrix: to_rows(m),
            matrix_pretty: matrix_as_fraction(m),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixOpResult {
    pub input: MatrixOpRequest,
    pub steps: StepLog,
    pub result: MatrixValue,
}

pub fn matrix_ops_api(request: &MatrixOpRequest) -> EngineResult<MatrixOpResult> {
    info!("matrix operation {}", request.operation);
    let (c, steps) = match request.operation {
        MatrixOperation::Add => add(&request.operand("A", &request.a)?, &request.operand("B", &request.b)?)?,
        MatrixOperation::Sub => sub(&request.operand("A", &request.a)?, &request.operand("B", &request.b)?)?,
        MatrixOperation::Scalar => {
            let alpha = request
                .scalar
                .ok_or_else(|| EngineError::validation("scalar requires a scalar value"))?;
            scalar_mult(alpha, &request.operand("A", &request.a)?)?
        }
        MatrixOperation::Transpose => transpose(&request.operand("A", &request.a)?),
        MatrixOperation::Matmul => {
            matmul(&request.operand("A", &request.a)?, &request.operand("B", &request.b)?)?
        }
        MatrixOperation::SumMany => sum_many(&request.operand_list()?)?,
        MatrixOperation::SubMany => sub_many(&request.operand_list()?)?,
        MatrixOperation::MatmulChain => matmul_chain(&request.operand_list()?)?,
        MatrixOperation::Inverse => inverse(&request.operand("A", &request.a)?, TOL)?,
    };
    Ok(MatrixOpResult {
        input: request.clone(),
        steps,
        result: MatrixValue::from(&c),
    })
}
