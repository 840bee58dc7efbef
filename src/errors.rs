//! Error type shared by every engine.
//!
//! All failures are raised synchronously before or during a computation and
//! carry enough context (operation, shapes, iteration) to be shown to a student.
//! An undefined relative error is not an error: it is flagged in the payload.
use serde::Serialize;

use crate::numeric::format_number;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Malformed input: ragged rows, empty matrices, unknown option strings.
    #[error("validation error: {0}")]
    Validation(String),
    /// Operand shapes incompatible with the requested operation.
    #[error("dimension error in {operation}: {detail}")]
    Dimension { operation: String, detail: String },
    #[error("singular matrix: det(A) = {}", pretty(.determinant))]
    SingularMatrix { determinant: f64 },
    /// A numerical method hit a state it cannot continue from.
    #[error("{method}: {reason}{}", iteration_suffix(.iteration))]
    DegenerateMethod {
        method: String,
        iteration: Option<usize>,
        reason: String,
    },
    #[error("expression error: {0}")]
    Expression(String),
    #[error("io error: {0}")]
    Io(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

fn pretty(value: &f64) -> String {
    format_number(*value)
}

fn iteration_suffix(iteration: &Option<usize>) -> String {
    iteration
        .map(|k| format!(" (iteration {k})"))
        .unwrap_or_default()
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }

    /// Shape mismatch between two operands, shapes given as `(rows, cols)`.
    pub fn shape_mismatch(
        operation: &str,
        left: (usize, usize),
        right: (usize, usize),
    ) -> Self {
        EngineError::Dimension {
            operation: operation.to_string(),
            detail: format!(
                "shapes {}x{} and {}x{} are not compatible",
                left.0, left.1, right.0, right.1
            ),
        }
    }

    pub fn dimension(operation: &str, detail: impl Into<String>) -> Self {
        EngineError::Dimension {
            operation: operation.to_string(),
            detail: detail.into(),
        }
    }

    pub fn degenerate(method: &str, iteration: Option<usize>, reason: impl Into<String>) -> Self {
        EngineError::DegenerateMethod {
            method: method.to_string(),
            iteration,
            reason: reason.into(),
        }
    }

    /// Machine readable code for the boundary layer.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::Dimension { .. } => "DIMENSION_ERROR",
            EngineError::SingularMatrix { .. } => "SINGULAR_MATRIX",
            EngineError::DegenerateMethod { .. } => "DEGENERATE_METHOD",
            EngineError::Expression(_) => "EXPRESSION_ERROR",
            EngineError::Io(_) => "IO_ERROR",
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

/// Serializable error shape handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

impl From<&EngineError> for ErrorPayload {
    fn from(err: &EngineError) -> Self {
        err.payload()
    }
}
