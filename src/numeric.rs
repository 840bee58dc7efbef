//! Numeric core: the global tolerance, exact pretty printing of floats as
//! integers or reduced fractions, and small matrix helpers every engine builds on.
pub mod fraction;
pub mod matrix_utils;

pub use fraction::{format_number, limit_denominator, matrix_as_fraction, vec_pretty};
pub use matrix_utils::{
    clone_with, from_rows, normalize_neg_zero, require_square, shape, to_augmented, to_rows, Matrix,
};

/// Absolute tolerance used for every "is this zero" decision.
pub const TOL: f64 = 1e-12;

/// Absolute closeness test: |a - b| <= tol.
pub fn is_close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

pub fn is_zero(x: f64) -> bool {
    is_close(x, 0.0, TOL)
}
