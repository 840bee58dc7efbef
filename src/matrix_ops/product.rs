use itertools::Itertools;
use log::info;

use crate::errors::{EngineError, EngineResult};
use crate::numeric::{Matrix, format_number, shape};
use crate::steps::StepLog;

fn product_lines(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Vec<String> {
    let (m, n) = shape(a);
    let p = b.ncols();
    let mut lines = Vec::with_capacity(m * p);
    for i in 0..m {
        for j in 0..p {
            let val: f64 = (0..n).map(|k| a[(i, k)] * b[(k, j)]).sum();
            c[(i, j)] = val;
            let terms = (0..n)
                .map(|k| format!("{}·{}", format_number(a[(i, k)]), format_number(b[(k, j)])))
                .join(" + ");
            lines.push(format!("c_{}{} = {terms} = {}", i + 1, j + 1, format_number(val)));
        }
    }
    lines
}

/// `A·B`; every entry is logged term by term.
pub fn matmul(a: &Matrix, b: &Matrix) -> EngineResult<(Matrix, StepLog)> {
    if a.ncols() != b.nrows() || a.is_empty() || b.is_empty() {
        return Err(EngineError::shape_mismatch("matmul", shape(a), shape(b)));
    }
    let mut c = Matrix::zeros(a.nrows(), b.ncols());
    let lines = product_lines(a, b, &mut c);
    Ok((c, StepLog::flat(lines)))
}

/// `M1·M2·...·Mk` folded left to right. All adjacent pairs are checked
/// before anything is multiplied.
pub fn matmul_chain(mats: &[Matrix]) -> EngineResult<(Matrix, StepLog)> {
    if mats.len() < 2 {
        return Err(EngineError::validation(format!(
            "matmul_chain needs at least 2 matrices, got {}",
            mats.len()
        )));
    }
    for (k, (left, right)) in mats.iter().tuple_windows().enumerate() {
        if left.ncols() != right.nrows() {
            return Err(EngineError::dimension(
                "matmul_chain",
                format!(
                    "M{} is {}x{} but M{} is {}x{}",
                    k + 1,
                    left.nrows(),
                    left.ncols(),
                    k + 2,
                    right.nrows(),
                    right.ncols()
                ),
            ));
        }
    }
    let mut current = mats[0].clone();
    let mut lines = Vec::new();
    for (k, next) in mats.iter().enumerate().skip(1) {
        let (c, step) = matmul(&current, next)?;
        lines.push(format!("Step {k}: previous result · M{}", k + 1));
        lines.extend(step.lines().iter().cloned());
        current = c;
    }
    info!(
        "product of {} matrices, result {}x{}",
        mats.len(),
        current.nrows(),
        current.ncols()
    );
    Ok((current, StepLog::flat(lines)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn entries_are_written_term_by_term() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = DMatrix::from_row_slice(2, 1, &[5.0, 7.0]);
        let (c, log) = matmul(&a, &b).unwrap();
        assert_eq!(c, DMatrix::from_row_slice(2, 1, &[19.0, 43.0]));
        assert_eq!(log.lines(), &["c_11 = 1·5 + 2·7 = 19", "c_21 = 3·5 + 4·7 = 43"]);
        assert_eq!(c, &a * &b);
    }

    #[test]
    fn incompatible_product() {
        let a = DMatrix::<f64>::zeros(2, 3);
        let err = matmul(&a, &a).unwrap_err();
        assert_eq!(err.code(), "DIMENSION_ERROR");
    }

    #[test]
    fn chain_folds_left_to_right() {
        let a = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let b = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let c = DMatrix::from_row_slice(2, 1, &[1.0, -1.0]);
        let (r, log) = matmul_chain(&[a.clone(), b.clone(), c.clone()]).unwrap();
        assert_eq!(r, &a * &b * &c);
        assert_eq!(log.lines()[0], "Step 1: previous result · M2");
        assert!(log.lines().iter().any(|l| l == "Step 2: previous result · M3"));

        let err = matmul_chain(&[a.clone(), c, b]).unwrap_err();
        assert!(err.to_string().contains("M2 is 2x1 but M3 is 2x2"));
        assert!(matmul_chain(&[a]).is_err());
    }
}
