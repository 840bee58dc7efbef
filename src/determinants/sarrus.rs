use itertools::Itertools;
use log::info;
use nalgebra::DMatrix;

use crate::errors::{EngineError, EngineResult};
use crate::numeric::{Matrix, clone_with, format_number, is_zero, require_square};
use crate::steps::{StepEvidence, StepLog, StepRecorder, StepTag};

type Diagonal = [(usize, usize); 3];

const POSITIVE: [Diagonal; 3] = [
    [(0, 0), (1, 1), (2, 2)],
    [(0, 1), (1, 2), (2, 0)],
    [(0, 2), (1, 0), (2, 1)],
];

const NEGATIVE: [Diagonal; 3] = [
    [(0, 2), (1, 1), (2, 0)],
    [(0, 0), (1, 2), (2, 1)],
    [(0, 1), (1, 0), (2, 2)],
];

fn label(diagonal: &Diagonal) -> String {
    diagonal
        .iter()
        .map(|(i, j)| format!("a{}{}", i + 1, j + 1))
        .join("·")
}

/// Log the three products of one diagonal family and return their sum.
fn log_diagonals(
    m: &Matrix,
    family: &[Diagonal; 3],
    tag: StepTag,
    sign: &str,
    rec: &mut StepRecorder,
) -> (Vec<f64>, f64) {
    let mut products = Vec::with_capacity(3);
    for diagonal in family {
        let terms: Vec<f64> = diagonal.iter().map(|&cell| m[cell]).collect();
        let product: f64 = terms.iter().product();
        let name = label(diagonal);
        let operation = format!(
            "{sign} {name} = {} = {}",
            terms.iter().map(|&t| format_number(t)).join("·"),
            format_number(product)
        );
        rec.push(
            tag,
            operation,
            None,
            None,
            Some(StepEvidence::Diagonal {
                label: name,
                terms,
                product,
            }),
        );
        products.push(product);
    }
    let sum: f64 = products.iter().sum();
    (products, sum)
}

/// Rule of Sarrus for a 3x3 matrix.
///
/// Logs the matrix extended with its first two columns, the three descending
/// (positive) and three ascending (negative) diagonal products, and the result.
pub fn determinant_sarrus(a: &Matrix) -> EngineResult<(f64, StepLog)> {
    let n = require_square(a, "sarrus")?;
    if n != 3 {
        return Err(EngineError::dimension(
            "sarrus",
            format!("the rule of Sarrus only applies to 3x3 matrices, got {n}x{n}"),
        ));
    }
    let m = clone_with(a);
    let mut rec = StepRecorder::new();
    rec.snapshot(StepTag::Initial, "Initial matrix", &m);

    let extended = DMatrix::from_fn(3, 5, |i, j| m[(i, j % 3)]);
    rec.push(
        StepTag::SarrusExtended,
        "Repeat the first two columns to the right",
        Some(&extended),
        Some("extended matrix (3x5)".to_string()),
        None,
    );

    let (pos, positive) = log_diagonals(&m, &POSITIVE, StepTag::SarrusPos, "+", &mut rec);
    rec.narrate(format!(
        "Main diagonals: {} (sum = {})",
        pos.iter().map(|&p| format_number(p)).join(", "),
        format_number(positive)
    ));
    let (neg, negative) = log_diagonals(&m, &NEGATIVE, StepTag::SarrusNeg, "-", &mut rec);
    rec.narrate(format!(
        "Secondary diagonals: {} (sum = {})",
        neg.iter().map(|&p| format_number(p)).join(", "),
        format_number(negative)
    ));

    let mut det = positive - negative;
    if is_zero(det) {
        det = 0.0;
    }
    let line = format!(
        "det (Sarrus) = {} - {} = {}",
        format_number(positive),
        format_number(negative),
        format_number(det)
    );
    rec.push(
        StepTag::Result,
        line.clone(),
        None,
        None,
        Some(StepEvidence::Value {
            value: det,
            pretty: format_number(det),
        }),
    );
    rec.narrate(line);
    info!("Sarrus determinant = {}", format_number(det));
    Ok((det, rec.finish()))
}
