use super::*;
use crate::determinants::cofactor_value;
use crate::steps::StepTag;
use approx::assert_relative_eq;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_matrix(rng: &mut StdRng, r: usize, c: usize) -> Matrix {
    DMatrix::from_fn(r, c, |_, _| rng.random_range(-9..=9) as f64)
}

#[test]
fn inverse_times_matrix_is_identity() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut checked = 0;
    for _ in 0..100 {
        let n = rng.random_range(1..=5);
        // diagonally dominant, hence invertible
        let mut a = random_matrix(&mut rng, n, n);
        for i in 0..n {
            a[(i, i)] = 50.0 + a[(i, i)];
        }
        let (inv, log) = inverse(&a, TOL).unwrap();
        let product = &inv * &a;
        assert_relative_eq!(product, DMatrix::identity(n, n), epsilon = 1e-9);
        assert_eq!(log.count_tag(StepTag::Pivot), n);
        checked += 1;
    }
    assert_eq!(checked, 100);
}

#[test]
fn gaussian_determinant_matches_cofactors() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let n = rng.random_range(1..=5);
        let a = random_matrix(&mut rng, n, n);
        let g = gaussian_determinant(&a, TOL).unwrap();
        let c = cofactor_value(&a).unwrap();
        assert!((g - c).abs() <= 1e-7 * (1.0 + c.abs()), "{g} vs {c}");
    }
}

#[test]
fn transpose_round_trip_is_exact() {
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..20 {
        let a = DMatrix::from_fn(3, 4, |_, _| rng.random::<f64>() * 1e3 - 5e2);
        let (t, _) = transpose(&a);
        let (back, _) = transpose(&t);
        assert_eq!(back, a);
    }
}

#[test]
fn api_dispatches_by_name() {
    let req: MatrixOpRequest = serde_json::from_str(
        r#"{"operation": "matmul", "a": [[1, 2], [3, 4]], "b": [[0, 1], [1, 0]]}"#,
    )
    .unwrap();
    let res = matrix_ops_api(&req).unwrap();
    assert_eq!(res.result.matrix, vec![vec![2.0, 1.0], vec![4.0, 3.0]]);
    assert_eq!(res.steps.lines().len(), 4);

    let req = MatrixOpRequest::new(MatrixOperation::Inverse).with_a(vec![vec![4.0, 7.0], vec![2.0, 6.0]]);
    let res = matrix_ops_api(&req).unwrap();
    assert_eq!(res.result.matrix_pretty, vec![vec!["3/5", "-7/10"], vec!["-1/5", "2/5"]]);
    let json = serde_json::to_value(&res).unwrap();
    assert_eq!(json["input"]["operation"], "inverse");
    assert_eq!(json["steps"]["kind"], "framed");
    assert!(json["input"].get("b").is_none());
}

#[test]
fn api_many_and_scalar() {
    let req = MatrixOpRequest::new(MatrixOperation::SubMany).with_matrices(vec![
        vec![vec![5.0, 5.0]],
        vec![vec![1.0, 2.0]],
        vec![vec![1.0, 1.0]],
    ]);
    let res = matrix_ops_api(&req).unwrap();
    assert_eq!(res.result.matrix, vec![vec![3.0, 2.0]]);

    let req = MatrixOpRequest::new(MatrixOperation::Scalar)
        .with_a(vec![vec![1.0, -2.0]])
        .with_scalar(0.5);
    let res = matrix_ops_api(&req).unwrap();
    assert_eq!(res.result.matrix_pretty, vec![vec!["1/2", "-1"]]);
}

#[test]
fn api_reports_missing_operands_and_bad_names() {
    let err = matrix_ops_api(&MatrixOpRequest::new(MatrixOperation::Add).with_a(vec![vec![1.0]])).unwrap_err();
    assert_eq!(err.to_string(), "validation error: add requires matrix B");
    let err = matrix_ops_api(&MatrixOpRequest::new(MatrixOperation::Scalar).with_a(vec![vec![1.0]])).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    let err = matrix_ops_api(&MatrixOpRequest::new(MatrixOperation::Inverse).with_a(vec![vec![0.0]])).unwrap_err();
    assert_eq!(err.code(), "SINGULAR_MATRIX");
    assert!(serde_json::from_str::<MatrixOpRequest>(r#"{"operation": "divide"}"#).is_err());
    assert_eq!(
        "matmul_chain".parse::<MatrixOperation>().unwrap(),
        MatrixOperation::MatmulChain
    );
}
