use super::*;
use crate::config::parse_option;
use crate::steps::StepTag;
use approx::assert_relative_eq;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_matrix(rng: &mut StdRng, n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |_, _| rng.random_range(-5..=5) as f64)
}

#[test]
fn sarrus_agrees_with_cofactors() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let a = random_matrix(&mut rng, 3);
        let (s, _) = determinant_sarrus(&a).unwrap();
        let (c, _) = determinant_cofactors(&a).unwrap();
        assert_relative_eq!(s, c, epsilon = 1e-9);
    }
}

#[test]
fn cofactors_match_lu_determinant() {
    let mut rng = StdRng::seed_from_u64(11);
    for n in 1..=6 {
        let a = random_matrix(&mut rng, n);
        let expected = a.clone().determinant();
        let got = cofactor_value(&a).unwrap();
        assert!(
            (got - expected).abs() <= 1e-8 * (1.0 + expected.abs()),
            "n = {n}: {got} vs {expected}"
        );
    }
}

#[test]
fn row_swap_negates() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let a = random_matrix(&mut rng, 4);
        let det = cofactor_value(&a).unwrap();
        let props = validate_determinant_properties(&a, det);
        assert_eq!(props.swap_rows_sign.applies, Some(true));
    }
}

#[test]
fn zero_and_equal_lines_force_zero() {
    let zero_col = vec![vec![1.0, 0.0, 3.0], vec![4.0, 0.0, 6.0], vec![7.0, 0.0, 9.0]];
    let res = determinant_api(&zero_col, DeterminantMethod::Sarrus).unwrap();
    assert_eq!(res.result.determinant, 0.0);
    assert!(res.properties.zero_row_or_col.zero_col);
    assert!(res.properties.consistency.consistent);

    let equal_rows = vec![
        vec![1.0, 2.0, 3.0, 4.0],
        vec![5.0, 6.0, 7.0, 8.0],
        vec![1.0, 2.0, 3.0, 4.0],
        vec![0.0, 1.0, 0.0, 2.0],
    ];
    let res = determinant_api(&equal_rows, DeterminantMethod::Cofactors).unwrap();
    assert_eq!(res.result.determinant_pretty, "0");
    assert!(res.properties.equal_rows_or_cols.equal_rows);
    assert!(res.properties.consistency.det_is_zero);
}

#[test]
fn cramer_is_cofactor_expansion() {
    let a = vec![vec![2.0, 1.0, 0.0], vec![1.0, 3.0, 1.0], vec![0.0, 1.0, 4.0]];
    let cramer = determinant_api(&a, DeterminantMethod::Cramer).unwrap();
    let cof = determinant_api(&a, DeterminantMethod::Cofactors).unwrap();
    assert_eq!(cramer.result, cof.result);
    assert_eq!(cramer.steps, cof.steps);
    assert_eq!(cramer.steps.count_tag(StepTag::CofactorValue), 3);
}

#[test]
fn method_names_parse() {
    assert_eq!(
        parse_option::<DeterminantMethod>("method", "Sarrus").unwrap(),
        DeterminantMethod::Sarrus
    );
    assert_eq!(DeterminantMethod::default().to_string(), "cofactors");
    assert!(parse_option::<DeterminantMethod>("method", "lu").is_err());
}

#[test]
fn invalid_shapes() {
    let err = determinant_api(&[vec![1.0, 2.0]], DeterminantMethod::Cofactors).unwrap_err();
    assert_eq!(err.code(), "DIMENSION_ERROR");
    let err = determinant_api(&[], DeterminantMethod::Cofactors).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    let err = determinant_api(&[vec![1.0, 2.0], vec![3.0]], DeterminantMethod::Sarrus).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[test]
fn payload_shape() {
    let res = determinant_api(&[vec![1.0, 2.0], vec![3.0, 4.0]], DeterminantMethod::Cofactors).unwrap();
    let json = serde_json::to_value(&res).unwrap();
    assert_eq!(json["input"]["method"], "cofactors");
    assert_eq!(json["result"]["determinant_pretty"], "-2");
    assert_eq!(json["steps"]["kind"], "framed");
    assert_eq!(json["steps"]["states"][0]["tag"], "initial");
    assert_eq!(json["properties"]["swap_rows_sign"]["applies"], true);
}
