#![allow(non_snake_case)]
use std::path::Path;

use RustedSteps::Utils::logger::init_logger;
use RustedSteps::Utils::tables::{render_matrix, render_states};
use RustedSteps::config::{AngleMode, EngineOptions};
use RustedSteps::determinants::{DeterminantMethod, determinant_api};
use RustedSteps::error_analysis::{
    AccumulationParams, Decimal, DecimalContext, accumulate_error_iterations,
    compute_abs_rel_error, propagation_error,
};
use RustedSteps::errors::EngineResult;
use RustedSteps::matrix_ops::{MatrixOpRequest, MatrixOperation, matrix_ops_api};
use RustedSteps::reduce::{LinearSystem, ReductionMethod, solve_linear_system};
use RustedSteps::root_finding::{RootFindingConfig, RootFindingMethod, find_root};
use RustedSteps::symbolic::expression::BoundExpression;
use RustedSteps::vectors::{VectorOpRequest, VectorOperation, vector_ops_api};

const OPTIONS_FILE: &str = "engine.toml";

fn main() -> EngineResult<()> {
    let options = if Path::new(OPTIONS_FILE).exists() {
        EngineOptions::from_file(OPTIONS_FILE)?
    } else {
        EngineOptions::default()
    };
    init_logger(options.loglevel.as_deref(), false)?;
    let example = 0;
    match example {
        0 => {
            for k in 1..=6 {
                run(k, &options)?;
            }
        }
        k => run(k, &options)?,
    }
    Ok(())
}

fn run(example: usize, options: &EngineOptions) -> EngineResult<()> {
    match example {
        1 => {
            // Gauss-Jordan on a 2x2 system: x = 0.8, y = 1.4
            let system = LinearSystem::new(&[vec![2.0, 1.0], vec![1.0, 3.0]], &[3.0, 5.0])?;
            let res = solve_linear_system(&system, ReductionMethod::GaussJordan, options)?;
            println!("{}", render_states(res.steps.states()));
            println!(
                "{} solution, x = {:?}",
                res.summary.solution_type, res.summary.parametric_form.particular_pretty
            );
        }
        2 => {
            let a = vec![vec![2.0, -3.0, 1.0], vec![2.0, 0.0, -1.0], vec![1.0, 4.0, 5.0]];
            for method in [DeterminantMethod::Sarrus, DeterminantMethod::Cofactors] {
                let res = determinant_api(&a, method)?;
                for line in res.steps.lines() {
                    println!("{line}");
                }
                println!("det ({method}) = {}", res.result.determinant_pretty);
            }
        }
        3 => {
            let request = MatrixOpRequest::new(MatrixOperation::Inverse)
                .with_a(vec![vec![4.0, 7.0], vec![2.0, 6.0]]);
            let res = matrix_ops_api(&request)?;
            println!("{}", render_states(res.steps.states()));
            println!("{}", render_matrix(&res.result.matrix_pretty));
        }
        4 => {
            let f = BoundExpression::parse("x^2 - 2", "x")?;
            for (method, b) in [
                (RootFindingMethod::Bisection, Some(2.0)),
                (RootFindingMethod::FalsePosition, Some(2.0)),
                (RootFindingMethod::NewtonRaphson, None),
                (RootFindingMethod::Secant, Some(2.0)),
            ] {
                let res = find_root(&f, method, 1.0, b, &RootFindingConfig::new(1e-6))?;
                println!("{}", res.render_table());
                let c = res.conclusion();
                println!("{method}: root {:.8} after {} iterations", c.root, c.iterations);
            }
        }
        5 => {
            let ctx = DecimalContext::new(options.precision)?;
            let m: Decimal = "3.1415926".parse()?;
            let m_tilde: Decimal = "3.1428571".parse()?;
            let res = compute_abs_rel_error(&m, &m_tilde, options.decimals_display, &ctx);
            println!(
                "e_a = {:?}, e_r = {:?}",
                res.absolute_error.result, res.relative_error.result
            );

            let f = BoundExpression::parse("sin(x)", "x")?;
            let res = propagation_error(&f, 30.0, 1.0, AngleMode::Deg, 6)?;
            println!(
                "dy approx {} dy real {} e_a {}",
                res.result.delta_y_approx, res.result.delta_y_real, res.result.absolute_error
            );

            let params = AccumulationParams::new("1000".parse()?, 10).with_mode(options.mode);
            let res = accumulate_error_iterations(&params, &ctx)?;
            println!("{}", res.render_table());
        }
        6 => {
            let request = VectorOpRequest::new(VectorOperation::Comb2)
                .with_vector("u", vec![1.0, 2.0])
                .with_vector("v", vec![3.0, -1.0])
                .with_scalar("c", 2.0)
                .with_scalar("d", -1.0);
            let res = vector_ops_api(&request)?;
            for line in res.steps.lines() {
                println!("{line}");
            }
        }
        _ => println!("no example {example}"),
    }
    Ok(())
}
