//! Portfolio Optimization Example
//!
//! This example solves a small Markowitz-style problem with range
//! constraints:
//!
//! minimize    0.5 x' H x            (risk)
//! subject to  sum(x) = 1            (fully invested, equality row)
//!             r' x >= 0.10          (minimum return, lower-only row)
//!             x >= 0                (long-only)
//!
//! Run with `RUST_LOG=rangeqp=debug` to see the row partition.

use nalgebra::DMatrix;
use rangeqp::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Portfolio Optimization ===\n");

    #[rustfmt::skip]
    let h = DMatrix::from_row_slice(4, 4, &[
        1003.1, 4.3, 6.3, 5.9,
        4.3,    2.2, 2.1, 3.9,
        6.3,    2.1, 3.5, 4.8,
        5.9,    3.9, 4.8, 10.0,
    ]);
    let returns = [0.17, 0.11, 0.10, 0.18];

    let mut a = DMatrix::from_element(2, 4, 1.0);
    a.row_mut(1).copy_from_slice(&returns);

    let problem = Problem::builder()
        .hessian(h)
        .constraints(a, vec![1.0, 0.10], vec![1.0, f64::INFINITY])
        .lower_bounds(vec![0.0; 4])
        .build()
        .expect("Invalid problem");

    let options = Options::builder().with_verbosity(1).build();
    let solution = problem.solve_with(&options).expect("Failed to solve");

    println!("Status: {} (exitflag {})", solution.status, solution.exitflag());
    println!("Objective: {:.6}", solution.f);
    println!("Iterations: {}\n", solution.info.iterations);

    let assets = ["A", "B", "C", "D"];
    println!("Optimal Portfolio:");
    for (name, w) in assets.iter().zip(&solution.x) {
        println!("  Asset {}: {:6.2}%", name, w * 100.0);
    }

    println!("\nRow multipliers:");
    println!("  budget  mu_l = {:.4}  mu_u = {:.4}", solution.lambda.mu_l[0], solution.lambda.mu_u[0]);
    println!("  return  mu_l = {:.4}  mu_u = {:.4}", solution.lambda.mu_l[1], solution.lambda.mu_u[1]);

    println!("\nLower bound multipliers:");
    for (name, mu) in assets.iter().zip(&solution.lambda.lower) {
        println!("  {}: {:.4}", name, mu);
    }

    // Tighten the return target until the return row binds.
    println!("\n--- Return Target Sweep ---\n");
    for &target in &[0.10, 0.12, 0.15, 0.18, 0.20] {
        let problem = Problem::builder()
            .hessian(problem.h.clone().unwrap_or_else(|| DMatrix::zeros(4, 4)))
            .constraints(problem.a.clone(), vec![1.0, target], vec![1.0, f64::INFINITY])
            .lower_bounds(vec![0.0; 4])
            .build()
            .expect("Invalid problem");

        match problem.solve() {
            Ok(sol) if sol.is_solved() => println!(
                "  target {:.2}: risk {:.4}, return multiplier {:.4}",
                target, sol.f, sol.lambda.mu_l[1]
            ),
            Ok(sol) => println!("  target {:.2}: {}", target, sol.status),
            Err(e) => println!("  target {:.2}: error: {}", target, e),
        }
    }
}
