use exdesign::{Criterion, Method, OptimalDesign, Result, generate_candidate_set};

// f(x, y): 1 + x + y
fn main() -> Result<()> {
    env_logger::init();

    // full factorial candidate grid with 3 levels per factor on [-1, 1]^2
    let candidates = generate_candidate_set::<2>(3)?;

    // define Optimal Design resolver
    let mut od = OptimalDesign::new(candidates)
        .with_degree(1)
        .with_n_points(4)
        .with_criterion(Criterion::D)
        .with_method(Method::Fedorov);

    // find optimal design
    // get design by: let (design, info) = od.solve()?;
    // or afterwards: let solution = od.solution();
    od.solve()?;

    // display optimal design
    println!("{od}");
    // Output
    // ---------- Design ----------
    // Run     Cand.   Design Point
    // 0       0       [ -1.0000, -1.0000 ]
    // 1       2       [ -1.0000, +1.0000 ]
    // 2       6       [ +1.0000, -1.0000 ]
    // 3       8       [ +1.0000, +1.0000 ]
    // -------- Statistics --------
    // Criterion: D
    // Method: fedorov
    // Score: 1.000000
    // D-efficiency: 100.00 %
    // A-efficiency: 100.00 %
    // det(X^T X): 64.000000
    // No. terms: 3
    // No. runs: 4
    // Termination: converged
    // Iterations: 1
    // ----------------------------

    Ok(())
}
