use exdesign::{Method, Result, generate_candidate_set, optimal_design};
use std::time::Instant;

// f(x, y, z): 1 + x + y + z
//             + x^2 + y^2 + z^2
//             + x * y + x * z + y * z
fn main() -> Result<()> {
    env_logger::init();

    let candidates = generate_candidate_set::<3>(3)?;

    println!("Method\t\t\tD-eff.\tIter.\tTermination\tTime");
    for method in Method::ALL {
        let now = Instant::now();
        let (_, info) =
            optimal_design(&candidates, 14, 2, "D", method.name(), None, 1e-10, Some(7))?;
        println!(
            "{:<16}\t{:.2}\t{}\t{}\t{:?}",
            method.name(),
            info.d_efficiency,
            info.iterations,
            info.termination,
            now.elapsed()
        );
    }

    Ok(())
}
