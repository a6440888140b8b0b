use exdesign::{Criterion, CriterionInput, Method, OptimalDesign, Result, generate_candidate_set};
use nalgebra::DVector;

// f(x, y): 1 + x + y + x^2 + y^2 + x * y
fn main() -> Result<()> {
    env_logger::init();

    let candidates = generate_candidate_set::<2>(5)?;

    // C-optimality needs the contrast, here the interaction coefficient, and
    // T-optimality the difference to a rival model at every candidate
    let contrast = DVector::from_vec(vec![0., 0., 0., 0., 0., 1.]);
    let model_difference = DVector::from_iterator(
        candidates.len(),
        candidates.points().column_iter().map(|x| x[0] * x[0] * x[1]),
    );
    let input = CriterionInput::new()
        .with_contrast(contrast)
        .with_model_difference(model_difference);

    println!("Crit.\tScore\t\tD-eff.\tA-eff.");
    for criterion in Criterion::ALL {
        let mut od = OptimalDesign::new(candidates.clone())
            .with_degree(2)
            .with_n_points(9)
            .with_criterion(criterion)
            .with_criterion_input(input.clone())
            .with_method(Method::ModifiedFedorov)
            .with_seed(42);
        let (_, info) = od.solve()?;
        println!(
            "{}\t{:+.6}\t{:.2}\t{:.2}",
            info.criterion, info.score, info.d_efficiency, info.a_efficiency
        );
    }

    Ok(())
}
