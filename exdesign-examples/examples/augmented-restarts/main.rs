use exdesign::{Criterion, Method, OptimalDesign, Result, SearchCriteria, generate_candidate_set};
use log::info;
use std::time::Duration;

// f(x, y): 1 + x + y + x^2 + y^2 + x * y
fn main() -> Result<()> {
    env_logger::init();

    let candidates = generate_candidate_set::<2>(7)?;
    let criteria = SearchCriteria {
        time_limit: Some(Duration::from_secs(5)),
        ..SearchCriteria::default()
    };

    // augmentation by the moment matrix of the region keeps small designs regular,
    // restarts run in parallel from different random designs
    for alpha in [0., 0.01, 0.1] {
        let mut od = OptimalDesign::new(candidates.clone())
            .with_degree(2)
            .with_n_points(8)
            .with_criterion(Criterion::I)
            .with_method(Method::SimpleExchange)
            .with_criteria(criteria.clone())
            .with_alpha(alpha)
            .with_seed(2024)
            .with_restarts(8);
        let (_, info) = od.solve()?;
        info!("alpha {alpha}: best restart {}", info.restart);
        println!("alpha = {alpha}\n{od}\n");
    }

    Ok(())
}
