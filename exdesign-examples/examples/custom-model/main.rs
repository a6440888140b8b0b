use exdesign::{
    CandidateSet, FeatureFunction, FeatureSet, LinearModel, Method, OptimalDesign, Result, Term,
};
use nalgebra::{Vector1, Vector2};
use std::sync::Arc;

// f(x): 1 + x + exp(x)
fn exponential_trend() -> Result<()> {
    let mut fs = FeatureSet::<1>::new();
    fs.push(Arc::new(Term::Intercept));
    fs.push(Arc::new(Term::Linear(0)));
    fs.push(Arc::new(FeatureFunction::new("exp(x0)", |x: &Vector1<f64>| {
        x[0].exp()
    })));
    let lm: LinearModel<1> = fs.into();

    let candidates = CandidateSet::grid(Vector1::new(0.), Vector1::new(2.), Vector1::new(41))?;
    let mut od = OptimalDesign::new(candidates)
        .with_linear_model(lm)
        .with_n_points(6)
        .with_method(Method::Detmax);
    od.solve()?;
    println!("{od}");
    Ok(())
}

// f(x, y): 1 + x + y + x * y on a non-cubic region
fn interaction_on_random_candidates() -> Result<()> {
    let mut fs = FeatureSet::<2>::new();
    for term in [
        Term::Intercept,
        Term::Linear(0),
        Term::Linear(1),
        Term::Interaction(0, 1),
    ] {
        fs.push(Arc::new(term));
    }
    let candidates =
        CandidateSet::uniform_random(Vector2::new(0., 10.), Vector2::new(1., 20.), 200, 1)?;
    let mut od = OptimalDesign::new(candidates)
        .with_linear_model(fs.into())
        .with_n_points(8)
        .with_method(Method::Fedorov)
        .with_seed(3);
    od.solve()?;
    println!("{od}");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    exponential_trend()?;
    interaction_on_random_candidates()
}
