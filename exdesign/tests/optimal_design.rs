use exdesign::{
    CandidateSet, Criterion, CriterionInput, Error, FeatureFunction, FeatureSet, LinearModel,
    MatrixDRows, Method, OptimalDesign, Result, SearchCriteria, Term, Termination,
    generate_candidate_set, optimal_design,
};
use nalgebra::{DVector, SVector, Vector1};
use std::{sync::Arc, time::Duration};

const EQ_EPS: f64 = 1e-8;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_optimal_design_linear_triangle() -> Result<()> {
    let candidates = generate_candidate_set::<2>(3)?;
    let (design, info) = optimal_design(&candidates, 3, 1, "D", "fedorov", None, 1e-10, None)?;
    assert_eq!(design.len(), 3);
    assert!(info.converged);
    // every triangle of maximal area 2 in the square has |det X| = 4
    assert!((info.det_xtx - 16.).abs() < EQ_EPS);
    assert!((info.score - 16. / 27.).abs() < EQ_EPS);
    let d_eff = 100. * (16f64 / 27.).powf(1. / 3.);
    assert!((info.d_efficiency - d_eff).abs() < 1e-6);
    assert_eq!(info.efficiency, info.d_efficiency);
    assert_eq!(info.n_terms, 3);
    assert_eq!(info.n_runs, 3);
    Ok(())
}

#[test]
fn test_optimal_design_quadratic_modified_fedorov() -> Result<()> {
    let candidates = generate_candidate_set::<2>(5)?;
    let (design, info) =
        optimal_design(&candidates, 6, 2, "D", "modified_fedorov", None, 1e-10, Some(42))?;
    assert_eq!(design.len(), 6);
    assert!(info.converged);
    assert_eq!(info.termination, Termination::Converged);
    assert!(info.d_efficiency > 0. && info.d_efficiency < 100.);
    assert!(info.history.windows(2).all(|w| w[1] >= w[0]));
    Ok(())
}

#[test]
fn test_optimal_design_degenerate_candidates() -> Result<()> {
    init_logger();
    // all candidates on the diagonal x0 = x1 span two of the three model terms
    let candidates = CandidateSet::new(MatrixDRows::<2>::from_vec(vec![
        -1., -1., -0.5, -0.5, 0., 0., 0.5, 0.5, 1., 1.,
    ]));
    for method in Method::ALL {
        let mut od = OptimalDesign::new(candidates.clone())
            .with_degree(1)
            .with_n_points(3)
            .with_method(method);
        let (design, info) = od.solve()?;
        assert_eq!(design.len(), 3);
        assert!(!info.converged);
        assert_eq!(info.termination, Termination::SingularInformationMatrix);
        assert_eq!(info.d_efficiency, 0.);
        assert!(info.det_xtx >= 0.);
    }
    Ok(())
}

#[test]
fn test_optimal_design_improves_sequential_start() -> Result<()> {
    let candidates = generate_candidate_set::<2>(5)?;
    let mut sequential = OptimalDesign::new(candidates.clone())
        .with_degree(2)
        .with_n_points(8)
        .with_method(Method::Sequential);
    let (start, start_info) = sequential.solve()?;
    assert_eq!(start.len(), 8);

    let mut modified = OptimalDesign::new(candidates)
        .with_degree(2)
        .with_n_points(8)
        .with_method(Method::ModifiedFedorov)
        .with_initial_design(start.indices.clone());
    let (_, info) = modified.solve()?;
    assert!(info.score >= start_info.score);
    assert_eq!(info.history[0], start_info.score);
    Ok(())
}

#[test]
fn test_optimal_design_reproducible() -> Result<()> {
    let candidates = generate_candidate_set::<3>(3)?;
    for method in ["simple_exchange", "fedorov", "modified_fedorov", "detmax"] {
        let a = optimal_design(&candidates, 12, 2, "A", method, None, 1e-10, Some(7))?;
        let b = optimal_design(&candidates, 12, 2, "A", method, None, 1e-10, Some(7))?;
        assert_eq!(a, b);
    }
    Ok(())
}

#[test]
fn test_optimal_design_monotone_history() -> Result<()> {
    let candidates = generate_candidate_set::<2>(5)?;
    for method in [
        Method::SimpleExchange,
        Method::Fedorov,
        Method::ModifiedFedorov,
        Method::Detmax,
    ] {
        let mut od = OptimalDesign::new(candidates.clone())
            .with_degree(2)
            .with_n_points(9)
            .with_method(method)
            .with_seed(3);
        let (_, info) = od.solve()?;
        assert!(!info.history.is_empty());
        assert!(info.history.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(info.history.last().copied(), Some(info.score));
    }
    Ok(())
}

#[test]
fn test_optimal_design_infeasible_size() -> Result<()> {
    let candidates = generate_candidate_set::<2>(3)?;
    assert_eq!(
        optimal_design(&candidates, 5, 2, "D", "fedorov", None, 1e-10, None),
        Err(Error::InfeasibleDesignSize {
            n_points: 5,
            n_terms: 6,
            n_candidates: 9
        })
    );
    let mut od = OptimalDesign::new(candidates)
        .with_n_points(10)
        .with_criteria(SearchCriteria {
            allow_repeats: false,
            ..SearchCriteria::default()
        });
    assert!(matches!(
        od.solve(),
        Err(Error::InfeasibleDesignSize { n_points: 10, .. })
    ));
    let empty = CandidateSet::new(MatrixDRows::<2>::zeros(0));
    assert!(matches!(
        optimal_design(&empty, 3, 1, "D", "fedorov", None, 1e-10, None),
        Err(Error::InfeasibleDesignSize {
            n_candidates: 0,
            ..
        })
    ));
    Ok(())
}

#[test]
fn test_optimal_design_invalid_names() -> Result<()> {
    let candidates = generate_candidate_set::<2>(3)?;
    assert_eq!(
        optimal_design(&candidates, 3, 1, "D", "annealing", None, 1e-10, None),
        Err(Error::UnsupportedMethod {
            name: "annealing".to_string()
        })
    );
    assert_eq!(
        optimal_design(&candidates, 3, 1, "Q", "fedorov", None, 1e-10, None),
        Err(Error::UnsupportedCriterion {
            name: "Q".to_string()
        })
    );
    assert_eq!(
        optimal_design(&candidates, 3, 3, "D", "fedorov", None, 1e-10, None),
        Err(Error::InvalidModelSpec {
            degree: 3,
            factors: 2
        })
    );
    Ok(())
}

#[test]
fn test_optimal_design_missing_auxiliary_input() -> Result<()> {
    let candidates = generate_candidate_set::<2>(3)?;
    assert_eq!(
        optimal_design(&candidates, 3, 1, "C", "fedorov", None, 1e-10, None),
        Err(Error::MissingAuxiliaryInput {
            criterion: "C",
            input: "contrast vector"
        })
    );
    assert!(matches!(
        optimal_design(&candidates, 3, 1, "t", "fedorov", None, 1e-10, None),
        Err(Error::MissingAuxiliaryInput { criterion: "T", .. })
    ));
    Ok(())
}

#[test]
fn test_optimal_design_all_criteria() -> Result<()> {
    let candidates = generate_candidate_set::<2>(5)?;
    let test_points = MatrixDRows::<2>::from_vec(vec![0., 0., 0.5, 0.5, -0.5, 0.5]);
    let model_difference =
        DVector::from_iterator(25, candidates.points().column_iter().map(|x| x[0] * x[0] * x[1]));
    let input = CriterionInput::new()
        .with_contrast(DVector::from_vec(vec![0., 1., 1., 0., 0., 0.]))
        .with_test_points(test_points)
        .with_model_difference(model_difference);
    for criterion in Criterion::ALL {
        let mut od = OptimalDesign::new(candidates.clone())
            .with_degree(2)
            .with_n_points(8)
            .with_criterion(criterion)
            .with_criterion_input(input.clone())
            .with_method(Method::Fedorov)
            .with_seed(5);
        let (design, info) = od.solve()?;
        assert_eq!(design.len(), 8);
        assert_eq!(info.criterion, criterion);
        assert!(info.score.is_finite());
        assert!(info.det_xtx >= 0.);
        assert!(info.d_efficiency > 0. && info.d_efficiency <= 100.);
        assert!(info.a_efficiency > 0.);
        assert!(info.converged);
    }
    Ok(())
}

#[test]
fn test_optimal_design_prediction_criteria_bounds() -> Result<()> {
    let candidates = generate_candidate_set::<1>(11)?;
    let mut od = OptimalDesign::new(candidates)
        .with_degree(2)
        .with_n_points(3)
        .with_criterion(Criterion::G)
        .with_method(Method::Fedorov);
    let (_, info) = od.solve()?;
    // the maximal prediction variance of an exact design is at least p
    assert!(-info.score >= 3. - EQ_EPS);
    Ok(())
}

#[test]
fn test_optimal_design_custom_model() -> Result<()> {
    let mut fs = FeatureSet::<1>::new();
    fs.push(Arc::new(Term::Intercept));
    fs.push(Arc::new(Term::Linear(0)));
    fs.push(Arc::new(FeatureFunction::new("x0^2", |x: &SVector<f64, 1>| {
        x[0] * x[0]
    })));
    let lm = LinearModel::new(fs.features);
    let candidates = generate_candidate_set::<1>(21)?;
    let mut od = OptimalDesign::new(candidates)
        .with_linear_model(lm)
        .with_n_points(3)
        .with_method(Method::Fedorov);
    let (design, info) = od.solve()?;
    let mut points: Vec<f64> = design.points.iter().copied().collect();
    points.sort_by(f64::total_cmp);
    assert!((points[0] + 1.).abs() < EQ_EPS);
    assert!(points[1].abs() < EQ_EPS);
    assert!((points[2] - 1.).abs() < EQ_EPS);
    assert!(info.converged);
    Ok(())
}

#[test]
fn test_optimal_design_without_repeats() -> Result<()> {
    let candidates = generate_candidate_set::<1>(5)?;
    let mut od = OptimalDesign::new(candidates)
        .with_n_points(5)
        .with_method(Method::Detmax)
        .with_criteria(SearchCriteria {
            allow_repeats: false,
            ..SearchCriteria::default()
        });
    let (design, _) = od.solve()?;
    assert!(design.replicates().iter().all(|&(_, count)| count == 1));
    Ok(())
}

#[test]
fn test_optimal_design_augmented() -> Result<()> {
    let candidates = generate_candidate_set::<2>(5)?;
    let mut od = OptimalDesign::new(candidates)
        .with_degree(2)
        .with_n_points(6)
        .with_method(Method::Sequential)
        .with_alpha(0.01);
    let (design, info) = od.solve()?;
    assert_eq!(design.len(), 6);
    assert_eq!(info.alpha, 0.01);
    assert_eq!(info.iterations, 6);
    assert!(info.d_efficiency > 0.);
    Ok(())
}

#[test]
fn test_optimal_design_restarts() -> Result<()> {
    let candidates = generate_candidate_set::<2>(5)?;
    let single = OptimalDesign::new(candidates.clone())
        .with_degree(2)
        .with_n_points(7)
        .with_method(Method::SimpleExchange)
        .with_seed(11)
        .solve()?;
    let restarted = OptimalDesign::new(candidates)
        .with_degree(2)
        .with_n_points(7)
        .with_method(Method::SimpleExchange)
        .with_seed(11)
        .with_restarts(4)
        .solve()?;
    assert!(restarted.1.score >= single.1.score);
    if restarted.1.restart == 0 {
        assert_eq!(restarted.0, single.0);
    }
    Ok(())
}

#[test]
fn test_optimal_design_small_scale_candidates() -> Result<()> {
    init_logger();
    // det(M) is of order 1e-20 on this grid
    let candidates = CandidateSet::grid(
        SVector::<f64, 2>::repeat(-0.1),
        SVector::<f64, 2>::repeat(0.1),
        SVector::<usize, 2>::repeat(5),
    )?;
    let (design, info) = optimal_design(&candidates, 6, 2, "D", "fedorov", None, 1e-10, Some(1))?;
    assert_eq!(design.len(), 6);
    assert!(info.converged);
    assert!(info.iterations > 1);
    assert!(info.history.len() > 1);
    let first = info.history[0];
    assert!(info.score > 2. * first);
    Ok(())
}

#[test]
fn test_optimal_design_sequential_budget() -> Result<()> {
    init_logger();
    let candidates = generate_candidate_set::<2>(3)?;
    let (design, info) =
        optimal_design(&candidates, 4, 1, "D", "sequential", Some(2), 1e-10, None)?;
    assert_eq!(design.len(), 4);
    assert_eq!(info.n_runs, 4);
    assert!(info.converged);
    assert!(info.d_efficiency > 0.);
    Ok(())
}

#[test]
fn test_optimal_design_deadline() -> Result<()> {
    let candidates = generate_candidate_set::<2>(5)?;
    let mut od = OptimalDesign::new(candidates)
        .with_degree(2)
        .with_n_points(6)
        .with_method(Method::Fedorov)
        .with_seed(1)
        .with_criteria(SearchCriteria {
            time_limit: Some(Duration::ZERO),
            ..SearchCriteria::default()
        });
    let (design, info) = od.solve()?;
    assert_eq!(design.len(), 6);
    assert_eq!(info.termination, Termination::Deadline);
    assert!(!info.converged);
    assert_eq!(info.iterations, 0);
    Ok(())
}

#[test]
fn test_candidate_set_uniform_random() -> Result<()> {
    let candidates =
        CandidateSet::uniform_random(Vector1::new(-1.), Vector1::new(1.), 30, 42)?;
    let (design, info) = optimal_design(&candidates, 2, 1, "D", "fedorov", None, 1e-10, Some(0))?;
    assert_eq!(design.len(), 2);
    assert!(info.converged);
    // the two outermost candidates
    let min = candidates.points().min();
    let max = candidates.points().max();
    let mut points: Vec<f64> = design.points.iter().copied().collect();
    points.sort_by(f64::total_cmp);
    assert_eq!(points, vec![min, max]);
    Ok(())
}
