use crate::{
    Augmentation, CandidateSet, Criterion, CriterionEvaluator, CriterionInput, Error,
    ExchangeEngine, InformationMatrix, LinearModel, MatrixDRows, Method, Result, SearchCriteria,
    SearchResult, Start, Termination,
};
use rayon::prelude::*;
use std::{fmt::Display, sync::Arc};

fn display_width(d: usize) -> usize {
    (12 + d * 7 + d.saturating_sub(1) * 2).max(28)
}

/// Exact design: the candidate indices of the runs, repeats allowed, and their points.
#[derive(Debug, Clone, PartialEq)]
pub struct Design<const D: usize> {
    /// The i-th index relates to the i-th column in the point matrix.
    pub indices: Vec<usize>,
    /// Column-orientated design points.
    pub points: MatrixDRows<D>,
}

impl<const D: usize> Design<D> {
    /// Creates the design from candidate indices.
    pub fn new(candidates: &CandidateSet<D>, indices: Vec<usize>) -> Result<Self> {
        if let Some(&index) = indices.iter().find(|&&i| i >= candidates.len()) {
            return Err(Error::CandidateIndex {
                index,
                n_candidates: candidates.len(),
            });
        }
        let points = candidates.select(&indices);
        Ok(Self { indices, points })
    }

    /// Returns the number of runs.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the design has no runs.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the distinct candidate indices with their number of replicates, ordered by index.
    pub fn replicates(&self) -> Vec<(usize, usize)> {
        let mut indices = self.indices.clone();
        indices.sort_unstable();
        let mut replicates: Vec<(usize, usize)> = vec![];
        for i in indices {
            match replicates.last_mut() {
                Some((last, count)) if *last == i => *count += 1,
                _ => replicates.push((i, 1)),
            }
        }
        replicates
    }
}

impl<const D: usize> Display for Design<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: String = self
            .indices
            .iter()
            .zip(self.points.column_iter())
            .enumerate()
            .map(|(run, (idx, x))| {
                let values = x
                    .iter()
                    .map(|v| format!("{:>+.4}", v))
                    .collect::<Vec<String>>()
                    .join(", ");
                format!("{run}\t{idx}\t[ {values} ]")
            })
            .collect::<Vec<String>>()
            .join("\n");
        write!(
            f,
            "{:-^1$}\nRun\tCand.\tDesign Point\n{rows}",
            " Design ".to_string(),
            display_width(D)
        )
    }
}

/// Diagnostics of a solved design.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignInfo {
    /// Optimized criterion.
    pub criterion: Criterion,
    /// Exchange method.
    pub method: Method,
    /// Criterion score, negative infinity for a singular design under a criterion needing the
    /// inverse information matrix.
    pub score: f64,
    /// Efficiency in percent matching the criterion.
    pub efficiency: f64,
    /// D-efficiency in percent.
    pub d_efficiency: f64,
    /// A-efficiency in percent.
    pub a_efficiency: f64,
    /// Determinant of the unnormalized `X^T X`.
    pub det_xtx: f64,
    /// Number of model terms p.
    pub n_terms: usize,
    /// Number of runs n.
    pub n_runs: usize,
    /// Augmentation weight.
    pub alpha: f64,
    /// True if the search converged.
    pub converged: bool,
    /// Iterations of the winning search.
    pub iterations: usize,
    /// Reason the winning search stopped.
    pub termination: Termination,
    /// Singular trial designs met by the winning search.
    pub singular_moves: usize,
    /// Accepted scores of the winning search.
    pub history: Vec<f64>,
    /// Index of the winning restart.
    pub restart: usize,
}

impl DesignInfo {
    fn write_statistics(&self, f: &mut std::fmt::Formatter<'_>, width: usize) -> std::fmt::Result {
        let title = format!("{:-^1$}", " Statistics ".to_string(), width);
        let footer = format!("{:-^1$}", String::new(), width);
        write!(
            f,
            "{title}\n\
            Criterion: {}\n\
            Method: {}\n\
            Score: {:.6}\n\
            D-efficiency: {:.2} %\n\
            A-efficiency: {:.2} %\n\
            det(X^T X): {:.6}\n\
            No. terms: {}\n\
            No. runs: {}\n\
            Termination: {}\n\
            Iterations: {}\n\
            {footer}",
            self.criterion,
            self.method,
            self.score,
            self.d_efficiency,
            self.a_efficiency,
            self.det_xtx,
            self.n_terms,
            self.n_runs,
            self.termination,
            self.iterations,
        )
    }
}

impl Display for DesignInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_statistics(f, display_width(0))
    }
}

/// Model the design is built for.
#[derive(Clone)]
enum ModelChoice<const D: usize> {
    Polynomial(usize),
    Custom(Arc<LinearModel<D>>),
}

/// Optimal Design Solver
///
/// Selects `n_points` runs from a finite candidate set which optimize a [Criterion] for a linear
/// model, by one of the exchange algorithms of [Method]. Every restart after the first one starts
/// from a different random design; the best score wins.
///
/// ```
/// use exdesign::{Criterion, Method, OptimalDesign, generate_candidate_set};
///
/// let candidates = generate_candidate_set::<2>(3).unwrap();
/// let mut od = OptimalDesign::new(candidates)
///     .with_degree(1)
///     .with_n_points(4)
///     .with_criterion(Criterion::D)
///     .with_method(Method::Fedorov);
/// let (design, info) = od.solve().unwrap();
/// assert_eq!(design.len(), 4);
/// assert!(info.converged);
/// ```
pub struct OptimalDesign<const D: usize> {
    candidates: CandidateSet<D>,
    model: ModelChoice<D>,
    n_points: Option<usize>,
    criterion: Criterion,
    criterion_input: CriterionInput<D>,
    method: Method,
    criteria: SearchCriteria,
    seed: Option<u64>,
    initial_design: Option<Vec<usize>>,
    alpha: f64,
    restarts: usize,
    solution: Option<(Design<D>, DesignInfo)>,
}

impl<const D: usize> OptimalDesign<D> {
    /// Returns the solver for the given candidate set with a linear model, D-optimality, DETMAX
    /// and as many runs as model terms.
    pub fn new(candidates: CandidateSet<D>) -> Self {
        Self {
            candidates,
            model: ModelChoice::Polynomial(1),
            n_points: None,
            criterion: Criterion::D,
            criterion_input: CriterionInput::default(),
            method: Method::Detmax,
            criteria: SearchCriteria::default(),
            seed: None,
            initial_design: None,
            alpha: 0.,
            restarts: 1,
            solution: None,
        }
    }

    /// Returns the solver with the full polynomial model of given degree.
    pub fn with_degree(mut self, degree: usize) -> Self {
        self.model = ModelChoice::Polynomial(degree);
        self
    }

    /// Returns the solver with a custom linear model.
    pub fn with_linear_model(mut self, linear_model: LinearModel<D>) -> Self {
        self.model = ModelChoice::Custom(Arc::new(linear_model));
        self
    }

    /// Returns the solver with given number of runs.
    pub fn with_n_points(mut self, n_points: usize) -> Self {
        self.n_points = Some(n_points);
        self
    }

    /// Returns the solver with given criterion.
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Returns the solver with given auxiliary criterion input.
    pub fn with_criterion_input(mut self, criterion_input: CriterionInput<D>) -> Self {
        self.criterion_input = criterion_input;
        self
    }

    /// Returns the solver with given exchange method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Returns the solver with given [SearchCriteria].
    pub fn with_criteria(mut self, criteria: SearchCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Returns the solver starting from a seeded random design.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the solver starting from the given candidate indices.
    pub fn with_initial_design(mut self, indices: Vec<usize>) -> Self {
        self.initial_design = Some(indices);
        self
    }

    /// Returns the solver with information matrices augmented by `alpha` times the moment matrix
    /// of the candidate set.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Returns the solver running `restarts` independent searches in parallel.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    /// Returns the solved design and its diagnostics, if [OptimalDesign::solve] succeeded.
    pub fn solution(&self) -> Option<&(Design<D>, DesignInfo)> {
        self.solution.as_ref()
    }

    fn linear_model(&self) -> Result<Arc<LinearModel<D>>> {
        match &self.model {
            ModelChoice::Polynomial(degree) => Ok(Arc::new(LinearModel::polynomial(*degree)?)),
            ModelChoice::Custom(lm) => Ok(lm.clone()),
        }
    }

    fn start(&self) -> Start {
        match (&self.initial_design, self.seed) {
            (Some(indices), _) => Start::Given(indices.clone()),
            (None, Some(seed)) => Start::Random(seed),
            (None, None) => Start::Sequential,
        }
    }

    /// Searches the optimal design.
    pub fn solve(&mut self) -> Result<(Design<D>, DesignInfo)> {
        let linear_model = self.linear_model()?;
        let n_terms = linear_model.len();
        let n_points = self.n_points.unwrap_or(n_terms);
        check_design_size(
            n_points,
            n_terms,
            self.candidates.len(),
            self.criteria.allow_repeats,
        )?;
        let candidates_t = Arc::new(linear_model.design_t(self.candidates.points()));
        let evaluator = CriterionEvaluator::new(
            self.criterion,
            &self.criterion_input,
            &linear_model,
            candidates_t.clone(),
        )?;
        let augmentation = (self.alpha != 0.).then(|| Augmentation::new(self.alpha, &candidates_t));
        let engine = ExchangeEngine::new(evaluator, self.method, self.criteria.clone())
            .with_augmentation(augmentation);

        let start = self.start();
        let base_seed = self.seed.unwrap_or(0);
        let (first, others) = rayon::join(
            || engine.run(n_points, &start),
            || {
                (1..self.restarts)
                    .into_par_iter()
                    .map(|i| engine.run(n_points, &Start::Random(base_seed.wrapping_add(i as u64))))
                    .collect::<Result<Vec<SearchResult>>>()
            },
        );
        let (restart, best) = best_result(first?, others?);

        let design = Design::new(&self.candidates, best.state.rows().to_vec())?;
        let info = self.design_info(&engine, best, restart)?;
        self.solution = Some((design.clone(), info.clone()));
        Ok((design, info))
    }

    fn design_info(
        &self,
        engine: &ExchangeEngine,
        result: SearchResult,
        restart: usize,
    ) -> Result<DesignInfo> {
        let info = result.state.info();
        let det_xtx = InformationMatrix::from_xtx(
            result.state.xtx(),
            1,
            None,
            self.criteria.max_condition,
        )?
        .determinant();
        Ok(DesignInfo {
            criterion: self.criterion,
            method: self.method,
            score: result.state.score(),
            efficiency: engine.evaluator().efficiency(info),
            d_efficiency: info.d_efficiency(),
            a_efficiency: info.a_efficiency(),
            det_xtx,
            n_terms: info.n_terms(),
            n_runs: result.state.rows().len(),
            alpha: self.alpha,
            converged: result.termination.converged(),
            iterations: result.iterations,
            termination: result.termination,
            singular_moves: result.singular_moves,
            history: result.history,
            restart,
        })
    }
}

impl<const D: usize> Display for OptimalDesign<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.solution {
            Some((design, info)) => {
                writeln!(f, "{design}")?;
                info.write_statistics(f, display_width(D))
            }
            None => write!(
                f,
                "{:-^1$}\nNot solved\n{2:-^1$}",
                " Design ".to_string(),
                display_width(D),
                String::new()
            ),
        }
    }
}

/// Fails with [Error::InfeasibleDesignSize] if no design of `n_points` runs can estimate all
/// `n_terms` terms.
fn check_design_size(
    n_points: usize,
    n_terms: usize,
    n_candidates: usize,
    allow_repeats: bool,
) -> Result<()> {
    if n_candidates == 0 || n_points < n_terms || (!allow_repeats && n_points > n_candidates) {
        return Err(Error::InfeasibleDesignSize {
            n_points,
            n_terms,
            n_candidates,
        });
    }
    Ok(())
}

/// Returns the winning restart: regular designs beat singular ones, then the higher score wins
/// and ties go to the lowest restart index.
fn best_result(first: SearchResult, others: Vec<SearchResult>) -> (usize, SearchResult) {
    let mut best = (0, first);
    for (i, result) in others.into_iter().enumerate() {
        let better = match (result.state.is_singular(), best.1.state.is_singular()) {
            (false, true) => true,
            (true, false) => false,
            _ => result.state.score() > best.1.state.score(),
        };
        if better {
            best = (i + 1, result);
        }
    }
    best
}

/// Generates an optimal design of `n_points` runs for the full polynomial model of given degree.
///
/// Criterion and method are given by name, see [Criterion] and [Method]. Without seed the search
/// starts from the greedy sequential design, otherwise from a seeded random design.
///
/// ```
/// use exdesign::{generate_candidate_set, optimal_design};
///
/// let candidates = generate_candidate_set::<2>(5).unwrap();
/// let (design, info) =
///     optimal_design(&candidates, 6, 2, "D", "modified_fedorov", None, 1e-10, Some(1)).unwrap();
/// assert_eq!(design.len(), 6);
/// assert!(info.d_efficiency > 0.);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn optimal_design<const D: usize>(
    candidates: &CandidateSet<D>,
    n_points: usize,
    degree: usize,
    criterion: &str,
    method: &str,
    max_iter: Option<usize>,
    tol: f64,
    seed: Option<u64>,
) -> Result<(Design<D>, DesignInfo)> {
    let linear_model = LinearModel::<D>::polynomial(degree)?;
    check_design_size(n_points, linear_model.len(), candidates.len(), true)?;
    let method: Method = method.parse()?;
    let criterion: Criterion = criterion.parse()?;
    let criteria = SearchCriteria {
        max_iter,
        tol,
        ..SearchCriteria::default()
    };
    let mut od = OptimalDesign::new(candidates.clone())
        .with_linear_model(linear_model)
        .with_n_points(n_points)
        .with_criterion(criterion)
        .with_method(method)
        .with_criteria(criteria);
    if let Some(seed) = seed {
        od = od.with_seed(seed);
    }
    od.solve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_candidate_set;

    #[test]
    fn test_design_replicates() -> Result<()> {
        let candidates = generate_candidate_set::<1>(3)?;
        let design = Design::new(&candidates, vec![2, 0, 2, 1, 2])?;
        assert_eq!(design.replicates(), vec![(0, 1), (1, 1), (2, 3)]);
        assert_eq!(design.points.ncols(), 5);
        Ok(())
    }

    #[test]
    fn test_design_index_out_of_range() -> Result<()> {
        let candidates = generate_candidate_set::<1>(3)?;
        assert_eq!(
            Design::new(&candidates, vec![0, 3]),
            Err(Error::CandidateIndex {
                index: 3,
                n_candidates: 3
            })
        );
        Ok(())
    }

    #[test]
    fn test_design_size_check() -> Result<()> {
        assert!(check_design_size(3, 3, 9, true).is_ok());
        assert_eq!(
            check_design_size(2, 3, 9, true),
            Err(Error::InfeasibleDesignSize {
                n_points: 2,
                n_terms: 3,
                n_candidates: 9
            })
        );
        assert!(check_design_size(3, 3, 0, true).is_err());
        assert!(check_design_size(10, 3, 9, false).is_err());
        assert!(check_design_size(10, 3, 9, true).is_ok());
        Ok(())
    }

    #[test]
    fn test_design_display() -> Result<()> {
        let candidates = generate_candidate_set::<1>(2)?;
        let design = Design::new(&candidates, vec![0, 1])?;
        assert_eq!(
            format!("{design}"),
            "---------- Design ----------\n\
            Run\tCand.\tDesign Point\n\
            0\t0\t[ -1.0000 ]\n\
            1\t1\t[ +1.0000 ]"
        );
        Ok(())
    }

    #[test]
    fn test_optimal_design_display() -> Result<()> {
        let candidates = generate_candidate_set::<1>(2)?;
        let mut od = OptimalDesign::new(candidates).with_method(Method::Fedorov);
        assert_eq!(
            format!("{od}"),
            "---------- Design ----------\nNot solved\n----------------------------"
        );
        od.solve()?;
        assert_eq!(
            format!("{od}"),
            "---------- Design ----------\n\
            Run\tCand.\tDesign Point\n\
            0\t0\t[ -1.0000 ]\n\
            1\t1\t[ +1.0000 ]\n\
            -------- Statistics --------\n\
            Criterion: D\n\
            Method: fedorov\n\
            Score: 1.000000\n\
            D-efficiency: 100.00 %\n\
            A-efficiency: 100.00 %\n\
            det(X^T X): 4.000000\n\
            No. terms: 2\n\
            No. runs: 2\n\
            Termination: converged\n\
            Iterations: 1\n\
            ----------------------------"
        );
        Ok(())
    }

    #[test]
    fn test_restart_ties_keep_first() -> Result<()> {
        let candidates = generate_candidate_set::<1>(5)?;
        let mut od = OptimalDesign::new(candidates)
            .with_method(Method::Fedorov)
            .with_restarts(4)
            .with_seed(9);
        let (_, info) = od.solve()?;
        // every restart reaches det M = 1 on the line
        assert_eq!(info.restart, 0);
        assert!((info.score - 1.).abs() < 1e-12);
        Ok(())
    }
}
