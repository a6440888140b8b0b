mod detmax;
mod fedorov;
mod modified_fedorov;
mod sequential;
mod simple_exchange;
use crate::{
    Augmentation, CriterionEvaluator, Error, InformationMatrix, Result,
    utils::{gram_of_columns, rank_one_update},
};
pub use detmax::Detmax;
pub use fedorov::Fedorov;
use faer::Mat;
use log::{debug, info, warn};
pub use modified_fedorov::ModifiedFedorov;
use rand::{Rng, SeedableRng, seq::index::sample};
use rand_xoshiro::Xoshiro256PlusPlus;
pub use sequential::Sequential;
pub use simple_exchange::SimpleExchange;
use std::{
    fmt::Display,
    str::FromStr,
    time::{Duration, Instant},
};

/// Exchange algorithms searching for an optimal design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Dykstra's sequential construction, adding the best candidate one at a time.
    Sequential,
    /// Wynn-Mitchell exchange of the worst design point against the best candidate.
    SimpleExchange,
    /// Fedorov's exchange of the best (design point, candidate) pair.
    Fedorov,
    /// Fedorov's exchange applied position by position within one sweep.
    ModifiedFedorov,
    /// Mitchell's DETMAX with excursions of growing depth.
    Detmax,
}

impl Method {
    /// All methods in display order.
    pub const ALL: [Method; 5] = [
        Method::Sequential,
        Method::SimpleExchange,
        Method::Fedorov,
        Method::ModifiedFedorov,
        Method::Detmax,
    ];

    /// Returns the method name as accepted by [Method::from_str].
    pub fn name(&self) -> &'static str {
        match self {
            Method::Sequential => "sequential",
            Method::SimpleExchange => "simple_exchange",
            Method::Fedorov => "fedorov",
            Method::ModifiedFedorov => "modified_fedorov",
            Method::Detmax => "detmax",
        }
    }

    /// Returns the iteration budget used if none is configured.
    pub fn default_max_iter(&self, n_points: usize) -> usize {
        match self {
            Method::Sequential => n_points,
            Method::SimpleExchange | Method::Fedorov => 200,
            Method::ModifiedFedorov | Method::Detmax => 100,
        }
    }

    /// Resolves the method to its move proposal strategy.
    pub fn strategy(&self, criteria: &SearchCriteria) -> Box<dyn ExchangeStrategy + Send + Sync> {
        match self {
            Method::Sequential => Box::new(Sequential),
            Method::SimpleExchange => Box::new(SimpleExchange),
            Method::Fedorov => Box::new(Fedorov),
            Method::ModifiedFedorov => Box::new(ModifiedFedorov),
            Method::Detmax => Box::new(Detmax::new(criteria.max_excursion)),
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnsupportedMethod {
                name: s.to_string(),
            })
    }
}

/// Options of the exchange search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    /// Iteration budget, [Method::default_max_iter] if none. Growing a design to its size is
    /// not limited by the budget or the time limit.
    pub max_iter: Option<usize>,
    /// Relative improvement `tol |score|` a move must exceed to be accepted.
    pub tol: f64,
    /// Condition number above which the information matrix counts as singular.
    pub max_condition: f64,
    /// Ridge added to the eigenvalues when ranking singular designs.
    pub ridge: f64,
    /// Maximal excursion depth of DETMAX.
    pub max_excursion: usize,
    /// Number of random starts tried until one is non-singular.
    pub init_attempts: usize,
    /// Allows a candidate to appear several times in the design.
    pub allow_repeats: bool,
    /// Wall clock budget of a single search.
    pub time_limit: Option<Duration>,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            max_iter: None,
            tol: 1e-10,
            max_condition: InformationMatrix::DEFAULT_MAX_CONDITION,
            ridge: 1e-6,
            max_excursion: 2,
            init_attempts: 20,
            allow_repeats: true,
            time_limit: None,
        }
    }
}

/// Reason the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// No move improves the design.
    Converged,
    /// Iteration budget exhausted.
    MaxIterations,
    /// Time limit passed.
    Deadline,
    /// The design is singular and no move makes it non-singular.
    SingularInformationMatrix,
}

impl Termination {
    /// Returns true if the search converged.
    pub fn converged(&self) -> bool {
        *self == Termination::Converged
    }
}

impl Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Termination::Converged => "converged",
            Termination::MaxIterations => "max iterations",
            Termination::Deadline => "deadline",
            Termination::SingularInformationMatrix => "singular information matrix",
        };
        write!(f, "{reason}")
    }
}

/// How the search obtains its initial design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Start {
    /// Caller supplied candidate indices. The sequential method extends them to the design size,
    /// all other methods require exactly the design size.
    Given(Vec<usize>),
    /// Seeded pseudo-random selection of candidates.
    Random(u64),
    /// Greedy sequential construction.
    Sequential,
}

/// A move proposed by an [ExchangeStrategy].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Move {
    /// Append a candidate.
    Add {
        /// Candidate index.
        candidate: usize,
    },
    /// Replace the design point at a position by a candidate.
    Swap {
        /// Design position.
        position: usize,
        /// Candidate index.
        candidate: usize,
    },
    /// Several swaps of one sweep over the design positions.
    Sweep {
        /// Number of applied swaps.
        swaps: usize,
    },
    /// Grow and shrink (or shrink and grow) the design by `depth` points.
    Excursion {
        /// Number of points added and removed.
        depth: usize,
    },
}

/// Design under search together with its information matrix and score.
///
/// The score of a singular design is negative infinity.
#[derive(Debug, Clone)]
pub struct ExchangeState {
    rows: Vec<usize>,
    xtx: Mat<f64>,
    info: InformationMatrix,
    score: f64,
}

impl ExchangeState {
    /// Returns the candidate indices of the design.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Returns the unnormalized `X^T X` of the design.
    pub fn xtx(&self) -> &Mat<f64> {
        &self.xtx
    }

    /// Returns the information matrix.
    pub fn info(&self) -> &InformationMatrix {
        &self.info
    }

    /// Returns the criterion score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Returns true if the information matrix is rank deficient.
    pub fn is_singular(&self) -> bool {
        self.info.is_rank_deficient()
    }

    fn key(&self, ridge: f64) -> FeasibilityKey {
        if self.is_singular() {
            FeasibilityKey {
                regular: false,
                value: self.info.ridge_log_determinant(ridge),
            }
        } else {
            FeasibilityKey {
                regular: true,
                value: self.score,
            }
        }
    }
}

/// Orders designs for greedy steps: regular designs by score beat singular designs, which are
/// ordered by `ln det(M + ridge I)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FeasibilityKey {
    regular: bool,
    value: f64,
}

impl FeasibilityKey {
    fn beats(&self, other: &FeasibilityKey) -> bool {
        match (self.regular, other.regular) {
            (true, false) => true,
            (false, true) => false,
            _ => self.value > other.value,
        }
    }

    fn improves(&self, other: &FeasibilityKey, tol: f64) -> bool {
        match (self.regular, other.regular) {
            (true, false) => true,
            (false, true) => false,
            _ if other.value == f64::NEG_INFINITY => self.value > other.value,
            _ => self.value > other.value + tol * other.value.abs(),
        }
    }
}

/// Proposed move and the design it leads to.
#[derive(Debug, Clone)]
pub struct Proposal {
    /// The move.
    pub mv: Move,
    /// Design after the move.
    pub state: ExchangeState,
}

/// Defines an exchange algorithm by its move proposals.
pub trait ExchangeStrategy {
    /// Returns the next move from `state`, or none if the strategy finds no candidate move.
    fn propose_move(
        &self,
        state: &ExchangeState,
        ctx: &mut SearchContext<'_>,
    ) -> Result<Option<Proposal>>;

    /// Returns true if the design needs no further moves regardless of the score.
    fn finished(&self, _state: &ExchangeState, _ctx: &SearchContext<'_>) -> bool {
        false
    }
}

/// Scores trial designs of a single search and counts the singular ones.
pub struct SearchContext<'a> {
    evaluator: &'a CriterionEvaluator,
    augmentation: Option<&'a Augmentation>,
    criteria: &'a SearchCriteria,
    n_points: usize,
    singular_trials: usize,
}

impl<'a> SearchContext<'a> {
    fn new(
        evaluator: &'a CriterionEvaluator,
        augmentation: Option<&'a Augmentation>,
        criteria: &'a SearchCriteria,
        n_points: usize,
    ) -> Self {
        Self {
            evaluator,
            augmentation,
            criteria,
            n_points,
            singular_trials: 0,
        }
    }

    /// Returns the number of candidates N.
    pub fn n_candidates(&self) -> usize {
        self.evaluator.candidates_t().ncols()
    }

    /// Returns the target design size n.
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Returns the search options.
    pub fn criteria(&self) -> &SearchCriteria {
        self.criteria
    }

    /// Returns true if `candidate` may enter `rows`.
    pub fn available(&self, rows: &[usize], candidate: usize) -> bool {
        self.criteria.allow_repeats || !rows.contains(&candidate)
    }

    fn state(&mut self, rows: Vec<usize>, xtx: Mat<f64>) -> Result<ExchangeState> {
        let info = InformationMatrix::from_xtx(
            &xtx,
            rows.len(),
            self.augmentation,
            self.criteria.max_condition,
        )?;
        let score = if info.is_rank_deficient() {
            if rows.len() >= info.n_terms() {
                self.singular_trials += 1;
                debug!(
                    "Singular trial design with rank {} of {}",
                    info.rank(),
                    info.n_terms()
                );
            }
            f64::NEG_INFINITY
        } else {
            self.evaluator.score(&info, &rows)?
        };
        Ok(ExchangeState {
            rows,
            xtx,
            info,
            score,
        })
    }

    /// Evaluates the design `rows` from scratch.
    pub fn evaluate(&mut self, rows: Vec<usize>) -> Result<ExchangeState> {
        let xtx = gram_of_columns(self.evaluator.candidates_t(), &rows);
        self.state(rows, xtx)
    }

    /// Returns the design with `candidate` appended.
    pub fn with_added(&mut self, state: &ExchangeState, candidate: usize) -> Result<ExchangeState> {
        let mut xtx = state.xtx.clone();
        rank_one_update(&mut xtx, self.evaluator.candidates_t().col(candidate), 1.);
        let mut rows = state.rows.clone();
        rows.push(candidate);
        self.state(rows, xtx)
    }

    /// Returns the design without the point at `position`.
    pub fn with_removed(&mut self, state: &ExchangeState, position: usize) -> Result<ExchangeState> {
        let mut xtx = state.xtx.clone();
        let mut rows = state.rows.clone();
        let candidate = rows.remove(position);
        rank_one_update(&mut xtx, self.evaluator.candidates_t().col(candidate), -1.);
        self.state(rows, xtx)
    }

    /// Returns the design with the point at `position` replaced by `candidate`.
    pub fn with_swapped(
        &mut self,
        state: &ExchangeState,
        position: usize,
        candidate: usize,
    ) -> Result<ExchangeState> {
        let candidates_t = self.evaluator.candidates_t();
        let mut xtx = state.xtx.clone();
        rank_one_update(&mut xtx, candidates_t.col(state.rows[position]), -1.);
        rank_one_update(&mut xtx, candidates_t.col(candidate), 1.);
        let mut rows = state.rows.clone();
        rows[position] = candidate;
        self.state(rows, xtx)
    }

    /// Returns true if `b` beats `a` in a greedy step.
    pub fn beats(&self, b: &ExchangeState, a: &ExchangeState) -> bool {
        b.key(self.criteria.ridge).beats(&a.key(self.criteria.ridge))
    }

    /// Returns true if `b` improves on `a` by more than the tolerance.
    pub fn improves(&self, b: &ExchangeState, a: &ExchangeState) -> bool {
        b.key(self.criteria.ridge)
            .improves(&a.key(self.criteria.ridge), self.criteria.tol)
    }

    /// Returns the best design with one more candidate and the candidate index, the earliest
    /// candidate on ties. With `fresh` only candidates outside the design are tried as long as
    /// there are any.
    pub fn best_addition(
        &mut self,
        state: &ExchangeState,
        fresh: bool,
    ) -> Result<Option<(usize, ExchangeState)>> {
        let n_candidates = self.n_candidates();
        let unused = |c: &usize| !state.rows.contains(c);
        let exhausted = fresh && !(0..n_candidates).any(|c| unused(&c));
        let mut best: Option<(usize, ExchangeState)> = None;
        for candidate in 0..n_candidates {
            if !self.available(&state.rows, candidate)
                || (fresh && !exhausted && !unused(&candidate))
            {
                continue;
            }
            let trial = self.with_added(state, candidate)?;
            if best.as_ref().is_none_or(|(_, b)| self.beats(&trial, b)) {
                best = Some((candidate, trial));
            }
        }
        Ok(best)
    }

    /// Returns the best design with one point less and the removed position, the earliest
    /// position on ties.
    pub fn best_removal(&mut self, state: &ExchangeState) -> Result<Option<(usize, ExchangeState)>> {
        let mut best: Option<(usize, ExchangeState)> = None;
        for position in 0..state.rows.len() {
            let trial = self.with_removed(state, position)?;
            if best.as_ref().is_none_or(|(_, b)| self.beats(&trial, b)) {
                best = Some((position, trial));
            }
        }
        Ok(best)
    }
}

/// Outcome of a single exchange search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Final design.
    pub state: ExchangeState,
    /// Reason the search stopped.
    pub termination: Termination,
    /// Number of performed iterations.
    pub iterations: usize,
    /// Number of singular trial designs met on the way.
    pub singular_moves: usize,
    /// Scores of the regular designs accepted along the search, starting with the initial one.
    pub history: Vec<f64>,
}

/// Runs the exchange search of one method for one criterion.
#[derive(Clone)]
pub struct ExchangeEngine {
    evaluator: CriterionEvaluator,
    augmentation: Option<Augmentation>,
    method: Method,
    criteria: SearchCriteria,
}

impl ExchangeEngine {
    /// Creates the engine.
    pub fn new(evaluator: CriterionEvaluator, method: Method, criteria: SearchCriteria) -> Self {
        Self {
            evaluator,
            augmentation: None,
            method,
            criteria,
        }
    }

    /// Returns engine whose information matrices are augmented.
    pub fn with_augmentation(mut self, augmentation: Option<Augmentation>) -> Self {
        self.augmentation = augmentation;
        self
    }

    /// Returns the method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the criterion evaluator.
    pub fn evaluator(&self) -> &CriterionEvaluator {
        &self.evaluator
    }

    /// Searches a design of `n_points` points from `start`.
    pub fn run(&self, n_points: usize, start: &Start) -> Result<SearchResult> {
        let mut ctx = SearchContext::new(
            &self.evaluator,
            self.augmentation.as_ref(),
            &self.criteria,
            n_points,
        );
        let strategy = self.method.strategy(&self.criteria);
        let mut state = self.initialize(&mut ctx, start)?;
        let max_iter = self
            .criteria
            .max_iter
            .unwrap_or(self.method.default_max_iter(n_points));
        let deadline = self.criteria.time_limit.map(|t| Instant::now() + t);
        let mut history = Vec::new();
        if !state.is_singular() {
            history.push(state.score);
        }
        let mut iterations = 0;
        let termination = loop {
            if strategy.finished(&state, &ctx) {
                break blocked_or_converged(&state);
            }
            let complete = state.rows.len() >= n_points;
            if complete && iterations >= max_iter {
                break Termination::MaxIterations;
            }
            if complete && deadline.is_some_and(|d| Instant::now() >= d) {
                break Termination::Deadline;
            }
            iterations += 1;
            let Some(proposal) = strategy.propose_move(&state, &mut ctx)? else {
                break blocked_or_converged(&state);
            };
            let growth = matches!(proposal.mv, Move::Add { .. });
            if !growth && !ctx.improves(&proposal.state, &state) {
                break blocked_or_converged(&state);
            }
            debug!(
                "{} iteration {iterations}: {:?} score {:e} -> {:e}",
                self.method, proposal.mv, state.score, proposal.state.score
            );
            state = proposal.state;
            if !state.is_singular() {
                history.push(state.score);
            }
        };
        if termination == Termination::SingularInformationMatrix {
            warn!(
                "{} stopped with singular information matrix of rank {} of {}",
                self.method,
                state.info.rank(),
                state.info.n_terms()
            );
        }
        info!(
            "{} terminated ({termination}) after {iterations} iterations with {} score {:e}",
            self.method,
            self.evaluator.criterion(),
            state.score
        );
        Ok(SearchResult {
            state,
            termination,
            iterations,
            singular_moves: ctx.singular_trials,
            history,
        })
    }

    fn initialize(&self, ctx: &mut SearchContext<'_>, start: &Start) -> Result<ExchangeState> {
        let n_points = ctx.n_points();
        let n_candidates = ctx.n_candidates();
        if n_candidates == 0 {
            return Err(Error::InfeasibleDesignSize {
                n_points,
                n_terms: self.evaluator.candidates_t().nrows(),
                n_candidates,
            });
        }
        let sequential = self.method == Method::Sequential;
        match start {
            Start::Given(rows) => {
                if let Some(&index) = rows.iter().find(|&&r| r >= n_candidates) {
                    return Err(Error::CandidateIndex {
                        index,
                        n_candidates,
                    });
                }
                let size_ok = if sequential {
                    rows.len() <= n_points
                } else {
                    rows.len() == n_points
                };
                if !size_ok {
                    return Err(Error::ShapeMismatch {
                        mat1: "initial design",
                        mat2: "design",
                        dim1: 0,
                        dim2: 0,
                        shape1: (rows.len(), 1),
                        shape2: (n_points, 1),
                    });
                }
                ctx.evaluate(rows.clone())
            }
            _ if sequential => ctx.evaluate(Vec::new()),
            Start::Random(seed) => {
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(*seed);
                for attempt in 0..self.criteria.init_attempts {
                    let rows = random_rows(&mut rng, n_candidates, n_points);
                    let state = ctx.evaluate(rows)?;
                    if !state.is_singular() {
                        debug!("Random start found after {} attempts", attempt + 1);
                        return Ok(state);
                    }
                }
                warn!(
                    "No regular random start in {} attempts, falling back to the sequential start",
                    self.criteria.init_attempts
                );
                sequential_fill(ctx, Vec::new())
            }
            Start::Sequential => sequential_fill(ctx, Vec::new()),
        }
    }
}

fn blocked_or_converged(state: &ExchangeState) -> Termination {
    if state.is_singular() {
        Termination::SingularInformationMatrix
    } else {
        Termination::Converged
    }
}

/// Draws `n` candidate indices, without replacement whenever the candidate set is large enough.
fn random_rows(rng: &mut Xoshiro256PlusPlus, n_candidates: usize, n: usize) -> Vec<usize> {
    if n <= n_candidates {
        sample(rng, n_candidates, n).into_vec()
    } else {
        (0..n).map(|_| rng.random_range(0..n_candidates)).collect()
    }
}

/// Greedily completes `rows` to the design size, preferring candidates outside the design.
pub(crate) fn sequential_fill(
    ctx: &mut SearchContext<'_>,
    rows: Vec<usize>,
) -> Result<ExchangeState> {
    let mut state = ctx.evaluate(rows)?;
    while state.rows.len() < ctx.n_points() {
        match ctx.best_addition(&state, true)? {
            Some((_, next)) => state = next,
            None => break,
        }
    }
    Ok(state)
}
