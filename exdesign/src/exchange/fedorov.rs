use super::{ExchangeState, ExchangeStrategy, Move, Proposal, SearchContext};
use crate::Result;

/// Fedorov's exchange.
///
/// Evaluates every swap of a design point against a candidate and proposes the best one. Ties
/// keep the earliest candidate, then the earliest design position.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fedorov;

impl ExchangeStrategy for Fedorov {
    fn propose_move(
        &self,
        state: &ExchangeState,
        ctx: &mut SearchContext<'_>,
    ) -> Result<Option<Proposal>> {
        let rows = state.rows();
        let mut best: Option<Proposal> = None;
        for candidate in 0..ctx.n_candidates() {
            if !ctx.available(rows, candidate) {
                continue;
            }
            for position in 0..rows.len() {
                // swapping out a repeated point gives the design of its first occurrence
                if rows[position] == candidate || rows[..position].contains(&rows[position]) {
                    continue;
                }
                let trial = ctx.with_swapped(state, position, candidate)?;
                if best.as_ref().is_none_or(|b| ctx.beats(&trial, &b.state)) {
                    best = Some(Proposal {
                        mv: Move::Swap {
                            position,
                            candidate,
                        },
                        state: trial,
                    });
                }
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Criterion, Result,
        exchange::{
            ExchangeEngine, Method, SearchCriteria, Start, Termination,
            tests::straight_line_evaluator,
        },
    };

    #[test]
    fn reaches_the_ends_of_the_line() -> Result<()> {
        let evaluator = straight_line_evaluator(Criterion::D)?;
        let engine = ExchangeEngine::new(evaluator, Method::Fedorov, SearchCriteria::default());
        let result = engine.run(2, &Start::Given(vec![2, 3]))?;
        assert_eq!(result.termination, Termination::Converged);
        let mut rows = result.state.rows().to_vec();
        rows.sort();
        assert_eq!(rows, vec![0, 4]);
        // det M = 1 for the points -1 and 1
        assert!((result.state.score() - 1.).abs() < 1e-12);
        assert!(result.history.windows(2).all(|w| w[1] > w[0]));
        Ok(())
    }

    #[test]
    fn best_swap_with_earliest_candidate() -> Result<()> {
        let evaluator = straight_line_evaluator(Criterion::D)?;
        let criteria = SearchCriteria {
            max_iter: Some(1),
            ..SearchCriteria::default()
        };
        let engine = ExchangeEngine::new(evaluator, Method::Fedorov, criteria);
        // from {0, 0.5} swapping 0 against -1 gives the widest design
        let result = engine.run(2, &Start::Given(vec![2, 3]))?;
        assert_eq!(result.state.rows(), &[0, 3]);
        Ok(())
    }

    #[test]
    fn without_repeats() -> Result<()> {
        let evaluator = straight_line_evaluator(Criterion::D)?;
        let criteria = SearchCriteria {
            allow_repeats: false,
            ..SearchCriteria::default()
        };
        let engine = ExchangeEngine::new(evaluator, Method::Fedorov, criteria);
        let result = engine.run(4, &Start::Sequential)?;
        let mut rows = result.state.rows().to_vec();
        rows.sort();
        rows.dedup();
        assert_eq!(rows.len(), 4);
        Ok(())
    }
}
