use super::{ExchangeState, ExchangeStrategy, Move, Proposal, SearchContext};
use crate::Result;

/// Dykstra's sequential construction.
///
/// Grows the design one point at a time by the candidate not yet in the design which improves
/// the criterion most. Once every candidate is part of the design, all become available again.
/// Points are never removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl ExchangeStrategy for Sequential {
    fn propose_move(
        &self,
        state: &ExchangeState,
        ctx: &mut SearchContext<'_>,
    ) -> Result<Option<Proposal>> {
        if self.finished(state, ctx) {
            return Ok(None);
        }
        let proposal = ctx
            .best_addition(state, true)?
            .map(|(candidate, next)| Proposal {
                mv: Move::Add { candidate },
                state: next,
            });
        Ok(proposal)
    }

    fn finished(&self, state: &ExchangeState, ctx: &SearchContext<'_>) -> bool {
        state.rows().len() >= ctx.n_points()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Criterion, Result,
        exchange::{ExchangeEngine, Method, SearchCriteria, Start, Termination, tests::straight_line_evaluator},
    };
    use std::time::Duration;

    #[test]
    fn grows_to_design_size() -> Result<()> {
        let evaluator = straight_line_evaluator(Criterion::D)?;
        let engine = ExchangeEngine::new(evaluator, Method::Sequential, SearchCriteria::default());
        let result = engine.run(4, &Start::Sequential)?;
        assert_eq!(result.state.rows().len(), 4);
        assert_eq!(result.iterations, 4);
        assert_eq!(result.termination, Termination::Converged);
        // the ends first, then the next best fresh points
        assert_eq!(&result.state.rows()[..2], &[0, 4]);
        Ok(())
    }

    #[test]
    fn reuses_candidates_once_exhausted() -> Result<()> {
        let evaluator = straight_line_evaluator(Criterion::D)?;
        let engine = ExchangeEngine::new(evaluator, Method::Sequential, SearchCriteria::default());
        let result = engine.run(7, &Start::Sequential)?;
        let mut rows = result.state.rows().to_vec();
        rows.sort();
        rows.dedup();
        assert_eq!(rows, vec![0, 1, 2, 3, 4]);
        assert_eq!(result.state.rows().len(), 7);
        Ok(())
    }

    #[test]
    fn budget_does_not_truncate_design() -> Result<()> {
        let evaluator = straight_line_evaluator(Criterion::D)?;
        let criteria = SearchCriteria {
            max_iter: Some(2),
            time_limit: Some(Duration::ZERO),
            ..SearchCriteria::default()
        };
        let engine = ExchangeEngine::new(evaluator, Method::Sequential, criteria);
        let result = engine.run(4, &Start::Sequential)?;
        assert_eq!(result.state.rows().len(), 4);
        assert_eq!(result.iterations, 4);
        assert_eq!(result.termination, Termination::Converged);
        Ok(())
    }

    #[test]
    fn extends_given_design() -> Result<()> {
        let evaluator = straight_line_evaluator(Criterion::D)?;
        let engine = ExchangeEngine::new(evaluator, Method::Sequential, SearchCriteria::default());
        let result = engine.run(3, &Start::Given(vec![2]))?;
        assert_eq!(result.state.rows()[0], 2);
        assert_eq!(result.state.rows().len(), 3);
        assert_eq!(result.iterations, 2);
        Ok(())
    }
}
