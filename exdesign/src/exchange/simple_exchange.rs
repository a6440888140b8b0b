use super::{ExchangeState, ExchangeStrategy, Move, Proposal, SearchContext};
use crate::Result;

/// Wynn-Mitchell simple exchange.
///
/// Drops the design point whose removal hurts the criterion least, then adds the best candidate
/// to the reduced design. Both steps form one swap at the position of the dropped point.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleExchange;

impl ExchangeStrategy for SimpleExchange {
    fn propose_move(
        &self,
        state: &ExchangeState,
        ctx: &mut SearchContext<'_>,
    ) -> Result<Option<Proposal>> {
        let Some((position, reduced)) = ctx.best_removal(state)? else {
            return Ok(None);
        };
        let Some((candidate, _)) = ctx.best_addition(&reduced, false)? else {
            return Ok(None);
        };
        if candidate == state.rows()[position] {
            return Ok(None);
        }
        let next = ctx.with_swapped(state, position, candidate)?;
        Ok(Some(Proposal {
            mv: Move::Swap {
                position,
                candidate,
            },
            state: next,
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Criterion, Result,
        exchange::{ExchangeEngine, Method, SearchCriteria, Start, tests::straight_line_evaluator},
    };

    #[test]
    fn moves_inner_points_outwards() -> Result<()> {
        let evaluator = straight_line_evaluator(Criterion::D)?;
        let engine = ExchangeEngine::new(evaluator, Method::SimpleExchange, SearchCriteria::default());
        let result = engine.run(2, &Start::Given(vec![1, 2]))?;
        assert!(result.termination.converged());
        let mut rows = result.state.rows().to_vec();
        rows.sort();
        assert_eq!(rows, vec![0, 4]);
        assert!(result.history.windows(2).all(|w| w[1] >= w[0]));
        Ok(())
    }
}
