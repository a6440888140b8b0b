use super::{ExchangeState, ExchangeStrategy, Move, Proposal, SearchContext};
use crate::Result;

/// Cook-Nachtsheim modification of Fedorov's exchange.
///
/// Visits the design positions in order and immediately applies the best improving swap of
/// each. One sweep over all positions forms a single move.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifiedFedorov;

impl ExchangeStrategy for ModifiedFedorov {
    fn propose_move(
        &self,
        state: &ExchangeState,
        ctx: &mut SearchContext<'_>,
    ) -> Result<Option<Proposal>> {
        let mut current = state.clone();
        let mut swaps = 0;
        for position in 0..current.rows().len() {
            let mut best: Option<ExchangeState> = None;
            for candidate in 0..ctx.n_candidates() {
                if current.rows()[position] == candidate
                    || !ctx.available(current.rows(), candidate)
                {
                    continue;
                }
                let trial = ctx.with_swapped(&current, position, candidate)?;
                if best.as_ref().is_none_or(|b| ctx.beats(&trial, b)) {
                    best = Some(trial);
                }
            }
            if let Some(best) = best.filter(|b| ctx.improves(b, &current)) {
                current = best;
                swaps += 1;
            }
        }
        Ok((swaps > 0).then_some(Proposal {
            mv: Move::Sweep { swaps },
            state: current,
        }))
    }
}
