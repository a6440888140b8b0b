use super::{ExchangeState, ExchangeStrategy, Move, Proposal, SearchContext};
use crate::Result;

/// Mitchell's DETMAX.
///
/// Tries excursions of depth `d = 1, ..., max_excursion`: the design is grown by d best
/// candidates and shrunk back by the d least useful points, or shrunk first and grown
/// afterwards. The first excursion which improves the criterion is proposed.
#[derive(Debug, Clone, Copy)]
pub struct Detmax {
    max_excursion: usize,
}

impl Detmax {
    /// Instantizes [Detmax] with maximal excursion depth.
    pub fn new(max_excursion: usize) -> Self {
        Self { max_excursion }
    }

    fn grow(
        ctx: &mut SearchContext<'_>,
        mut state: ExchangeState,
        depth: usize,
    ) -> Result<Option<ExchangeState>> {
        for _ in 0..depth {
            match ctx.best_addition(&state, false)? {
                Some((_, next)) => state = next,
                None => return Ok(None),
            }
        }
        Ok(Some(state))
    }

    fn shrink(
        ctx: &mut SearchContext<'_>,
        mut state: ExchangeState,
        depth: usize,
    ) -> Result<Option<ExchangeState>> {
        for _ in 0..depth {
            match ctx.best_removal(&state)? {
                Some((_, next)) => state = next,
                None => return Ok(None),
            }
        }
        Ok(Some(state))
    }

    fn excursion(
        ctx: &mut SearchContext<'_>,
        state: &ExchangeState,
        depth: usize,
        upwards: bool,
    ) -> Result<Option<ExchangeState>> {
        let halfway = if upwards {
            Self::grow(ctx, state.clone(), depth)?
        } else {
            Self::shrink(ctx, state.clone(), depth)?
        };
        let Some(halfway) = halfway else {
            return Ok(None);
        };
        if upwards {
            Self::shrink(ctx, halfway, depth)
        } else {
            Self::grow(ctx, halfway, depth)
        }
    }
}

impl Default for Detmax {
    fn default() -> Self {
        Self::new(2)
    }
}

impl ExchangeStrategy for Detmax {
    fn propose_move(
        &self,
        state: &ExchangeState,
        ctx: &mut SearchContext<'_>,
    ) -> Result<Option<Proposal>> {
        for depth in 1..=self.max_excursion {
            for upwards in [true, false] {
                if !upwards && depth >= state.rows().len() {
                    continue;
                }
                if let Some(next) = Self::excursion(ctx, state, depth, upwards)? {
                    if ctx.improves(&next, state) {
                        return Ok(Some(Proposal {
                            mv: Move::Excursion { depth },
                            state: next,
                        }));
                    }
                }
            }
        }
        Ok(None)
    }
}
