use super::{DesignContext, Optimality};
use crate::{InformationMatrix, Result};

/// S-Optimality drives the information matrix towards orthogonality of the model terms by
/// minimizing the squared off-diagonal entries,
///
/// `phi_S(M) = -sum_{i != j} M_ij^2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SOptimality;

impl SOptimality {
    /// Instantizes [SOptimality]
    pub fn new() -> Self {
        Self
    }
}

impl Optimality for SOptimality {
    fn score(&self, info: &InformationMatrix, _ctx: &DesignContext<'_>) -> Result<f64> {
        let m = info.matrix();
        let mut off_diagonal = 0.;
        for j in 0..m.ncols() {
            for i in (0..m.nrows()).filter(|&i| i != j) {
                off_diagonal += m[(i, j)] * m[(i, j)];
            }
        }
        Ok(-off_diagonal)
    }
}
