use super::{DesignContext, Optimality};
use crate::{InformationMatrix, Result};

/// A-Optimality minimizes the average variance of the coefficient estimates,
///
/// `phi_A(M) = -tr(M^{-1})`.
///
/// Fails with [crate::Error::SingularInformationMatrix] for rank deficient M.
#[derive(Debug, Clone, Copy, Default)]
pub struct AOptimality;

impl AOptimality {
    /// Instantizes [AOptimality]
    pub fn new() -> Self {
        Self
    }
}

impl Optimality for AOptimality {
    fn score(&self, info: &InformationMatrix, _ctx: &DesignContext<'_>) -> Result<f64> {
        Ok(-info.trace_inverse()?)
    }
}
