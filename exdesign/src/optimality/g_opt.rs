use super::{DesignContext, Optimality, prediction_variances};
use crate::{InformationMatrix, Result};
use faer::Mat;

/// G-Optimality minimizes the maximal prediction variance over a reference set of points,
///
/// `phi_G(M) = -max_k x_k^T M^{-1} x_k`.
///
/// By the Kiefer-Wolfowitz equivalence the maximum is at least p for every design.
#[derive(Debug, Clone)]
pub struct GOptimality {
    reference_t: Mat<f64>,
}

impl GOptimality {
    /// Instantizes [GOptimality] from the transposed model matrix of the reference points.
    pub fn new(reference_t: Mat<f64>) -> Self {
        Self { reference_t }
    }
}

impl Optimality for GOptimality {
    fn score(&self, info: &InformationMatrix, _ctx: &DesignContext<'_>) -> Result<f64> {
        let max = prediction_variances(info, &self.reference_t)?
            .into_iter()
            .fold(0., f64::max);
        Ok(-max)
    }
}
