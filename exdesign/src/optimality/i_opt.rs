use super::{DesignContext, Optimality, prediction_variances};
use crate::{InformationMatrix, Result};
use faer::Mat;

/// I-Optimality (integrated variance) minimizes the mean prediction variance over a reference
/// set of points,
///
/// `phi_I(M) = -1/m sum_k x_k^T M^{-1} x_k`,
///
/// where `x_k` are the term vectors of the m reference points.
#[derive(Debug, Clone)]
pub struct IOptimality {
    reference_t: Mat<f64>,
}

impl IOptimality {
    /// Instantizes [IOptimality] from the transposed model matrix of the reference points.
    pub fn new(reference_t: Mat<f64>) -> Self {
        Self { reference_t }
    }
}

impl Optimality for IOptimality {
    fn score(&self, info: &InformationMatrix, _ctx: &DesignContext<'_>) -> Result<f64> {
        let variances = prediction_variances(info, &self.reference_t)?;
        let m = variances.len().max(1) as f64;
        Ok(-variances.iter().sum::<f64>() / m)
    }
}
