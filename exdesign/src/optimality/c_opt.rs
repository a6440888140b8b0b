use super::{DesignContext, Optimality};
use crate::{Error, InformationMatrix, Result};
use faer::Mat;
use nalgebra::DVector;

/// C-Optimality
///
/// Minimizes the variance of the linear combination `c^T beta` of the coefficients,
///
/// `phi_C(M) = -c^T M^{-1} c`.
///
/// Setting `c^T = (0, ..., 0, 1)` builds a design which estimates the last coefficient best, e.g.
/// for testing the null hypothesis `beta_p = 0`.
#[derive(Debug, Clone)]
pub struct COptimality {
    c: Mat<f64>,
}

impl COptimality {
    /// Instantizes [COptimality], the contrast must have one entry per model term.
    pub fn new(c: &DVector<f64>, n_terms: usize) -> Result<Self> {
        if c.nrows() != n_terms {
            return Err(Error::ShapeMismatch {
                mat1: "features",
                mat2: "c",
                dim1: 0,
                dim2: 0,
                shape1: (n_terms, 1),
                shape2: c.shape(),
            });
        }
        Ok(Self {
            c: Mat::from_fn(n_terms, 1, |i, _| c[i]),
        })
    }
}

impl Optimality for COptimality {
    fn score(&self, info: &InformationMatrix, _ctx: &DesignContext<'_>) -> Result<f64> {
        Ok(-info.prediction_variance(self.c.col(0))?)
    }
}
