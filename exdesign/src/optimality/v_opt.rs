use super::{DesignContext, Optimality};
use crate::{InformationMatrix, Result};
use faer::Mat;

/// V-Optimality minimizes the mean prediction variance over a set of test points. Without test
/// points the design points themselves are used.
#[derive(Debug, Clone)]
pub struct VOptimality {
    test_points_t: Option<Mat<f64>>,
}

impl VOptimality {
    /// Instantizes [VOptimality] from the transposed model matrix of the test points.
    pub fn new(test_points_t: Option<Mat<f64>>) -> Self {
        Self { test_points_t }
    }
}

impl Optimality for VOptimality {
    fn score(&self, info: &InformationMatrix, ctx: &DesignContext<'_>) -> Result<f64> {
        let (sum, m) = match &self.test_points_t {
            Some(test_t) => {
                let mut sum = 0.;
                for x in test_t.col_iter() {
                    sum += info.prediction_variance(x)?;
                }
                (sum, test_t.ncols())
            }
            None => {
                let mut sum = 0.;
                for &r in ctx.rows {
                    sum += info.prediction_variance(ctx.candidates_t.col(r))?;
                }
                (sum, ctx.rows.len())
            }
        };
        Ok(-sum / m.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn mean_variance_over_test_points() -> Result<()> {
        let x = mat![[1., -1.], [1., 1.]];
        let info = InformationMatrix::evaluate(&x)?;
        let candidates_t = mat![[1., 1., 1.], [-1., 0., 1.]];
        let ctx = DesignContext {
            candidates_t: &candidates_t,
            rows: &[0, 2],
        };
        let test_t = mat![[1.], [0.]];
        let score = VOptimality::new(Some(test_t)).score(&info, &ctx)?;
        assert!((score + 1.).abs() < 1e-10);
        Ok(())
    }

    #[test]
    fn design_points_by_default() -> Result<()> {
        // the mean variance over the design points of an unaugmented design is always p
        let x = mat![[1., -1.], [1., 1.], [1., 0.]];
        let info = InformationMatrix::evaluate(&x)?;
        let candidates_t = mat![[1., 1., 1.], [-1., 0., 1.]];
        let ctx = DesignContext {
            candidates_t: &candidates_t,
            rows: &[0, 2, 1],
        };
        let score = VOptimality::new(None).score(&info, &ctx)?;
        assert!((score + 2.).abs() < 1e-10);
        Ok(())
    }
}
