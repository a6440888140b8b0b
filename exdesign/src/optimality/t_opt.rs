use super::{DesignContext, Optimality};
use crate::{Error, InformationMatrix, Result};
use faer::Mat;
use nalgebra::DVector;

/// T-Optimality discriminates between two rival models. Given the difference `d` of their mean
/// responses at every candidate, it maximizes the squared length of the projection of `d` on the
/// design onto the span of the fitted model's terms,
///
/// `phi_T(M) = z^T M^{-1} z / n`, `z = sum_a d(x_a) phi(x_a)`,
///
/// summed over the n design points.
#[derive(Debug, Clone)]
pub struct TOptimality {
    difference: Vec<f64>,
}

impl TOptimality {
    /// Instantizes [TOptimality], the difference needs one entry per candidate.
    pub fn new(difference: &DVector<f64>, n_candidates: usize) -> Result<Self> {
        if difference.nrows() != n_candidates {
            return Err(Error::ShapeMismatch {
                mat1: "candidates",
                mat2: "model difference",
                dim1: 0,
                dim2: 0,
                shape1: (n_candidates, 1),
                shape2: difference.shape(),
            });
        }
        Ok(Self {
            difference: difference.iter().copied().collect(),
        })
    }
}

impl Optimality for TOptimality {
    fn score(&self, info: &InformationMatrix, ctx: &DesignContext<'_>) -> Result<f64> {
        let p = ctx.candidates_t.nrows();
        let mut z = Mat::<f64>::zeros(p, 1);
        for &r in ctx.rows {
            let x = ctx.candidates_t.col(r);
            for i in 0..p {
                z[(i, 0)] += self.difference[r] * x[i];
            }
        }
        let n = info.n_runs().max(1) as f64;
        Ok(info.prediction_variance(z.col(0))? / n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn explained_difference_of_straight_line() -> Result<()> {
        // rival difference d(x) = x is explained by the slope, the projection recovers |d|^2
        let candidates_t = mat![[1., 1., 1.], [-1., 0., 1.]];
        let x = mat![[1., -1.], [1., 1.]];
        let info = InformationMatrix::evaluate(&x)?;
        let ctx = DesignContext {
            candidates_t: &candidates_t,
            rows: &[0, 2],
        };
        let t = TOptimality::new(&DVector::from_vec(vec![-1., 0., 1.]), 3)?;
        assert!((t.score(&info, &ctx)? - 2.).abs() < 1e-10);
        Ok(())
    }

    #[test]
    fn difference_length_checked() -> Result<()> {
        assert!(TOptimality::new(&DVector::from_vec(vec![1., 2.]), 3).is_err());
        Ok(())
    }
}
