use super::{DesignContext, Optimality};
use crate::{InformationMatrix, Result};

/// D-Optimality maximizes the determinant of the information matrix,
///
/// `phi_D(M) = det(M)`,
///
/// i.e. minimizes the volume of the confidence ellipsoid of the coefficients.
#[derive(Debug, Clone, Copy, Default)]
pub struct DOptimality;

impl DOptimality {
    /// Instantizes [DOptimality]
    pub fn new() -> Self {
        Self
    }
}

impl Optimality for DOptimality {
    fn score(&self, info: &InformationMatrix, _ctx: &DesignContext<'_>) -> Result<f64> {
        Ok(info.determinant())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::{Mat, mat};

    #[test]
    fn determinant_of_factorial() -> Result<()> {
        // 2^2 factorial with intercept: X^T X = 4 I, M = I
        let x = mat![[1., -1., -1.], [1., 1., -1.], [1., -1., 1.], [1., 1., 1.]];
        let info = InformationMatrix::evaluate(&x)?;
        let candidates_t = Mat::<f64>::zeros(3, 0);
        let ctx = DesignContext {
            candidates_t: &candidates_t,
            rows: &[],
        };
        assert!((DOptimality::new().score(&info, &ctx)? - 1.).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn singular_scores_zero() -> Result<()> {
        let x = mat![[1., 1.], [1., 1.]];
        let info = InformationMatrix::evaluate(&x)?;
        let candidates_t = Mat::<f64>::zeros(2, 0);
        let ctx = DesignContext {
            candidates_t: &candidates_t,
            rows: &[],
        };
        let score = DOptimality::new().score(&info, &ctx)?;
        assert!(score >= 0. && score < 1e-12);
        Ok(())
    }
}
