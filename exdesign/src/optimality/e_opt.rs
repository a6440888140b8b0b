use super::{DesignContext, Optimality};
use crate::{InformationMatrix, Result};

/// E-Optimality maximizes the smallest eigenvalue of the information matrix, which bounds the
/// worst estimated linear combination of unit length.
#[derive(Debug, Clone, Copy, Default)]
pub struct EOptimality;

impl EOptimality {
    /// Instantizes [EOptimality]
    pub fn new() -> Self {
        Self
    }
}

impl Optimality for EOptimality {
    fn score(&self, info: &InformationMatrix, _ctx: &DesignContext<'_>) -> Result<f64> {
        Ok(info.min_eigenvalue())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::{Mat, mat};

    #[test]
    fn smallest_eigenvalue() -> Result<()> {
        // M = diag(2, 1/2)
        let x = mat![[2., 0.], [0., 1.]];
        let info = InformationMatrix::evaluate(&x)?;
        let candidates_t = Mat::<f64>::zeros(2, 0);
        let ctx = DesignContext {
            candidates_t: &candidates_t,
            rows: &[],
        };
        assert!((EOptimality::new().score(&info, &ctx)? - 0.5).abs() < 1e-12);
        Ok(())
    }
}
