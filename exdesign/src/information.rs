use crate::{Error, Result, utils::gram_of_columns};
use faer::{ColRef, Mat, Side};

/// How [InformationMatrix::invert] reacts to a rank deficient matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InverseMode {
    /// Return the Moore-Penrose pseudo-inverse and flag the rank deficiency.
    PseudoInverse,
    /// Fail with [Error::SingularInformationMatrix].
    Strict,
}

/// Augments the information matrix by `alpha` times the moment matrix of the candidate region,
/// `M = (X^T X + alpha X_0^T X_0 / N_0) / n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Augmentation {
    /// Augmentation weight.
    pub alpha: f64,
    /// Uniform moment matrix `X_0^T X_0 / N_0` of the candidate region.
    pub moment: Mat<f64>,
}

impl Augmentation {
    /// Creates the augmentation from the transposed candidate model matrix.
    pub fn new(alpha: f64, candidates_design_t: &Mat<f64>) -> Self {
        Self {
            alpha,
            moment: moment_matrix(candidates_design_t),
        }
    }
}

/// Returns the uniform moment matrix `X_0^T X_0 / N_0` for the transposed model matrix `X_0^T`.
pub fn moment_matrix(design_t: &Mat<f64>) -> Mat<f64> {
    let n = design_t.ncols();
    let rows: Vec<usize> = (0..n).collect();
    let mut moment = gram_of_columns(design_t, &rows);
    let scale = 1. / n.max(1) as f64;
    for j in 0..moment.ncols() {
        for i in 0..moment.nrows() {
            moment[(i, j)] *= scale;
        }
    }
    moment
}

/// Normalized information matrix `M = X^T X / n` together with its self-adjoint
/// eigendecomposition.
///
/// Determinant, inverse, trace of the inverse, eigenvalues and the prediction variance are all
/// derived from the single decomposition computed on construction. The matrix is rank deficient
/// whenever its condition number exceeds `max_condition` or its largest eigenvalue is not
/// positive.
#[derive(Debug, Clone)]
pub struct InformationMatrix {
    m: Mat<f64>,
    n: usize,
    eigenvalues: Vec<f64>,
    eigenvectors: Mat<f64>,
    cutoff: f64,
    rank: usize,
}

impl InformationMatrix {
    /// Default threshold on the condition number above which M is treated as singular.
    pub const DEFAULT_MAX_CONDITION: f64 = 1e12;

    /// Computes `M = X^T X / n` from the model matrix `X` (one row per design point).
    pub fn evaluate(x: &Mat<f64>) -> Result<Self> {
        let xtx = x.transpose() * x;
        Self::from_xtx(&xtx, x.nrows(), None, Self::DEFAULT_MAX_CONDITION)
    }

    /// Computes the (augmented) information matrix from the unnormalized `X^T X` of `n` runs.
    pub fn from_xtx(
        xtx: &Mat<f64>,
        n: usize,
        augmentation: Option<&Augmentation>,
        max_condition: f64,
    ) -> Result<Self> {
        let p = xtx.nrows();
        let mut m = xtx.to_owned();
        if let Some(aug) = augmentation.filter(|a| a.alpha != 0.) {
            for j in 0..p {
                for i in 0..p {
                    m[(i, j)] += aug.alpha * aug.moment[(i, j)];
                }
            }
        }
        let scale = if n > 0 { 1. / n as f64 } else { 0. };
        for j in 0..p {
            for i in 0..p {
                m[(i, j)] *= scale;
            }
        }
        Self::decompose(m, n, max_condition)
    }

    fn decompose(m: Mat<f64>, n: usize, max_condition: f64) -> Result<Self> {
        let evd = m
            .self_adjoint_eigen(Side::Lower)
            .map_err(|_| Error::EigenDecomposition)?;
        let eigenvalues: Vec<f64> = evd.S().column_vector().iter().copied().collect();
        let eigenvectors = evd.U().to_owned();
        let s_max = eigenvalues.iter().copied().fold(0., f64::max);
        let cutoff = s_max / max_condition;
        let rank = if s_max > 0. {
            eigenvalues.iter().filter(|&&s| s > cutoff).count()
        } else {
            0
        };
        Ok(Self {
            m,
            n,
            eigenvalues,
            eigenvectors,
            cutoff,
            rank,
        })
    }

    /// Returns the matrix M.
    pub fn matrix(&self) -> &Mat<f64> {
        &self.m
    }

    /// Returns the number of model terms p.
    pub fn n_terms(&self) -> usize {
        self.m.nrows()
    }

    /// Returns the number of runs n the matrix was normalized with.
    pub fn n_runs(&self) -> usize {
        self.n
    }

    /// Returns the numerical rank.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Returns true if the numerical rank is lower than the number of model terms.
    pub fn is_rank_deficient(&self) -> bool {
        self.rank < self.n_terms()
    }

    /// Returns the eigenvalues in nondecreasing order.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Returns the smallest eigenvalue.
    pub fn min_eigenvalue(&self) -> f64 {
        self.eigenvalues.first().copied().unwrap_or(0.)
    }

    /// Returns `det(M)`, negative rounding noise of a semidefinite matrix is clamped to zero.
    pub fn determinant(&self) -> f64 {
        self.eigenvalues.iter().map(|s| s.max(0.)).product()
    }

    /// Returns `ln det(M + ridge I)`, which stays finite for singular M.
    pub fn ridge_log_determinant(&self, ridge: f64) -> f64 {
        self.eigenvalues.iter().map(|s| (s.max(0.) + ridge).ln()).sum()
    }

    fn check_regular(&self) -> Result<()> {
        if self.is_rank_deficient() {
            return Err(Error::SingularInformationMatrix {
                rank: self.rank,
                n_terms: self.n_terms(),
            });
        }
        Ok(())
    }

    /// Iterates the eigenpairs which take part in the (pseudo-)inverse.
    fn regular_eigenpairs(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        let cutoff = self.cutoff;
        self.eigenvalues
            .iter()
            .copied()
            .enumerate()
            .filter(move |(_, s)| *s > cutoff && *s > 0.)
    }

    /// Returns `(M^{-1}, rank_deficient)`.
    ///
    /// With [InverseMode::PseudoInverse] a rank deficient M yields the pseudo-inverse, with
    /// [InverseMode::Strict] it fails with [Error::SingularInformationMatrix].
    pub fn invert(&self, mode: InverseMode) -> Result<(Mat<f64>, bool)> {
        let rank_deficient = self.is_rank_deficient();
        if mode == InverseMode::Strict {
            self.check_regular()?;
        }
        let p = self.n_terms();
        let u = &self.eigenvectors;
        let mut inv = Mat::<f64>::zeros(p, p);
        for (k, s) in self.regular_eigenpairs() {
            for j in 0..p {
                let ujk = u[(j, k)] / s;
                for i in 0..p {
                    inv[(i, j)] += u[(i, k)] * ujk;
                }
            }
        }
        Ok((inv, rank_deficient))
    }

    /// Returns `tr(M^{-1})`.
    pub fn trace_inverse(&self) -> Result<f64> {
        self.check_regular()?;
        Ok(self.regular_eigenpairs().map(|(_, s)| 1. / s).sum())
    }

    /// Returns `x^T M^{-1} x` for a term vector `x` of length p.
    pub fn prediction_variance(&self, x: ColRef<'_, f64>) -> Result<f64> {
        self.check_regular()?;
        Ok(self.inverse_quadratic_form(x))
    }

    /// Returns `x^T M^+ x` with the pseudo-inverse `M^+`.
    pub(crate) fn inverse_quadratic_form(&self, x: ColRef<'_, f64>) -> f64 {
        let u = &self.eigenvectors;
        self.regular_eigenpairs()
            .map(|(k, s)| {
                let proj: f64 = (0..x.nrows()).map(|i| u[(i, k)] * x[i]).sum();
                proj * proj / s
            })
            .sum()
    }

    /// Returns the D-efficiency `100 det(M)^{1/p}`, zero for rank deficient M.
    pub fn d_efficiency(&self) -> f64 {
        if self.is_rank_deficient() {
            return 0.;
        }
        100. * self.determinant().powf(1. / self.n_terms() as f64)
    }

    /// Returns the A-efficiency `100 p / tr(M^{-1})`, zero for rank deficient M.
    pub fn a_efficiency(&self) -> f64 {
        match self.trace_inverse() {
            Ok(trace) => 100. * self.n_terms() as f64 / trace,
            Err(_) => 0.,
        }
    }
}
