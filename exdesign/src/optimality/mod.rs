mod a_opt;
mod c_opt;
mod d_opt;
mod e_opt;
mod g_opt;
mod i_opt;
mod s_opt;
mod t_opt;
mod v_opt;
use crate::{Error, InformationMatrix, LinearModel, MatrixDRows, Result};
pub use a_opt::AOptimality;
pub use c_opt::COptimality;
pub use d_opt::DOptimality;
pub use e_opt::EOptimality;
use faer::Mat;
pub use g_opt::GOptimality;
pub use i_opt::IOptimality;
use nalgebra::DVector;
pub use s_opt::SOptimality;
use std::{fmt::Display, str::FromStr, sync::Arc};
pub use t_opt::TOptimality;
pub use v_opt::VOptimality;

/// The design a score is computed for: candidate indices into the transposed candidate model
/// matrix, repeats allowed.
#[derive(Debug, Clone, Copy)]
pub struct DesignContext<'a> {
    /// Transposed candidate model matrix `X_0^T` with one column per candidate.
    pub candidates_t: &'a Mat<f64>,
    /// Candidate indices of the design points.
    pub rows: &'a [usize],
}

/// Defines an optimality criterion by its score function. The search always maximizes the
/// score; criteria which are minimized in the literature are negated.
pub trait Optimality {
    /// Returns the score of the information matrix of the design.
    fn score(&self, info: &InformationMatrix, ctx: &DesignContext<'_>) -> Result<f64>;
}

/// Optimality criteria known to the exchange search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    /// Maximizes `det(M)`.
    D,
    /// Minimizes `tr(M^{-1})`.
    A,
    /// Maximizes the smallest eigenvalue of M.
    E,
    /// Minimizes `c^T M^{-1} c` for a contrast vector c.
    C,
    /// Minimizes the mean prediction variance over a reference set.
    I,
    /// Minimizes the maximal prediction variance over a reference set.
    G,
    /// Minimizes the mean prediction variance over test points.
    V,
    /// Minimizes the squared off-diagonal mass of M.
    S,
    /// Maximizes the discrimination between two rival models.
    T,
}

impl Criterion {
    /// All criteria in display order.
    pub const ALL: [Criterion; 9] = [
        Criterion::D,
        Criterion::A,
        Criterion::E,
        Criterion::C,
        Criterion::I,
        Criterion::G,
        Criterion::V,
        Criterion::S,
        Criterion::T,
    ];

    /// Returns the one letter name.
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::D => "D",
            Criterion::A => "A",
            Criterion::E => "E",
            Criterion::C => "C",
            Criterion::I => "I",
            Criterion::G => "G",
            Criterion::V => "V",
            Criterion::S => "S",
            Criterion::T => "T",
        }
    }

    /// Resolves the criterion to its score function.
    ///
    /// Fails with [Error::MissingAuxiliaryInput] if the criterion needs data the input does not
    /// carry, i.e. the contrast for C and the model difference for T.
    pub fn optimality<const D: usize>(
        &self,
        input: &CriterionInput<D>,
        linear_model: &LinearModel<D>,
        candidates_t: &Mat<f64>,
    ) -> Result<Arc<dyn Optimality + Send + Sync>> {
        let reference_t = |points: &Option<MatrixDRows<D>>| {
            points
                .as_ref()
                .map(|p| linear_model.design_t(p))
                .unwrap_or_else(|| candidates_t.to_owned())
        };
        let optimality: Arc<dyn Optimality + Send + Sync> = match self {
            Criterion::D => Arc::new(DOptimality::new()),
            Criterion::A => Arc::new(AOptimality::new()),
            Criterion::E => Arc::new(EOptimality::new()),
            Criterion::C => {
                let c = input.contrast.as_ref().ok_or(Error::MissingAuxiliaryInput {
                    criterion: self.name(),
                    input: "contrast vector",
                })?;
                Arc::new(COptimality::new(c, linear_model.len())?)
            }
            Criterion::I => Arc::new(IOptimality::new(reference_t(&input.reference))),
            Criterion::G => Arc::new(GOptimality::new(reference_t(&input.reference))),
            Criterion::V => Arc::new(VOptimality::new(
                input.test_points.as_ref().map(|p| linear_model.design_t(p)),
            )),
            Criterion::S => Arc::new(SOptimality::new()),
            Criterion::T => {
                let d = input
                    .model_difference
                    .as_ref()
                    .ok_or(Error::MissingAuxiliaryInput {
                        criterion: self.name(),
                        input: "model difference vector",
                    })?;
                Arc::new(TOptimality::new(d, candidates_t.ncols())?)
            }
        };
        Ok(optimality)
    }
}

impl Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Criterion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Criterion::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnsupportedCriterion {
                name: s.to_string(),
            })
    }
}

/// Auxiliary data of the criteria beyond the information matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriterionInput<const D: usize> {
    /// Contrast vector c of C-optimality, one entry per model term.
    pub contrast: Option<DVector<f64>>,
    /// Reference points of I- and G-optimality, defaults to the candidate set.
    pub reference: Option<MatrixDRows<D>>,
    /// Test points of V-optimality, defaults to the design points.
    pub test_points: Option<MatrixDRows<D>>,
    /// Difference between the two rival models of T-optimality at every candidate.
    pub model_difference: Option<DVector<f64>>,
}

impl<const D: usize> CriterionInput<D> {
    /// Creates empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns input with given contrast vector.
    pub fn with_contrast(mut self, contrast: DVector<f64>) -> Self {
        self.contrast = Some(contrast);
        self
    }

    /// Returns input with given reference points.
    pub fn with_reference(mut self, reference: MatrixDRows<D>) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Returns input with given test points.
    pub fn with_test_points(mut self, test_points: MatrixDRows<D>) -> Self {
        self.test_points = Some(test_points);
        self
    }

    /// Returns input with given model difference vector.
    pub fn with_model_difference(mut self, model_difference: DVector<f64>) -> Self {
        self.model_difference = Some(model_difference);
        self
    }
}

/// Score of a design under a criterion together with its efficiencies and spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionResult {
    /// Evaluated criterion.
    pub criterion: Criterion,
    /// Criterion score, larger is better.
    pub value: f64,
    /// Efficiency matching the criterion, see [CriterionEvaluator::efficiency].
    pub efficiency: f64,
    /// D-efficiency in percent.
    pub d_efficiency: f64,
    /// A-efficiency in percent.
    pub a_efficiency: f64,
    /// Eigenvalues of M in nondecreasing order.
    pub eigenvalues: Vec<f64>,
}

/// Evaluates a criterion, resolved once to its score function, for designs drawn from a fixed
/// candidate set.
#[derive(Clone)]
pub struct CriterionEvaluator {
    criterion: Criterion,
    optimality: Arc<dyn Optimality + Send + Sync>,
    candidates_t: Arc<Mat<f64>>,
}

impl CriterionEvaluator {
    /// Creates the evaluator.
    pub fn new<const D: usize>(
        criterion: Criterion,
        input: &CriterionInput<D>,
        linear_model: &LinearModel<D>,
        candidates_t: Arc<Mat<f64>>,
    ) -> Result<Self> {
        let optimality = criterion.optimality(input, linear_model, &candidates_t)?;
        Ok(Self {
            criterion,
            optimality,
            candidates_t,
        })
    }

    /// Returns the criterion.
    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// Returns the transposed candidate model matrix.
    pub fn candidates_t(&self) -> &Mat<f64> {
        &self.candidates_t
    }

    /// Returns the score of the design `rows` with information matrix `info`.
    pub fn score(&self, info: &InformationMatrix, rows: &[usize]) -> Result<f64> {
        let ctx = DesignContext {
            candidates_t: &self.candidates_t,
            rows,
        };
        self.optimality.score(info, &ctx)
    }

    /// Returns the efficiency in percent belonging to the criterion: the A-efficiency for
    /// A-optimality and the D-efficiency for all others.
    pub fn efficiency(&self, info: &InformationMatrix) -> f64 {
        match self.criterion {
            Criterion::A => info.a_efficiency(),
            _ => info.d_efficiency(),
        }
    }

    /// Returns the full criterion result of the design.
    pub fn evaluate(&self, info: &InformationMatrix, rows: &[usize]) -> Result<CriterionResult> {
        Ok(CriterionResult {
            criterion: self.criterion,
            value: self.score(info, rows)?,
            efficiency: self.efficiency(info),
            d_efficiency: info.d_efficiency(),
            a_efficiency: info.a_efficiency(),
            eigenvalues: info.eigenvalues().to_vec(),
        })
    }

    /// Returns the prediction variance `x^T M^{-1} x` at every candidate.
    pub fn prediction_variance_profile(&self, info: &InformationMatrix) -> Result<Vec<f64>> {
        prediction_variances(info, &self.candidates_t)
    }
}

/// Returns the prediction variances `x^T M^{-1} x` of the columns of `points_t`.
pub(crate) fn prediction_variances(
    info: &InformationMatrix,
    points_t: &Mat<f64>,
) -> Result<Vec<f64>> {
    points_t
        .col_iter()
        .map(|x| info.prediction_variance(x))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn criterion_from_name() -> Result<()> {
        for c in Criterion::ALL {
            assert_eq!(c.name().parse::<Criterion>()?, c);
            assert_eq!(c.name().to_lowercase().parse::<Criterion>()?, c);
        }
        assert_eq!(
            "X".parse::<Criterion>(),
            Err(Error::UnsupportedCriterion {
                name: "X".to_string()
            })
        );
        Ok(())
    }

    #[test]
    fn missing_auxiliary_input() -> Result<()> {
        let lm = LinearModel::<1>::polynomial(1)?;
        let candidates_t = mat![[1., 1., 1.], [-1., 0., 1.]];
        let input = CriterionInput::<1>::new();
        assert_eq!(
            Criterion::C
                .optimality(&input, &lm, &candidates_t)
                .err()
                .map(|e| e.to_string()),
            Some("criterion C requires contrast vector".to_string())
        );
        assert!(matches!(
            Criterion::T.optimality(&input, &lm, &candidates_t),
            Err(Error::MissingAuxiliaryInput { criterion: "T", .. })
        ));
        for c in [Criterion::D, Criterion::A, Criterion::E, Criterion::I] {
            assert!(c.optimality(&input, &lm, &candidates_t).is_ok());
        }
        for c in [Criterion::G, Criterion::V, Criterion::S] {
            assert!(c.optimality(&input, &lm, &candidates_t).is_ok());
        }
        Ok(())
    }

    #[test]
    fn evaluator_result() -> Result<()> {
        let lm = LinearModel::<1>::polynomial(1)?;
        let candidates_t: Arc<_> = mat![[1., 1., 1.], [-1., 0., 1.]].into();
        let input = CriterionInput::<1>::new();
        let evaluator = CriterionEvaluator::new(Criterion::D, &input, &lm, candidates_t)?;
        let x = mat![[1., -1.], [1., 1.]];
        let info = InformationMatrix::evaluate(&x)?;
        let result = evaluator.evaluate(&info, &[0, 2])?;
        assert_eq!(result.criterion, Criterion::D);
        assert!((result.value - 1.).abs() < 1e-12);
        assert!((result.efficiency - 100.).abs() < 1e-9);
        assert!((result.a_efficiency - 100.).abs() < 1e-9);
        assert_eq!(result.eigenvalues.len(), 2);
        let profile = evaluator.prediction_variance_profile(&info)?;
        assert!((profile[0] - 2.).abs() < 1e-12);
        assert!((profile[1] - 1.).abs() < 1e-12);
        assert!((profile[2] - 2.).abs() < 1e-12);
        Ok(())
    }
}
