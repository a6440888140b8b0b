use nalgebra::SVector;
use std::{fmt::Display, sync::Arc};

/// Defines a model term, i.e. a scalar function of the factor settings.
pub trait Feature<const D: usize> {
    /// Value function.
    fn val(&self, x: &SVector<f64, D>) -> f64;
    /// Human readable name of the term, used in displays.
    fn name(&self) -> String;
}

/// Polynomial term of at most second order in the factors `x0, x1, ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    /// Constant term `1`.
    Intercept,
    /// Linear term `x_i`.
    Linear(usize),
    /// Pure quadratic term `x_i^2`.
    Square(usize),
    /// Two-way interaction `x_i * x_j` with `i < j`.
    Interaction(usize, usize),
}

impl Term {
    /// Returns the ordered terms of a full polynomial of given degree in `factors` factors:
    /// intercept, linear terms, then for degree 2 the squares followed by the interactions in
    /// lexicographic factor-pair order.
    pub(crate) fn polynomial(degree: usize, factors: usize) -> Vec<Term> {
        let mut terms = vec![Term::Intercept];
        terms.extend((0..factors).map(Term::Linear));
        if degree >= 2 {
            terms.extend((0..factors).map(Term::Square));
            for i in 0..factors {
                terms.extend((i + 1..factors).map(|j| Term::Interaction(i, j)));
            }
        }
        terms
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Intercept => write!(f, "1"),
            Term::Linear(i) => write!(f, "x{i}"),
            Term::Square(i) => write!(f, "x{i}^2"),
            Term::Interaction(i, j) => write!(f, "x{i}*x{j}"),
        }
    }
}

impl<const D: usize> Feature<D> for Term {
    #[inline(always)]
    fn val(&self, x: &SVector<f64, D>) -> f64 {
        match *self {
            Term::Intercept => 1.,
            Term::Linear(i) => x[i],
            Term::Square(i) => x[i] * x[i],
            Term::Interaction(i, j) => x[i] * x[j],
        }
    }

    fn name(&self) -> String {
        self.to_string()
    }
}

/// Feature defined by a value function, e.g. a closure.
///
/// ```
/// use exdesign::{Feature, FeatureFunction};
/// use nalgebra::Vector1;
///
/// let exp = FeatureFunction::new("exp(x0)", |x: &Vector1<f64>| x[0].exp());
/// assert_eq!(exp.val(&Vector1::new(0.)), 1.);
/// ```
#[derive(Clone)]
pub struct FeatureFunction<const D: usize> {
    name: String,
    f: Arc<dyn Fn(&SVector<f64, D>) -> f64 + Send + Sync>,
}

impl<const D: usize> FeatureFunction<D> {
    /// Creates the feature from its name and value function.
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&SVector<f64, D>) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }
}

impl<const D: usize> Feature<D> for FeatureFunction<D> {
    fn val(&self, x: &SVector<f64, D>) -> f64 {
        (self.f)(x)
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Set of features.
#[derive(Default)]
pub struct FeatureSet<const D: usize> {
    /// Vectoring storing features.
    pub features: Vec<Arc<dyn Feature<D> + Send + Sync>>,
}

impl<const D: usize> FeatureSet<D> {
    /// Create empty feature set.
    pub fn new() -> FeatureSet<D> {
        Self::default()
    }

    /// Add feature to feature set.
    pub fn push(&mut self, feature: Arc<dyn Feature<D> + Send + Sync>) {
        self.features.push(feature)
    }
}

impl<const D: usize> From<FeatureSet<D>> for crate::LinearModel<D> {
    fn from(fs: FeatureSet<D>) -> Self {
        crate::LinearModel::new(fs.features)
    }
}
