use crate::{Error, Feature, MatrixDRows, Result, Term};
use faer::Mat;
use nalgebra::SVector;
use std::sync::Arc;

/// Linear model containing its set of features
///
/// Defines the linear model `y = phi(x)^T beta` with its feature map `phi: R^D -> R^p`. In the
/// context of optimal designs only the feature map matters; the coefficients are never estimated
/// here.
///
/// ```
/// use exdesign::LinearModel;
///
/// // y = b0 + b1 x0 + b2 x1 + b3 x0^2 + b4 x1^2 + b5 x0 x1
/// let lm = LinearModel::<2>::polynomial(2).unwrap();
/// assert_eq!(lm.len(), 6);
/// ```
pub struct LinearModel<const D: usize> {
    /// Ordered list of features, building the feature map, where p is the number of features
    pub features: Vec<Arc<dyn Feature<D> + Send + Sync>>,
}

impl<const D: usize> LinearModel<D> {
    /// Creates linear model by providing the feature map.
    pub fn new(features: Vec<Arc<dyn Feature<D> + Send + Sync>>) -> Self {
        Self { features }
    }

    /// Creates the full polynomial model of degree 1 (linear) or 2 (quadratic) in the D factors.
    pub fn polynomial(degree: usize) -> Result<Self> {
        if !(1..=2).contains(&degree) || D < 1 {
            return Err(Error::InvalidModelSpec {
                degree,
                factors: D,
            });
        }
        let features = Term::polynomial(degree, D)
            .into_iter()
            .map(|t| Arc::new(t) as Arc<dyn Feature<D> + Send + Sync>)
            .collect();
        Ok(Self { features })
    }

    /// Returns the number of model terms p.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the model has no terms.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Returns the term names in model order.
    pub fn term_names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name()).collect()
    }

    /// Returns the feature map `phi(x)` as column vector.
    pub fn feature_vec(&self, x: &SVector<f64, D>) -> Mat<f64> {
        let mut feature_vec = Mat::<f64>::zeros(self.features.len(), 1);
        feature_vec
            .col_mut(0)
            .iter_mut()
            .enumerate()
            .for_each(|(idx, r)| {
                *r = self.features[idx].val(x);
            });
        feature_vec
    }

    /// Returns the transposed model matrix `X^T` for the column-orientated points in `data`,
    /// where `(X)_{ij} = phi_j(x^{(i)})` and `x^{(i)}` is the i-th column of `data`.
    pub fn design_t(&self, data: &MatrixDRows<D>) -> Mat<f64> {
        let no_features = self.features.len();
        let mut design_t = Mat::<f64>::zeros(no_features, data.ncols());
        design_t
            .col_iter_mut()
            .enumerate()
            .for_each(|(j, mut col)| {
                let x = data.column(j).into();
                for i in 0..col.nrows() {
                    col[i] = self.features[i].val(&x);
                }
            });
        design_t
    }

    /// Returns the model matrix `X` with one row per point and one column per term.
    pub fn design(&self, data: &MatrixDRows<D>) -> Mat<f64> {
        self.design_t(data).transpose().to_owned()
    }
}

/// Builds the model matrix of the full polynomial of given degree at the column-orientated
/// points.
///
/// For degree 1 the matrix has `1 + D` columns, for degree 2 `1 + 2D + D(D-1)/2`.
pub fn build_model_matrix<const D: usize>(
    points: &MatrixDRows<D>,
    degree: usize,
) -> Result<Mat<f64>> {
    let lm = LinearModel::<D>::polynomial(degree)?;
    Ok(lm.design(points))
}
