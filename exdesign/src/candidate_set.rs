use crate::{Error, MatrixDRows, Result};
use nalgebra::SVector;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;

/// Finite pool of feasible factor settings the designs are drawn from.
///
/// Points are stored column-wise, one column per candidate, and shared read-only between all
/// parallel searches.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet<const D: usize> {
    points: Arc<MatrixDRows<D>>,
}

impl<const D: usize> CandidateSet<D> {
    /// Creates the candidate set from column-orientated points.
    pub fn new(points: MatrixDRows<D>) -> Self {
        Self {
            points: Arc::new(points),
        }
    }

    /// Creates the full factorial grid between `lower` and `upper` with `q[d]` equidistant
    /// levels on dimension d. The first factor varies slowest.
    pub fn grid(
        lower: SVector<f64, D>,
        upper: SVector<f64, D>,
        q: SVector<usize, D>,
    ) -> Result<Self> {
        check_bounds(&lower, &upper)?;
        if D > 0 {
            let (dim, value) = q.argmin();
            if value < 2 {
                return Err(Error::MinValue {
                    vector: "q",
                    dim,
                    value,
                    ge_value: 2,
                });
            }
        }
        let delta = SVector::<f64, D>::from_fn(|d, _| (upper[d] - lower[d]) / (q[d] - 1) as f64);
        let n: usize = q.iter().product();
        let mut pos = SVector::<usize, D>::zeros();
        let mut columns = Vec::with_capacity(n);
        for _ in 0..n {
            columns.push(SVector::<f64, D>::from_fn(|d, _| {
                lower[d] + pos[d] as f64 * delta[d]
            }));
            for d in (0..D).rev() {
                pos[d] += 1;
                if pos[d] < q[d] {
                    break;
                }
                pos[d] = 0;
            }
        }
        Ok(Self::new(MatrixDRows::<D>::from_columns(&columns)))
    }

    /// Draws `n` points uniformly from the box between `lower` and `upper` with a seeded
    /// Xoshiro256++ generator.
    pub fn uniform_random(
        lower: SVector<f64, D>,
        upper: SVector<f64, D>,
        n: usize,
        seed: u64,
    ) -> Result<Self> {
        check_bounds(&lower, &upper)?;
        if n == 0 {
            return Err(Error::MinValue {
                vector: "n",
                dim: 0,
                value: n,
                ge_value: 1,
            });
        }
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let columns: Vec<SVector<f64, D>> = (0..n)
            .map(|_| SVector::<f64, D>::from_fn(|d, _| rng.random_range(lower[d]..upper[d])))
            .collect();
        Ok(Self::new(MatrixDRows::<D>::from_columns(&columns)))
    }

    /// Returns the points, one column per candidate.
    pub fn points(&self) -> &MatrixDRows<D> {
        &self.points
    }

    /// Returns the shared points.
    pub fn shared_points(&self) -> Arc<MatrixDRows<D>> {
        self.points.clone()
    }

    /// Returns the number of candidates N.
    pub fn len(&self) -> usize {
        self.points.ncols()
    }

    /// Returns true if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.points.ncols() == 0
    }

    /// Returns the columns `indices` as new point matrix, repeats allowed.
    pub fn select(&self, indices: &[usize]) -> MatrixDRows<D> {
        self.points.select_columns(indices)
    }
}

fn check_bounds<const D: usize>(lower: &SVector<f64, D>, upper: &SVector<f64, D>) -> Result<()> {
    if D == 0 {
        return Ok(());
    }
    let (dim, distance) = (upper - lower).argmin();
    if distance <= 0. {
        return Err(Error::MinDistanceBetweenVectors {
            vector1: "lower",
            vector2: "upper",
            dim,
            distance,
            gt_distance: 0.,
        });
    }
    Ok(())
}

/// Generates the full factorial candidate grid with `n_levels` equidistant levels per factor on
/// the coded region `[-1, 1]^D`.
///
/// ```
/// use exdesign::generate_candidate_set;
///
/// let candidates = generate_candidate_set::<2>(3).unwrap();
/// assert_eq!(candidates.len(), 9);
/// ```
pub fn generate_candidate_set<const D: usize>(n_levels: usize) -> Result<CandidateSet<D>> {
    CandidateSet::grid(
        SVector::<f64, D>::repeat(-1.),
        SVector::<f64, D>::repeat(1.),
        SVector::<usize, D>::repeat(n_levels),
    )
}
