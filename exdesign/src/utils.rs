use faer::{ColRef, Mat};
use nalgebra::{Const, Dyn, Matrix, VecStorage};

/// Matrix with D rows
pub type MatrixDRows<const D: usize> = Matrix<f64, Const<D>, Dyn, VecStorage<f64, Const<D>, Dyn>>;

/// Adds `sign * x x^T` to the square matrix `m`.
pub(crate) fn rank_one_update(m: &mut Mat<f64>, x: ColRef<'_, f64>, sign: f64) {
    let p = m.nrows();
    for j in 0..p {
        let xj = sign * x[j];
        if xj == 0. {
            continue;
        }
        for i in 0..p {
            m[(i, j)] += x[i] * xj;
        }
    }
}

/// Returns the sum of `x_j x_j^T` over the columns `rows` of `design_t`.
pub(crate) fn gram_of_columns(design_t: &Mat<f64>, rows: &[usize]) -> Mat<f64> {
    let p = design_t.nrows();
    let mut xtx = Mat::<f64>::zeros(p, p);
    for &r in rows {
        rank_one_update(&mut xtx, design_t.col(r), 1.);
    }
    xtx
}
