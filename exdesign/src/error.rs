/// Main error type
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// The polynomial model cannot be built for the given degree or factor count.
    #[error("invalid model spec: degree {degree} with {factors} factors, expected degree 1 or 2 and at least one factor")]
    InvalidModelSpec {
        /// Requested polynomial degree.
        degree: usize,
        /// Number of factors of the candidate points.
        factors: usize,
    },
    /// The requested design size cannot be reached with the model and candidate set.
    #[error(
        "infeasible design size {n_points} for {n_terms} model terms and {n_candidates} candidates"
    )]
    InfeasibleDesignSize {
        /// Requested number of design points.
        n_points: usize,
        /// Number of model terms.
        n_terms: usize,
        /// Number of candidate points.
        n_candidates: usize,
    },
    /// Criterion name is not one of D, A, E, C, I, G, V, S, T.
    #[error("unsupported criterion {name}")]
    UnsupportedCriterion {
        /// Given criterion name.
        name: String,
    },
    /// Method name is not a known exchange strategy.
    #[error("unsupported method {name}")]
    UnsupportedMethod {
        /// Given method name.
        name: String,
    },
    /// Criterion requires auxiliary data which has not been supplied.
    #[error("criterion {criterion} requires {input}")]
    MissingAuxiliaryInput {
        /// Criterion name.
        criterion: &'static str,
        /// Name of the missing input.
        input: &'static str,
    },
    /// A design refers to a candidate which does not exist.
    #[error("candidate index {index} out of range for {n_candidates} candidates")]
    CandidateIndex {
        /// Given index.
        index: usize,
        /// Number of candidate points.
        n_candidates: usize,
    },
    /// Information matrix is numerically singular.
    #[error("singular information matrix with rank {rank} of {n_terms}")]
    SingularInformationMatrix {
        /// Numerical rank.
        rank: usize,
        /// Number of model terms.
        n_terms: usize,
    },
    /// Eigendecomposition of the information matrix did not converge.
    #[error("eigendecomposition of information matrix did not converge")]
    EigenDecomposition,
    /// A vector contains a minimum value lower than required.
    #[error("minimal value for each value in vector {vector} is {ge_value}")]
    MinValue {
        /// Vector name
        vector: &'static str,
        /// Value constraint
        dim: usize,
        /// Value at position dim
        value: usize,
        /// Required minimum value
        ge_value: usize,
    },
    /// Minimal dimensional distance requirement is violated.
    #[error(
        "min distance between vectors {vector1} and {vector2} found on dim {dim} with {distance} but should > {gt_distance}"
    )]
    MinDistanceBetweenVectors {
        /// Name of vector1.
        vector1: &'static str,
        /// Name of vector2.
        vector2: &'static str,
        /// Dimension on which the distance requirement is violated.
        dim: usize,
        /// Found distance between dim-values of vector1 and vector2.
        distance: f64,
        /// Minimal required distance.
        gt_distance: f64,
    },
    /// Two given tensors do not have the same shape.
    #[error(
        "mat {mat1} with shape {shape1:?} and {mat2} with {shape2:?} have different len on dim {dim1} and {dim2}"
    )]
    ShapeMismatch {
        /// Name of matrix 1.
        mat1: &'static str,
        /// Name of matrix .
        mat2: &'static str,
        /// Affected shape of dimension on matrix 1.
        dim1: usize,
        /// Affected shape of dimension on matrix 2.
        dim2: usize,
        /// Shape of matrix 1.
        shape1: (usize, usize),
        /// Shape of matrix 2.
        shape2: (usize, usize),
    },
}

/// Main result type
pub type Result<T> = std::result::Result<T, Error>;
