#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
mod candidate_set;
mod error;
mod exchange;
mod feature;
mod information;
mod linear_model;
mod optimal_design;
mod optimality;
mod utils;

pub use candidate_set::{CandidateSet, generate_candidate_set};
pub use error::{Error, Result};
pub use exchange::{
    Detmax, ExchangeEngine, ExchangeState, ExchangeStrategy, Fedorov, Method, ModifiedFedorov,
    Move, Proposal, SearchContext, SearchCriteria, SearchResult, Sequential, SimpleExchange, Start,
    Termination,
};
pub use feature::{Feature, FeatureFunction, FeatureSet, Term};
pub use information::{Augmentation, InformationMatrix, InverseMode, moment_matrix};
pub use linear_model::{LinearModel, build_model_matrix};
pub use optimal_design::{Design, DesignInfo, OptimalDesign, optimal_design};
pub use optimality::{
    AOptimality, COptimality, Criterion, CriterionEvaluator, CriterionInput, CriterionResult,
    DOptimality, DesignContext, EOptimality, GOptimality, IOptimality, Optimality, SOptimality,
    TOptimality, VOptimality,
};
pub use utils::MatrixDRows;
