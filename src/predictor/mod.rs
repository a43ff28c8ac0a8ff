//! The prediction pipeline: feature construction, standardization,
//! multinomial classification, evaluation, and team-strength aggregation.
//!
//! Everything in here is synchronous and CPU-bound. Network access,
//! scheduling and persistence live in `feed`, `db` and `main`; the pipeline
//! only consumes already-parsed [`MatchRecord`](crate::db::models::MatchRecord)
//! values.

pub mod confidence;
pub mod features;
pub mod model;
pub mod outcome;
pub mod pipeline;
pub mod scaler;
pub mod team_stats;

pub use outcome::Outcome;
pub use pipeline::{PredictionPipeline, TrainingReport, UpcomingPrediction};
pub use team_stats::TeamStats;

use thiserror::Error;

/// Errors the pipeline can surface to its callers. All of these are
/// recoverable at the boundary; none of them corrupts published model state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredictError {
    /// Malformed or empty feature rows
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Too few usable training rows
    #[error("insufficient data: need at least {required} usable matches, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// Degenerate label set (all rows share one outcome)
    #[error("insufficient diversity in target labels: need at least 2 different outcomes")]
    InsufficientLabelDiversity,

    /// Classifier asked to predict before any successful train
    #[error("model not trained yet")]
    ModelNotTrained,

    /// Pipeline asked to predict before a successful training cycle
    #[error("prediction pipeline is not ready; train it first")]
    ModelNotReady,

    /// No match in the batch has complete score data
    #[error("no valid matches after preprocessing")]
    NoValidData,
}
