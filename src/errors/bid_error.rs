//! Error types for the bid-generation entry point.

use crate::errors::EvaluationError;
use thiserror::Error;

/// Errors raised while generating a bid from an interest group.
#[derive(Error, Debug)]
pub enum BidError {
    #[error("Interest group carries no ads")]
    NoAdsProvided,

    #[error("Ad metadata carries neither a pre-computed bid nor an input vector with model weights")]
    MissingBidInputs,

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
