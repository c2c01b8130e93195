//! Engine error type

use crate::board::Colour;
use crate::state::Action;

/// Errors raised by the rules and the search algorithms.
///
/// None of these are retried: every operation is a pure function of its
/// inputs.
#[derive(Debug, thiserror::Error)]
pub enum ChexersError {
    #[error("illegal action {action} for {colour}")]
    IllegalAction { action: Action, colour: Colour },

    #[error("rules produced an empty action set")]
    EmptyActionSet,

    #[error("search ended without an evaluation: {0}")]
    SearchExhausted(String),

    #[error("heuristic distance field for {0} has not been built")]
    HeuristicFieldUnavailable(Colour),

    #[error("no exit plan found for {0}")]
    NoPlanFound(Colour),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Convenience Result type for engine operations
pub type Result<T> = std::result::Result<T, ChexersError>;
