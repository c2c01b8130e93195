//! Chexers Core - Game model for the three-player hex racing game
//!
//! This crate provides the state and rules the search engine works on:
//! - Board geometry (radius-3 hex grid with axial coordinates)
//! - Immutable game state with red-centred perspective rotation
//! - Move generation, transitions and heuristic distance fields
//! - Arena-allocated search trees
//! - Evaluators mapping states to per-colour utilities

pub mod board;
pub mod error;
pub mod eval;
pub mod game;
pub mod node;
pub mod state;

// Re-exports for convenient access
pub use board::{BoardConfig, Colour, Hex, Occupant, BOARD_RADIUS, DIRECTIONS, PIECES_TO_WIN};
pub use error::{ChexersError, Result};
pub use eval::{Evaluator, ExitCountEvaluator, Heuristics, Utility, WeightedEvaluator, WIN_VALUE};
pub use game::{Game, HeuristicField};
pub use node::{NodeId, SearchNode, SearchTree};
pub use state::{Action, State};
