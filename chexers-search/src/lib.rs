//! Chexers Search - Move selection for the three-player racing game
//!
//! This crate provides the algorithms an agent chooses from:
//! - MaxN for three independent players
//! - Paranoid alpha-beta treating both opponents as one coalition
//! - A* exit planning once only the mover's pieces matter
//! - UCT (Monte Carlo tree search with random rollouts)
//! - Opening books and the composition strategy tying them together

pub mod astar;
pub mod book;
pub mod composition;
pub mod cutoff;
pub mod maxn;
pub mod paranoid;
pub mod uct;

use chexers_core::{Action, Game, Result, State};

/// An algorithm that picks an action for the active colour of a state
pub trait Search {
    fn search(&mut self, game: &Game, state: &State) -> Result<Action>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

// Re-exports for convenient access
pub use astar::AStar;
pub use book::OpeningBook;
pub use composition::{CompositionStrategy, StrategyConfig, ThreePlayerAlgorithm};
pub use cutoff::{Cutoff, DeadlineCutoff, DepthLimitCutoff};
pub use maxn::MaxN;
pub use paranoid::{Paranoid, ParanoidConfig};
pub use uct::{Uct, UctConfig};
