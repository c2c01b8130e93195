//! Composition strategy
//!
//! Picks an algorithm by how many colours still have pieces on the board:
//! - 3 colours: opening book, then the configured three-player search
//! - 2 colours: paranoid alpha-beta (the coalition is now one real player)
//! - 1 colour: A* exit planning
//!
//! A mover with no pieces left passes without searching.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use chexers_core::{Action, Game, Heuristics, Result, State, WeightedEvaluator};

use crate::astar::AStar;
use crate::book::OpeningBook;
use crate::cutoff::{DeadlineCutoff, DepthLimitCutoff};
use crate::maxn::MaxN;
use crate::paranoid::{Paranoid, ParanoidConfig};
use crate::uct::{Uct, UctConfig};
use crate::Search;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Search used while all three colours are in play
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreePlayerAlgorithm {
    #[default]
    MaxN,
    Paranoid,
    Uct,
}

impl ThreePlayerAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            ThreePlayerAlgorithm::MaxN => "maxn",
            ThreePlayerAlgorithm::Paranoid => "paranoid",
            ThreePlayerAlgorithm::Uct => "uct",
        }
    }
}

impl fmt::Display for ThreePlayerAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ThreePlayerAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "maxn" => Ok(ThreePlayerAlgorithm::MaxN),
            "paranoid" => Ok(ThreePlayerAlgorithm::Paranoid),
            "uct" => Ok(ThreePlayerAlgorithm::Uct),
            other => Err(format!("unknown algorithm '{}' (expected maxn, paranoid or uct)", other)),
        }
    }
}

/// Composition strategy configuration
#[derive(Clone, Debug)]
pub struct StrategyConfig {
    pub three_player: ThreePlayerAlgorithm,
    pub maxn_depth: u32,
    pub paranoid_depth: u32,
    pub order_moves: bool,
    /// Wall-clock budget per tree search, on top of the depth limits
    pub time_budget: Option<Duration>,
    pub uct: UctConfig,
    pub heuristics: Heuristics,
    pub book: OpeningBook,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            three_player: ThreePlayerAlgorithm::default(),
            maxn_depth: 2,
            paranoid_depth: 2,
            order_moves: true,
            time_budget: None,
            uct: UctConfig::default(),
            heuristics: Heuristics::default(),
            book: OpeningBook::gather(),
        }
    }
}

impl StrategyConfig {
    pub fn with_three_player(mut self, algorithm: ThreePlayerAlgorithm) -> Self {
        self.three_player = algorithm;
        self
    }

    pub fn with_maxn_depth(mut self, depth: u32) -> Self {
        self.maxn_depth = depth;
        self
    }

    pub fn with_paranoid_depth(mut self, depth: u32) -> Self {
        self.paranoid_depth = depth;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn with_book(mut self, book: OpeningBook) -> Self {
        self.book = book;
        self
    }
}

// ============================================================================
// COMPOSITION STRATEGY
// ============================================================================

type BoxedSearch = Box<dyn Search + Send>;

/// Delegates to one algorithm per phase of the game
pub struct CompositionStrategy {
    book: OpeningBook,
    three: BoxedSearch,
    two: BoxedSearch,
    one: BoxedSearch,
    current: Option<&'static str>,
}

impl CompositionStrategy {
    pub fn new(book: OpeningBook, three: BoxedSearch, two: BoxedSearch, one: BoxedSearch) -> Self {
        Self {
            book,
            three,
            two,
            one,
            current: None,
        }
    }

    /// Build every delegate from a config, scoring with a weighted evaluator
    pub fn from_config(game: &Game, config: &StrategyConfig) -> Self {
        let evaluator = WeightedEvaluator::new(game.clone(), config.heuristics.clone());
        let paranoid_config = ParanoidConfig::default().with_order_moves(config.order_moves);

        let paranoid = |depth: u32| -> BoxedSearch {
            match config.time_budget {
                Some(budget) => Box::new(Paranoid::with_config(
                    evaluator.clone(),
                    DeadlineCutoff::new(depth, budget),
                    paranoid_config.clone(),
                )),
                None => Box::new(Paranoid::with_config(
                    evaluator.clone(),
                    DepthLimitCutoff::new(depth),
                    paranoid_config.clone(),
                )),
            }
        };

        let three: BoxedSearch = match config.three_player {
            ThreePlayerAlgorithm::MaxN => match config.time_budget {
                Some(budget) => Box::new(MaxN::new(
                    evaluator.clone(),
                    DeadlineCutoff::new(config.maxn_depth, budget),
                )),
                None => Box::new(MaxN::new(
                    evaluator.clone(),
                    DepthLimitCutoff::new(config.maxn_depth),
                )),
            },
            ThreePlayerAlgorithm::Paranoid => paranoid(config.paranoid_depth),
            ThreePlayerAlgorithm::Uct => Box::new(Uct::new(evaluator.clone(), config.uct.clone())),
        };

        Self::new(
            config.book.clone(),
            three,
            paranoid(config.paranoid_depth),
            Box::new(AStar::new()),
        )
    }

    /// Book entries not yet played
    pub fn book(&self) -> &OpeningBook {
        &self.book
    }

    fn delegate(&mut self, remaining: usize) -> &mut BoxedSearch {
        match remaining {
            3 => &mut self.three,
            2 => &mut self.two,
            _ => &mut self.one,
        }
    }

    fn note_switch(&mut self, name: &'static str, state: &State, remaining: usize) {
        if self.current != Some(name) {
            tracing::info!(
                "{} switching to {} with {} colours on the board",
                state.active(),
                name,
                remaining
            );
            self.current = Some(name);
        }
    }
}

impl Search for CompositionStrategy {
    fn search(&mut self, game: &Game, state: &State) -> Result<Action> {
        if state.piece_count(state.active()) == 0 {
            return Ok(Action::Pass);
        }

        let remaining = game.remaining_colours(state).len();
        if remaining == 3 {
            if let Some(action) = self.book.next(game, state) {
                self.note_switch("book", state, remaining);
                return Ok(action);
            }
        }

        let delegate = self.delegate(remaining);
        let name = delegate.name();
        self.note_switch(name, state, remaining);
        self.delegate(remaining).search(game, state)
    }

    fn name(&self) -> &'static str {
        "composition"
    }
}
