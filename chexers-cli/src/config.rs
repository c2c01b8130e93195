//! Agent configuration, loadable from JSON
//!
//! Every field has a default, so a config file only needs the settings it
//! changes:
//!
//! ```json
//! { "algorithm": "paranoid", "paranoid_depth": 3, "book": "edge" }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use chexers_core::Heuristics;
use chexers_search::{OpeningBook, StrategyConfig, ThreePlayerAlgorithm, UctConfig};

/// Settings for one agent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Search used while all three colours have pieces
    pub algorithm: ThreePlayerAlgorithm,
    pub maxn_depth: u32,
    pub paranoid_depth: u32,
    pub order_moves: bool,
    /// Wall-clock budget per search in milliseconds
    pub time_budget_ms: Option<u64>,
    pub uct_iterations: u32,
    pub uct_exploration: f32,
    pub uct_rollout_depth: u32,
    pub seed: u64,
    pub heuristics: Heuristics,
    /// Built-in opening book: "gather", "edge" or "none"
    pub book: String,
    /// JSON book file, used instead of the built-in book when set
    pub book_file: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let strategy = StrategyConfig::default();
        let uct = UctConfig::default();
        Self {
            algorithm: strategy.three_player,
            maxn_depth: strategy.maxn_depth,
            paranoid_depth: strategy.paranoid_depth,
            order_moves: strategy.order_moves,
            time_budget_ms: None,
            uct_iterations: uct.iterations,
            uct_exploration: uct.exploration,
            uct_rollout_depth: uct.max_rollout_depth,
            seed: uct.seed,
            heuristics: Heuristics::default(),
            book: "gather".to_string(),
            book_file: None,
        }
    }
}

impl AgentConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read agent config: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse agent config: {}", path.display()))
    }

    /// Load from a file if given, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolve the opening book this config refers to
    pub fn opening_book(&self) -> Result<OpeningBook> {
        if let Some(path) = &self.book_file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read opening book: {}", path.display()))?;
            return OpeningBook::from_json(&content)
                .with_context(|| format!("Failed to parse opening book: {}", path.display()));
        }
        OpeningBook::named(&self.book).ok_or_else(|| anyhow!("Unknown opening book: {}", self.book))
    }

    /// Strategy settings for the search crate
    pub fn strategy(&self) -> Result<StrategyConfig> {
        let mut strategy = StrategyConfig::default()
            .with_three_player(self.algorithm)
            .with_maxn_depth(self.maxn_depth)
            .with_paranoid_depth(self.paranoid_depth)
            .with_heuristics(self.heuristics.clone())
            .with_book(self.opening_book()?);
        strategy.order_moves = self.order_moves;
        if let Some(ms) = self.time_budget_ms {
            strategy = strategy.with_time_budget(Duration::from_millis(ms));
        }
        strategy.uct = UctConfig::default()
            .with_iterations(self.uct_iterations)
            .with_exploration(self.uct_exploration)
            .with_max_rollout_depth(self.uct_rollout_depth)
            .with_seed(self.seed);
        Ok(strategy)
    }
}
