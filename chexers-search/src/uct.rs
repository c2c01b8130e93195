//! UCT: Monte Carlo tree search with UCB1 selection
//!
//! Every iteration walks down the tree with UCB1, expands the first leaf it
//! reaches, plays a uniform random rollout and backs a per-colour reward
//! vector up the path. Each node is judged by the colour that moved into
//! it, so the search stays meaningful with three independent players.
//!
//! ## Architecture
//! - Level 2: Search loop
//! - Level 3: Selection, rollout, backpropagation
//! - Level 4: UCB1 and reward shaping

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use chexers_core::{
    Action, ChexersError, Colour, Evaluator, Game, NodeId, Result, SearchTree, State,
};

use crate::Search;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// UCT configuration
#[derive(Clone, Debug, PartialEq)]
pub struct UctConfig {
    /// Number of select/expand/rollout/backpropagate iterations
    pub iterations: u32,
    /// Exploration constant in UCB1
    pub exploration: f32,
    /// Rollout length before the evaluator scores the position
    pub max_rollout_depth: u32,
    /// Utility scale for squashing evaluator scores into (0, 1)
    pub reward_scale: f32,
    pub seed: u64,
}

impl Default for UctConfig {
    fn default() -> Self {
        Self {
            iterations: 500,
            exploration: 2.0,
            max_rollout_depth: 40,
            reward_scale: 10.0,
            seed: 42,
        }
    }
}

impl UctConfig {
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_exploration(mut self, exploration: f32) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_max_rollout_depth(mut self, depth: u32) -> Self {
        self.max_rollout_depth = depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

// ============================================================================
// NODE STATISTICS
// ============================================================================

/// Statistics for a tree node, stored alongside the arena
#[derive(Clone, Debug, Default)]
struct NodeStats {
    visits: u32,
    /// Summed rewards per colour
    rewards: [f32; 3],
    /// Children in action order, once expanded
    children: Option<Vec<NodeId>>,
}

impl NodeStats {
    fn mean(&self, colour: Colour) -> f32 {
        if self.visits == 0 {
            0.5
        } else {
            self.rewards[colour.index()] / self.visits as f32
        }
    }
}

// ============================================================================
// UCT SEARCH (Level 2)
// ============================================================================

/// UCT player
pub struct Uct<E> {
    config: UctConfig,
    evaluator: E,
    rng: ChaCha8Rng,
}

impl<E: Evaluator> Uct<E> {
    pub fn new(evaluator: E, config: UctConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            evaluator,
            rng,
        }
    }

    pub fn config(&self) -> &UctConfig {
        &self.config
    }

    /// Visit counts of the root actions after running the configured
    /// number of iterations
    pub fn root_visits(&mut self, game: &Game, state: &State) -> Result<Vec<(Action, u32)>> {
        let mut tree = SearchTree::new(state.clone());
        let mut stats = vec![NodeStats::default()];

        for _ in 0..self.config.iterations {
            let path = self.select(game, &mut tree, &mut stats)?;
            let leaf = path.last().copied().unwrap_or(NodeId::ROOT);
            let reward = self.rollout(game, tree.state(leaf))?;
            backpropagate(&mut stats, &path, reward);
        }

        let children = stats[NodeId::ROOT.0].children.clone().unwrap_or_default();
        tracing::debug!(
            "UCT ran {} iterations over {} nodes",
            self.config.iterations,
            tree.len()
        );
        Ok(children
            .into_iter()
            .filter_map(|id| tree.get(id).action.map(|a| (a, stats[id.0].visits)))
            .collect())
    }

    // ========================================================================
    // Level 3: Phases
    // ========================================================================

    /// Walk down with UCB1, expanding the first node without children.
    ///
    /// Returns the path from the root to the node to roll out from.
    fn select(
        &self,
        game: &Game,
        tree: &mut SearchTree,
        stats: &mut Vec<NodeStats>,
    ) -> Result<Vec<NodeId>> {
        let mut path = vec![NodeId::ROOT];
        let mut current = NodeId::ROOT;

        loop {
            if game.terminal_test(tree.state(current)) {
                return Ok(path);
            }
            let children = match &stats[current.0].children {
                Some(children) => children.clone(),
                None => {
                    let children = tree.expand(game, current)?;
                    stats.resize_with(tree.len(), NodeStats::default);
                    stats[current.0].children = Some(children.clone());
                    children
                }
            };

            if let Some(unvisited) = children.iter().find(|id| stats[id.0].visits == 0) {
                path.push(*unvisited);
                return Ok(path);
            }

            let mover = tree.state(current).active();
            let parent_visits = stats[current.0].visits;
            current = self
                .best_child(&children, stats, mover, parent_visits)
                .ok_or(ChexersError::EmptyActionSet)?;
            path.push(current);
        }
    }

    /// Uniform random playout from `state`
    fn rollout(&mut self, game: &Game, state: &State) -> Result<[f32; 3]> {
        let mut state = state.clone();
        for _ in 0..self.config.max_rollout_depth {
            if game.terminal_test(&state) {
                break;
            }
            let actions = game.actions(&state);
            let action = *actions.choose(&mut self.rng).ok_or(ChexersError::EmptyActionSet)?;
            state = game.result(&state, action)?;
        }
        self.reward(game, &state)
    }

    // ========================================================================
    // Level 4: Scoring
    // ========================================================================

    fn best_child(
        &self,
        children: &[NodeId],
        stats: &[NodeStats],
        mover: Colour,
        parent_visits: u32,
    ) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;
        for id in children {
            let score = ucb1(&stats[id.0], mover, parent_visits, self.config.exploration);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((*id, score));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Reward vector in [0, 1]: 1 for the winner of a finished game,
    /// otherwise the evaluator's utilities squashed by a logistic
    fn reward(&self, game: &Game, state: &State) -> Result<[f32; 3]> {
        if let Some(winner) = game.winner(state) {
            let mut reward = [0.0; 3];
            reward[winner.index()] = 1.0;
            return Ok(reward);
        }
        let utility = self.evaluator.evaluate(state)?;
        let scale = self.config.reward_scale.max(f32::EPSILON);
        Ok(utility.0.map(|u| 1.0 / (1.0 + (-u / scale).exp())))
    }
}

/// UCB1 for a child judged by `mover`, the colour that chose it
fn ucb1(stats: &NodeStats, mover: Colour, parent_visits: u32, exploration: f32) -> f32 {
    if stats.visits == 0 {
        return f32::INFINITY;
    }
    let explore = ((parent_visits.max(1) as f32).ln() / stats.visits as f32).sqrt();
    stats.mean(mover) + exploration * explore
}

fn backpropagate(stats: &mut [NodeStats], path: &[NodeId], reward: [f32; 3]) {
    for id in path {
        let node = &mut stats[id.0];
        node.visits += 1;
        for (total, r) in node.rewards.iter_mut().zip(reward) {
            *total += r;
        }
    }
}

impl<E: Evaluator> Search for Uct<E> {
    fn search(&mut self, game: &Game, state: &State) -> Result<Action> {
        let actions = game.actions(state);
        if let [only] = actions.as_slice() {
            return Ok(*only);
        }

        let visits = self.root_visits(game, state)?;
        let mut best: Option<(Action, u32)> = None;
        for (action, count) in visits {
            if best.map_or(true, |(_, b)| count > b) {
                best = Some((action, count));
            }
        }
        best.map(|(action, _)| action).ok_or_else(|| {
            let colour = state.active();
            ChexersError::SearchExhausted(format!("UCT visited no root action for {}", colour))
        })
    }

    fn name(&self) -> &'static str {
        "uct"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chexers_core::{ExitCountEvaluator, Heuristics, Hex, Occupant, WeightedEvaluator};

    #[test]
    fn test_ucb1_prefers_unvisited() {
        let visited = NodeStats {
            visits: 10,
            rewards: [9.0, 0.0, 0.0],
            children: None,
        };
        assert_eq!(ucb1(&NodeStats::default(), Colour::Red, 10, 2.0), f32::INFINITY);
        assert!(ucb1(&visited, Colour::Red, 20, 2.0) > ucb1(&visited, Colour::Green, 20, 2.0));
    }

    #[test]
    fn test_returns_legal_action() {
        let game = Game::default();
        let state = game.initial_state();
        let evaluator = WeightedEvaluator::new(game.clone(), Heuristics::default());
        let config = UctConfig::default().with_iterations(60).with_max_rollout_depth(8);
        let mut uct = Uct::new(evaluator, config);
        let action = uct.search(&game, &state).unwrap();
        assert!(game.actions(&state).contains(&action));
    }

    #[test]
    fn test_deterministic_for_seed() {
        let game = Game::default();
        let state = game.initial_state();
        let config = UctConfig::default()
            .with_iterations(40)
            .with_max_rollout_depth(6)
            .with_seed(7);
        let a = Uct::new(ExitCountEvaluator, config.clone()).search(&game, &state).unwrap();
        let b = Uct::new(ExitCountEvaluator, config).search(&game, &state).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_visits_sum_to_iterations() {
        let game = Game::default();
        let state = game.initial_state();
        let config = UctConfig::default().with_iterations(50).with_max_rollout_depth(4);
        let mut uct = Uct::new(ExitCountEvaluator, config);
        let visits = uct.root_visits(&game, &state).unwrap();
        assert_eq!(visits.len(), game.actions(&state).len());
        assert_eq!(visits.iter().map(|(_, v)| v).sum::<u32>(), 50);
    }

    #[test]
    fn test_finds_winning_exit() {
        let game = Game::default();
        let state = State::with_completed(
            vec![
                (Hex::new(3, -2), Occupant::Piece(Colour::Red)),
                (Hex::new(0, 0), Occupant::Piece(Colour::Green)),
            ],
            [3, 0, 0],
            Colour::Red,
        )
        .unwrap();
        let config = UctConfig::default().with_iterations(200).with_exploration(0.5);
        let mut uct = Uct::new(ExitCountEvaluator, config);
        assert_eq!(uct.search(&game, &state).unwrap(), Action::Exit { from: Hex::new(3, -2) });
    }
}
