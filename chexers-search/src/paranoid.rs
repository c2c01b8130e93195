//! Paranoid alpha-beta search
//!
//! Both opponents are treated as one coalition minimising the root mover's
//! utility. A max level expands one ply for the mover; a min level expands
//! two nested plies, one per opponent, so the three-player game collapses
//! into a two-player minimax that alpha-beta can prune.
//!
//! ## Architecture
//! - Level 2: Root search
//! - Level 3: max_value / min_value
//! - Level 4: Move ordering

use chexers_core::{Action, ChexersError, Colour, Evaluator, Game, Result, State};

use crate::cutoff::Cutoff;
use crate::Search;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Paranoid search configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParanoidConfig {
    /// Sort children best-first by static evaluation at max levels
    pub order_moves: bool,
}

impl ParanoidConfig {
    pub fn with_order_moves(mut self, order_moves: bool) -> Self {
        self.order_moves = order_moves;
        self
    }
}

// ============================================================================
// PARANOID SEARCH
// ============================================================================

/// Paranoid alpha-beta player
pub struct Paranoid<E, C> {
    evaluator: E,
    cutoff: C,
    config: ParanoidConfig,
}

impl<E: Evaluator, C: Cutoff> Paranoid<E, C> {
    pub fn new(evaluator: E, cutoff: C) -> Self {
        Self::with_config(evaluator, cutoff, ParanoidConfig::default())
    }

    pub fn with_config(evaluator: E, cutoff: C, config: ParanoidConfig) -> Self {
        Self {
            evaluator,
            cutoff,
            config,
        }
    }

    pub fn config(&self) -> &ParanoidConfig {
        &self.config
    }

    // ========================================================================
    // Level 2: Root
    // ========================================================================

    /// Value of `state` for its mover and the action achieving it.
    ///
    /// The root is expanded even when the cutoff already fires.
    pub fn value(&self, game: &Game, state: &State) -> Result<(f32, Option<Action>)> {
        let root = state.active();
        if game.terminal_test(state) {
            return Ok((self.score(state, root)?, None));
        }
        self.expand_max(game, state, root, 0, f32::NEG_INFINITY, f32::INFINITY)
    }

    // ========================================================================
    // Level 3: Max / Min
    // ========================================================================

    fn stop(&self, game: &Game, state: &State, depth: u32) -> bool {
        self.cutoff.cutoff(state, depth) || game.terminal_test(state)
    }

    fn score(&self, state: &State, root: Colour) -> Result<f32> {
        Ok(self.evaluator.evaluate(state)?[root])
    }

    fn max_value(
        &self,
        game: &Game,
        state: &State,
        root: Colour,
        depth: u32,
        alpha: f32,
        beta: f32,
    ) -> Result<(f32, Option<Action>)> {
        if self.stop(game, state, depth) {
            return Ok((self.score(state, root)?, None));
        }
        self.expand_max(game, state, root, depth, alpha, beta)
    }

    fn expand_max(
        &self,
        game: &Game,
        state: &State,
        root: Colour,
        depth: u32,
        mut alpha: f32,
        beta: f32,
    ) -> Result<(f32, Option<Action>)> {
        let mut children: Vec<(Action, State)> = game
            .actions(state)
            .into_iter()
            .map(|action| Ok((action, game.result(state, action)?)))
            .collect::<Result<_>>()?;
        if self.config.order_moves {
            self.order(&mut children, root)?;
        }

        let mut best = f32::NEG_INFINITY;
        let mut best_action = None;
        for (action, child) in &children {
            let v = self.min_value(game, child, root, depth + 1, alpha, beta)?;
            if best_action.is_none() || v > best {
                best = v;
                best_action = Some(*action);
            }
            if best >= beta {
                return Ok((best, best_action));
            }
            alpha = alpha.max(best);
        }
        Ok((best, best_action))
    }

    /// Two nested opponent plies; the coalition minimises the root's score
    fn min_value(
        &self,
        game: &Game,
        state: &State,
        root: Colour,
        depth: u32,
        alpha: f32,
        mut beta: f32,
    ) -> Result<f32> {
        if self.stop(game, state, depth) {
            return self.score(state, root);
        }

        let mut best = f32::INFINITY;
        for first in game.actions(state) {
            let after_first = game.result(state, first)?;

            // The first opponent ended the game; the second never moves
            if game.terminal_test(&after_first) {
                let (v, _) = self.max_value(game, &after_first, root, depth + 1, alpha, beta)?;
                best = best.min(v);
                if best <= alpha {
                    return Ok(best);
                }
                beta = beta.min(best);
                continue;
            }

            for second in game.actions(&after_first) {
                let after_second = game.result(&after_first, second)?;
                let (v, _) = self.max_value(game, &after_second, root, depth + 1, alpha, beta)?;
                best = best.min(v);
                if best <= alpha {
                    return Ok(best);
                }
                beta = beta.min(best);
            }
        }
        Ok(best)
    }

    // ========================================================================
    // Level 4: Move Ordering
    // ========================================================================

    /// Sort children best-first for the root colour (stable, so equal
    /// scores keep the rules' order)
    fn order(&self, children: &mut [(Action, State)], root: Colour) -> Result<()> {
        let mut scored: Vec<(f32, (Action, State))> = children
            .iter()
            .map(|(action, child)| Ok((self.score(child, root)?, (*action, child.clone()))))
            .collect::<Result<_>>()?;
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        for (slot, (_, child)) in children.iter_mut().zip(scored) {
            *slot = child;
        }
        Ok(())
    }
}

impl<E: Evaluator, C: Cutoff> Search for Paranoid<E, C> {
    fn search(&mut self, game: &Game, state: &State) -> Result<Action> {
        let actions = game.actions(state);
        if let [only] = actions.as_slice() {
            return Ok(*only);
        }

        self.cutoff.reset();
        let (value, action) = self.value(game, state)?;
        let action = action.ok_or_else(|| {
            ChexersError::SearchExhausted(format!("no root action for {}", state.active()))
        })?;
        tracing::debug!(
            "Paranoid chose {} for {} (value {:.3})",
            action,
            state.active(),
            value
        );
        Ok(action)
    }

    fn name(&self) -> &'static str {
        "paranoid"
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cutoff::{DeadlineCutoff, DepthLimitCutoff};
    use chexers_core::{ExitCountEvaluator, Heuristics, Hex, Occupant, WeightedEvaluator};
    use std::time::Duration;

    /// Plain paranoid minimax without pruning
    fn brute_max(
        game: &Game,
        eval: &impl Evaluator,
        max_depth: u32,
        state: &State,
        root: Colour,
        depth: u32,
    ) -> (f32, Option<Action>) {
        if depth > max_depth || game.terminal_test(state) {
            return (eval.evaluate(state).unwrap()[root], None);
        }
        let mut best = (f32::NEG_INFINITY, None);
        for action in game.actions(state) {
            let child = game.result(state, action).unwrap();
            let v = brute_min(game, eval, max_depth, &child, root, depth + 1);
            if best.1.is_none() || v > best.0 {
                best = (v, Some(action));
            }
        }
        best
    }

    fn brute_min(
        game: &Game,
        eval: &impl Evaluator,
        max_depth: u32,
        state: &State,
        root: Colour,
        depth: u32,
    ) -> f32 {
        if depth > max_depth || game.terminal_test(state) {
            return eval.evaluate(state).unwrap()[root];
        }
        let mut best = f32::INFINITY;
        for first in game.actions(state) {
            let s1 = game.result(state, first).unwrap();
            if game.terminal_test(&s1) {
                best = best.min(brute_max(game, eval, max_depth, &s1, root, depth + 1).0);
                continue;
            }
            for second in game.actions(&s1) {
                let s2 = game.result(&s1, second).unwrap();
                best = best.min(brute_max(game, eval, max_depth, &s2, root, depth + 1).0);
            }
        }
        best
    }

    fn piece(q: i8, r: i8, colour: Colour) -> (Hex, Occupant) {
        (Hex::new(q, r), Occupant::Piece(colour))
    }

    fn small_board() -> State {
        State::new(
            vec![
                piece(1, -1, Colour::Red),
                piece(-2, 0, Colour::Red),
                piece(1, 0, Colour::Green),
                piece(0, -1, Colour::Blue),
                (Hex::new(2, -1), Occupant::Block),
            ],
            Colour::Red,
        )
        .unwrap()
    }

    #[test]
    fn test_matches_unpruned_minimax() {
        let game = Game::default();
        let eval = WeightedEvaluator::new(game.clone(), Heuristics::default());
        let state = small_board();

        for max_depth in [0, 1, 2] {
            let search = Paranoid::new(eval.clone(), DepthLimitCutoff::new(max_depth));
            let (value, action) = search.value(&game, &state).unwrap();
            let (expected_value, expected_action) =
                brute_max(&game, &eval, max_depth, &state, Colour::Red, 0);
            assert_eq!(action, expected_action, "depth {max_depth}");
            assert_eq!(value, expected_value, "depth {max_depth}");
        }
    }

    #[test]
    fn test_move_ordering_keeps_value() {
        let game = Game::default();
        let eval = WeightedEvaluator::new(game.clone(), Heuristics::default());
        let state = small_board();

        let plain = Paranoid::new(eval.clone(), DepthLimitCutoff::new(2));
        let ordered = Paranoid::with_config(
            eval,
            DepthLimitCutoff::new(2),
            ParanoidConfig::default().with_order_moves(true),
        );
        let (plain_value, _) = plain.value(&game, &state).unwrap();
        let (ordered_value, ordered_action) = ordered.value(&game, &state).unwrap();
        assert_eq!(plain_value, ordered_value);
        assert!(game.actions(&state).contains(&ordered_action.unwrap()));
    }

    #[test]
    fn test_picks_exit() {
        let game = Game::default();
        let state = State::new(vec![piece(3, -3, Colour::Red)], Colour::Red).unwrap();
        let exit = Action::Exit { from: Hex::new(3, -3) };
        assert!(game.actions(&state).contains(&exit));

        for max_depth in [1, 2] {
            let mut search = Paranoid::new(ExitCountEvaluator, DepthLimitCutoff::new(max_depth));
            assert_eq!(search.search(&game, &state).unwrap(), exit);
        }
    }

    #[test]
    fn test_picks_exit_among_opponents() {
        let game = Game::default();
        let state = State::new(
            vec![
                piece(3, -3, Colour::Red),
                piece(0, 0, Colour::Green),
                piece(-1, 2, Colour::Blue),
            ],
            Colour::Red,
        )
        .unwrap();
        let eval = WeightedEvaluator::new(game.clone(), Heuristics::default());
        let mut search = Paranoid::with_config(
            eval,
            DepthLimitCutoff::new(1),
            ParanoidConfig::default().with_order_moves(true),
        );
        assert_eq!(search.search(&game, &state).unwrap(), Action::Exit { from: Hex::new(3, -3) });
    }

    #[test]
    fn test_root_expanded_when_cut_off() {
        let game = Game::default();
        let state = game.initial_state();
        let mut search = Paranoid::new(ExitCountEvaluator, |_: &State, _: u32| true);
        let action = search.search(&game, &state).unwrap();
        assert!(game.actions(&state).contains(&action));
    }

    #[test]
    fn test_spent_deadline_still_plays() {
        let game = Game::default();
        let state = game.initial_state();
        let eval = WeightedEvaluator::new(game.clone(), Heuristics::default());
        let mut search = Paranoid::new(eval, DeadlineCutoff::new(3, Duration::ZERO));
        let action = search.search(&game, &state).unwrap();
        assert!(game.actions(&state).contains(&action));
    }
}
