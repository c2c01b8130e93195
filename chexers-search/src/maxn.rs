//! MaxN search
//!
//! Minimax generalised to three players: every colour maximises its own
//! coordinate of the utility vector and no pruning is possible, so depth
//! has to stay small or the evaluator cheap.
//!
//! ## Architecture
//! - Level 2: Root expansion (optionally parallel)
//! - Level 3: Recursive value computation

use chexers_core::{Action, ChexersError, Evaluator, Game, Result, State, Utility};

use crate::cutoff::Cutoff;
use crate::Search;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Depth of the root state
const ROOT_DEPTH: u32 = 1;

/// MaxN player
pub struct MaxN<E, C> {
    evaluator: E,
    cutoff: C,
}

impl<E: Evaluator, C: Cutoff> MaxN<E, C> {
    pub fn new(evaluator: E, cutoff: C) -> Self {
        Self { evaluator, cutoff }
    }

    // ========================================================================
    // Level 2: Root
    // ========================================================================

    /// Best root action and its utility vector.
    ///
    /// The root is always expanded; children are reduced in action order
    /// so the first maximal action wins ties whether or not they were
    /// evaluated in parallel.
    pub fn best(&self, game: &Game, state: &State) -> Result<(Action, Utility)> {
        let actions = game.actions(state);
        let mover = state.active();

        let children: Vec<State> = actions
            .iter()
            .map(|action| game.result(state, *action))
            .collect::<Result<_>>()?;

        #[cfg(feature = "parallel")]
        let values: Vec<Result<Utility>> = children
            .par_iter()
            .map(|child| self.value(game, child, ROOT_DEPTH + 1))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let values: Vec<Result<Utility>> = children
            .iter()
            .map(|child| self.value(game, child, ROOT_DEPTH + 1))
            .collect();

        let mut best: Option<(Action, Utility)> = None;
        for (action, value) in actions.into_iter().zip(values) {
            let utility = value?;
            if best.map_or(true, |(_, b)| utility[mover] > b[mover]) {
                best = Some((action, utility));
            }
        }
        best.ok_or(ChexersError::EmptyActionSet)
    }

    // ========================================================================
    // Level 3: Recursion
    // ========================================================================

    /// Utility vector of `state` when every colour plays for itself
    fn value(&self, game: &Game, state: &State, depth: u32) -> Result<Utility> {
        if self.cutoff.cutoff(state, depth) || game.terminal_test(state) {
            return self.evaluator.evaluate(state);
        }

        let mover = state.active();
        let mut best: Option<Utility> = None;
        for action in game.actions(state) {
            let child = game.result(state, action)?;
            let utility = self.value(game, &child, depth + 1)?;
            if best.map_or(true, |b| utility[mover] > b[mover]) {
                best = Some(utility);
            }
        }
        best.ok_or(ChexersError::EmptyActionSet)
    }
}

impl<E: Evaluator, C: Cutoff> Search for MaxN<E, C> {
    fn search(&mut self, game: &Game, state: &State) -> Result<Action> {
        let actions = game.actions(state);
        if let [only] = actions.as_slice() {
            return Ok(*only);
        }

        self.cutoff.reset();
        let (action, utility) = self.best(game, state)?;
        tracing::debug!(
            "MaxN chose {} for {} (utility {:.3})",
            action,
            state.active(),
            utility[state.active()]
        );
        Ok(action)
    }

    fn name(&self) -> &'static str {
        "maxn"
    }
}
