//! Game rules: move generation, transitions, terminal test and the
//! heuristic distance fields used by the pathfinder

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::board::{BoardConfig, Colour, Hex, Occupant, CELL_COUNT, DIRECTIONS};
use crate::error::{ChexersError, Result};
use crate::state::{Action, State};

// ============================================================================
// HEURISTIC DISTANCE FIELD
// ============================================================================

/// Estimated number of actions from each cell until a piece has exited.
///
/// Cells the flood fill never reached have no entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeuristicField {
    colour: Colour,
    costs: [Option<u32>; CELL_COUNT],
}

impl HeuristicField {
    /// Cost charged for a piece standing on an unreachable cell
    pub const UNREACHABLE: u32 = 64;

    /// Dijkstra flood fill from `colour`'s exit cells.
    ///
    /// Exit cells cost 1 (the exit action itself). Each expansion reaches
    /// one or two cells along a direction for one more action, matching
    /// the reach of a move or a jump.
    pub fn build(config: &BoardConfig, colour: Colour, blocked: &[Hex]) -> Self {
        let mut costs = [None; CELL_COUNT];
        let mut frontier = BinaryHeap::new();
        let is_blocked = |hex: &Hex| blocked.contains(hex);

        for exit in config.exits(colour).iter().filter(|h| !is_blocked(*h)) {
            if let Some(i) = exit.index() {
                costs[i] = Some(1);
                frontier.push(Reverse((1u32, i)));
            }
        }

        while let Some(Reverse((cost, index))) = frontier.pop() {
            if costs[index].is_some_and(|best| best < cost) {
                continue; // stale entry
            }
            let hex = Hex::from_index(index);
            for direction in 0..DIRECTIONS.len() {
                for steps in 1..=2 {
                    let next = hex.offset(direction, steps);
                    let Some(next_index) = next.index() else {
                        continue;
                    };
                    if is_blocked(&next) {
                        continue;
                    }
                    if costs[next_index].map_or(true, |best| best > cost + 1) {
                        costs[next_index] = Some(cost + 1);
                        frontier.push(Reverse((cost + 1, next_index)));
                    }
                }
            }
        }

        Self { colour, costs }
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    /// Cost from a cell, `None` when unreachable or off the board
    pub fn get(&self, hex: Hex) -> Option<u32> {
        hex.index().and_then(|i| self.costs[i])
    }

    /// Cost from a cell, saturating unreachable cells
    pub fn cost(&self, hex: Hex) -> u32 {
        self.get(hex).unwrap_or(Self::UNREACHABLE)
    }

    /// Sum of per-piece costs.
    ///
    /// Pieces are treated independently: two pieces heading for the same
    /// exit cell are not charged for the contention.
    pub fn sum_over(&self, pieces: &[Hex]) -> u32 {
        pieces.iter().map(|hex| self.cost(*hex)).sum()
    }
}

// ============================================================================
// GAME
// ============================================================================

/// Rules of the game plus per-colour heuristic fields
#[derive(Clone, Debug)]
pub struct Game {
    config: BoardConfig,
    fields: [Option<HeuristicField>; 3],
}

impl Default for Game {
    fn default() -> Self {
        Self::new(BoardConfig::standard())
    }
}

impl Game {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            fields: [None, None, None],
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Standard opening position, red to move
    pub fn initial_state(&self) -> State {
        let mut state = State::empty(Colour::Red);
        for colour in Colour::ALL {
            for hex in self.config.starts(colour) {
                state.put(*hex, Occupant::Piece(colour));
            }
        }
        state
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// All legal actions for the active colour.
    ///
    /// Exits come first, then moves and jumps piece by piece in direction
    /// order. Never empty: a colour with nothing to do gets `[Pass]`.
    pub fn actions(&self, state: &State) -> Vec<Action> {
        if self.terminal_test(state) {
            return vec![Action::Pass];
        }

        let colour = state.active();
        let pieces = state.pieces_of(colour);
        let mut actions: Vec<Action> = pieces
            .iter()
            .filter(|hex| self.config.is_exit(colour, **hex))
            .map(|&from| Action::Exit { from })
            .collect();

        for &from in &pieces {
            for direction in 0..DIRECTIONS.len() {
                let step = from.neighbor(direction);
                if !step.is_valid() {
                    continue;
                }
                if !state.is_occupied(step) {
                    actions.push(Action::Move { from, to: step });
                    continue;
                }
                let landing = from.offset(direction, 2);
                if landing.is_valid() && !state.is_occupied(landing) {
                    actions.push(Action::Jump { from, to: landing });
                }
            }
        }

        if actions.is_empty() {
            actions.push(Action::Pass);
        }
        actions
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// State after the active colour plays `action`; the turn always passes on.
    ///
    /// `action` is expected to come from [`Game::actions`]. Only a missing
    /// piece at the source cell is detected here; use
    /// [`Game::apply_checked`] for untrusted actions.
    pub fn result(&self, state: &State, action: Action) -> Result<State> {
        let mut next = self.transition(state, action)?;
        next.set_active(state.active().next());
        Ok(next)
    }

    /// Like [`Game::result`] but the same colour moves again.
    ///
    /// Used for single-player planning where opponents are ignored.
    pub fn result_solo(&self, state: &State, action: Action) -> Result<State> {
        self.transition(state, action)
    }

    /// Validate `action` against the legal set before applying it
    pub fn apply_checked(&self, state: &State, action: Action) -> Result<State> {
        if !self.actions(state).contains(&action) {
            return Err(ChexersError::IllegalAction {
                action,
                colour: state.active(),
            });
        }
        self.result(state, action)
    }

    fn transition(&self, state: &State, action: Action) -> Result<State> {
        let colour = state.active();
        let mut next = state.clone();
        let Some(from) = action.from() else {
            return Ok(next); // pass
        };
        if next.take(from) != Some(Occupant::Piece(colour)) {
            return Err(ChexersError::IllegalAction { action, colour });
        }
        match action.to() {
            Some(to) => next.put(to, Occupant::Piece(colour)),
            None => next.record_exit(colour),
        }
        Ok(next)
    }

    // ========================================================================
    // GAME STATUS
    // ========================================================================

    /// True once any colour has exited enough pieces
    pub fn terminal_test(&self, state: &State) -> bool {
        self.winner(state).is_some()
    }

    pub fn winner(&self, state: &State) -> Option<Colour> {
        Colour::ALL
            .into_iter()
            .find(|c| state.completed(*c) >= self.config.pieces_to_win)
    }

    /// Colours that still have pieces on the board
    pub fn remaining_colours(&self, state: &State) -> Vec<Colour> {
        Colour::ALL
            .into_iter()
            .filter(|c| state.piece_count(*c) > 0)
            .collect()
    }

    // ========================================================================
    // HEURISTIC FIELDS
    // ========================================================================

    /// Build and store the distance field for `colour`
    pub fn build_heuristic_field(&mut self, colour: Colour, blocked: &[Hex]) -> &HeuristicField {
        let field = HeuristicField::build(&self.config, colour, blocked);
        tracing::debug!(
            "Built heuristic field for {} ({} blocked cells)",
            colour,
            blocked.len()
        );
        self.fields[colour.index()].insert(field)
    }

    /// Previously built field for `colour`
    pub fn heuristic_field(&self, colour: Colour) -> Result<&HeuristicField> {
        self.fields[colour.index()]
            .as_ref()
            .ok_or(ChexersError::HeuristicFieldUnavailable(colour))
    }
}

// ============================================================================
// TESTS
// ============================================================================
