//! Position evaluation
//!
//! Evaluators return one utility per colour. The weighted evaluator scores
//! every colour from red's point of view by rotating the board first, so a
//! single set of weights serves all three players.

use serde::{Deserialize, Serialize};

use crate::board::Colour;
use crate::error::Result;
use crate::game::Game;
use crate::state::{Action, State};

/// Win value (effectively infinite)
pub const WIN_VALUE: f32 = 100000.0;

/// Utility of a state for each colour
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Utility(pub [f32; 3]);

impl Utility {
    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        Self([red, green, blue])
    }

    pub fn from_fn<F: FnMut(Colour) -> f32>(mut f: F) -> Self {
        Self([f(Colour::Red), f(Colour::Green), f(Colour::Blue)])
    }

    pub fn get(&self, colour: Colour) -> f32 {
        self.0[colour.index()]
    }
}

impl std::ops::Index<Colour> for Utility {
    type Output = f32;

    fn index(&self, colour: Colour) -> &f32 {
        &self.0[colour.index()]
    }
}

/// Maps a state to a utility per colour.
///
/// Must be pure; a failure aborts the search that asked for it.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, state: &State) -> Result<Utility>;
}

impl<F> Evaluator for F
where
    F: Fn(&State) -> Result<Utility> + Send + Sync,
{
    fn evaluate(&self, state: &State) -> Result<Utility> {
        self(state)
    }
}

// ============================================================================
// EXIT COUNT
// ============================================================================

/// Utility is the number of pieces each colour has exited
#[derive(Clone, Copy, Debug, Default)]
pub struct ExitCountEvaluator;

impl Evaluator for ExitCountEvaluator {
    fn evaluate(&self, state: &State) -> Result<Utility> {
        Ok(Utility::from_fn(|colour| state.completed(colour) as f32))
    }
}

// ============================================================================
// WEIGHTED FEATURES
// ============================================================================

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Weight per exited piece
    pub completed_weight: f32,
    /// Weight on the summed exit distance of the pieces still needed
    pub distance_weight: f32,
    /// Weight per legal move or jump
    pub mobility_weight: f32,
    /// Penalty per missing piece when a colour can no longer reach the win count
    pub shortage_weight: f32,
    /// How much the strongest opponent's score counts against a colour
    pub opponent_weight: f32,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            completed_weight: 10.0,
            distance_weight: 1.0,
            mobility_weight: 0.05,
            shortage_weight: 25.0,
            opponent_weight: 0.5,
        }
    }
}

/// Weighted sum of red-centred features, computed for each colour
#[derive(Clone, Debug, Default)]
pub struct WeightedEvaluator {
    game: Game,
    pub heuristics: Heuristics,
}

impl WeightedEvaluator {
    pub fn new(game: Game, heuristics: Heuristics) -> Self {
        Self { game, heuristics }
    }

    /// Score of red in a red-centred state, ignoring opponents
    fn red_score(&self, state: &State) -> f32 {
        let h = &self.heuristics;
        let config = self.game.config();
        let needed = state.needed(Colour::Red) as usize;

        let mut distances: Vec<i8> = state
            .pieces_of(Colour::Red)
            .into_iter()
            .map(|hex| config.exit_distance(Colour::Red, hex) + 1)
            .collect();
        distances.sort_unstable();
        let shortage = needed.saturating_sub(distances.len());
        let distance: i32 = distances.iter().take(needed).map(|d| *d as i32).sum();

        let mobility = if h.mobility_weight.abs() > 0.001 {
            self.game
                .actions(&state.with_active(Colour::Red))
                .iter()
                .filter(|a| !matches!(a, Action::Pass))
                .count()
        } else {
            0
        };

        h.completed_weight * state.completed(Colour::Red) as f32
            - h.distance_weight * distance as f32
            + h.mobility_weight * mobility as f32
            - h.shortage_weight * shortage as f32
    }
}

impl Evaluator for WeightedEvaluator {
    fn evaluate(&self, state: &State) -> Result<Utility> {
        if let Some(winner) = self.game.winner(state) {
            return Ok(Utility::from_fn(|colour| {
                if colour == winner {
                    WIN_VALUE
                } else {
                    -WIN_VALUE
                }
            }));
        }

        let raw = Utility::from_fn(|colour| self.red_score(&state.to_perspective(colour)));
        let weight = self.heuristics.opponent_weight;
        Ok(Utility::from_fn(|colour| {
            let strongest = Colour::ALL
                .into_iter()
                .filter(|c| *c != colour)
                .map(|c| raw[c])
                .fold(f32::NEG_INFINITY, f32::max);
            raw[colour] - weight * strongest
        }))
    }
}
