//! Immutable board state, actions and the perspective rotation

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::board::{Colour, Hex, Occupant, ALL_CELLS, BOARD_RADIUS, CELL_COUNT, PIECES_TO_WIN};
use crate::error::{ChexersError, Result};

// ============================================================================
// ACTIONS
// ============================================================================

/// A legal action for the active colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Move { from: Hex, to: Hex },
    Jump { from: Hex, to: Hex },
    Exit { from: Hex },
    Pass,
}

impl Action {
    /// Cell the acting piece leaves, if any
    pub fn from(&self) -> Option<Hex> {
        match *self {
            Action::Move { from, .. } | Action::Jump { from, .. } | Action::Exit { from } => {
                Some(from)
            }
            Action::Pass => None,
        }
    }

    /// Cell the acting piece lands on, if any
    pub fn to(&self) -> Option<Hex> {
        match *self {
            Action::Move { to, .. } | Action::Jump { to, .. } => Some(to),
            Action::Exit { .. } | Action::Pass => None,
        }
    }

    /// Rotate every coordinate of the action `times` steps of 120 degrees
    pub fn rotate(&self, times: usize) -> Action {
        match *self {
            Action::Move { from, to } => Action::Move {
                from: from.rotate(times),
                to: to.rotate(times),
            },
            Action::Jump { from, to } => Action::Jump {
                from: from.rotate(times),
                to: to.rotate(times),
            },
            Action::Exit { from } => Action::Exit { from: from.rotate(times) },
            Action::Pass => Action::Pass,
        }
    }

    /// Express an action taken on `colour`'s absolute board in that colour's red-centred view
    pub fn to_perspective(&self, colour: Colour) -> Action {
        self.rotate(colour.rotations_to_red())
    }

    /// Inverse of [`Action::to_perspective`]
    pub fn from_perspective(&self, colour: Colour) -> Action {
        self.rotate(colour.index())
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Move { from, to } => write!(f, "MOVE from {} to {}.", from, to),
            Action::Jump { from, to } => write!(f, "JUMP from {} to {}.", from, to),
            Action::Exit { from } => write!(f, "EXIT from {}.", from),
            Action::Pass => f.write_str("PASS."),
        }
    }
}

// ============================================================================
// STATE
// ============================================================================

/// Board state (never mutated once handed out; transitions build a new one)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// Occupant per cell, indexed by [`Hex::index`]
    cells: [Option<Occupant>; CELL_COUNT],
    /// Exited pieces per colour
    completed: [u8; 3],
    /// Whose turn it is
    active: Colour,
}

impl Hash for State {
    // Only the board takes part; equal states still hash equally.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cells.hash(state);
    }
}

impl State {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty board with `active` to move
    pub fn empty(active: Colour) -> Self {
        Self {
            cells: [None; CELL_COUNT],
            completed: [0; 3],
            active,
        }
    }

    /// Build a state from occupant placements with nothing exited yet
    pub fn new<I>(occupants: I, active: Colour) -> Result<Self>
    where
        I: IntoIterator<Item = (Hex, Occupant)>,
    {
        Self::with_completed(occupants, [0; 3], active)
    }

    /// Build a state from occupant placements and exit counters
    pub fn with_completed<I>(occupants: I, completed: [u8; 3], active: Colour) -> Result<Self>
    where
        I: IntoIterator<Item = (Hex, Occupant)>,
    {
        let mut state = Self {
            cells: [None; CELL_COUNT],
            completed,
            active,
        };
        for (hex, occupant) in occupants {
            let index = hex
                .index()
                .ok_or_else(|| ChexersError::InvalidState(format!("{} is off the board", hex)))?;
            if state.cells[index].is_some() {
                return Err(ChexersError::InvalidState(format!("{} is occupied twice", hex)));
            }
            state.cells[index] = Some(occupant);
        }
        state.validate()?;
        Ok(state)
    }

    fn validate(&self) -> Result<()> {
        for colour in Colour::ALL {
            let total = self.completed[colour.index()] as usize + self.piece_count(colour);
            if total > PIECES_TO_WIN as usize {
                return Err(ChexersError::InvalidState(format!(
                    "{} has {} pieces on board or exited",
                    colour, total
                )));
            }
        }
        Ok(())
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Colour to move
    pub fn active(&self) -> Colour {
        self.active
    }

    /// Pieces `colour` has exited
    pub fn completed(&self, colour: Colour) -> u8 {
        self.completed[colour.index()]
    }

    pub fn completed_counts(&self) -> [u8; 3] {
        self.completed
    }

    /// Occupant of a cell (off-board cells are empty)
    pub fn occupant(&self, hex: Hex) -> Option<Occupant> {
        hex.index().and_then(|i| self.cells[i])
    }

    pub fn is_occupied(&self, hex: Hex) -> bool {
        self.occupant(hex).is_some()
    }

    /// Iterate occupied cells in index order
    pub fn occupants(&self) -> impl Iterator<Item = (Hex, Occupant)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell.map(|occupant| (ALL_CELLS[i], occupant)))
    }

    /// Positions of `colour`'s pieces in index order
    pub fn pieces_of(&self, colour: Colour) -> Vec<Hex> {
        self.occupants()
            .filter(|(_, occupant)| *occupant == Occupant::Piece(colour))
            .map(|(hex, _)| hex)
            .collect()
    }

    /// Cells holding immovable blocks
    pub fn blocks(&self) -> Vec<Hex> {
        self.occupants()
            .filter(|(_, occupant)| *occupant == Occupant::Block)
            .map(|(hex, _)| hex)
            .collect()
    }

    pub fn piece_count(&self, colour: Colour) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == Some(Occupant::Piece(colour)))
            .count()
    }

    /// Pieces `colour` still has to exit to win
    pub fn needed(&self, colour: Colour) -> u8 {
        PIECES_TO_WIN.saturating_sub(self.completed(colour))
    }

    // ========================================================================
    // DERIVED STATES
    // ========================================================================

    /// Same board with another colour to move
    pub fn with_active(&self, active: Colour) -> State {
        let mut next = self.clone();
        next.active = active;
        next
    }

    /// Rewrite or drop every occupant; the result is re-validated
    pub fn map_occupants<F>(&self, mut f: F) -> Result<State>
    where
        F: FnMut(Hex, Occupant) -> Option<Occupant>,
    {
        let occupants: Vec<_> = self
            .occupants()
            .filter_map(|(hex, occupant)| f(hex, occupant).map(|o| (hex, o)))
            .collect();
        State::with_completed(occupants, self.completed, self.active)
    }

    /// Same board with other exit counts; the result is re-validated
    pub fn with_completed_counts(&self, completed: [u8; 3]) -> Result<State> {
        State::with_completed(self.occupants(), completed, self.active)
    }

    pub(crate) fn take(&mut self, hex: Hex) -> Option<Occupant> {
        hex.index().and_then(|i| self.cells[i].take())
    }

    pub(crate) fn put(&mut self, hex: Hex, occupant: Occupant) {
        if let Some(i) = hex.index() {
            self.cells[i] = Some(occupant);
        }
    }

    pub(crate) fn record_exit(&mut self, colour: Colour) {
        self.completed[colour.index()] += 1;
    }

    pub(crate) fn set_active(&mut self, colour: Colour) {
        self.active = colour;
    }

    // ========================================================================
    // PERSPECTIVE
    // ========================================================================

    /// Rotate the board 120 degrees; every colour becomes the next one
    pub fn rotate_120(&self) -> State {
        let mut rotated = State::empty(self.active.next());
        for (hex, occupant) in self.occupants() {
            rotated.put(hex.rotate_120(), occupant.advance(1));
        }
        for colour in Colour::ALL {
            rotated.completed[colour.next().index()] = self.completed[colour.index()];
        }
        rotated
    }

    /// Apply [`State::rotate_120`] `times` times
    pub fn rotate(&self, times: usize) -> State {
        (0..times % 3).fold(self.clone(), |state, _| state.rotate_120())
    }

    /// View of this state in which `colour` plays red
    pub fn to_perspective(&self, colour: Colour) -> State {
        self.rotate(colour.rotations_to_red())
    }

    /// Undo [`State::to_perspective`] for the same colour
    pub fn from_perspective(&self, colour: Colour) -> State {
        self.rotate(colour.index())
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for r in -BOARD_RADIUS..=BOARD_RADIUS {
            let indent = r.unsigned_abs() as usize;
            write!(f, "{}", " ".repeat(indent))?;
            for q in -BOARD_RADIUS..=BOARD_RADIUS {
                let hex = Hex::new(q, r);
                if !hex.is_valid() {
                    continue;
                }
                let symbol = match self.occupant(hex) {
                    Some(Occupant::Piece(Colour::Red)) => 'R',
                    Some(Occupant::Piece(Colour::Green)) => 'G',
                    Some(Occupant::Piece(Colour::Blue)) => 'B',
                    Some(Occupant::Block) => '#',
                    None => '.',
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "to move: {}  exited: red {} green {} blue {}",
            self.active, self.completed[0], self.completed[1], self.completed[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn piece(colour: Colour) -> Occupant {
        Occupant::Piece(colour)
    }

    fn hash_of(state: &State) -> u64 {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_state_creation() {
        let state = State::new(
            vec![(Hex::new(1, -1), piece(Colour::Red)), (Hex::new(0, 0), Occupant::Block)],
            Colour::Red,
        )
        .unwrap();
        assert_eq!(state.active(), Colour::Red);
        assert_eq!(state.pieces_of(Colour::Red), vec![Hex::new(1, -1)]);
        assert_eq!(state.occupant(Hex::new(0, 0)), Some(Occupant::Block));
        assert!(!state.is_occupied(Hex::new(0, 1)));
        assert_eq!(state.needed(Colour::Red), 4);
    }

    #[test]
    fn test_invalid_states_rejected() {
        let off_board = State::new(vec![(Hex::new(4, 0), piece(Colour::Red))], Colour::Red);
        assert!(matches!(off_board, Err(ChexersError::InvalidState(_))));

        let twice = State::new(
            vec![(Hex::new(0, 0), piece(Colour::Red)), (Hex::new(0, 0), piece(Colour::Blue))],
            Colour::Red,
        );
        assert!(twice.is_err());

        let too_many = State::with_completed(
            vec![(Hex::new(0, 0), piece(Colour::Red))],
            [4, 0, 0],
            Colour::Red,
        );
        assert!(too_many.is_err());
    }

    #[test]
    fn test_rotate_120() {
        // blue to move, one rotation makes blue red
        let state = State::with_completed(
            vec![
                (Hex::new(1, -1), piece(Colour::Red)),
                (Hex::new(0, 0), piece(Colour::Green)),
                (Hex::new(0, 1), piece(Colour::Blue)),
            ],
            [0, 0, 1],
            Colour::Blue,
        )
        .unwrap();
        let expected = State::with_completed(
            vec![
                (Hex::new(0, 1), piece(Colour::Green)),
                (Hex::new(0, 0), piece(Colour::Blue)),
                (Hex::new(-1, 0), piece(Colour::Red)),
            ],
            [1, 0, 0],
            Colour::Red,
        )
        .unwrap();
        assert_eq!(state.rotate_120(), expected);
        assert_eq!(state.to_perspective(Colour::Blue), expected);
        assert_eq!(expected.from_perspective(Colour::Blue), state);
    }

    #[test]
    fn test_hash_ignores_turn_and_counters() {
        let a = State::new(vec![(Hex::new(0, 0), piece(Colour::Red))], Colour::Red).unwrap();
        let b = a.with_active(Colour::Green);
        assert_ne!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_action_rotation() {
        let action = Action::Move { from: Hex::new(0, -3), to: Hex::new(0, -2) };
        for colour in Colour::ALL {
            assert_eq!(action.to_perspective(colour).from_perspective(colour), action);
        }
        assert_eq!(Action::Pass.to_perspective(Colour::Green), Action::Pass);
        assert_eq!(
            Action::Exit { from: Hex::new(0, -3) }.to_perspective(Colour::Blue),
            Action::Exit { from: Hex::new(3, 0) }
        );
    }

    #[test]
    fn test_map_occupants() {
        let state = State::new(
            vec![(Hex::new(0, 0), piece(Colour::Red)), (Hex::new(1, 0), piece(Colour::Green))],
            Colour::Red,
        )
        .unwrap();
        let only_red = state
            .map_occupants(|_, o| (o == piece(Colour::Red)).then_some(o))
            .unwrap();
        assert_eq!(only_red.piece_count(Colour::Green), 0);
        assert_eq!(only_red.piece_count(Colour::Red), 1);
    }
}
