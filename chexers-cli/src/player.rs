//! Player boundary between the referee and the engine
//!
//! The referee speaks in absolute coordinates and colours. The engine only
//! ever sees its own colour as red, so every action crossing this boundary
//! is rotated, and every action coming in is checked against the rules.

use serde::{Deserialize, Serialize};

use chexers_core::{Action, ChexersError, Colour, Game, Hex, Result, State};
use chexers_search::{CompositionStrategy, Search, StrategyConfig};

/// Axial `(q, r)` pair as the referee writes it
pub type Coord = (i8, i8);

fn coord(hex: Hex) -> Coord {
    (hex.q, hex.r)
}

fn hex((q, r): Coord) -> Hex {
    Hex::new(q, r)
}

// ============================================================================
// REFEREE ACTIONS
// ============================================================================

/// Action in the referee's format, e.g. `{"kind": "MOVE", "payload": [[-3, 0], [-2, 0]]}`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "UPPERCASE")]
pub enum RefereeAction {
    Move(Coord, Coord),
    Jump(Coord, Coord),
    Exit(Coord),
    Pass,
}

impl RefereeAction {
    /// Action in absolute coordinates
    pub fn absolute(self) -> Action {
        match self {
            RefereeAction::Move(from, to) => Action::Move { from: hex(from), to: hex(to) },
            RefereeAction::Jump(from, to) => Action::Jump { from: hex(from), to: hex(to) },
            RefereeAction::Exit(from) => Action::Exit { from: hex(from) },
            RefereeAction::Pass => Action::Pass,
        }
    }

    /// Whether every coordinate in the payload is a board cell
    pub fn on_board(self) -> bool {
        let action = self.absolute();
        action.from().into_iter().chain(action.to()).all(|hex| hex.index().is_some())
    }

    /// Action as seen by the engine playing `viewer`
    pub fn to_engine(self, viewer: Colour) -> Action {
        self.absolute().to_perspective(viewer)
    }

    /// Referee form of an absolute action
    pub fn from_absolute(action: Action) -> Self {
        match action {
            Action::Move { from, to } => RefereeAction::Move(coord(from), coord(to)),
            Action::Jump { from, to } => RefereeAction::Jump(coord(from), coord(to)),
            Action::Exit { from } => RefereeAction::Exit(coord(from)),
            Action::Pass => RefereeAction::Pass,
        }
    }

    /// Referee form of an action chosen by the engine playing `viewer`
    pub fn from_engine(action: Action, viewer: Colour) -> Self {
        Self::from_absolute(action.from_perspective(viewer))
    }
}

// ============================================================================
// PLAYER
// ============================================================================

/// One engine instance playing a single colour
pub struct Player {
    colour: Colour,
    game: Game,
    /// Board in this player's red-centred view
    state: State,
    strategy: CompositionStrategy,
}

impl Player {
    /// Player for `colour` starting from the standard opening
    pub fn new(colour: Colour, config: &StrategyConfig) -> Self {
        let game = Game::default();
        let start = game.initial_state();
        Self::from_game(colour, game, &start, config)
    }

    /// Player for `colour` starting from an arbitrary absolute state
    pub fn from_state(colour: Colour, state: &State, config: &StrategyConfig) -> Self {
        Self::from_game(colour, Game::default(), state, config)
    }

    fn from_game(
        colour: Colour,
        mut game: Game,
        absolute: &State,
        config: &StrategyConfig,
    ) -> Self {
        let state = absolute.to_perspective(colour);
        game.build_heuristic_field(Colour::Red, &state.blocks());
        let strategy = CompositionStrategy::from_config(&game, config);
        Self {
            colour,
            game,
            state,
            strategy,
        }
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    /// Board in this player's red-centred view
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Board in absolute coordinates
    pub fn absolute_state(&self) -> State {
        self.state.from_perspective(self.colour)
    }

    /// Choose this player's next action
    pub fn action(&mut self) -> Result<RefereeAction> {
        if self.state.active() != Colour::Red {
            return Err(ChexersError::InvalidState(format!(
                "{} asked to move on {}'s turn",
                self.colour,
                self.state.active().advance(self.colour.index())
            )));
        }
        let action = self.strategy.search(&self.game, &self.state)?;
        Ok(RefereeAction::from_engine(action, self.colour))
    }

    /// Apply the action the referee reports for `mover`
    pub fn update(&mut self, mover: Colour, action: RefereeAction) -> Result<()> {
        let relative = mover.advance(self.colour.rotations_to_red());
        if relative != self.state.active() {
            return Err(ChexersError::InvalidState(format!(
                "{} reported a move out of turn",
                mover
            )));
        }
        if !action.on_board() {
            return Err(ChexersError::IllegalAction {
                action: action.absolute(),
                colour: mover,
            });
        }
        let action = action.to_engine(self.colour);
        self.state = self.game.apply_checked(&self.state, action)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chexers_search::OpeningBook;

    fn quick_config() -> StrategyConfig {
        StrategyConfig::default()
            .with_maxn_depth(1)
            .with_paranoid_depth(0)
            .with_book(OpeningBook::empty())
    }

    #[test]
    fn test_referee_json() {
        let action = RefereeAction::Move((-3, 0), (-2, 0));
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"kind":"MOVE","payload":[[-3,0],[-2,0]]}"#);
        assert_eq!(serde_json::to_string(&RefereeAction::Pass).unwrap(), r#"{"kind":"PASS"}"#);

        let exit: RefereeAction =
            serde_json::from_str(r#"{"kind":"EXIT","payload":[3,-3]}"#).unwrap();
        assert_eq!(exit, RefereeAction::Exit((3, -3)));
    }

    #[test]
    fn test_engine_round_trip_for_every_colour() {
        let actions = [
            RefereeAction::Move((0, -3), (0, -2)),
            RefereeAction::Jump((1, -3), (1, -1)),
            RefereeAction::Exit((-3, 3)),
            RefereeAction::Pass,
        ];
        for colour in Colour::ALL {
            for action in actions {
                let engine = action.to_engine(colour);
                assert_eq!(RefereeAction::from_engine(engine, colour), action);
            }
        }
    }

    #[test]
    fn test_green_sees_itself_as_red() {
        let player = Player::new(Colour::Green, &quick_config());
        let game = Game::default();
        let mut actual = player.state().pieces_of(Colour::Red);
        actual.sort();
        let mut expected: Vec<Hex> = game
            .config()
            .starts(Colour::Green)
            .iter()
            .map(|h| h.rotate(Colour::Green.rotations_to_red()))
            .collect();
        expected.sort();
        assert_eq!(actual, expected);
        // red moves first, which is the turn before green's
        assert_eq!(player.state().active(), Colour::Blue);
        assert_eq!(player.absolute_state(), game.initial_state());
    }

    #[test]
    fn test_players_stay_in_sync() {
        let game = Game::default();
        let mut referee = game.initial_state();
        let mut players: Vec<Player> = Colour::ALL
            .into_iter()
            .map(|colour| Player::new(colour, &quick_config()))
            .collect();

        for turn in 0..6 {
            let mover = referee.active();
            let action = players[mover.index()].action().unwrap();
            referee = game.apply_checked(&referee, action.absolute()).unwrap();
            for player in &mut players {
                player.update(mover, action).unwrap();
                assert_eq!(player.absolute_state(), referee, "turn {turn}");
            }
        }
    }

    #[test]
    fn test_rejects_illegal_referee_action() {
        let mut player = Player::new(Colour::Blue, &quick_config());
        // red cannot move a green piece
        let bogus = RefereeAction::Move((0, -3), (0, -2));
        assert!(matches!(
            player.update(Colour::Red, bogus),
            Err(ChexersError::IllegalAction { .. })
        ));
        // and blue is not on turn
        assert!(player.update(Colour::Blue, RefereeAction::Pass).is_err());
        assert!(player.action().is_err());
    }

    #[test]
    fn test_rejects_off_board_coordinates() {
        let mut player = Player::new(Colour::Green, &quick_config());
        let far: RefereeAction =
            serde_json::from_str(r#"{"kind":"MOVE","payload":[[100,100],[0,0]]}"#).unwrap();
        assert!(!far.on_board());
        assert!(matches!(
            player.update(Colour::Red, far),
            Err(ChexersError::IllegalAction { colour: Colour::Red, .. })
        ));

        let extreme = RefereeAction::Exit((i8::MIN, i8::MAX));
        assert!(player.update(Colour::Red, extreme).is_err());
        // the rejected actions left the board untouched
        assert_eq!(player.absolute_state(), Game::default().initial_state());
        assert!(RefereeAction::Pass.on_board());
    }
}
