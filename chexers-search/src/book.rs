//! Opening books
//!
//! A book is a queue of red-centred actions played front-first before any
//! tree search. It is abandoned as soon as the next entry is not legal,
//! which happens once an opponent occupies a cell the book relies on.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use chexers_core::{Action, Game, Hex, State};

/// Queue of precomputed opening actions
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpeningBook {
    actions: VecDeque<Action>,
}

impl OpeningBook {
    pub fn new<I: IntoIterator<Item = Action>>(actions: I) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }

    /// Book with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pull the starting row towards the centre as a group
    pub fn gather() -> Self {
        Self::new([
            mv((-3, 0), (-2, 0)),
            mv((-2, 0), (-2, 1)),
            mv((-3, 3), (-2, 2)),
            jump((-3, 2), (-1, 0)),
            jump((-3, 1), (-1, 1)),
        ])
    }

    /// Leapfrog along the starting edge
    pub fn edge() -> Self {
        Self::new([
            mv((-3, 2), (-2, 2)),
            jump((-3, 0), (-3, 2)),
            mv((-3, 3), (-2, 3)),
        ])
    }

    /// Built-in book by name
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "gather" => Some(Self::gather()),
            "edge" => Some(Self::edge()),
            "none" => Some(Self::empty()),
            _ => None,
        }
    }

    /// Parse a JSON list of actions
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Next book action if it is legal in `state`.
    ///
    /// An illegal entry ends the book for good.
    pub fn next(&mut self, game: &Game, state: &State) -> Option<Action> {
        let action = self.actions.pop_front()?;
        if game.actions(state).contains(&action) {
            return Some(action);
        }
        tracing::warn!(
            "Opening book entry {} is not playable, dropping {} remaining entries",
            action,
            self.actions.len()
        );
        self.actions.clear();
        None
    }
}

fn mv(from: (i8, i8), to: (i8, i8)) -> Action {
    Action::Move {
        from: Hex::new(from.0, from.1),
        to: Hex::new(to.0, to.1),
    }
}

fn jump(from: (i8, i8), to: (i8, i8)) -> Action {
    Action::Jump {
        from: Hex::new(from.0, from.1),
        to: Hex::new(to.0, to.1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chexers_core::Colour;

    /// Play the book for red while green and blue pass
    fn replay(book: &mut OpeningBook) -> Vec<Action> {
        let game = Game::default();
        let mut state = game.initial_state();
        let mut played = Vec::new();
        while let Some(action) = book.next(&game, &state) {
            played.push(action);
            state = game.result(&state, action).unwrap().with_active(Colour::Red);
        }
        played
    }

    #[test]
    fn test_builtin_books_are_playable() {
        for name in ["gather", "edge"] {
            let mut book = OpeningBook::named(name).unwrap();
            let expected = book.len();
            assert_eq!(replay(&mut book).len(), expected, "book {name}");
            assert!(book.is_empty());
        }
        assert!(OpeningBook::named("missing").is_none());
    }

    #[test]
    fn test_illegal_entry_exhausts_book() {
        let game = Game::default();
        let state = game.initial_state();
        let mut book = OpeningBook::new([mv((0, 0), (1, 0)), mv((-3, 0), (-2, 0))]);
        assert_eq!(book.next(&game, &state), None);
        assert!(book.is_empty());
        assert_eq!(book.next(&game, &state), None);
    }

    #[test]
    fn test_json_book() {
        let book = OpeningBook::gather();
        let json = book.to_json().unwrap();
        assert_eq!(OpeningBook::from_json(&json).unwrap(), book);
        assert!(OpeningBook::from_json("{\"not\": \"a book\"}").is_err());
    }
}
