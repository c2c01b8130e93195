//! A* exit planning for a single colour
//!
//! Once the mover is the only colour with pieces on the board, opponents
//! no longer matter and the game becomes a shortest-path problem: exit the
//! pieces still needed in as few actions as possible.
//!
//! The heuristic sums the distance field over the mover's pieces. It does
//! not charge for two pieces contending for the same exit cell, so it is an
//! approximation rather than a proven lower bound once several pieces are
//! left. With a single piece it never overestimates.
//!
//! ## Architecture
//! - Level 2: Cached plan / replanning
//! - Level 3: Projection and best-first search

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use rustc_hash::{FxHashMap, FxHashSet};

use chexers_core::{
    Action, ChexersError, Colour, Game, HeuristicField, NodeId, Occupant, Result, SearchTree, State,
};

use crate::Search;

// ============================================================================
// A* PLANNER
// ============================================================================

/// A* player that caches its plan between turns
#[derive(Clone, Debug, Default)]
pub struct AStar {
    plan: VecDeque<Action>,
    /// Projected state the next planned action applies to
    expected: Option<State>,
}

impl AStar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions left in the cached plan
    pub fn remaining_plan(&self) -> &VecDeque<Action> {
        &self.plan
    }

    // ========================================================================
    // Level 2: Planning
    // ========================================================================

    /// Shortest action sequence exiting the pieces the mover still needs
    pub fn plan(&self, game: &Game, state: &State) -> Result<Vec<Action>> {
        let colour = state.active();
        let field = game.heuristic_field(colour)?;
        best_first(game, project(state)?, field)
    }
}

/// One-colour view of `state`: opponents' pieces and exit counts removed,
/// blocks and the mover's pieces kept
pub fn project(state: &State) -> Result<State> {
    let colour = state.active();
    let mut completed = [0; 3];
    completed[colour.index()] = state.completed(colour);
    state
        .map_occupants(|_, occupant| match occupant {
            Occupant::Piece(c) if c != colour => None,
            other => Some(other),
        })?
        .with_completed_counts(completed)
}

fn is_goal(state: &State, colour: Colour) -> bool {
    state.piece_count(colour) == 0
}

/// A* over a projected state; the mover keeps the turn after every action
fn best_first(game: &Game, start: State, field: &HeuristicField) -> Result<Vec<Action>> {
    let colour = start.active();
    let heuristic = |state: &State| field.sum_over(&state.pieces_of(colour));

    let mut tree = SearchTree::new(start);
    let mut frontier = BinaryHeap::new();
    let mut best_cost: FxHashMap<State, u32> = FxHashMap::default();
    let mut explored: FxHashSet<State> = FxHashSet::default();
    let mut pushed: u64 = 0;

    frontier.push(Reverse((heuristic(tree.state(NodeId::ROOT)), pushed, NodeId::ROOT.0)));
    best_cost.insert(tree.state(NodeId::ROOT).clone(), 0);

    while let Some(Reverse((_, _, index))) = frontier.pop() {
        let id = NodeId(index);
        let state = tree.state(id);
        if explored.contains(state) {
            continue; // stale entry
        }
        if is_goal(state, colour) {
            tracing::debug!(
                "A* found a {}-action plan for {} after exploring {} states",
                tree.get(id).path_cost,
                colour,
                explored.len()
            );
            return Ok(tree.solution(id));
        }
        explored.insert(state.clone());

        for action in game.actions(state) {
            let child = tree.child_by(id, action, |s, a| game.result_solo(s, a))?;
            let child_state = tree.state(child);
            if explored.contains(child_state) {
                continue;
            }
            let cost = tree.get(child).path_cost;
            if best_cost.get(child_state).is_some_and(|best| *best <= cost) {
                continue;
            }
            best_cost.insert(child_state.clone(), cost);
            pushed += 1;
            frontier.push(Reverse((cost + heuristic(child_state), pushed, child.0)));
        }
    }

    Err(ChexersError::NoPlanFound(colour))
}

impl Search for AStar {
    fn search(&mut self, game: &Game, state: &State) -> Result<Action> {
        let colour = state.active();
        let field = game.heuristic_field(colour)?;
        let projected = project(state)?;

        if self.expected.as_ref() == Some(&projected) {
            if let Some(action) = self.plan.pop_front() {
                self.expected = Some(game.result_solo(&projected, action)?);
                return Ok(action);
            }
        } else if self.expected.is_some() {
            tracing::warn!("{} left the planned path, replanning", colour);
        }

        let mut plan: VecDeque<Action> = best_first(game, projected.clone(), field)?.into();
        let Some(action) = plan.pop_front() else {
            self.expected = None;
            return Ok(Action::Pass);
        };
        self.expected = Some(game.result_solo(&projected, action)?);
        self.plan = plan;
        Ok(action)
    }

    fn name(&self) -> &'static str {
        "astar"
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chexers_core::board::ALL_CELLS;
    use chexers_core::Hex;

    fn red(q: i8, r: i8) -> (Hex, Occupant) {
        (Hex::new(q, r), Occupant::Piece(Colour::Red))
    }

    /// Three rows (r = -1, 0, 1) left open, everything else blocked
    fn corridor(pieces: Vec<(Hex, Occupant)>) -> State {
        let taken: Vec<Hex> = pieces.iter().map(|(hex, _)| *hex).collect();
        let blocks = ALL_CELLS
            .iter()
            .filter(|hex| !(-1..=1).contains(&hex.r) && !taken.contains(hex))
            .map(|hex| (*hex, Occupant::Block));
        State::new(pieces.into_iter().chain(blocks), Colour::Red).unwrap()
    }

    fn game_for(state: &State) -> Game {
        let mut game = Game::default();
        game.build_heuristic_field(Colour::Red, &state.blocks());
        game
    }

    /// Fewest actions to exit every piece, by breadth-first search
    fn bfs_plan_length(game: &Game, start: &State) -> usize {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([(start.clone(), 0)]);
        seen.insert(start.clone());
        while let Some((state, depth)) = queue.pop_front() {
            if is_goal(&state, Colour::Red) {
                return depth;
            }
            for action in game.actions(&state) {
                let next = game.result_solo(&state, action).unwrap();
                if seen.insert(next.clone()) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        panic!("no plan");
    }

    #[test]
    fn test_requires_heuristic_field() {
        let game = Game::default();
        let state = corridor(vec![red(-3, 0)]);
        let mut astar = AStar::new();
        assert!(matches!(
            astar.search(&game, &state),
            Err(ChexersError::HeuristicFieldUnavailable(Colour::Red))
        ));
    }

    #[test]
    fn test_corridor_plan_is_optimal() {
        for start in [Hex::new(-3, 0), Hex::new(-3, 1), Hex::new(-2, -1), Hex::new(0, 0)] {
            let state = corridor(vec![(start, Occupant::Piece(Colour::Red))]);
            let game = game_for(&state);
            let plan = AStar::new().plan(&game, &state).unwrap();
            assert_eq!(plan.len(), bfs_plan_length(&game, &state), "from {start}");
            assert!(matches!(plan.last(), Some(Action::Exit { .. })));
        }
    }

    #[test]
    fn test_plan_replays_to_goal() {
        let state = corridor(vec![red(-3, 0), red(-2, 0)]);
        let game = game_for(&state);
        let plan = AStar::new().plan(&game, &state).unwrap();

        let mut current = state;
        for action in &plan {
            current = game.result_solo(&current, *action).unwrap();
        }
        assert_eq!(current.piece_count(Colour::Red), 0);
        assert_eq!(current.completed(Colour::Red), 2);
    }

    #[test]
    fn test_cached_plan_is_followed() {
        let state = corridor(vec![red(-3, 0)]);
        let game = game_for(&state);
        let mut astar = AStar::new();
        let plan = astar.plan(&game, &state).unwrap();

        let mut current = state;
        for expected in &plan {
            let action = astar.search(&game, &current).unwrap();
            assert_eq!(action, *expected);
            current = game.result_solo(&current, action).unwrap();
        }
        assert!(astar.remaining_plan().is_empty());
    }

    #[test]
    fn test_replans_after_deviation() {
        let state = corridor(vec![red(-3, 0)]);
        let game = game_for(&state);
        let mut astar = AStar::new();
        astar.search(&game, &state).unwrap();

        // the piece ends up somewhere the plan did not predict
        let moved = corridor(vec![red(1, 0)]);
        let action = astar.search(&game, &moved).unwrap();
        let fresh = AStar::new().plan(&game, &moved).unwrap();
        assert_eq!(action, fresh[0]);
        assert_eq!(astar.remaining_plan().len(), fresh.len() - 1);
    }

    #[test]
    fn test_projection_drops_opponents() {
        let mut game = Game::default();
        game.build_heuristic_field(Colour::Red, &[]);
        let state = State::with_completed(
            vec![
                red(3, -1),
                (Hex::new(-3, 0), Occupant::Block),
                (Hex::new(0, 0), Occupant::Piece(Colour::Green)),
            ],
            [3, 1, 0],
            Colour::Red,
        )
        .unwrap();

        let projected = project(&state).unwrap();
        assert_eq!(projected.pieces_of(Colour::Red), vec![Hex::new(3, -1)]);
        assert_eq!(projected.occupant(Hex::new(-3, 0)), Some(Occupant::Block));
        assert_eq!(projected.piece_count(Colour::Green), 0);
        assert_eq!(projected.completed_counts(), [3, 0, 0]);

        let plan = AStar::new().plan(&game, &state).unwrap();
        assert_eq!(plan, vec![Action::Exit { from: Hex::new(3, -1) }]);
    }

    #[test]
    fn test_unreachable_exit() {
        // every red exit is blocked
        let mut occupants = vec![red(0, 0)];
        occupants.extend(
            [(3, -3), (3, -2), (3, -1), (3, 0)]
                .into_iter()
                .map(|(q, r)| (Hex::new(q, r), Occupant::Block)),
        );
        let state = State::new(occupants, Colour::Red).unwrap();
        let game = game_for(&state);
        assert!(matches!(
            AStar::new().plan(&game, &state),
            Err(ChexersError::NoPlanFound(Colour::Red))
        ));
    }
}
