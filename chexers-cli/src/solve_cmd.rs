//! Solve command - plan a single colour's exit from a JSON board
//!
//! Input:
//!
//! ```json
//! { "colour": "green", "pieces": [[0, 0], [1, -1]], "blocks": [[-1, 0]] }
//! ```
//!
//! Output is one line per action, e.g. `MOVE from (0, 0) to (-1, 1).`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use chexers_core::{Action, Colour, Game, Hex, Occupant, State};
use chexers_search::AStar;

use crate::player::Coord;

#[derive(Args, Clone, Debug)]
pub struct SolveArgs {
    /// Board JSON file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Print the board before the plan
    #[arg(long)]
    pub show_board: bool,
}

/// A single colour's pieces among blocks
#[derive(Clone, Debug, Deserialize)]
pub struct Puzzle {
    pub colour: Colour,
    pub pieces: Vec<Coord>,
    #[serde(default)]
    pub blocks: Vec<Coord>,
}

impl Puzzle {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read board: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse board: {}", path.display()))
    }

    /// Absolute state with the puzzle's colour to move
    pub fn state(&self) -> Result<State> {
        let pieces = self
            .pieces
            .iter()
            .map(|&(q, r)| (Hex::new(q, r), Occupant::Piece(self.colour)));
        let blocks = self.blocks.iter().map(|&(q, r)| (Hex::new(q, r), Occupant::Block));
        Ok(State::new(pieces.chain(blocks), self.colour)?)
    }
}

/// Run solve command
pub fn run(args: SolveArgs) -> Result<()> {
    let puzzle = Puzzle::load(&args.input)?;
    let state = puzzle.state()?;
    if args.show_board {
        println!("{}", state);
    }

    for action in solve(&puzzle)? {
        println!("{}", action);
    }
    Ok(())
}

/// Shortest exit plan in absolute coordinates
pub fn solve(puzzle: &Puzzle) -> Result<Vec<Action>> {
    let colour = puzzle.colour;
    let view = puzzle.state()?.to_perspective(colour);

    let mut game = Game::default();
    game.build_heuristic_field(Colour::Red, &view.blocks());
    let plan = AStar::new()
        .plan(&game, &view)
        .with_context(|| format!("No way out for {}", colour))?;

    tracing::info!("Planned {} actions for {}", plan.len(), colour);
    Ok(plan.into_iter().map(|action| action.from_perspective(colour)).collect())
}
