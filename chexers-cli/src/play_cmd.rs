//! Play command - self-play games between three agents
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_configs(), play_game(), report_results()
//! - Level 3: referee loop
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use chexers_core::{Colour, Game, State};
use chexers_search::StrategyConfig;

use crate::config::AgentConfig;
use crate::player::{Player, RefereeAction};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args, Clone, Debug)]
pub struct PlayArgs {
    /// Agent config for every colour without its own
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Agent config for red
    #[arg(long, value_name = "FILE")]
    pub red: Option<PathBuf>,

    /// Agent config for green
    #[arg(long, value_name = "FILE")]
    pub green: Option<PathBuf>,

    /// Agent config for blue
    #[arg(long, value_name = "FILE")]
    pub blue: Option<PathBuf>,

    /// Number of games to play
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// Turns before a game is declared a draw
    #[arg(long, default_value = "256")]
    pub max_turns: u32,

    /// Print every action as the referee sees it
    #[arg(long)]
    pub verbose: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug, Serialize)]
pub struct GameRecord {
    pub game_number: usize,
    pub winner: Option<Colour>,
    pub turns: u32,
    pub completed: [u8; 3],
    pub actions: Vec<RefereeAction>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs) -> Result<()> {
    let configs = load_configs(&args)?;

    tracing::info!(
        "Starting {} game(s): red={}, green={}, blue={}",
        args.games,
        configs[0].three_player,
        configs[1].three_player,
        configs[2].three_player
    );

    let mut records = Vec::with_capacity(args.games);
    for game_number in 1..=args.games {
        let record = play_game(&configs, game_number, args.max_turns, args.verbose)?;
        tracing::info!(
            "Game {}: {} after {} turns",
            record.game_number,
            winner_label(record.winner),
            record.turns
        );
        records.push(record);
    }

    report_results(&records, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Strategy per colour, falling back to the shared config
fn load_configs(args: &PlayArgs) -> Result<[StrategyConfig; 3]> {
    let shared = AgentConfig::load_or_default(args.config.as_deref())?;
    let load = |path: &Option<PathBuf>, colour: Colour| -> Result<StrategyConfig> {
        let config = match path {
            Some(path) => AgentConfig::load(path)?,
            None => shared.clone(),
        };
        config
            .strategy()
            .with_context(|| format!("Invalid config for {}", colour))
    };
    Ok([
        load(&args.red, Colour::Red)?,
        load(&args.green, Colour::Green)?,
        load(&args.blue, Colour::Blue)?,
    ])
}

/// Play one game from the standard opening
pub fn play_game(
    configs: &[StrategyConfig; 3],
    game_number: usize,
    max_turns: u32,
    verbose: bool,
) -> Result<GameRecord> {
    let game = Game::default();
    let mut state = game.initial_state();
    let mut players: Vec<Player> = Colour::ALL
        .into_iter()
        .map(|colour| Player::new(colour, &configs[colour.index()]))
        .collect();

    let mut actions = Vec::new();
    let mut turns = 0;
    while !game.terminal_test(&state) && turns < max_turns {
        let mover = state.active();
        let action = players[mover.index()]
            .action()
            .with_context(|| format!("{} failed to choose an action", mover))?;
        state = referee_step(&game, &state, mover, action)?;
        for player in &mut players {
            player
                .update(mover, action)
                .with_context(|| format!("{} rejected {}'s action", player.colour(), mover))?;
        }
        if verbose {
            println!("{:>5} {}", mover, action.absolute());
        }
        tracing::debug!("Turn {}: {} played {}", turns, mover, action.absolute());
        actions.push(action);
        turns += 1;
    }

    Ok(GameRecord {
        game_number,
        winner: game.winner(&state),
        turns,
        completed: state.completed_counts(),
        actions,
    })
}

fn report_results(records: &[GameRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else {
        print_text_results(records);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - REFEREE
// ============================================================================

/// Check and apply an agent's action on the absolute board
fn referee_step(game: &Game, state: &State, mover: Colour, action: RefereeAction) -> Result<State> {
    game.apply_checked(state, action.absolute())
        .with_context(|| format!("{} played an illegal action", mover))
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn winner_label(winner: Option<Colour>) -> String {
    match winner {
        Some(colour) => format!("{} wins", colour),
        None => "draw".to_string(),
    }
}

fn print_text_results(records: &[GameRecord]) {
    println!("\n=== Results ===");
    println!("Games played: {}", records.len());
    for colour in Colour::ALL {
        let wins = records.iter().filter(|r| r.winner == Some(colour)).count();
        println!("{:<6} wins: {}", colour.name(), wins);
    }
    let draws = records.iter().filter(|r| r.winner.is_none()).count();
    println!("Draws:       {}", draws);
    for record in records {
        println!(
            "  game {:>3}: {:<10} turns={:<4} exited={:?}",
            record.game_number,
            winner_label(record.winner),
            record.turns,
            record.completed
        );
    }
}
