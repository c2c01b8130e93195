//! Chexers CLI - Agents, self-play and exit planning from the command line
//!
//! Modules:
//! - player: referee boundary and the per-colour agent
//! - config: JSON agent configuration
//! - play_cmd: self-play between three agents
//! - solve_cmd: single-colour exit planning

pub mod config;
pub mod play_cmd;
pub mod player;
pub mod solve_cmd;

pub use config::AgentConfig;
pub use player::{Player, RefereeAction};
