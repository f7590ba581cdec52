mod board;
mod common;
mod config;
mod game;
mod logging;
mod player;
pub mod rules;
mod skills;

pub use board::*;
pub use common::*;
pub use config::*;
pub use game::*;
pub use logging::init_logging;
pub use player::*;
pub use rules::{MoveOptions, MoveTile};
pub use skills::*;
