//! Tunable game constants. The settings panel mutates a [`GameConfig`]
//! between actions; every costed action reads it at evaluation time.

use std::time::Duration;

/// Board side length.
pub const BOARD_SIZE: i32 = 9;

/// Die values are drawn uniformly from `1..=DIE_MAX`.
pub const DIE_MAX: u8 = 3;

/// Number of slots in a player's dice queue (current + two upcoming).
pub const DICE_QUEUE_LEN: usize = 3;

/// Turns of skill/drill/stock lockout applied by the Control skill.
pub const DOMINATION_TURNS: u32 = 3;

/// Stones seeded onto the board at game start.
pub const INITIAL_STONES: usize = 3;

/// Point costs for every paid action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillCosts {
    pub bomb: u32,
    pub drill: u32,
    pub ice: u32,
    pub diagonal_move: u32,
    pub stock: u32,
    pub domination: u32,
    pub sniper: u32,
    pub suriashi: u32,
    pub hitokiri: u32,
    pub meteor: u32,
    pub momonga: u32,
}

impl Default for SkillCosts {
    fn default() -> Self {
        SkillCosts {
            bomb: 50,
            drill: 100,
            ice: 20,
            diagonal_move: 10,
            stock: 20,
            domination: 100,
            sniper: 100,
            suriashi: 50,
            hitokiri: 100,
            meteor: 200,
            momonga: 50,
        }
    }
}

/// Full rules configuration held by the game controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub costs: SkillCosts,
    /// Points awarded to the incoming player at each turn swap.
    pub turn_bonus: u32,
    /// Points granted by stepping on a fountain tile.
    pub fountain_pickup: u32,
    /// Scale of the points bar in the rendering layer.
    pub max_points_display: u32,
    /// Delay between sniper activation and the deferred win declaration.
    pub sniper_delay: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            costs: SkillCosts::default(),
            turn_bonus: 10,
            fountain_pickup: 100,
            max_points_display: 500,
            sniper_delay: Duration::from_secs(2),
        }
    }
}
