//! The eight-skill catalog. Each player confirms one skill before play and
//! keeps it for the whole match.

use crate::config::SkillCosts;
use core::fmt;
use serde::Serialize;

/// A special skill. Costs live in [`SkillCosts`] so the settings panel can
/// tune them mid-session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Skill {
    /// Place an ice tile (extends traversal by one step, once per pass).
    Ice,
    /// Place a bomb, safe for its owner and lethal for the opponent.
    Bomb,
    /// Lock the opponent out of skill/drill/stock for three of their turns.
    Domination,
    /// Eliminate the opponent along an unobstructed line, 4+ tiles away.
    Sniper,
    /// Slide one diagonal step without placing anything.
    Suriashi,
    /// Eliminate a cardinally adjacent opponent.
    Hitokiri,
    /// Drop a stone anywhere on the board.
    Meteor,
    /// Fly to a cardinal neighbor of the nearest stone.
    Momonga,
}

impl Skill {
    /// Catalog in selection-screen order.
    pub const ALL: [Skill; 8] = [
        Skill::Ice,
        Skill::Bomb,
        Skill::Domination,
        Skill::Sniper,
        Skill::Suriashi,
        Skill::Hitokiri,
        Skill::Meteor,
        Skill::Momonga,
    ];

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Skill::Ice => "Ice Tile",
            Skill::Bomb => "Bomb",
            Skill::Domination => "Control",
            Skill::Sniper => "Sniper",
            Skill::Suriashi => "Sneak",
            Skill::Hitokiri => "Landshark",
            Skill::Meteor => "Meteor Shower",
            Skill::Momonga => "Momonga",
        }
    }

    /// Activation cost under the current config.
    pub const fn cost(self, costs: &SkillCosts) -> u32 {
        match self {
            Skill::Ice => costs.ice,
            Skill::Bomb => costs.bomb,
            Skill::Domination => costs.domination,
            Skill::Sniper => costs.sniper,
            Skill::Suriashi => costs.suriashi,
            Skill::Hitokiri => costs.hitokiri,
            Skill::Meteor => costs.meteor,
            Skill::Momonga => costs.momonga,
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
