//! Per-player mutable state: position, points, dice queue, stock, skill
//! choice and the domination lockout counter.

use crate::common::{PlayerId, Pos};
use crate::config::{DICE_QUEUE_LEN, DIE_MAX};
use crate::skills::Skill;
use rand::Rng;

/// Draw one die value in `1..=DIE_MAX`.
pub fn roll_die<R: Rng>(rng: &mut R) -> u8 {
    rng.random_range(1..=DIE_MAX)
}

/// One player's state. Owned and mutated exclusively by the game controller;
/// legality of mutations is the caller's responsibility.
#[derive(Clone, Debug)]
pub struct Player {
    id: PlayerId,
    pos: Pos,
    points: u32,
    dice_queue: [u8; DICE_QUEUE_LEN],
    stocked: Option<u8>,
    skill: Option<Skill>,
    skill_confirmed: bool,
    domination_turns: u32,
}

impl Player {
    /// New player at its starting cell with zero points and an unfilled
    /// dice queue.
    pub fn new(id: PlayerId, start: Pos) -> Self {
        Player {
            id,
            pos: start,
            points: 0,
            dice_queue: [0; DICE_QUEUE_LEN],
            stocked: None,
            skill: None,
            skill_confirmed: false,
            domination_turns: 0,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    /// Unconditional position overwrite.
    pub fn move_to(&mut self, pos: Pos) {
        self.pos = pos;
    }

    pub fn add_points(&mut self, amount: u32) {
        self.points += amount;
    }

    /// Deduct `amount` iff affordable. Returns `false` with no mutation
    /// otherwise; this is the single gate for every paid action.
    pub fn deduct_points(&mut self, amount: u32) -> bool {
        if self.points >= amount {
            self.points -= amount;
            true
        } else {
            false
        }
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.points >= cost
    }

    /// Fill all queue slots from the injected RNG.
    pub fn init_queue<R: Rng>(&mut self, rng: &mut R) {
        for slot in &mut self.dice_queue {
            *slot = roll_die(rng);
        }
    }

    /// Pop the front value, append a newly drawn one, return the popped
    /// value. The queue length is always [`DICE_QUEUE_LEN`].
    pub fn shift_queue<R: Rng>(&mut self, rng: &mut R) -> u8 {
        let front = self.dice_queue[0];
        self.dice_queue.rotate_left(1);
        self.dice_queue[DICE_QUEUE_LEN - 1] = roll_die(rng);
        front
    }

    /// Current + upcoming die values, front first.
    pub fn dice_queue(&self) -> &[u8; DICE_QUEUE_LEN] {
        &self.dice_queue
    }

    /// Bank a die value, overwriting any previous stock.
    pub fn stock_die(&mut self, value: u8) {
        self.stocked = Some(value);
    }

    /// Return and clear the stocked value.
    pub fn use_stock(&mut self) -> Option<u8> {
        self.stocked.take()
    }

    pub fn has_stock(&self) -> bool {
        self.stocked.is_some()
    }

    pub fn stocked(&self) -> Option<u8> {
        self.stocked
    }

    /// Confirm the chosen skill. Allowed exactly once; later calls are
    /// no-ops returning `false`.
    pub fn set_skill(&mut self, skill: Skill) -> bool {
        if self.skill_confirmed {
            return false;
        }
        self.skill = Some(skill);
        self.skill_confirmed = true;
        true
    }

    pub fn skill(&self) -> Option<Skill> {
        self.skill
    }

    pub fn skill_confirmed(&self) -> bool {
        self.skill_confirmed
    }

    pub fn is_dominated(&self) -> bool {
        self.domination_turns > 0
    }

    pub fn domination_turns(&self) -> u32 {
        self.domination_turns
    }

    /// Apply the Control lockout for `turns` of this player's own turns.
    pub fn dominate(&mut self, turns: u32) {
        self.domination_turns = turns;
    }

    /// Count down the lockout at the end of this player's turn.
    pub fn tick_domination(&mut self) {
        if self.domination_turns > 0 {
            self.domination_turns -= 1;
        }
    }

    /// Back to the starting state for a fresh match.
    pub fn reset(&mut self, start: Pos) {
        self.pos = start;
        self.points = 0;
        self.dice_queue = [0; DICE_QUEUE_LEN];
        self.stocked = None;
        self.skill = None;
        self.skill_confirmed = false;
        self.domination_turns = 0;
    }
}
