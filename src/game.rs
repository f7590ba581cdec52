//! The game controller: phase machine, action dispatch and win handling.
//!
//! Every player action enters through a method here, is validated against
//! the current phase and the acting player's points, resolved through the
//! rules module and applied. Rejected actions return an [`ActionError`]
//! and leave the state untouched.

use crate::board::{Board, Marker};
use crate::common::{ActionError, MoveMode, PlayerId, Pos};
use crate::config::{GameConfig, BOARD_SIZE, DOMINATION_TURNS, INITIAL_STONES};
use crate::player::Player;
use crate::rules::{self, MoveOptions, MoveTile, PlaceRule};
use crate::skills::Skill;
use core::fmt;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;

/// Player 1 starts mid-row on the left edge, player 2 opposite.
pub const P1_START: Pos = Pos::new(BOARD_SIZE / 2, 0);
pub const P2_START: Pos = Pos::new(BOARD_SIZE / 2, BOARD_SIZE - 1);

/// Where the state machine currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    StartScreen,
    Settings,
    SkillSelection,
    Roll,
    Move,
    Place,
    DrillTarget,
    SkillTarget,
    GameOver,
}

/// What the Place phase will put down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PlacementKind {
    Stone,
    Bomb,
    Ice,
    Drill,
}

/// How a match ended. Rendered through `Display` with the loser as the
/// subject of the sentence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WinReason {
    Blocked,
    SteppedOnBomb,
    FellOffCliff,
    NoPlacement,
    Slashed,
    Sniped,
}

impl fmt::Display for WinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinReason::Blocked => write!(f, "is blocked and cannot move!"),
            WinReason::SteppedOnBomb => write!(f, "stepped on a bomb!"),
            WinReason::FellOffCliff => write!(f, "fell off the cliff!"),
            WinReason::NoPlacement => write!(f, "has no place to put an object!"),
            WinReason::Slashed => write!(f, "was slashed!"),
            WinReason::Sniped => write!(f, "was sniped!"),
        }
    }
}

/// Recorded result of a finished match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub winner: PlayerId,
    pub reason: WinReason,
}

/// A sniper activation awaiting its deferred resolution.
#[derive(Clone, Copy, Debug)]
pub struct SniperShot {
    pub shooter: PlayerId,
    pub started: Instant,
}

/// The whole game: board, both players, config, RNG and phase state.
pub struct Game {
    board: Board,
    players: [Player; 2],
    current: PlayerId,
    phase: Phase,
    config: GameConfig,
    rng: SmallRng,
    dice_roll: Option<u8>,
    move_mode: MoveMode,
    last_move_mode: MoveMode,
    placement: PlacementKind,
    move_options: MoveOptions,
    placeable: Vec<Pos>,
    drill_targets: Vec<Pos>,
    skill_targets: Vec<Pos>,
    active_skill: Option<Skill>,
    drill_for_survival: bool,
    sniper_pending: Option<SniperShot>,
    outcome: Option<Outcome>,
}

impl Game {
    /// A fresh controller on the start screen. The injected RNG drives die
    /// rolls and board seeding, so a fixed seed gives a reproducible match.
    pub fn new(config: GameConfig, rng: SmallRng) -> Self {
        Game {
            board: Board::new(),
            players: [Player::new(PlayerId::P1, P1_START), Player::new(PlayerId::P2, P2_START)],
            current: PlayerId::P1,
            phase: Phase::StartScreen,
            config,
            rng,
            dice_roll: None,
            move_mode: MoveMode::Cross,
            last_move_mode: MoveMode::Cross,
            placement: PlacementKind::Stone,
            move_options: MoveOptions::default(),
            placeable: Vec::new(),
            drill_targets: Vec::new(),
            skill_targets: Vec::new(),
            active_skill: None,
            drill_for_survival: false,
            sniper_pending: None,
            outcome: None,
        }
    }

    fn init(&mut self) {
        self.board.reset();
        self.players[0].reset(P1_START);
        self.players[1].reset(P2_START);
        self.current = PlayerId::P1;
        self.dice_roll = None;
        self.move_mode = MoveMode::Cross;
        self.last_move_mode = MoveMode::Cross;
        self.placement = PlacementKind::Stone;
        self.drill_for_survival = false;
        self.sniper_pending = None;
        self.outcome = None;
        self.players[0].init_queue(&mut self.rng);
        self.players[1].init_queue(&mut self.rng);
        self.clear_highlights();
    }

    // --- Accessors ---

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for setup and tooling.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[(id.number() - 1) as usize]
    }

    /// Direct player access for setup and tooling.
    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[(id.number() - 1) as usize]
    }

    pub fn current_turn(&self) -> PlayerId {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn dice_roll(&self) -> Option<u8> {
        self.dice_roll
    }

    pub fn move_mode(&self) -> MoveMode {
        self.move_mode
    }

    /// Direction set of the most recently executed move.
    pub fn last_move_mode(&self) -> MoveMode {
        self.last_move_mode
    }

    pub fn placement_type(&self) -> PlacementKind {
        self.placement
    }

    pub fn movable_tiles(&self) -> &[MoveTile] {
        &self.move_options.movable
    }

    pub fn fall_tiles(&self) -> &[MoveTile] {
        &self.move_options.falls
    }

    pub fn placeable_tiles(&self) -> &[Pos] {
        &self.placeable
    }

    pub fn drill_targets(&self) -> &[Pos] {
        &self.drill_targets
    }

    pub fn skill_targets(&self) -> &[Pos] {
        &self.skill_targets
    }

    pub fn active_skill(&self) -> Option<Skill> {
        self.active_skill
    }

    pub fn drill_for_survival(&self) -> bool {
        self.drill_for_survival
    }

    pub fn sniper_pending(&self) -> Option<&SniperShot> {
        self.sniper_pending.as_ref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// "Player N <phrase>" with the loser as subject, or `None` while the
    /// match is still running.
    pub fn win_reason_text(&self) -> Option<String> {
        self.outcome
            .map(|o| format!("{} {}", o.winner.other(), o.reason))
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The settings collaborator mutates costs and bonuses here between
    /// actions; each costed action reads the table when it evaluates.
    pub fn config_mut(&mut self) -> &mut GameConfig {
        &mut self.config
    }

    fn current_player(&self) -> &Player {
        self.player(self.current)
    }

    fn current_player_mut(&mut self) -> &mut Player {
        let id = self.current;
        self.player_mut(id)
    }

    fn opponent_pos(&self) -> Pos {
        self.player(self.current.other()).pos()
    }

    // --- Menu / settings ---

    /// Leave the start screen and begin skill selection for a new match.
    pub fn start_game(&mut self) -> Result<(), ActionError> {
        if self.phase != Phase::StartScreen {
            return Err(ActionError::WrongPhase);
        }
        self.init();
        self.phase = Phase::SkillSelection;
        info!("new game started");
        Ok(())
    }

    pub fn open_settings(&mut self) -> Result<(), ActionError> {
        if self.phase != Phase::StartScreen {
            return Err(ActionError::WrongPhase);
        }
        self.phase = Phase::Settings;
        Ok(())
    }

    pub fn close_settings(&mut self) -> Result<(), ActionError> {
        if self.phase != Phase::Settings {
            return Err(ActionError::WrongPhase);
        }
        self.phase = Phase::StartScreen;
        Ok(())
    }

    /// Full reset back to the start screen after a finished match.
    pub fn return_to_menu(&mut self) -> Result<(), ActionError> {
        if self.phase != Phase::GameOver {
            return Err(ActionError::WrongPhase);
        }
        self.init();
        self.phase = Phase::StartScreen;
        Ok(())
    }

    // --- Skill selection ---

    /// Confirm `skill` for `id`. A player's first confirmation sticks;
    /// repeats are ignored. Once both players confirmed, the board is
    /// seeded and play begins.
    pub fn select_skill(&mut self, id: PlayerId, skill: Skill) -> Result<(), ActionError> {
        if self.phase != Phase::SkillSelection {
            return Err(ActionError::WrongPhase);
        }
        if self.player_mut(id).set_skill(skill) {
            info!("{} picked {}", id, skill);
        }
        if self.players[0].skill_confirmed() && self.players[1].skill_confirmed() {
            self.seed_board();
            self.phase = Phase::Roll;
        }
        Ok(())
    }

    /// Two fountains (one deep in each player's half, away from its owner)
    /// plus three stones clear of both fountains and both start areas;
    /// then a coin flip for the first turn.
    fn seed_board(&mut self) {
        let f1 = self.pick_fountain(PlayerId::P1);
        let f2 = self.pick_fountain(PlayerId::P2);
        self.board.set(f1, Marker::Fountain);
        self.board.set(f2, Marker::Fountain);

        let mut banned: HashSet<Pos> = HashSet::new();
        banned.insert(f1);
        banned.insert(f2);
        for player in &self.players {
            let pos = player.pos();
            for dr in -1..=1 {
                for dc in -1..=1 {
                    banned.insert(Pos::new(pos.row + dr, pos.col + dc));
                }
            }
        }

        let mut available: Vec<Pos> =
            Board::positions().filter(|p| !banned.contains(p)).collect();
        for _ in 0..INITIAL_STONES {
            if available.is_empty() {
                break;
            }
            let idx = self.rng.random_range(0..available.len());
            let pos = available.remove(idx);
            self.board.set(pos, Marker::Stone);
        }

        self.current = if self.rng.random() {
            PlayerId::P1
        } else {
            PlayerId::P2
        };
        info!("board seeded, {} moves first", self.current);
        debug!("board:\n{}", self.board);
    }

    fn pick_fountain(&mut self, id: PlayerId) -> Pos {
        let start = self.player(id).pos();
        let cols = match id {
            PlayerId::P1 => 0..BOARD_SIZE / 2 - 1,
            PlayerId::P2 => BOARD_SIZE / 2 + 2..BOARD_SIZE,
        };
        let zone: Vec<Pos> = (0..BOARD_SIZE)
            .flat_map(|r| cols.clone().map(move |c| Pos::new(r, c)))
            .filter(|&p| start.chebyshev(p) > 3)
            .collect();
        zone[self.rng.random_range(0..zone.len())]
    }

    // --- Roll phase ---

    /// Pop the dice queue front as the active roll and resolve movement.
    pub fn roll_dice(&mut self) -> Result<(), ActionError> {
        if self.phase != Phase::Roll {
            return Err(ActionError::WrongPhase);
        }
        let roll = {
            let rng = &mut self.rng;
            self.players[(self.current.number() - 1) as usize].shift_queue(rng)
        };
        self.begin_move_phase(roll);
        Ok(())
    }

    /// Pay the stock cost to bank the current die value, then roll again.
    /// The cost is paid once; any previously banked value is replaced.
    pub fn stock_current_die(&mut self) -> Result<(), ActionError> {
        if self.phase != Phase::Roll {
            return Err(ActionError::WrongPhase);
        }
        if self.current_player().is_dominated() {
            return Err(ActionError::Dominated);
        }
        let cost = self.config.costs.stock;
        if !self.current_player_mut().deduct_points(cost) {
            return Err(ActionError::InsufficientPoints);
        }
        let value = {
            let rng = &mut self.rng;
            self.players[(self.current.number() - 1) as usize].shift_queue(rng)
        };
        self.current_player_mut().stock_die(value);
        debug!("{} stocked a {}", self.current, value);
        self.roll_dice()
    }

    /// Spend the banked die as the active roll instead of drawing. The
    /// queue still advances underneath.
    pub fn use_stocked_die(&mut self) -> Result<(), ActionError> {
        if self.phase != Phase::Roll {
            return Err(ActionError::WrongPhase);
        }
        if self.current_player().is_dominated() {
            return Err(ActionError::Dominated);
        }
        let Some(value) = self.current_player_mut().use_stock() else {
            return Err(ActionError::NoStock);
        };
        let _ = {
            let rng = &mut self.rng;
            self.players[(self.current.number() - 1) as usize].shift_queue(rng)
        };
        self.begin_move_phase(value);
        Ok(())
    }

    /// Shared tail of every roll variant: reset to cardinal mode, detect
    /// stalemate across both modes, otherwise enter Move.
    fn begin_move_phase(&mut self, roll: u8) {
        self.move_mode = MoveMode::Cross;
        self.dice_roll = Some(roll);
        info!("{} rolled {}", self.current, roll);
        let from = self.current_player().pos();
        let opponent = self.opponent_pos();
        if !rules::has_any_move(&self.board, from, opponent, roll) {
            self.game_over(self.current.other(), WinReason::Blocked);
            return;
        }
        self.move_options =
            rules::movement_options(&self.board, from, opponent, self.move_mode, roll);
        self.phase = Phase::Move;
    }

    // --- Move phase ---

    /// Flip cardinal/diagonal. Entering diagonal requires affordability of
    /// the diagonal cost, but the charge lands on the eventual move.
    pub fn toggle_move_mode(&mut self) -> Result<(), ActionError> {
        if self.phase != Phase::Move {
            return Err(ActionError::WrongPhase);
        }
        match self.move_mode {
            MoveMode::Cross => {
                if !self.current_player().can_afford(self.config.costs.diagonal_move) {
                    return Err(ActionError::InsufficientPoints);
                }
                self.move_mode = MoveMode::Diagonal;
            }
            MoveMode::Diagonal => self.move_mode = MoveMode::Cross,
        }
        let roll = self.dice_roll.unwrap_or(0);
        let from = self.current_player().pos();
        let opponent = self.opponent_pos();
        self.move_options =
            rules::movement_options(&self.board, from, opponent, self.move_mode, roll);
        Ok(())
    }

    /// Step onto a resolved destination. A fall-trigger tile loses the
    /// game on the spot; a reachable tile executes the move and advances
    /// to Place.
    pub fn move_to(&mut self, pos: Pos) -> Result<(), ActionError> {
        if self.phase != Phase::Move {
            return Err(ActionError::WrongPhase);
        }
        if self.move_options.fall_at(pos).is_some() {
            self.game_over(self.current.other(), WinReason::FellOffCliff);
            return Ok(());
        }
        let Some(tile) = self.move_options.movable_at(pos) else {
            return Err(ActionError::InvalidTarget);
        };

        if self.board.get(pos) == Some(Marker::Bomb) {
            if self.board.owner_of(pos) != Some(self.current) {
                self.game_over(self.current.other(), WinReason::SteppedOnBomb);
                return Ok(());
            }
            // own bomb: defused underfoot
            self.board.set(pos, Marker::Empty);
        }

        self.last_move_mode = tile.mode;
        self.current_player_mut().move_to(pos);
        info!("{} moved to {}", self.current, pos);

        if self.move_mode == MoveMode::Diagonal {
            let cost = self.config.costs.diagonal_move;
            let _ = self.current_player_mut().deduct_points(cost);
        }

        if self.board.get(pos) == Some(Marker::Fountain) {
            let pickup = self.config.fountain_pickup;
            self.current_player_mut().add_points(pickup);
            self.board.set(pos, Marker::Empty);
            info!("{} drank from the fountain (+{})", self.current, pickup);
        }

        self.phase = Phase::Place;
        self.placement = PlacementKind::Stone;
        self.clear_highlights();
        self.refresh_placeable();
        Ok(())
    }

    // --- Place phase ---

    fn place_rule(&self) -> PlaceRule {
        match self.placement {
            PlacementKind::Stone => PlaceRule::NotStone,
            _ => PlaceRule::EmptyOnly,
        }
    }

    /// Recompute placement targets for the active placement type. An empty
    /// set means the player is cornered: a drill may save them, otherwise
    /// they lose.
    fn refresh_placeable(&mut self) {
        let from = self.current_player().pos();
        let opponent = self.opponent_pos();
        self.placeable = rules::placeable_tiles(&self.board, from, opponent, self.place_rule());

        if self.placeable.is_empty() && self.outcome.is_none() {
            if self.can_drill_to_survive() {
                self.drill_for_survival = true;
                self.drill_targets = rules::drill_targets(&self.board, from);
                self.phase = Phase::DrillTarget;
            } else {
                self.game_over(self.current.other(), WinReason::NoPlacement);
            }
        }
    }

    fn can_drill_to_survive(&self) -> bool {
        let player = self.current_player();
        !player.is_dominated()
            && player.can_afford(self.config.costs.drill)
            && !rules::drill_targets(&self.board, player.pos()).is_empty()
    }

    /// Switch what the Place phase will put down. `Stone` also serves as
    /// the cancel action for drill and skill targeting.
    pub fn set_placement_type(&mut self, kind: PlacementKind) -> Result<(), ActionError> {
        match self.phase {
            Phase::Place | Phase::DrillTarget => {}
            Phase::SkillTarget => {
                // Only the stone action cancels skill targeting.
                if kind != PlacementKind::Stone {
                    return Err(ActionError::WrongPhase);
                }
            }
            _ => return Err(ActionError::WrongPhase),
        }

        match kind {
            PlacementKind::Stone => {
                self.active_skill = None;
                self.skill_targets.clear();
                self.drill_targets.clear();
                self.drill_for_survival = false;
                self.placement = PlacementKind::Stone;
                self.phase = Phase::Place;
                self.refresh_placeable();
                Ok(())
            }
            PlacementKind::Bomb | PlacementKind::Ice => {
                // Reachable only through the matching skill.
                let player = self.current_player();
                if player.is_dominated() {
                    return Err(ActionError::Dominated);
                }
                let required = if kind == PlacementKind::Bomb {
                    Skill::Bomb
                } else {
                    Skill::Ice
                };
                if player.skill() != Some(required) {
                    return Err(ActionError::SkillUnavailable);
                }
                let cost = required.cost(&self.config.costs);
                if !player.can_afford(cost) {
                    return Err(ActionError::InsufficientPoints);
                }
                self.drill_for_survival = false;
                self.placement = kind;
                self.phase = Phase::Place;
                self.refresh_placeable();
                Ok(())
            }
            PlacementKind::Drill => {
                if self.current_player().is_dominated() {
                    return Err(ActionError::Dominated);
                }
                if !self.current_player().can_afford(self.config.costs.drill) {
                    return Err(ActionError::InsufficientPoints);
                }
                let targets = rules::drill_targets(&self.board, self.current_player().pos());
                if targets.is_empty() {
                    // Nothing to drill: fall back to stone placement.
                    self.placement = PlacementKind::Stone;
                    self.phase = Phase::Place;
                    self.refresh_placeable();
                    return Err(ActionError::InvalidTarget);
                }
                self.placement = PlacementKind::Drill;
                self.drill_targets = targets;
                self.phase = Phase::DrillTarget;
                Ok(())
            }
        }
    }

    /// Put the active object down on a legal neighbor and end the turn.
    /// Stones are free; bombs and ice are paid at placement time.
    pub fn place_at(&mut self, pos: Pos) -> Result<(), ActionError> {
        if self.phase != Phase::Place {
            return Err(ActionError::WrongPhase);
        }
        if !self.placeable.contains(&pos) {
            return Err(ActionError::InvalidTarget);
        }
        match self.placement {
            PlacementKind::Stone => {
                self.board.set(pos, Marker::Stone);
            }
            PlacementKind::Bomb => {
                let cost = self.config.costs.bomb;
                if !self.current_player_mut().deduct_points(cost) {
                    return Err(ActionError::InsufficientPoints);
                }
                let owner = self.current;
                self.board.place_bomb(pos, owner);
            }
            PlacementKind::Ice => {
                let cost = self.config.costs.ice;
                if !self.current_player_mut().deduct_points(cost) {
                    return Err(ActionError::InsufficientPoints);
                }
                self.board.set(pos, Marker::Ice);
            }
            PlacementKind::Drill => return Err(ActionError::WrongPhase),
        }
        info!("{} placed {:?} at {}", self.current, self.placement, pos);
        self.end_turn();
        Ok(())
    }

    /// Grind away an adjacent stone and end the turn.
    pub fn drill_at(&mut self, pos: Pos) -> Result<(), ActionError> {
        if self.phase != Phase::DrillTarget {
            return Err(ActionError::WrongPhase);
        }
        if !self.drill_targets.contains(&pos) {
            return Err(ActionError::InvalidTarget);
        }
        let cost = self.config.costs.drill;
        if !self.current_player_mut().deduct_points(cost) {
            return Err(ActionError::InsufficientPoints);
        }
        self.board.set(pos, Marker::Empty);
        self.drill_for_survival = false;
        info!("{} drilled the stone at {}", self.current, pos);
        self.end_turn();
        Ok(())
    }

    // --- Skills ---

    /// Activate the current player's confirmed skill. `now` timestamps the
    /// sniper's deferred resolution; the other skills ignore it.
    pub fn activate_skill(&mut self, now: Instant) -> Result<(), ActionError> {
        if self.phase != Phase::Place && self.phase != Phase::DrillTarget {
            return Err(ActionError::WrongPhase);
        }
        if self.current_player().is_dominated() {
            return Err(ActionError::Dominated);
        }
        let Some(skill) = self.current_player().skill() else {
            return Err(ActionError::SkillUnavailable);
        };

        match skill {
            Skill::Ice => self.set_placement_type(PlacementKind::Ice),
            Skill::Bomb => self.set_placement_type(PlacementKind::Bomb),
            Skill::Domination => self.use_domination(),
            Skill::Sniper => self.activate_sniper(now),
            Skill::Hitokiri => self.activate_hitokiri(),
            Skill::Suriashi => self.enter_skill_targeting(skill),
            Skill::Meteor => self.enter_skill_targeting(skill),
            Skill::Momonga => self.enter_skill_targeting(skill),
        }
    }

    fn use_domination(&mut self) -> Result<(), ActionError> {
        let cost = self.config.costs.domination;
        if !self.current_player_mut().deduct_points(cost) {
            return Err(ActionError::InsufficientPoints);
        }
        let victim = self.current.other();
        self.player_mut(victim).dominate(DOMINATION_TURNS);
        info!("{} is dominated for {} turns", victim, DOMINATION_TURNS);
        self.end_turn();
        Ok(())
    }

    fn activate_sniper(&mut self, now: Instant) -> Result<(), ActionError> {
        if self.sniper_pending.is_some() {
            return Err(ActionError::SkillUnavailable);
        }
        let player = self.current_player();
        if !player.can_afford(self.config.costs.sniper) {
            return Err(ActionError::InsufficientPoints);
        }
        if !rules::sniper_line_clear(&self.board, player.pos(), self.opponent_pos()) {
            return Err(ActionError::SkillUnavailable);
        }
        let cost = self.config.costs.sniper;
        self.current_player_mut().deduct_points(cost);
        self.sniper_pending = Some(SniperShot {
            shooter: self.current,
            started: now,
        });
        info!("{} took aim", self.current);
        Ok(())
    }

    fn activate_hitokiri(&mut self) -> Result<(), ActionError> {
        let player = self.current_player();
        if !player.can_afford(self.config.costs.hitokiri) {
            return Err(ActionError::InsufficientPoints);
        }
        if !rules::hitokiri_in_reach(player.pos(), self.opponent_pos()) {
            return Err(ActionError::SkillUnavailable);
        }
        let cost = self.config.costs.hitokiri;
        self.current_player_mut().deduct_points(cost);
        self.game_over(self.current, WinReason::Slashed);
        Ok(())
    }

    /// Suriashi, Meteor and Momonga pick a destination first; the cost is
    /// charged when the target is chosen.
    fn enter_skill_targeting(&mut self, skill: Skill) -> Result<(), ActionError> {
        let player = self.current_player();
        if !player.can_afford(skill.cost(&self.config.costs)) {
            return Err(ActionError::InsufficientPoints);
        }
        let from = player.pos();
        let opponent = self.opponent_pos();
        let targets = match skill {
            Skill::Suriashi => rules::suriashi_targets(&self.board, from, opponent),
            Skill::Meteor => rules::meteor_targets(&self.board, from, opponent),
            Skill::Momonga => rules::momonga_targets(&self.board, from, opponent),
            _ => return Err(ActionError::SkillUnavailable),
        };
        if targets.is_empty() {
            return Err(ActionError::SkillUnavailable);
        }
        self.skill_targets = targets;
        self.active_skill = Some(skill);
        self.drill_for_survival = false;
        self.phase = Phase::SkillTarget;
        Ok(())
    }

    /// Resolve the pending targeting skill on a chosen cell and end the
    /// turn.
    pub fn skill_target_at(&mut self, pos: Pos) -> Result<(), ActionError> {
        if self.phase != Phase::SkillTarget {
            return Err(ActionError::WrongPhase);
        }
        if !self.skill_targets.contains(&pos) {
            return Err(ActionError::InvalidTarget);
        }
        let Some(skill) = self.active_skill else {
            return Err(ActionError::SkillUnavailable);
        };
        let cost = skill.cost(&self.config.costs);
        if !self.current_player_mut().deduct_points(cost) {
            return Err(ActionError::InsufficientPoints);
        }
        match skill {
            Skill::Suriashi | Skill::Momonga => {
                self.current_player_mut().move_to(pos);
                info!("{} used {} to reach {}", self.current, skill, pos);
            }
            Skill::Meteor => {
                self.board.set(pos, Marker::Stone);
                info!("{} dropped a meteor stone at {}", self.current, pos);
            }
            _ => return Err(ActionError::SkillUnavailable),
        }
        self.end_turn();
        Ok(())
    }

    /// Advance deferred resolutions. Call once per render/update tick; a
    /// pending sniper shot resolves after the configured delay.
    pub fn tick(&mut self, now: Instant) {
        if let Some(shot) = self.sniper_pending {
            if now.duration_since(shot.started) >= self.config.sniper_delay {
                self.sniper_pending = None;
                self.game_over(shot.shooter, WinReason::Sniped);
            }
        }
    }

    // --- Turn / match bookkeeping ---

    fn end_turn(&mut self) {
        self.current_player_mut().tick_domination();
        self.current = self.current.other();
        let bonus = self.config.turn_bonus;
        self.current_player_mut().add_points(bonus);
        self.phase = Phase::Roll;
        self.dice_roll = None;
        self.drill_for_survival = false;
        self.clear_highlights();
        debug!("turn passes to {}", self.current);
    }

    fn clear_highlights(&mut self) {
        self.move_options = MoveOptions::default();
        self.placeable.clear();
        self.drill_targets.clear();
        self.skill_targets.clear();
        self.active_skill = None;
    }

    /// Declare `winner`. Idempotent: the first declaration fixes the
    /// outcome; later calls in the same match are no-ops.
    fn game_over(&mut self, winner: PlayerId, reason: WinReason) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(Outcome { winner, reason });
        self.phase = Phase::GameOver;
        info!("{} wins: {} {}", winner, winner.other(), reason);
    }

    /// Serializable view of everything a rendering layer needs.
    pub fn snapshot(&self) -> GameSnapshot {
        let mut grid = [[Marker::Empty; BOARD_SIZE as usize]; BOARD_SIZE as usize];
        for pos in Board::positions() {
            if let Some(marker) = self.board.get(pos) {
                grid[pos.row as usize][pos.col as usize] = marker;
            }
        }
        let mut bomb_owners: Vec<(Pos, PlayerId)> = self.board.bomb_owners().collect();
        bomb_owners.sort_by_key(|(p, _)| (p.row, p.col));

        GameSnapshot {
            phase: self.phase,
            current_turn: self.current,
            dice_roll: self.dice_roll,
            move_mode: self.move_mode,
            placement_type: self.placement,
            grid,
            bomb_owners,
            players: [
                PlayerSnapshot::of(&self.players[0]),
                PlayerSnapshot::of(&self.players[1]),
            ],
            movable: self.move_options.movable.clone(),
            falls: self.move_options.falls.clone(),
            placeable: self.placeable.clone(),
            drill_targets: self.drill_targets.clone(),
            skill_targets: self.skill_targets.clone(),
            active_skill: self.active_skill,
            drill_for_survival: self.drill_for_survival,
            sniper_pending: self.sniper_pending.is_some(),
            winner: self.outcome.map(|o| o.winner),
            win_reason: self.win_reason_text(),
        }
    }
}

/// One player's public state in a [`GameSnapshot`].
#[derive(Clone, Debug, Serialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub pos: Pos,
    pub points: u32,
    pub dice_queue: [u8; crate::config::DICE_QUEUE_LEN],
    pub stocked: Option<u8>,
    pub skill: Option<Skill>,
    pub domination_turns: u32,
}

impl PlayerSnapshot {
    fn of(player: &Player) -> Self {
        PlayerSnapshot {
            id: player.id(),
            pos: player.pos(),
            points: player.points(),
            dice_queue: *player.dice_queue(),
            stocked: player.stocked(),
            skill: player.skill(),
            domination_turns: player.domination_turns(),
        }
    }
}

/// Read-only view of the full game state for rendering layers and the
/// simulation driver's JSON output.
#[derive(Clone, Debug, Serialize)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub current_turn: PlayerId,
    pub dice_roll: Option<u8>,
    pub move_mode: MoveMode,
    pub placement_type: PlacementKind,
    pub grid: [[Marker; BOARD_SIZE as usize]; BOARD_SIZE as usize],
    pub bomb_owners: Vec<(Pos, PlayerId)>,
    pub players: [PlayerSnapshot; 2],
    pub movable: Vec<MoveTile>,
    pub falls: Vec<MoveTile>,
    pub placeable: Vec<Pos>,
    pub drill_targets: Vec<Pos>,
    pub skill_targets: Vec<Pos>,
    pub active_skill: Option<Skill>,
    pub drill_for_survival: bool,
    pub sniper_pending: bool,
    pub winner: Option<PlayerId>,
    pub win_reason: Option<String>,
}
