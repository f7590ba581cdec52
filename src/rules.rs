//! Movement and target resolution. Pure functions over board and player
//! snapshots; the game controller applies the results.

use crate::board::{Board, Marker};
use crate::common::{MoveMode, Pos, CROSS_DIRS, DIAGONAL_DIRS};
use serde::Serialize;
use std::collections::HashSet;

/// A destination produced by traversal, tagged with the direction set that
/// reached it so the renderer can color cross and diagonal moves apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MoveTile {
    pub pos: Pos,
    pub mode: MoveMode,
}

/// Result of resolving one roll: reachable destinations and fall-trigger
/// cells (stepping there walks the mover off the board).
#[derive(Clone, Debug, Default)]
pub struct MoveOptions {
    pub movable: Vec<MoveTile>,
    pub falls: Vec<MoveTile>,
}

impl MoveOptions {
    pub fn is_empty(&self) -> bool {
        self.movable.is_empty() && self.falls.is_empty()
    }

    pub fn movable_at(&self, pos: Pos) -> Option<MoveTile> {
        self.movable.iter().copied().find(|t| t.pos == pos)
    }

    pub fn fall_at(&self, pos: Pos) -> Option<MoveTile> {
        self.falls.iter().copied().find(|t| t.pos == pos)
    }
}

/// Walk outward from `from` in every direction of `mode`, up to `roll`
/// steps per direction. Stones and the opponent block (the last free cell
/// becomes reachable); the board edge turns the last free cell into a
/// fall trigger; each ice tile crossed grants one extra step, counted once
/// per direction. A cell keeps its first classification: nothing is ever
/// both reachable and a fall trigger.
pub fn movement_options(
    board: &Board,
    from: Pos,
    opponent: Pos,
    mode: MoveMode,
    roll: u8,
) -> MoveOptions {
    let mut out = MoveOptions::default();
    let mut seen: HashSet<Pos> = HashSet::new();

    for &dir in mode.dirs() {
        let mut budget = roll as i32;
        let mut current = from;
        let mut final_dest: Option<Pos> = None;
        let mut counted_ice: HashSet<Pos> = HashSet::new();
        let mut step = 1;

        while step <= budget {
            let next = current.step(dir);

            if !board.is_valid(next) {
                if let Some(dest) = final_dest {
                    if seen.insert(dest) {
                        out.falls.push(MoveTile { pos: dest, mode });
                    }
                }
                final_dest = None;
                break;
            }

            let tile = board.get(next).unwrap_or(Marker::Empty);
            if tile == Marker::Stone || next == opponent {
                if let Some(dest) = final_dest {
                    if seen.insert(dest) {
                        out.movable.push(MoveTile { pos: dest, mode });
                    }
                }
                final_dest = None;
                break;
            }

            final_dest = Some(next);
            current = next;

            if tile == Marker::Ice && counted_ice.insert(next) {
                budget += 1;
            }

            step += 1;
        }

        // Budget ran out in open terrain: the final cell is reachable.
        if let Some(dest) = final_dest {
            if seen.insert(dest) {
                out.movable.push(MoveTile { pos: dest, mode });
            }
        }
    }

    out
}

/// Whether the mover has any option at all for this roll, checking the
/// cardinal directions first and falling back to the diagonals.
pub fn has_any_move(board: &Board, from: Pos, opponent: Pos, roll: u8) -> bool {
    !movement_options(board, from, opponent, MoveMode::Cross, roll).is_empty()
        || !movement_options(board, from, opponent, MoveMode::Diagonal, roll).is_empty()
}

/// What a placement target must satisfy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceRule {
    /// Stones may overwrite anything except another stone.
    NotStone,
    /// Bombs and ice need an empty cell.
    EmptyOnly,
}

/// Cardinal neighbors of `from` where an object may be placed, excluding
/// the opponent's cell.
pub fn placeable_tiles(board: &Board, from: Pos, opponent: Pos, rule: PlaceRule) -> Vec<Pos> {
    let mut out = Vec::new();
    for &dir in &CROSS_DIRS {
        let next = from.step(dir);
        if next == opponent {
            continue;
        }
        let Some(tile) = board.get(next) else {
            continue;
        };
        let ok = match rule {
            PlaceRule::NotStone => tile != Marker::Stone,
            PlaceRule::EmptyOnly => tile == Marker::Empty,
        };
        if ok {
            out.push(next);
        }
    }
    out
}

/// Cardinal neighbors of `from` currently holding a stone.
pub fn drill_targets(board: &Board, from: Pos) -> Vec<Pos> {
    CROSS_DIRS
        .iter()
        .map(|&dir| from.step(dir))
        .filter(|&p| board.get(p) == Some(Marker::Stone))
        .collect()
}

/// Sneak destinations: in-bounds diagonal neighbors that are neither the
/// opponent nor a stone.
pub fn suriashi_targets(board: &Board, from: Pos, opponent: Pos) -> Vec<Pos> {
    let mut out = Vec::new();
    for &dir in &DIAGONAL_DIRS {
        let next = from.step(dir);
        if !board.is_valid(next) || next == opponent {
            continue;
        }
        if board.get(next) == Some(Marker::Stone) {
            continue;
        }
        out.push(next);
    }
    out
}

/// Meteor drop sites: every empty cell not under either player.
pub fn meteor_targets(board: &Board, from: Pos, opponent: Pos) -> Vec<Pos> {
    Board::positions()
        .filter(|&p| board.get(p) == Some(Marker::Empty) && p != from && p != opponent)
        .collect()
}

/// Stones at minimal Manhattan distance from `from`, ties included.
pub fn nearest_stones(board: &Board, from: Pos) -> Vec<Pos> {
    let mut min_dist = i32::MAX;
    let mut stones = Vec::new();
    for pos in Board::positions() {
        if board.get(pos) != Some(Marker::Stone) {
            continue;
        }
        let dist = from.manhattan(pos);
        if dist < min_dist {
            min_dist = dist;
            stones.clear();
            stones.push(pos);
        } else if dist == min_dist {
            stones.push(pos);
        }
    }
    stones
}

/// Momonga landing sites: cardinal neighbors of the nearest stone(s) that
/// are in bounds, unoccupied and not stones themselves. Empty when the
/// board has no stones at all.
pub fn momonga_targets(board: &Board, from: Pos, opponent: Pos) -> Vec<Pos> {
    let mut out = Vec::new();
    let mut seen: HashSet<Pos> = HashSet::new();
    for stone in nearest_stones(board, from) {
        for &dir in &CROSS_DIRS {
            let next = stone.step(dir);
            if !seen.insert(next) {
                continue;
            }
            if !board.is_valid(next) || next == from || next == opponent {
                continue;
            }
            if board.get(next) == Some(Marker::Stone) {
                continue;
            }
            out.push(next);
        }
    }
    out
}

/// Sniper line of sight: the opponent sits on the same row, column or
/// diagonal at Chebyshev distance 4 or more, with no stone strictly
/// between the two.
pub fn sniper_line_clear(board: &Board, from: Pos, opponent: Pos) -> bool {
    let dr = opponent.row - from.row;
    let dc = opponent.col - from.col;

    if dr != 0 && dc != 0 && dr.abs() != dc.abs() {
        return false;
    }

    let dist = dr.abs().max(dc.abs());
    if dist < 4 {
        return false;
    }

    let step_r = dr.signum();
    let step_c = dc.signum();
    for i in 1..dist {
        let p = Pos::new(from.row + step_r * i, from.col + step_c * i);
        if board.get(p) == Some(Marker::Stone) {
            return false;
        }
    }
    true
}

/// Hitokiri reach: the opponent occupies a cardinal neighbor.
pub fn hitokiri_in_reach(from: Pos, opponent: Pos) -> bool {
    CROSS_DIRS.iter().any(|&dir| from.step(dir) == opponent)
}
