//! Abstract box relocations produced by the search engines

use super::{Board, Cell, Direction};
use crate::level::IndexMap;
use std::fmt;

/// A single box relocation.
///
/// `from` and `to` are dense cell indices (see [`IndexMap`]). After the move
/// the player stands next to the box's destination, one step in the
/// `sokoban_position` direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: u16,
    pub to: u16,
    pub sokoban_position: Direction,
    pub pull: bool,
}

impl Move {
    /// A push of the box at `from` one cell in direction `dir`.
    pub fn push(map: &IndexMap, from: u16, dir: Direction) -> Option<Move> {
        let to = map.neighbor(from, dir)?;
        Some(Move {
            from,
            to,
            sokoban_position: dir.opposite(),
            pull: false,
        })
    }

    /// Dense index of the player's cell once the move is done.
    pub fn player_after(&self, map: &IndexMap) -> Option<u16> {
        map.neighbor(self.to, self.sokoban_position)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{} ({}{})",
            self.from,
            self.to,
            self.sokoban_position,
            if self.pull { ", pull" } else { "" }
        )
    }
}

impl Board {
    /// Relocate the box described by `m` and put the player where the move
    /// leaves it. Returns `false` if the board does not match the move.
    pub fn apply_move(&mut self, map: &IndexMap, m: &Move) -> bool {
        let (Some((fy, fx)), Some((ty, tx))) = (map.coords(m.from), map.coords(m.to)) else {
            return false;
        };
        if !self.get(fy, fx).has_box() {
            return false;
        }
        self.cell_mut(fy, fx).remove(Cell::BOX);
        if self.get(ty, tx).has_box() || self.get(ty, tx).is_wall() {
            self.cell_mut(fy, fx).insert(Cell::BOX);
            return false;
        }
        self.cell_mut(ty, tx).insert(Cell::BOX);
        match m.player_after(map).and_then(|p| map.coords(p)) {
            Some((py, px)) => {
                self.place_player(py, px);
                true
            }
            None => false,
        }
    }
}
