//! Search positions and move generation
//!
//! A position is the sorted set of box cells plus the player's region, named
//! by the smallest cell index the player can reach. Two positions that differ
//! only by where the player stands inside the same region compare equal.

use std::collections::VecDeque;

use crate::board::{Board, Direction, Move};
use crate::level::{Level, UNREACHABLE};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub boxes: Box<[u16]>,
    pub player: u16,
}

impl Position {
    /// The level's start, with the player region taken from the
    /// precomputed cloud.
    pub fn initial(level: &Level) -> Self {
        let player = level
            .cloud
            .iter()
            .position(|&reached| reached)
            .map_or(level.player_start, |cell| cell as u16);
        Self {
            boxes: level.initial_boxes.clone().into_boxed_slice(),
            player,
        }
    }

    /// Root of a search over `board`.
    pub fn root(level: &Level, board: &Board) -> Option<Self> {
        if *board == level.initial_board {
            Some(Self::initial(level))
        } else {
            Self::from_board(level, board)
        }
    }

    /// Read a position off a board laid out like the level.
    pub fn from_board(level: &Level, board: &Board) -> Option<Self> {
        let mut boxes = Vec::with_capacity(level.box_count());
        let mut player = None;
        for (y, x, cell) in board.cells() {
            if cell.has_box() {
                boxes.push(level.map.index(y, x)?);
            }
            if cell.has_player() {
                player = level.map.index(y, x);
            }
        }
        let mut scratch = Scratch::new(level);
        Some(scratch.position(level, boxes, player?))
    }

    pub fn is_solved(&self, level: &Level) -> bool {
        self.boxes.iter().all(|&b| level.is_target(b))
    }
}

/// Reusable buffers for move generation.
#[derive(Debug, Clone)]
pub struct Scratch {
    occupied: Vec<bool>,
    reach: Vec<bool>,
    queue: VecDeque<u16>,
}

impl Scratch {
    pub fn new(level: &Level) -> Self {
        Self {
            occupied: vec![false; level.cells()],
            reach: vec![false; level.cells()],
            queue: VecDeque::new(),
        }
    }

    /// Build a normalized position from unsorted boxes and a player cell.
    pub fn position(&mut self, level: &Level, mut boxes: Vec<u16>, player: u16) -> Position {
        boxes.sort_unstable();
        self.occupy(&boxes);
        let player = self.flood(level, player);
        Position {
            boxes: boxes.into_boxed_slice(),
            player,
        }
    }

    fn occupy(&mut self, boxes: &[u16]) {
        self.occupied.fill(false);
        for &b in boxes {
            self.occupied[b as usize] = true;
        }
    }

    /// Flood the player region from `start`; returns its smallest cell.
    fn flood(&mut self, level: &Level, start: u16) -> u16 {
        self.reach.fill(false);
        self.queue.clear();
        self.reach[start as usize] = true;
        self.queue.push_back(start);
        let mut min = start;
        while let Some(cell) = self.queue.pop_front() {
            min = min.min(cell);
            for dir in Direction::ALL {
                if let Some(n) = level.map.neighbor(cell, dir) {
                    if !self.reach[n as usize] && !self.occupied[n as usize] {
                        self.reach[n as usize] = true;
                        self.queue.push_back(n);
                    }
                }
            }
        }
        min
    }

    fn reachable(&self, cell: u16) -> bool {
        self.reach[cell as usize]
    }

    fn is_free(&self, cell: u16) -> bool {
        !self.occupied[cell as usize]
    }

    /// Every legal push out of `position` that does not land a box on a
    /// forbidden cell.
    pub fn pushes(&mut self, level: &Level, position: &Position) -> Vec<(Move, Position)> {
        self.occupy(&position.boxes);
        self.flood(level, position.player);

        let mut candidates = Vec::new();
        for (i, &b) in position.boxes.iter().enumerate() {
            for dir in Direction::ALL {
                let Some(behind) = level.map.neighbor(b, dir.opposite()) else {
                    continue;
                };
                let Some(to) = level.map.neighbor(b, dir) else {
                    continue;
                };
                if !self.reachable(behind) || !self.is_free(to) || level.is_forbidden(to) {
                    continue;
                }
                candidates.push((i, Move {
                    from: b,
                    to,
                    sokoban_position: dir.opposite(),
                    pull: false,
                }));
            }
        }

        candidates
            .into_iter()
            .map(|(i, m)| {
                let mut boxes = position.boxes.to_vec();
                boxes[i] = m.to;
                let child = self.position(level, boxes, m.from);
                (m, child)
            })
            .collect()
    }

    /// Every legal pull out of `position`, reported as the forward push that
    /// undoes it. Boxes are never pulled onto cells from which they could not
    /// have come.
    pub fn pulls(&mut self, level: &Level, position: &Position) -> Vec<(Move, Position)> {
        self.occupy(&position.boxes);
        self.flood(level, position.player);

        let mut candidates = Vec::new();
        for (i, &b) in position.boxes.iter().enumerate() {
            for dir in Direction::ALL {
                let Some(stand) = level.map.neighbor(b, dir) else {
                    continue;
                };
                let Some(back) = level.map.neighbor(stand, dir) else {
                    continue;
                };
                if !self.reachable(stand) || !self.is_free(back) {
                    continue;
                }
                if level.distances.pull_to_start(stand) == UNREACHABLE {
                    continue;
                }
                // box moves b -> stand, player stand -> back
                candidates.push((i, stand, back, Move {
                    from: stand,
                    to: b,
                    sokoban_position: dir,
                    pull: false,
                }));
            }
        }

        candidates
            .into_iter()
            .map(|(i, stand, back, undo)| {
                let mut boxes = position.boxes.to_vec();
                boxes[i] = stand;
                let child = self.position(level, boxes, back);
                (undo, child)
            })
            .collect()
    }

    /// Cells reached by the last flood.
    pub fn reached(&self) -> &[bool] {
        &self.reach
    }
}
