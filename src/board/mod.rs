//! Puzzle grid representation
//!
//! A [`Board`] is a rectangular grid of [`Cell`]s. Each cell is a small set of
//! flags so that combined states such as box-on-target or player-on-target
//! need no special casing.

pub mod moves;

pub use moves::Move;

use std::fmt;

/// Largest accepted width or height.
pub const MAX_SIZE: usize = 64;

/// Largest number of boxes a level may contain.
pub const MAX_BOXES: usize = 255;

/// A single grid cell, stored as a set of flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);
    pub const WALL: Cell = Cell(1);
    pub const BOX: Cell = Cell(2);
    pub const TARGET: Cell = Cell(4);
    pub const PLAYER: Cell = Cell(8);

    pub fn contains(self, other: Cell) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn insert(&mut self, other: Cell) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Cell) {
        self.0 &= !other.0;
    }

    pub fn is_wall(self) -> bool {
        self.contains(Cell::WALL)
    }

    pub fn has_box(self) -> bool {
        self.contains(Cell::BOX)
    }

    pub fn is_target(self) -> bool {
        self.contains(Cell::TARGET)
    }

    pub fn has_player(self) -> bool {
        self.contains(Cell::PLAYER)
    }

    /// Cell the player can walk into (no wall, no box).
    pub fn is_walkable(self) -> bool {
        !self.is_wall() && !self.has_box()
    }

    /// The XSB character for this cell.
    pub fn to_char(self) -> char {
        if self.is_wall() {
            '#'
        } else if self.has_box() && self.is_target() {
            '*'
        } else if self.has_box() {
            '$'
        } else if self.has_player() && self.is_target() {
            '+'
        } else if self.has_player() {
            '@'
        } else if self.is_target() {
            '.'
        } else {
            ' '
        }
    }
}

impl std::ops::BitOr for Cell {
    type Output = Cell;

    fn bitor(self, rhs: Cell) -> Cell {
        Cell(self.0 | rhs.0)
    }
}

/// One of the four grid directions, ordered up, down, left, right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Row/column offset of one step in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Direction> {
        Direction::ALL.get(index).copied()
    }

    /// LURD letter, upper case for a push and lower case for a walk.
    pub fn to_lurd(self, push: bool) -> char {
        let c = match self {
            Direction::Up => 'u',
            Direction::Down => 'd',
            Direction::Left => 'l',
            Direction::Right => 'r',
        };
        if push { c.to_ascii_uppercase() } else { c }
    }

    pub fn from_lurd(c: char) -> Option<(Direction, bool)> {
        let dir = match c.to_ascii_lowercase() {
            'u' => Direction::Up,
            'd' => Direction::Down,
            'l' => Direction::Left,
            'r' => Direction::Right,
            _ => return None,
        };
        Some((dir, c.is_ascii_uppercase()))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_lurd(false))
    }
}

/// Why a literal step could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    Blocked { step: usize },
    PushMismatch { step: usize },
    InvalidChar { step: usize, c: char },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::Blocked { step } => write!(f, "step {} runs into an obstacle", step),
            StepError::PushMismatch { step } => {
                write!(f, "step {} disagrees with its push/walk letter case", step)
            }
            StepError::InvalidChar { step, c } => {
                write!(f, "step {} has invalid move character '{}'", step, c)
            }
        }
    }
}

impl std::error::Error for StepError {}

/// Rectangular Sokoban grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    height: usize,
    width: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a board filled with empty cells.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![Cell::EMPTY; height * width],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, y: usize, x: usize) -> Cell {
        self.cells[y * self.width + x]
    }

    pub fn set(&mut self, y: usize, x: usize, cell: Cell) {
        self.cells[y * self.width + x] = cell;
    }

    pub fn cell_mut(&mut self, y: usize, x: usize) -> &mut Cell {
        &mut self.cells[y * self.width + x]
    }

    pub fn in_bounds(&self, y: isize, x: isize) -> bool {
        y >= 0 && x >= 0 && (y as usize) < self.height && (x as usize) < self.width
    }

    /// Neighbouring coordinate, or `None` when it falls off the grid.
    pub fn step(&self, y: usize, x: usize, dir: Direction) -> Option<(usize, usize)> {
        let (dy, dx) = dir.delta();
        let (ny, nx) = (y as isize + dy, x as isize + dx);
        if self.in_bounds(ny, nx) {
            Some((ny as usize, nx as usize))
        } else {
            None
        }
    }

    /// Iterate over every `(y, x, cell)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &c)| (i / self.width, i % self.width, c))
    }

    pub fn player_position(&self) -> Option<(usize, usize)> {
        self.cells()
            .find(|(_, _, c)| c.has_player())
            .map(|(y, x, _)| (y, x))
    }

    pub fn count(&self, flag: Cell) -> usize {
        self.cells.iter().filter(|c| c.contains(flag)).count()
    }

    pub fn box_count(&self) -> usize {
        self.count(Cell::BOX)
    }

    pub fn target_count(&self) -> usize {
        self.count(Cell::TARGET)
    }

    /// Targets that do not hold a box.
    pub fn unfilled_targets(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.is_target() && !c.has_box())
            .count()
    }

    pub fn is_solved(&self) -> bool {
        self.unfilled_targets() == 0
    }

    /// Move the player marker to `(y, x)`.
    pub fn place_player(&mut self, y: usize, x: usize) {
        for c in self.cells.iter_mut() {
            c.remove(Cell::PLAYER);
        }
        self.cell_mut(y, x).insert(Cell::PLAYER);
    }

    /// Apply one literal step, pushing a box if one is in the way.
    ///
    /// Returns whether the step pushed a box.
    pub fn apply_step(&mut self, dir: Direction) -> Option<bool> {
        let (py, px) = self.player_position()?;
        let (ny, nx) = self.step(py, px, dir)?;
        let next = self.get(ny, nx);
        if next.is_wall() {
            return None;
        }
        let mut pushed = false;
        if next.has_box() {
            let (by, bx) = self.step(ny, nx, dir)?;
            if !self.get(by, bx).is_walkable() {
                return None;
            }
            self.cell_mut(ny, nx).remove(Cell::BOX);
            self.cell_mut(by, bx).insert(Cell::BOX);
            pushed = true;
        }
        self.cell_mut(py, px).remove(Cell::PLAYER);
        self.cell_mut(ny, nx).insert(Cell::PLAYER);
        Some(pushed)
    }

    /// Play a LURD string step by step, checking that letter case matches
    /// what actually happens on the board.
    pub fn apply_lurd(&mut self, lurd: &str) -> Result<usize, StepError> {
        let mut pushes = 0;
        for (step, c) in lurd.chars().enumerate() {
            let (dir, push) = Direction::from_lurd(c).ok_or(StepError::InvalidChar { step, c })?;
            let pushed = self.apply_step(dir).ok_or(StepError::Blocked { step })?;
            if pushed != push {
                return Err(StepError::PushMismatch { step });
            }
            if pushed {
                pushes += 1;
            }
        }
        Ok(pushes)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            let row: String = (0..self.width).map(|x| self.get(y, x).to_char()).collect();
            writeln!(f, "{}", row.trim_end())?;
        }
        Ok(())
    }
}
