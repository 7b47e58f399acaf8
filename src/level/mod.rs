//! Search-ready level geometry
//!
//! A [`Level`] is produced once per puzzle by the preprocessing pipeline and
//! then shared read-only by every worker. All search code addresses cells by
//! the dense indices of an [`IndexMap`] rather than by grid coordinates.

pub mod distance;
pub mod rooms;

pub use distance::{DistanceTable, UNREACHABLE};
pub use rooms::Rooms;

use crate::board::{Board, Direction};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Bounding rectangle (inclusive) of the non-wall cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InnerRegion {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl InnerRegion {
    pub fn contains(&self, y: usize, x: usize) -> bool {
        y >= self.top && y <= self.bottom && x >= self.left && x <= self.right
    }
}

/// Dense numbering of the non-wall cells inside the inner region.
#[derive(Debug, Clone)]
pub struct IndexMap {
    width: usize,
    inner: InnerRegion,
    index: Vec<Option<u16>>,
    coords: Vec<(usize, usize)>,
    neighbors: Vec<[Option<u16>; 4]>,
}

impl IndexMap {
    pub fn build(board: &Board) -> Self {
        let mut inner: Option<InnerRegion> = None;
        for (y, x, cell) in board.cells() {
            if cell.is_wall() {
                continue;
            }
            let region = inner.get_or_insert(InnerRegion {
                top: y,
                left: x,
                bottom: y,
                right: x,
            });
            region.top = region.top.min(y);
            region.left = region.left.min(x);
            region.bottom = region.bottom.max(y);
            region.right = region.right.max(x);
        }
        let inner = inner.unwrap_or_default();

        let mut index = vec![None; board.height() * board.width()];
        let mut coords = Vec::new();
        for (y, x, cell) in board.cells() {
            if !cell.is_wall() && inner.contains(y, x) {
                index[y * board.width() + x] = Some(coords.len() as u16);
                coords.push((y, x));
            }
        }

        let neighbors = coords
            .iter()
            .map(|&(y, x)| {
                let mut n = [None; 4];
                for dir in Direction::ALL {
                    n[dir.index()] = board
                        .step(y, x, dir)
                        .and_then(|(ny, nx)| index[ny * board.width() + nx]);
                }
                n
            })
            .collect();

        Self {
            width: board.width(),
            inner,
            index,
            coords,
            neighbors,
        }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn inner(&self) -> InnerRegion {
        self.inner
    }

    pub fn index(&self, y: usize, x: usize) -> Option<u16> {
        self.index.get(y * self.width + x).copied().flatten()
    }

    pub fn coords(&self, index: u16) -> Option<(usize, usize)> {
        self.coords.get(index as usize).copied()
    }

    /// Neighbouring non-wall cell, if any.
    #[inline]
    pub fn neighbor(&self, index: u16, dir: Direction) -> Option<u16> {
        self.neighbors[index as usize][dir.index()]
    }

    /// Number of non-wall neighbours of a cell.
    pub fn degree(&self, index: u16) -> usize {
        self.neighbors[index as usize]
            .iter()
            .filter(|n| n.is_some())
            .count()
    }

    pub fn indices(&self) -> impl Iterator<Item = u16> {
        0..self.coords.len() as u16
    }
}

/// Zobrist keys for hashing box configurations.
#[derive(Debug, Clone)]
pub struct Zobrist {
    boxes: Vec<u64>,
    /// Marks the box that moved last, for verdicts that depend on it
    moved: Vec<u64>,
}

impl Zobrist {
    const SEED: u64 = 0x50c0_ba11_5eed_0001;

    pub fn new(cells: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(Self::SEED);
        Self {
            boxes: (0..cells).map(|_| rng.random()).collect(),
            moved: (0..cells).map(|_| rng.random()).collect(),
        }
    }

    pub fn hash_boxes(&self, boxes: &[u16]) -> u64 {
        boxes
            .iter()
            .fold(0, |acc, &b| acc ^ self.boxes[b as usize])
    }

    pub fn hash_move(&self, boxes: &[u16], moved: u16) -> u64 {
        self.hash_boxes(boxes) ^ self.moved[moved as usize]
    }
}

/// Level shape classification used to rewrite search types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelShape {
    /// Corridor-dominated level.
    pub snail: bool,
    /// Many small rooms joined by doors.
    pub netlock: bool,
    /// Room holding every target, when there is one.
    pub girl_room: Option<u16>,
}

/// Static cell patterns used by the deadlock checks and heuristics.
#[derive(Debug, Clone, Default)]
pub struct Patterns {
    /// For every cell, the four 2x2 blocks containing it, each listed as its
    /// other three cells (`None` marks a wall).
    pub freeze_blocks: Vec<[[Option<u16>; 3]; 4]>,
    /// Non-target cells next to a target.
    pub envelope: Vec<bool>,
}

/// Preprocessed, immutable puzzle.
#[derive(Debug, Clone)]
pub struct Level {
    pub map: IndexMap,
    /// Normalized board captured before any search.
    pub initial_board: Board,
    pub player_start: u16,
    pub targets: Vec<u16>,
    /// Initial box cells, sorted.
    pub initial_boxes: Vec<u16>,
    pub target_mask: Vec<bool>,
    /// Cells a box must never be pushed onto.
    pub forbidden: Vec<bool>,
    /// Targets enclosed on three sides.
    pub target_holes: Vec<bool>,
    /// Cells the player can reach at the start.
    pub cloud: Vec<bool>,
    pub distances: DistanceTable,
    pub rooms: Rooms,
    pub patterns: Patterns,
    pub shape: LevelShape,
    pub zobrist: Zobrist,
}

impl Level {
    #[inline]
    pub fn is_target(&self, cell: u16) -> bool {
        self.target_mask[cell as usize]
    }

    #[inline]
    pub fn is_forbidden(&self, cell: u16) -> bool {
        self.forbidden[cell as usize]
    }

    pub fn box_count(&self) -> usize {
        self.initial_boxes.len()
    }

    pub fn cells(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_board;

    #[test]
    fn test_index_map_skips_walls() {
        let board = parse_board("#####\n#@$.#\n#####").unwrap();
        let map = IndexMap::build(&board);
        assert_eq!(map.len(), 3);
        assert_eq!(map.index(0, 0), None);
        assert_eq!(map.index(1, 1), Some(0));
        assert_eq!(map.coords(2), Some((1, 3)));
        assert_eq!(map.neighbor(0, Direction::Right), Some(1));
        assert_eq!(map.neighbor(0, Direction::Up), None);
        assert_eq!(map.degree(1), 2);
    }

    #[test]
    fn test_inner_region_bounds() {
        let board = parse_board("######\n#    #\n# @  #\n######").unwrap();
        let map = IndexMap::build(&board);
        let inner = map.inner();
        assert_eq!((inner.top, inner.left, inner.bottom, inner.right), (1, 1, 2, 4));
    }

    #[test]
    fn test_zobrist_is_order_independent() {
        let z = Zobrist::new(10);
        assert_eq!(z.hash_boxes(&[1, 4, 7]), z.hash_boxes(&[7, 1, 4]));
        assert_ne!(z.hash_move(&[1, 4], 1), z.hash_move(&[1, 4], 4));
    }
}
