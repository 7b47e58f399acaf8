//! One-shot preprocessing of a parsed board into a search-ready [`Level`]
//!
//! The pipeline validates the geometry, clears every board-keyed cache held by
//! the resource pool, normalizes the board in place, snapshots it and then
//! computes the static analysis the search engines rely on. Any failing step
//! aborts the whole pipeline with a [`PreprocessError`] describing why.

pub mod analysis;
pub mod normalize;

use thiserror::Error;
use tracing::{debug, trace};

use crate::board::Board;
use crate::level::{IndexMap, Level, Rooms, Zobrist};
use crate::resources::ResourcePool;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreprocessError {
    #[error("level has zero width or height")]
    EmptyBoard,
    #[error("level must contain exactly one player, found {0}")]
    PlayerCount(usize),
    #[error("level contains no boxes")]
    NoBoxes,
    #[error("box count ({boxes}) does not match target count ({targets})")]
    BoxTargetMismatch { boxes: usize, targets: usize },
    #[error("too many boxes: {0}")]
    TooManyBoxes(usize),
    #[error("player can leave the level at row {row}, column {column}")]
    NotEnclosed { row: usize, column: usize },
    #[error("box at row {row}, column {column} is out of the player's reach")]
    UnreachableBox { row: usize, column: usize },
    #[error("target at row {row}, column {column} is out of the player's reach")]
    UnreachableTarget { row: usize, column: usize },
    #[error("box at row {row}, column {column} lies outside the inner region")]
    BoxOutsideInner { row: usize, column: usize },
    #[error("room analysis failed: {0} rooms")]
    RoomAnalysis(usize),
}

/// Validate and normalize `board`, returning the immutable level.
pub fn preprocess(board: &mut Board, pool: &mut ResourcePool) -> Result<Level, PreprocessError> {
    normalize::sanity_checks(board)?;

    pool.clear_caches();

    let decorative = normalize::turn_decorative_boxes_to_walls(board);
    let closed = normalize::close_holes_in_board(board);
    trace!(decorative, closed, "normalized board");

    let map = IndexMap::build(board);

    let mut boxes = Vec::new();
    let mut targets = Vec::new();
    let mut player = None;
    for (y, x, cell) in board.cells() {
        if cell.is_wall() {
            continue;
        }
        let index = map.index(y, x);
        if cell.has_box() {
            boxes.push(index.ok_or(PreprocessError::BoxOutsideInner { row: y, column: x })?);
        }
        if cell.is_target() {
            if let Some(i) = index {
                targets.push(i);
            }
        }
        if cell.has_player() {
            player = index;
        }
    }
    boxes.sort_unstable();
    let player_start = player.ok_or(PreprocessError::PlayerCount(0))?;

    let initial_board = board.clone();
    let cloud = analysis::expand_sokoban_cloud(&map, &initial_board, player_start);

    let mut target_mask = vec![false; map.len()];
    for &t in &targets {
        target_mask[t as usize] = true;
    }

    let distances = crate::level::DistanceTable::build(&map, &targets, &boxes);
    let forbidden = analysis::mark_forbidden(&map, &distances);
    let target_holes = analysis::mark_target_holes(&map, &target_mask);

    debug!("preprocessed level:\n{}", initial_board);

    let rooms = Rooms::analyse(&map).map_err(PreprocessError::RoomAnalysis)?;
    let patterns = analysis::init_patterns(&map, &target_mask);
    let shape = analysis::detect_shape(&map, &rooms, &targets);
    debug!(
        cells = map.len(),
        boxes = boxes.len(),
        rooms = rooms.count(),
        snail = shape.snail,
        netlock = shape.netlock,
        girl = shape.girl_room.is_some(),
        "level analysis done"
    );

    let zobrist = Zobrist::new(map.len());

    Ok(Level {
        map,
        initial_board,
        player_start,
        targets,
        initial_boxes: boxes,
        target_mask,
        forbidden,
        target_holes,
        cloud,
        distances,
        rooms,
        patterns,
        shape,
        zobrist,
    })
}
