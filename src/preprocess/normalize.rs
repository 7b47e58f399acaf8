//! Sanity checks and destructive board normalization

use std::collections::VecDeque;

use super::PreprocessError;
use crate::board::{Board, Cell, Direction, MAX_BOXES};

/// Cells the player could ever walk over, treating boxes as passable.
pub fn player_region(board: &Board, start: (usize, usize)) -> Vec<bool> {
    let mut seen = vec![false; board.height() * board.width()];
    let mut queue = VecDeque::from([start]);
    seen[start.0 * board.width() + start.1] = true;

    while let Some((y, x)) = queue.pop_front() {
        for dir in Direction::ALL {
            if let Some((ny, nx)) = board.step(y, x, dir) {
                let i = ny * board.width() + nx;
                if !seen[i] && !board.get(ny, nx).is_wall() {
                    seen[i] = true;
                    queue.push_back((ny, nx));
                }
            }
        }
    }

    seen
}

/// Structural checks run before anything is modified.
pub fn sanity_checks(board: &Board) -> Result<(), PreprocessError> {
    if board.height() == 0 || board.width() == 0 {
        return Err(PreprocessError::EmptyBoard);
    }

    let players = board.count(Cell::PLAYER);
    if players != 1 {
        return Err(PreprocessError::PlayerCount(players));
    }

    let boxes = board.box_count();
    let targets = board.target_count();
    if boxes != targets {
        return Err(PreprocessError::BoxTargetMismatch { boxes, targets });
    }
    if boxes == 0 {
        return Err(PreprocessError::NoBoxes);
    }
    if boxes > MAX_BOXES {
        return Err(PreprocessError::TooManyBoxes(boxes));
    }

    let Some(start) = board.player_position() else {
        return Err(PreprocessError::PlayerCount(0));
    };
    let region = player_region(board, start);
    let (h, w) = (board.height(), board.width());

    for (y, x, cell) in board.cells() {
        let inside = region[y * w + x];
        if inside && (y == 0 || x == 0 || y == h - 1 || x == w - 1) {
            return Err(PreprocessError::NotEnclosed { row: y, column: x });
        }
        if !inside && cell.has_box() && !cell.is_target() {
            return Err(PreprocessError::UnreachableBox { row: y, column: x });
        }
        if !inside && cell.is_target() && !cell.has_box() {
            return Err(PreprocessError::UnreachableTarget { row: y, column: x });
        }
    }

    Ok(())
}

/// Turn boxes that can never move off their targets into walls.
///
/// A box on a target is frozen when both axes are blocked by walls (or by
/// boxes already frozen); the process repeats until nothing changes.
/// Returns the number of boxes removed.
pub fn turn_decorative_boxes_to_walls(board: &mut Board) -> usize {
    let mut converted = 0;

    if let Some(start) = board.player_position() {
        let region = player_region(board, start);
        for y in 0..board.height() {
            for x in 0..board.width() {
                let cell = board.get(y, x);
                if !region[y * board.width() + x] && cell.has_box() && cell.is_target() {
                    board.set(y, x, Cell::WALL);
                    converted += 1;
                }
            }
        }
    }

    loop {
        let mut changed = false;
        for y in 0..board.height() {
            for x in 0..board.width() {
                let cell = board.get(y, x);
                if !(cell.has_box() && cell.is_target()) {
                    continue;
                }
                let blocked = |dir: Direction| {
                    board
                        .step(y, x, dir)
                        .map_or(true, |(ny, nx)| board.get(ny, nx).is_wall())
                };
                let vertical = blocked(Direction::Up) || blocked(Direction::Down);
                let horizontal = blocked(Direction::Left) || blocked(Direction::Right);
                if vertical && horizontal {
                    board.set(y, x, Cell::WALL);
                    converted += 1;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    converted
}

/// Wall off every cell the player can never reach.
pub fn close_holes_in_board(board: &mut Board) -> usize {
    let Some(start) = board.player_position() else {
        return 0;
    };
    let region = player_region(board, start);
    let mut closed = 0;
    for y in 0..board.height() {
        for x in 0..board.width() {
            if !region[y * board.width() + x] && !board.get(y, x).is_wall() {
                board.set(y, x, Cell::WALL);
                closed += 1;
            }
        }
    }
    closed
}
