//! Expansion of abstract push solutions into literal LURD strings
//!
//! Engines report a solution as box relocations. Replay walks them on a
//! private copy of the initial board, asks the pathfinder for the literal
//! player steps of each relocation and finally plays the whole string back
//! with [`Board::apply_lurd`] to check that it really solves the level.

pub mod path;

pub use path::{count_pushes, find_sol_move};

use thiserror::Error;
use tracing::trace;

use crate::board::{Board, Move, StepError};
use crate::level::Level;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("no solution to replay")]
    NoSolution,
    #[error("move {index} is a pull")]
    PullMove { index: usize },
    #[error("move {index} leaves the player outside the level")]
    InvalidCell { index: usize },
    #[error("move {index} ({mv}) cannot be reached by the player")]
    NoPath { index: usize, mv: Move },
    #[error("move {index} does not match the board")]
    BoardMismatch { index: usize },
    #[error("step string diverges from the board: {0}")]
    Diverged(StepError),
    #[error("{0} targets left unfilled")]
    Unfilled(usize),
}

/// A solution expanded to literal steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub lurd: String,
    /// Total number of steps, walks included
    pub steps: usize,
    pub pushes: usize,
}

/// Expand `moves` into a LURD string valid from `level.initial_board`.
pub fn replay(level: &Level, moves: &[Move]) -> Result<Replay, ReplayError> {
    let map = &level.map;
    let mut board = level.initial_board.clone();
    let mut player = level.player_start;
    let mut lurd = String::new();

    for (index, m) in moves.iter().enumerate() {
        if m.pull {
            return Err(ReplayError::PullMove { index });
        }
        let next = m.player_after(map).ok_or(ReplayError::InvalidCell { index })?;

        let occupied = path::box_cells(map, &board);
        let steps =
            find_sol_move(map, &occupied, player, m.from, m.to, next).ok_or(ReplayError::NoPath { index, mv: *m })?;
        trace!(index, %m, steps = %steps, "expanded move");
        lurd.push_str(&steps);

        if !board.apply_move(map, m) {
            return Err(ReplayError::BoardMismatch { index });
        }
        player = next;
    }

    let unfilled = board.unfilled_targets();
    if unfilled > 0 {
        return Err(ReplayError::Unfilled(unfilled));
    }

    let pushes = simulate(&level.initial_board, &lurd)?;
    debug_assert_eq!(pushes, count_pushes(&lurd));

    Ok(Replay {
        steps: lurd.chars().count(),
        pushes,
        lurd,
    })
}

/// Play `lurd` on a copy of `board`, returning the push count if the result
/// is solved.
pub fn simulate(board: &Board, lurd: &str) -> Result<usize, ReplayError> {
    let mut board = board.clone();
    let pushes = board.apply_lurd(lurd).map_err(ReplayError::Diverged)?;
    match board.unfilled_targets() {
        0 => Ok(pushes),
        n => Err(ReplayError::Unfilled(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Direction;
    use crate::engine::test_support::level;

    fn push(level: &Level, (y, x): (usize, usize), dir: Direction) -> Move {
        let from = level.map.index(y, x).unwrap();
        Move::push(&level.map, from, dir).unwrap()
    }

    #[test]
    fn test_replay_corridor() {
        let level = level("######\n#@$ .#\n######");
        let moves = vec![push(&level, (1, 2), Direction::Right), push(&level, (1, 3), Direction::Right)];
        let replay = replay(&level, &moves).unwrap();
        assert_eq!(replay.lurd, "RR");
        assert_eq!(replay.pushes, 2);
        assert_eq!(replay.steps, 2);
    }

    #[test]
    fn test_replay_walks_around() {
        let level = level("######\n#@   #\n# $  #\n# .  #\n######");
        let moves = vec![push(&level, (2, 2), Direction::Down)];
        let replay = replay(&level, &moves).unwrap();
        assert_eq!(replay.lurd, "rD");
        assert_eq!(replay.pushes, 1);
        assert_eq!(simulate(&level.initial_board, &replay.lurd), Ok(1));
    }

    #[test]
    fn test_replay_rejects_pull() {
        let level = level("######\n#@$ .#\n######");
        let mut m = push(&level, (1, 2), Direction::Right);
        m.pull = true;
        assert_eq!(replay(&level, &[m]), Err(ReplayError::PullMove { index: 0 }));
    }

    #[test]
    fn test_replay_incomplete_solution() {
        let level = level("######\n#@$ .#\n######");
        let moves = vec![push(&level, (1, 2), Direction::Right)];
        assert_eq!(replay(&level, &moves), Err(ReplayError::Unfilled(1)));
    }

    #[test]
    fn test_replay_wrong_box() {
        let level = level("######\n#@$ .#\n######");
        let moves = vec![push(&level, (1, 3), Direction::Right)];
        assert!(matches!(replay(&level, &moves), Err(ReplayError::NoPath { index: 0, .. })));
    }

    #[test]
    fn test_simulate_detects_divergence() {
        let level = level("######\n#@$ .#\n######");
        assert!(matches!(simulate(&level.initial_board, "rR"), Err(ReplayError::Diverged(_))));
    }
}
