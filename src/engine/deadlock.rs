//! Freeze deadlock detection
//!
//! A box is frozen when it can move along neither axis. Walls block an axis
//! outright, forbidden cells on both sides block it, and so does a neighbour
//! that is itself frozen. A frozen box off its target makes the position
//! unsolvable.

use crate::board::Direction;
use crate::level::Level;
use crate::resources::DeadlockCache;

/// Whether moving a box onto `moved` produced a deadlock.
pub fn is_deadlocked(level: &Level, boxes: &[u16], moved: u16, cache: &mut DeadlockCache) -> bool {
    let key = level.zobrist.hash_move(boxes, moved);
    if let Some(hit) = cache.get(key) {
        return hit;
    }

    let mut occupied = vec![false; level.cells()];
    for &b in boxes {
        occupied[b as usize] = true;
    }

    let dead = square_freeze(level, &occupied, moved) || axis_freeze(level, &occupied, moved);
    cache.insert(key, dead);
    dead
}

/// Any fully blocked 2x2 square around `moved` holding a box off target.
fn square_freeze(level: &Level, occupied: &[bool], moved: u16) -> bool {
    level.patterns.freeze_blocks[moved as usize].iter().any(|block| {
        let closed = block
            .iter()
            .all(|c| c.map_or(true, |c| occupied[c as usize]));
        closed
            && (!level.is_target(moved)
                || block
                    .iter()
                    .flatten()
                    .any(|&c| occupied[c as usize] && !level.is_target(c)))
    })
}

fn axis_freeze(level: &Level, occupied: &[bool], moved: u16) -> bool {
    let mut visiting = vec![false; level.cells()];
    let mut frozen_off_target = false;
    if frozen(level, occupied, moved, &mut visiting, &mut frozen_off_target) {
        return frozen_off_target || !level.is_target(moved);
    }
    false
}

fn frozen(
    level: &Level,
    occupied: &[bool],
    cell: u16,
    visiting: &mut [bool],
    off_target: &mut bool,
) -> bool {
    visiting[cell as usize] = true;
    let result = axis_blocked(level, occupied, cell, [Direction::Left, Direction::Right], visiting, off_target)
        && axis_blocked(level, occupied, cell, [Direction::Up, Direction::Down], visiting, off_target);
    visiting[cell as usize] = false;
    result
}

fn axis_blocked(
    level: &Level,
    occupied: &[bool],
    cell: u16,
    [a, b]: [Direction; 2],
    visiting: &mut [bool],
    off_target: &mut bool,
) -> bool {
    let (Some(na), Some(nb)) = (level.map.neighbor(cell, a), level.map.neighbor(cell, b)) else {
        return true;
    };
    if level.is_forbidden(na) && level.is_forbidden(nb) {
        return true;
    }
    for n in [na, nb] {
        if !occupied[n as usize] {
            continue;
        }
        // a box already under examination counts as a wall
        if visiting[n as usize] {
            return true;
        }
        if frozen(level, occupied, n, visiting, off_target) {
            if !level.is_target(n) {
                *off_target = true;
            }
            return true;
        }
    }
    false
}
