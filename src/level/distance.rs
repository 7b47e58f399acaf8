//! Push-distance fields for lone boxes
//!
//! Distances ignore every other box and only require that the player has a
//! non-wall cell to push from, so they are lower bounds on the real number of
//! pushes.

use std::collections::VecDeque;

use super::IndexMap;
use crate::board::Direction;

pub const UNREACHABLE: u16 = u16::MAX;

#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    /// `to_target[t][cell]`: pushes moving a box from `cell` onto target `t`.
    to_target: Vec<Vec<u16>>,
    /// Minimum over all targets.
    to_any: Vec<u16>,
    /// Pulls moving a box from `cell` back onto any initial box cell.
    pull_to_start: Vec<u16>,
}

impl DistanceTable {
    pub fn build(map: &IndexMap, targets: &[u16], starts: &[u16]) -> Self {
        let to_target: Vec<Vec<u16>> = targets.iter().map(|&t| pushes_onto(map, t)).collect();

        let mut to_any = vec![UNREACHABLE; map.len()];
        for field in &to_target {
            for (best, &d) in to_any.iter_mut().zip(field) {
                *best = (*best).min(d);
            }
        }

        let mut pull_to_start = vec![UNREACHABLE; map.len()];
        for &s in starts {
            for (best, d) in pull_to_start.iter_mut().zip(pushes_from(map, s)) {
                *best = (*best).min(d);
            }
        }

        Self {
            to_target,
            to_any,
            pull_to_start,
        }
    }

    /// Pushes needed to bring a box on `cell` to target number `target`.
    #[inline]
    pub fn to_target(&self, target: usize, cell: u16) -> u16 {
        self.to_target[target][cell as usize]
    }

    #[inline]
    pub fn to_any(&self, cell: u16) -> u16 {
        self.to_any[cell as usize]
    }

    #[inline]
    pub fn pull_to_start(&self, cell: u16) -> u16 {
        self.pull_to_start[cell as usize]
    }

    pub fn target_count(&self) -> usize {
        self.to_target.len()
    }
}

/// Backward BFS from `target`: a box at `prev` reaches `b` by one push in
/// direction `d` when `prev = b - d` and the player can stand at `prev - d`.
fn pushes_onto(map: &IndexMap, target: u16) -> Vec<u16> {
    let mut dist = vec![UNREACHABLE; map.len()];
    let mut queue = VecDeque::new();
    dist[target as usize] = 0;
    queue.push_back(target);

    while let Some(b) = queue.pop_front() {
        let next = dist[b as usize] + 1;
        for dir in Direction::ALL {
            let Some(prev) = map.neighbor(b, dir.opposite()) else {
                continue;
            };
            if map.neighbor(prev, dir.opposite()).is_none() {
                continue;
            }
            if dist[prev as usize] == UNREACHABLE {
                dist[prev as usize] = next;
                queue.push_back(prev);
            }
        }
    }

    dist
}

/// Forward BFS from `start` over pushes.
fn pushes_from(map: &IndexMap, start: u16) -> Vec<u16> {
    let mut dist = vec![UNREACHABLE; map.len()];
    let mut queue = VecDeque::new();
    dist[start as usize] = 0;
    queue.push_back(start);

    while let Some(b) = queue.pop_front() {
        let next = dist[b as usize] + 1;
        for dir in Direction::ALL {
            if map.neighbor(b, dir.opposite()).is_none() {
                continue;
            }
            let Some(to) = map.neighbor(b, dir) else {
                continue;
            };
            if dist[to as usize] == UNREACHABLE {
                dist[to as usize] = next;
                queue.push_back(to);
            }
        }
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_board;

    #[test]
    fn test_corridor_distances() {
        // cells: 0=@ 1=$ 2=' ' 3=.
        let board = parse_board("######\n#@$ .#\n######").unwrap();
        let map = IndexMap::build(&board);
        let table = DistanceTable::build(&map, &[3], &[1]);
        assert_eq!(table.to_any(1), 2);
        assert_eq!(table.to_any(2), 1);
        assert_eq!(table.to_any(3), 0);
        // the leftmost cell has no room for the player behind it
        assert_eq!(table.to_any(0), UNREACHABLE);
    }

    #[test]
    fn test_pull_to_start() {
        let board = parse_board("######\n#@$ .#\n######").unwrap();
        let map = IndexMap::build(&board);
        let table = DistanceTable::build(&map, &[3], &[1]);
        assert_eq!(table.pull_to_start(1), 0);
        assert_eq!(table.pull_to_start(3), 2);
    }
}
