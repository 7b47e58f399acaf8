//! Level analysis run after normalization: reachability, forbidden cells,
//! static patterns and shape classification.

use std::collections::VecDeque;

use crate::board::{Board, Direction};
use crate::level::{DistanceTable, IndexMap, LevelShape, Patterns, Rooms, UNREACHABLE};

/// Corridor share (in tenths of the free cells) above which a level is a snail.
const SNAIL_TUNNEL_TENTHS: usize = 6;
const SNAIL_MIN_CELLS: usize = 20;
const NETLOCK_MIN_ROOMS: usize = 6;
const NETLOCK_MAX_AVG_ROOM: usize = 4;
const GIRL_MIN_TARGETS: usize = 4;

/// Cells the player reaches from `start` without moving any box.
pub fn expand_sokoban_cloud(map: &IndexMap, board: &Board, start: u16) -> Vec<bool> {
    let mut cloud = vec![false; map.len()];
    let mut queue = VecDeque::from([start]);
    cloud[start as usize] = true;

    while let Some(cell) = queue.pop_front() {
        for dir in Direction::ALL {
            let Some(n) = map.neighbor(cell, dir) else {
                continue;
            };
            if cloud[n as usize] {
                continue;
            }
            let has_box = map
                .coords(n)
                .is_some_and(|(y, x)| board.get(y, x).has_box());
            if !has_box {
                cloud[n as usize] = true;
                queue.push_back(n);
            }
        }
    }

    cloud
}

/// Cells from which a lone box can never reach any target.
pub fn mark_forbidden(map: &IndexMap, distances: &DistanceTable) -> Vec<bool> {
    map.indices()
        .map(|i| distances.to_any(i) == UNREACHABLE)
        .collect()
}

/// Targets with at most one open side.
pub fn mark_target_holes(map: &IndexMap, target_mask: &[bool]) -> Vec<bool> {
    map.indices()
        .map(|i| target_mask[i as usize] && map.degree(i) <= 1)
        .collect()
}

pub fn init_patterns(map: &IndexMap, target_mask: &[bool]) -> Patterns {
    let freeze_blocks = map
        .indices()
        .map(|cell| {
            let mut blocks = [[None; 3]; 4];
            let (y, x) = map.coords(cell).unwrap_or_default();
            let offsets = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
            for (block, &(dy, dx)) in blocks.iter_mut().zip(offsets.iter()) {
                let at = |oy: isize, ox: isize| {
                    let ny = y.checked_add_signed(oy)?;
                    let nx = x.checked_add_signed(ox)?;
                    map.index(ny, nx)
                };
                *block = [at(dy, 0), at(0, dx), at(dy, dx)];
            }
            blocks
        })
        .collect();

    let envelope = map
        .indices()
        .map(|cell| {
            !target_mask[cell as usize]
                && Direction::ALL.iter().any(|&dir| {
                    map.neighbor(cell, dir)
                        .is_some_and(|n| target_mask[n as usize])
                })
        })
        .collect();

    Patterns {
        freeze_blocks,
        envelope,
    }
}

/// Classify the level shape from its room structure.
pub fn detect_shape(map: &IndexMap, rooms: &Rooms, targets: &[u16]) -> LevelShape {
    let free = map.len();
    let tunnels = rooms.tunnel_cells();

    let snail = free >= SNAIL_MIN_CELLS && tunnels * 10 >= free * SNAIL_TUNNEL_TENTHS;

    let netlock = rooms.count() >= NETLOCK_MIN_ROOMS
        && free - tunnels <= rooms.count() * NETLOCK_MAX_AVG_ROOM;

    let girl_room = if targets.len() >= GIRL_MIN_TARGETS {
        let first = rooms.room_of(targets[0]);
        if first.is_some() && targets.iter().all(|&t| rooms.room_of(t) == first) {
            first
        } else {
            None
        }
    } else {
        None
    };

    LevelShape {
        snail,
        netlock,
        girl_room,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_board;

    fn map_of(text: &str) -> (Board, IndexMap) {
        let board = parse_board(text).unwrap();
        let map = IndexMap::build(&board);
        (board, map)
    }

    #[test]
    fn test_cloud_stops_at_boxes() {
        let (board, map) = map_of("#######\n#@ $ .#\n#######");
        let start = map.index(1, 1).unwrap();
        let cloud = expand_sokoban_cloud(&map, &board, start);
        assert!(cloud[map.index(1, 2).unwrap() as usize]);
        assert!(!cloud[map.index(1, 3).unwrap() as usize]);
        assert!(!cloud[map.index(1, 4).unwrap() as usize]);
    }

    #[test]
    fn test_corners_are_forbidden() {
        let (_, map) = map_of("#####\n#   #\n# . #\n#   #\n#####");
        let target = map.index(2, 2).unwrap();
        let distances = DistanceTable::build(&map, &[target], &[]);
        let forbidden = mark_forbidden(&map, &distances);
        assert!(forbidden[map.index(1, 1).unwrap() as usize]);
        assert!(!forbidden[target as usize]);
    }

    #[test]
    fn test_freeze_blocks_list_walls_as_none() {
        let (_, map) = map_of("####\n#  #\n#  #\n####");
        let mut mask = vec![false; map.len()];
        mask[0] = true;
        let patterns = init_patterns(&map, &mask);
        let corner = map.index(1, 1).unwrap();
        // the down-right block is fully open
        let open = patterns.freeze_blocks[corner as usize][3];
        assert!(open.iter().all(|c| c.is_some()));
        // the up-left block is all wall
        assert!(patterns.freeze_blocks[corner as usize][0].iter().all(|c| c.is_none()));
        assert!(patterns.envelope[map.index(1, 2).unwrap() as usize]);
    }

    #[test]
    fn test_snail_detection_on_long_corridor() {
        let (_, map) = map_of(&format!("{}\n#{}#\n{}", "#".repeat(26), " ".repeat(24), "#".repeat(26)));
        let rooms = Rooms::analyse(&map).unwrap();
        let shape = detect_shape(&map, &rooms, &[0]);
        assert!(shape.snail);
        assert!(!shape.netlock);
        assert_eq!(shape.girl_room, None);
    }
}
