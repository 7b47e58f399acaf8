//! Literal step search for a single box relocation

use fnv::FnvHashMap;
use std::collections::VecDeque;

use crate::board::{Board, Direction};
use crate::level::IndexMap;

/// Cells occupied by boxes on `board`, by dense index.
pub fn box_cells(map: &IndexMap, board: &Board) -> Vec<bool> {
    map.indices()
        .map(|i| {
            map.coords(i)
                .map(|(y, x)| board.get(y, x).has_box())
                .unwrap_or(false)
        })
        .collect()
}

/// Shortest LURD string taking the player from `player` to `player_goal`
/// while moving the box at `from` to `to`.
///
/// The search runs over (box, player) pairs; every other box in `occupied`
/// is an obstacle. Walking steps are lower case, pushes upper case.
pub fn find_sol_move(
    map: &IndexMap,
    occupied: &[bool],
    player: u16,
    from: u16,
    to: u16,
    player_goal: u16,
) -> Option<String> {
    let blocked = |cell: u16| cell != from && occupied.get(cell as usize).copied().unwrap_or(true);

    let start = (from, player);
    let goal = (to, player_goal);
    if start == goal {
        return Some(String::new());
    }

    let mut parent: FnvHashMap<(u16, u16), ((u16, u16), char)> = FnvHashMap::default();
    let mut queue = VecDeque::from([start]);
    parent.insert(start, (start, ' '));

    while let Some(state @ (bx, pl)) = queue.pop_front() {
        for dir in Direction::ALL {
            let Some(next) = map.neighbor(pl, dir) else {
                continue;
            };
            if blocked(next) {
                continue;
            }

            let successor = if next == bx {
                let Some(pushed_to) = map.neighbor(bx, dir) else {
                    continue;
                };
                if blocked(pushed_to) {
                    continue;
                }
                ((pushed_to, next), dir.to_lurd(true))
            } else {
                ((bx, next), dir.to_lurd(false))
            };

            let (key, step) = successor;
            if parent.contains_key(&key) {
                continue;
            }
            parent.insert(key, (state, step));
            if key == goal {
                return Some(rebuild(&parent, start, goal));
            }
            queue.push_back(key);
        }
    }

    None
}

fn rebuild(parent: &FnvHashMap<(u16, u16), ((u16, u16), char)>, start: (u16, u16), goal: (u16, u16)) -> String {
    let mut steps = Vec::new();
    let mut cursor = goal;
    while cursor != start {
        let &(prev, step) = &parent[&cursor];
        steps.push(step);
        cursor = prev;
    }
    steps.iter().rev().collect()
}

/// Number of pushes in a LURD string.
pub fn count_pushes(lurd: &str) -> usize {
    lurd.chars().filter(|c| c.is_ascii_uppercase()).count()
}
