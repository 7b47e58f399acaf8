//! Backward (packing) searches
//!
//! Planning starts from the solved configuration and takes boxes back off
//! their targets one at a time; the reverse of that removal order is the
//! packing order the forward search follows. For [`SearchType::Rev`] the
//! backward phase instead pulls boxes from every goal position and stores
//! the resulting positions in the worker's perimeter.

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::position::{Position, Scratch};
use crate::board::Direction;
use crate::level::Level;
use crate::resources::{AttemptState, SearchArena};
use crate::search::config::SearchType;
use crate::search::EngineRequest;

/// Which removable target is taken out first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrieval {
    /// Closest to the player: filled last
    Nearest,
    /// Farthest from the player: filled last
    Farthest,
}

impl Retrieval {
    pub fn for_type(search_type: SearchType) -> Self {
        match search_type {
            SearchType::MaxDist | SearchType::MaxDist2 | SearchType::Bicon => Retrieval::Farthest,
            _ => Retrieval::Nearest,
        }
    }
}

pub fn packing_search(request: &EngineRequest<'_>, arena: &mut SearchArena, attempt: &mut AttemptState) {
    match request.search_type {
        SearchType::Rev => build_perimeter(request, arena, attempt),
        other => plan_packing_order(request, attempt, Retrieval::for_type(other)),
    }
}

/// Walking distance from `start`, treating `occupied` cells as walls.
fn walk_distances(level: &Level, occupied: &[bool], start: u16) -> Vec<Option<u32>> {
    let mut dist = vec![None; level.cells()];
    let mut queue = VecDeque::from([start]);
    dist[start as usize] = Some(0);
    while let Some(cell) = queue.pop_front() {
        let next = dist[cell as usize].map_or(0, |d| d + 1);
        for dir in Direction::ALL {
            if let Some(n) = level.map.neighbor(cell, dir) {
                if dist[n as usize].is_none() && !occupied[n as usize] {
                    dist[n as usize] = Some(next);
                    queue.push_back(n);
                }
            }
        }
    }
    dist
}

/// Fill `attempt.parking_order`, or leave it empty when the boxes cannot all
/// be taken back off their targets in time.
pub fn plan_packing_order(request: &EngineRequest<'_>, attempt: &mut AttemptState, retrieval: Retrieval) {
    let level = request.level;
    let mut occupied = level.target_mask.clone();
    let mut remaining = level.targets.clone();
    let mut removal = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        if request.expired() {
            attempt.fail("time limit while planning");
            return;
        }

        let dist = walk_distances(level, &occupied, level.player_start);
        let removable = remaining.iter().enumerate().filter_map(|(i, &t)| {
            Direction::ALL
                .iter()
                .filter_map(|&dir| {
                    let stand = level.map.neighbor(t, dir)?;
                    let back = level.map.neighbor(stand, dir)?;
                    if occupied[back as usize] {
                        return None;
                    }
                    dist[stand as usize]
                })
                .min()
                .map(|d| (d, i))
        });
        let chosen = match retrieval {
            Retrieval::Nearest => removable.min_by_key(|&(d, i)| (d, i)),
            Retrieval::Farthest => removable.max_by_key(|&(d, i)| (d, std::cmp::Reverse(i))),
        };
        let Some((_, i)) = chosen else {
            trace!(left = remaining.len(), "no target can be emptied");
            attempt.fail("Could not find packing order");
            return;
        };

        let t = remaining.swap_remove(i);
        occupied[t as usize] = false;
        removal.push(t);
    }

    removal.reverse();
    attempt.parking_order = removal;
}

/// Goal positions: every box on a target, one per player region.
fn goal_positions(level: &Level, scratch: &mut Scratch) -> Vec<Position> {
    let mut covered = vec![false; level.cells()];
    let mut goals = Vec::new();
    for cell in level.map.indices() {
        if level.is_target(cell) || covered[cell as usize] {
            continue;
        }
        goals.push(scratch.position(level, level.targets.clone(), cell));
        for (seen, &reached) in covered.iter_mut().zip(scratch.reached()) {
            *seen |= reached;
        }
    }
    goals
}

/// Breadth-first pulls from the goal positions until the deadline or the
/// arena's capacity is reached.
pub fn build_perimeter(request: &EngineRequest<'_>, arena: &mut SearchArena, attempt: &mut AttemptState) {
    let level = request.level;
    let limit = arena.capacity();
    let mut scratch = Scratch::new(level);
    let perimeter = &mut arena.caches.perimeter;
    perimeter.clear();

    let initial = Position::root(level, request.board);
    let mut queue = VecDeque::new();
    for goal in goal_positions(level, &mut scratch) {
        if let Some(id) = perimeter.insert_goal(goal) {
            queue.push_back(id);
        }
    }
    let goals = perimeter.len();

    'search: while let Some(id) = queue.pop_front() {
        if request.expired() {
            break;
        }
        let Some(position) = perimeter.position(id).cloned() else {
            continue;
        };
        for (push, child) in scratch.pulls(level, &position) {
            let Some(child_id) = perimeter.insert(child, push, id) else {
                continue;
            };
            if perimeter.position(child_id) == initial.as_ref() {
                attempt.record_solution(perimeter.moves_to_goal(child_id));
                break 'search;
            }
            if perimeter.len() >= limit {
                break 'search;
            }
            queue.push_back(child_id);
        }
    }

    attempt.perimeter_found = perimeter.len() > goals;
    debug!(
        worker = attempt.worker,
        positions = perimeter.len(),
        goals,
        solved = attempt.solved,
        "perimeter built"
    );
}
