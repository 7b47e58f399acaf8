//! Generic best-first tree search
//!
//! Nodes live in the worker's [`SearchArena`]; the open list is a binary heap
//! of arena ids ordered by [`Scorer::priority`]. The search ends on a goal, on
//! an empty open list, on a full arena or when the request's deadline passes.
//! The deadline is checked before every child is scored, since scoring a
//! crowded position can take longer than a whole small search.
//! With a non-empty perimeter it also ends as soon as a generated position is
//! a perimeter member, and the stored pushes complete the solution.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fnv::FnvHashSet;
use tracing::{debug, trace};

use super::deadlock::is_deadlocked;
use super::heuristic::Scorer;
use super::position::{Position, Scratch};
use crate::resources::{AttemptState, SearchArena};
use crate::search::config::SearchType;
use crate::search::EngineRequest;

pub fn best_first(request: &EngineRequest<'_>, arena: &mut SearchArena, attempt: &mut AttemptState) {
    let level = request.level;
    let Some(root) = Position::root(level, request.board) else {
        attempt.fail("board does not match the level");
        return;
    };

    if root.is_solved(level) {
        attempt.record_solution(Vec::new());
        return;
    }

    let use_perimeter =
        request.search_type == SearchType::Rev && !arena.caches.perimeter.is_empty();
    if use_perimeter {
        if let Some(entry) = arena.caches.perimeter.lookup(&root) {
            attempt.record_solution(arena.caches.perimeter.moves_to_goal(entry));
            return;
        }
    }

    let scorer = Scorer::new(level, request.search_type, attempt.weighted_search, &attempt.zones);
    let mut scratch = Scratch::new(level);
    let mut seen: FnvHashSet<Position> = FnvHashSet::default();
    let mut open = BinaryHeap::new();

    arena.begin_epoch();
    let Some(h) = scorer.estimate(&root, &mut arena.caches.distance) else {
        attempt.fail("initial position is dead");
        return;
    };
    let root_id = match arena.alloc(None, None, root.clone(), 0) {
        Ok(id) => id,
        Err(full) => {
            attempt.fail(full.to_string());
            return;
        }
    };
    seen.insert(root);
    open.push(Reverse((scorer.priority(0, h), root_id)));

    let mut expanded = 0u64;
    'search: while let Some(Reverse((_, id))) = open.pop() {
        expanded += 1;
        if request.expired() {
            attempt.fail("time limit");
            break;
        }

        let Some(node) = arena.get(id) else {
            continue;
        };
        let depth = node.depth + 1;
        let parent = node.position.clone();

        for (m, child) in scratch.pushes(level, &parent) {
            if request.expired() {
                attempt.fail("time limit");
                break 'search;
            }
            if seen.contains(&child) {
                continue;
            }
            if is_deadlocked(level, &child.boxes, m.to, &mut arena.caches.deadlock) {
                continue;
            }
            let Some(h) = scorer.estimate(&child, &mut arena.caches.distance) else {
                continue;
            };

            let solved = child.is_solved(level);
            let perimeter_hit = if use_perimeter {
                arena.caches.perimeter.lookup(&child)
            } else {
                None
            };

            seen.insert(child.clone());
            let child_id = match arena.alloc(Some(id), Some(m), child, depth) {
                Ok(child_id) => child_id,
                Err(full) => {
                    debug!(worker = attempt.worker, expanded, "{}", full);
                    attempt.fail(full.to_string());
                    return;
                }
            };

            if solved || perimeter_hit.is_some() {
                let mut moves = arena.moves_to(child_id);
                if let Some(entry) = perimeter_hit {
                    moves.extend(arena.caches.perimeter.moves_to_goal(entry));
                }
                trace!(
                    worker = attempt.worker,
                    expanded,
                    pushes = moves.len(),
                    "best-first search reached a goal"
                );
                attempt.record_solution(moves);
                return;
            }

            open.push(Reverse((scorer.priority(depth, h), child_id)));
        }
    }

    if attempt.fail_reason.is_none() {
        attempt.fail("search space exhausted");
    }
    trace!(worker = attempt.worker, expanded, nodes = arena.len(), "best-first search gave up");
}
