//! Depth-first search that keeps no node tree
//!
//! Children are visited best heuristic first and the current path is the only
//! history kept. Positions already visited are skipped; the visited set is
//! capped at the arena's capacity so the memory footprint matches the
//! smaller tree this worker was given.

use fnv::FnvHashSet;
use tracing::trace;

use super::deadlock::is_deadlocked;
use super::heuristic::Scorer;
use super::position::{Position, Scratch};
use crate::board::Move;
use crate::resources::{AttemptState, SearchArena};
use crate::search::EngineRequest;

struct Frame {
    /// Unvisited children, best last.
    children: Vec<(Move, Position)>,
}

pub fn dragonfly_search(request: &EngineRequest<'_>, arena: &mut SearchArena, attempt: &mut AttemptState) {
    let level = request.level;
    let Some(root) = Position::root(level, request.board) else {
        attempt.fail("board does not match the level");
        return;
    };
    if root.is_solved(level) {
        attempt.record_solution(Vec::new());
        return;
    }

    let scorer = Scorer::new(level, request.search_type, false, &attempt.zones);
    let limit = arena.capacity();
    let caches = &mut arena.caches;
    let mut scratch = Scratch::new(level);

    let mut expand = |position: &Position, scratch: &mut Scratch| -> Vec<(Move, Position)> {
        let mut scored: Vec<(i64, Move, Position)> = Vec::new();
        for (m, child) in scratch.pushes(level, position) {
            // the main loop notices the deadline and gives up
            if request.expired() {
                break;
            }
            if is_deadlocked(level, &child.boxes, m.to, &mut caches.deadlock) {
                continue;
            }
            if let Some(h) = scorer.estimate(&child, &mut caches.distance) {
                scored.push((h, m, child));
            }
        }
        // reversed so the best child is popped first
        scored.sort_by_key(|(h, _, _)| std::cmp::Reverse(*h));
        scored.into_iter().map(|(_, m, p)| (m, p)).collect()
    };

    let mut visited: FnvHashSet<Position> = FnvHashSet::default();
    visited.insert(root.clone());
    let mut path: Vec<Move> = Vec::new();
    let mut stack = vec![Frame {
        children: expand(&root, &mut scratch),
    }];

    let mut steps = 0u64;
    while let Some(frame) = stack.last_mut() {
        steps += 1;
        if request.expired() {
            attempt.fail("time limit");
            return;
        }

        let Some((m, child)) = frame.children.pop() else {
            stack.pop();
            path.pop();
            continue;
        };

        if visited.len() >= limit {
            attempt.fail("visited set is full");
            return;
        }
        if !visited.insert(child.clone()) {
            continue;
        }

        path.push(m);
        if child.is_solved(level) {
            trace!(worker = attempt.worker, steps, pushes = path.len(), "dragonfly reached a goal");
            attempt.record_solution(path);
            return;
        }
        let children = expand(&child, &mut scratch);
        stack.push(Frame { children });
    }

    attempt.fail("search space exhausted");
}
