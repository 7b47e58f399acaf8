//! Position scoring for the best-first searches

use crate::level::{Level, UNREACHABLE};
use crate::resources::attempt::NO_ZONE;
use crate::resources::DistanceCache;
use crate::search::config::SearchType;

use super::Position;

/// Weight applied to the heuristic once the forward search turns greedy.
pub const WEIGHTED_FACTOR: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Sum of each box's distance to its nearest target
    Simple,
    /// Greedy box-to-target assignment
    Matching,
}

/// How a search type scores positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub bound: Bound,
    /// Reward per target filled in packing order
    pub packing_bonus: i64,
    /// Reward per box inside the room holding every target
    pub room_bonus: i64,
    /// Penalty per box sitting next to a target but not on one
    pub envelope_penalty: i64,
    /// Reward per box settled in a dead-end target
    pub hole_bonus: i64,
}

impl Profile {
    pub fn for_type(search_type: SearchType) -> Self {
        let base = Profile {
            bound: Bound::Matching,
            packing_bonus: 0,
            room_bonus: 0,
            envelope_penalty: 0,
            hole_bonus: 0,
        };
        match search_type {
            SearchType::Base | SearchType::ForwardWithBases => Profile {
                packing_bonus: 2,
                hole_bonus: 1,
                ..base
            },
            SearchType::Girl => Profile {
                packing_bonus: 3,
                room_bonus: 1,
                hole_bonus: 1,
                ..base
            },
            SearchType::Hf | SearchType::Netlock => Profile {
                packing_bonus: 1,
                ..base
            },
            SearchType::Bicon => Profile {
                envelope_penalty: 1,
                ..base
            },
            SearchType::MaxDist | SearchType::MaxDist2 => base,
            SearchType::Snail => Profile {
                bound: Bound::Simple,
                packing_bonus: 1,
                ..base
            },
            SearchType::Rev | SearchType::Naive | SearchType::Dragonfly => Profile {
                bound: Bound::Simple,
                ..base
            },
        }
    }
}

/// Sum over boxes of the distance to the nearest target, or `None` when a
/// box can no longer reach any target.
pub fn simple_bound(level: &Level, boxes: &[u16]) -> Option<u32> {
    boxes.iter().try_fold(0u32, |acc, &b| {
        let d = level.distances.to_any(b);
        (d != UNREACHABLE).then_some(acc + d as u32)
    })
}

/// Greedy assignment of boxes to distinct targets, shortest pairs first.
/// Boxes left without a target fall back to their nearest one.
pub fn matching_bound(level: &Level, boxes: &[u16], cache: &mut DistanceCache) -> Option<u32> {
    let key = level.zobrist.hash_boxes(boxes);
    if let Some(hit) = cache.get(key) {
        return (hit != u32::MAX).then_some(hit);
    }

    let targets = level.distances.target_count();
    let mut pairs = Vec::with_capacity(boxes.len() * targets);
    for (bi, &b) in boxes.iter().enumerate() {
        for t in 0..targets {
            let d = level.distances.to_target(t, b);
            if d != UNREACHABLE {
                pairs.push((d, bi, t));
            }
        }
    }
    pairs.sort_unstable();

    let mut box_done = vec![false; boxes.len()];
    let mut target_done = vec![false; targets];
    let mut total = 0u32;
    for (d, bi, t) in pairs {
        if !box_done[bi] && !target_done[t] {
            box_done[bi] = true;
            target_done[t] = true;
            total += d as u32;
        }
    }

    let mut result = Some(total);
    for (bi, &b) in boxes.iter().enumerate() {
        if box_done[bi] {
            continue;
        }
        let d = level.distances.to_any(b);
        if d == UNREACHABLE {
            result = None;
            break;
        }
        total += d as u32;
        result = Some(total);
    }

    cache.insert(key, result.unwrap_or(u32::MAX));
    result
}

/// Length of the packing-order prefix already holding boxes.
pub fn packed_prefix(order: &[u16], boxes: &[u16]) -> usize {
    order
        .iter()
        .take_while(|&&t| boxes.binary_search(&t).is_ok())
        .count()
}

/// Scores positions for one engine run.
#[derive(Debug, Clone)]
pub struct Scorer<'a> {
    level: &'a Level,
    profile: Profile,
    weight: i64,
    order: Vec<u16>,
}

impl<'a> Scorer<'a> {
    pub fn new(level: &'a Level, search_type: SearchType, weighted: bool, zones: &[u32]) -> Self {
        let mut ranked: Vec<(u32, u16)> = zones
            .iter()
            .enumerate()
            .filter(|&(_, &z)| z != NO_ZONE)
            .map(|(cell, &z)| (z, cell as u16))
            .collect();
        ranked.sort_unstable();
        Self {
            level,
            profile: Profile::for_type(search_type),
            weight: if weighted { WEIGHTED_FACTOR } else { 1 },
            order: ranked.into_iter().map(|(_, cell)| cell).collect(),
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Heuristic estimate, or `None` when the position is hopeless.
    pub fn estimate(&self, position: &Position, cache: &mut DistanceCache) -> Option<i64> {
        let level = self.level;
        let bound = match self.profile.bound {
            Bound::Simple => simple_bound(level, &position.boxes)?,
            Bound::Matching => matching_bound(level, &position.boxes, cache)?,
        };

        let mut h = bound as i64;
        if self.profile.packing_bonus > 0 && !self.order.is_empty() {
            h -= self.profile.packing_bonus * packed_prefix(&self.order, &position.boxes) as i64;
        }
        if self.profile.room_bonus > 0 {
            if let Some(room) = level.shape.girl_room {
                let inside = position
                    .boxes
                    .iter()
                    .filter(|&&b| level.rooms.room_of(b) == Some(room))
                    .count();
                h -= self.profile.room_bonus * inside as i64;
            }
        }
        if self.profile.envelope_penalty > 0 {
            let stuck = position
                .boxes
                .iter()
                .filter(|&&b| level.patterns.envelope[b as usize])
                .count();
            h += self.profile.envelope_penalty * stuck as i64;
        }
        if self.profile.hole_bonus > 0 {
            let settled = position
                .boxes
                .iter()
                .filter(|&&b| level.target_holes[b as usize])
                .count();
            h -= self.profile.hole_bonus * settled as i64;
        }
        Some(h)
    }

    /// Priority of a node: lower is expanded first.
    pub fn priority(&self, depth: u32, h: i64) -> i64 {
        depth as i64 + self.weight * h
    }
}
