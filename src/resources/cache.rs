//! Board-keyed caches
//!
//! Every entry is derived from one specific puzzle, so the whole set is
//! cleared whenever a new board is preprocessed.

use fnv::FnvHashMap;

use crate::board::Move;
use crate::engine::Position;

/// Entries kept per cache before it is flushed.
pub const CACHE_LIMIT: usize = 1 << 20;

/// Hash-keyed memo that drops everything once it grows past its limit.
#[derive(Debug, Clone)]
pub struct BoundedCache<V> {
    entries: FnvHashMap<u64, V>,
    limit: usize,
}

impl<V: Copy> BoundedCache<V> {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: FnvHashMap::default(),
            limit,
        }
    }

    pub fn get(&self, key: u64) -> Option<V> {
        self.entries.get(&key).copied()
    }

    pub fn insert(&mut self, key: u64, value: V) {
        if self.entries.len() >= self.limit {
            self.entries.clear();
        }
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V: Copy> Default for BoundedCache<V> {
    fn default() -> Self {
        Self::with_limit(CACHE_LIMIT)
    }
}

/// Box-configuration hash to "is deadlocked".
pub type DeadlockCache = BoundedCache<bool>;
/// Box-configuration hash to heuristic lower bound.
pub type DistanceCache = BoundedCache<u32>;

#[derive(Debug, Clone)]
struct PerimeterEntry {
    position: Position,
    /// Forward push leading one step closer to a goal, and the entry it reaches.
    toward_goal: Option<(Move, usize)>,
}

/// Positions proven to reach a goal position, found by pulling boxes back
/// from the solved configuration.
#[derive(Debug, Clone, Default)]
pub struct Perimeter {
    entries: Vec<PerimeterEntry>,
    index: FnvHashMap<Position, usize>,
}

impl Perimeter {
    /// Add a solved position. Returns `None` if it was already present.
    pub fn insert_goal(&mut self, position: Position) -> Option<usize> {
        self.insert_entry(position, None)
    }

    /// Add a position one push away from entry `next`.
    pub fn insert(&mut self, position: Position, push: Move, next: usize) -> Option<usize> {
        self.insert_entry(position, Some((push, next)))
    }

    fn insert_entry(&mut self, position: Position, toward_goal: Option<(Move, usize)>) -> Option<usize> {
        if self.index.contains_key(&position) {
            return None;
        }
        let id = self.entries.len();
        self.index.insert(position.clone(), id);
        self.entries.push(PerimeterEntry {
            position,
            toward_goal,
        });
        Some(id)
    }

    pub fn lookup(&self, position: &Position) -> Option<usize> {
        self.index.get(position).copied()
    }

    pub fn position(&self, id: usize) -> Option<&Position> {
        self.entries.get(id).map(|e| &e.position)
    }

    /// Pushes leading from entry `id` to the goal it was pulled from.
    pub fn moves_to_goal(&self, id: usize) -> Vec<Move> {
        let mut moves = Vec::new();
        let mut current = self.entries.get(id);
        while let Some((push, next)) = current.and_then(|e| e.toward_goal) {
            moves.push(push);
            current = self.entries.get(next);
        }
        moves
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct PuzzleCaches {
    pub deadlock: DeadlockCache,
    pub distance: DistanceCache,
    pub perimeter: Perimeter,
}

impl PuzzleCaches {
    pub fn clear(&mut self) {
        self.deadlock.clear();
        self.distance.clear();
        self.perimeter.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.deadlock.is_empty() && self.distance.is_empty() && self.perimeter.is_empty()
    }
}
