//! Fixed-capacity node store for the tree searches
//!
//! The arena is allocated lazily up to `2^log_size` nodes and is never freed
//! while the pool lives. Each engine run opens a new epoch and rewinds the
//! write cursor; slots past the cursor still hold nodes from earlier epochs
//! and are overwritten in place. [`SearchArena::get`] refuses stale slots.

use thiserror::Error;

use super::cache::PuzzleCaches;
use crate::board::Move;
use crate::engine::Position;

pub type NodeId = u32;

#[derive(Debug, Clone)]
pub struct Node {
    pub epoch: u32,
    pub parent: Option<NodeId>,
    pub last_move: Option<Move>,
    pub position: Position,
    pub depth: u32,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("search arena is full ({capacity} nodes)")]
pub struct ArenaFull {
    pub capacity: usize,
}

#[derive(Debug)]
pub struct SearchArena {
    log_size: u32,
    capacity: usize,
    nodes: Vec<Node>,
    cursor: usize,
    epoch: u32,
    /// Board-keyed caches living next to the node store.
    pub caches: PuzzleCaches,
}

impl SearchArena {
    pub fn new(log_size: u32) -> Self {
        Self {
            log_size,
            capacity: 1usize << log_size,
            nodes: Vec::new(),
            cursor: 0,
            epoch: 0,
            caches: PuzzleCaches::default(),
        }
    }

    pub fn log_size(&self) -> u32 {
        self.log_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Nodes written in the current epoch.
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Slots still holding nodes from earlier epochs.
    pub fn stale_slots(&self) -> usize {
        self.nodes.len() - self.cursor
    }

    /// Start a new search over the same memory.
    pub fn begin_epoch(&mut self) -> u32 {
        self.epoch = self.epoch.wrapping_add(1);
        self.cursor = 0;
        self.epoch
    }

    pub fn alloc(
        &mut self,
        parent: Option<NodeId>,
        last_move: Option<Move>,
        position: Position,
        depth: u32,
    ) -> Result<NodeId, ArenaFull> {
        let full = ArenaFull {
            capacity: self.capacity,
        };
        if self.cursor >= self.capacity {
            return Err(full);
        }

        let node = Node {
            epoch: self.epoch,
            parent,
            last_move,
            position,
            depth,
        };

        if self.cursor < self.nodes.len() {
            self.nodes[self.cursor] = node;
        } else {
            if self.nodes.len() == self.nodes.capacity() {
                let additional = self
                    .nodes
                    .len()
                    .max(1024)
                    .min(self.capacity - self.nodes.len());
                self.nodes.try_reserve_exact(additional).map_err(|_| full)?;
            }
            self.nodes.push(node);
        }

        let id = self.cursor as NodeId;
        self.cursor += 1;
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        let index = id as usize;
        if index >= self.cursor {
            return None;
        }
        self.nodes.get(index).filter(|n| n.epoch == self.epoch)
    }

    /// Moves leading from the root of the current epoch to `id`.
    pub fn moves_to(&self, id: NodeId) -> Vec<Move> {
        let mut moves = Vec::new();
        let mut current = self.get(id);
        while let Some(node) = current {
            if let Some(m) = node.last_move {
                moves.push(m);
            }
            current = node.parent.and_then(|p| self.get(p));
        }
        moves.reverse();
        moves
    }
}
