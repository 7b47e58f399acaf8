//! Per-worker search resources
//!
//! The pool is allocated once per process: one [`Worker`] per core, each with
//! its own [`SearchArena`] and [`AttemptState`]. Nothing is shared between
//! workers except the read-only level.

pub mod arena;
pub mod attempt;
pub mod cache;

pub use arena::{ArenaFull, Node, NodeId, SearchArena};
pub use attempt::AttemptState;
pub use cache::{DeadlockCache, DistanceCache, Perimeter, PuzzleCaches};

use thiserror::Error;
use tracing::{debug, trace};

/// Worker counts the scheduler knows how to split the roster over.
pub const SUPPORTED_WORKER_COUNTS: [usize; 4] = [1, 2, 4, 8];

/// The last worker of a full pool runs the dragonfly strategy, which does
/// not need a large tree.
pub const DRAGONFLY_WORKER: usize = 7;
const DRAGONFLY_LOG_REDUCTION: i32 = 3;

pub const MIN_LOG_SIZE: i32 = 4;
pub const MAX_LOG_SIZE: i32 = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Number of cores should be 1/2/4/8, got {0}")]
    WorkerCount(usize),
    #[error("search tree log size {0} is outside {MIN_LOG_SIZE}..={MAX_LOG_SIZE}")]
    LogSize(i32),
}

/// Search tree sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Base-2 logarithm of the node capacity of each tree.
    pub log_size: u32,
    /// Added to `log_size` for every worker.
    pub extra_mem: i32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            log_size: 20,
            extra_mem: 0,
        }
    }
}

impl MemoryConfig {
    pub fn with_log_size(mut self, log_size: u32) -> Self {
        self.log_size = log_size;
        self
    }

    pub fn with_extra_mem(mut self, extra_mem: i32) -> Self {
        self.extra_mem = extra_mem;
        self
    }

    pub fn log_size_for(&self, worker: usize) -> Result<u32, ConfigError> {
        let mut log_size = self.log_size as i32 + self.extra_mem;
        if worker == DRAGONFLY_WORKER {
            log_size -= DRAGONFLY_LOG_REDUCTION;
        }
        if !(MIN_LOG_SIZE..=MAX_LOG_SIZE).contains(&log_size) {
            return Err(ConfigError::LogSize(log_size));
        }
        Ok(log_size as u32)
    }
}

#[derive(Debug)]
pub struct Worker {
    pub index: usize,
    pub arena: SearchArena,
    pub attempt: AttemptState,
}

#[derive(Debug)]
pub struct ResourcePool {
    workers: Vec<Worker>,
}

impl ResourcePool {
    pub fn allocate(worker_count: usize, memory: &MemoryConfig) -> Result<Self, ConfigError> {
        if !SUPPORTED_WORKER_COUNTS.contains(&worker_count) {
            return Err(ConfigError::WorkerCount(worker_count));
        }

        let workers = (0..worker_count)
            .map(|index| {
                let log_size = memory.log_size_for(index)?;
                debug!(worker = index, log_size, "allocating search tree");
                Ok(Worker {
                    index,
                    arena: SearchArena::new(log_size),
                    attempt: AttemptState::new(index),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { workers })
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn worker_mut(&mut self, index: usize) -> &mut Worker {
        &mut self.workers[index]
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn workers_mut(&mut self) -> &mut [Worker] {
        &mut self.workers
    }

    /// Invalidate everything derived from the previous puzzle.
    pub fn clear_caches(&mut self) {
        for worker in &mut self.workers {
            worker.arena.caches.clear();
        }
    }

    pub fn reset_attempts(&mut self) {
        for worker in &mut self.workers {
            worker.attempt.reset();
        }
    }
}

impl Drop for ResourcePool {
    fn drop(&mut self) {
        trace!(workers = self.workers.len(), "releasing search trees");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_rejects_unsupported_counts() {
        let memory = MemoryConfig::default().with_log_size(8);
        assert_eq!(
            ResourcePool::allocate(3, &memory).unwrap_err(),
            ConfigError::WorkerCount(3)
        );
        assert!(ResourcePool::allocate(0, &memory).is_err());
        assert_eq!(ResourcePool::allocate(4, &memory).unwrap().len(), 4);
    }

    #[test]
    fn test_last_of_eight_workers_gets_smaller_tree() {
        let memory = MemoryConfig::default().with_log_size(10).with_extra_mem(1);
        let pool = ResourcePool::allocate(8, &memory).unwrap();
        assert_eq!(pool.workers()[0].arena.log_size(), 11);
        assert_eq!(pool.workers()[7].arena.log_size(), 8);
        assert_eq!(pool.workers()[7].attempt.worker, 7);
    }

    #[test]
    fn test_log_size_out_of_range() {
        let memory = MemoryConfig::default().with_log_size(5).with_extra_mem(-4);
        assert_eq!(memory.log_size_for(0), Err(ConfigError::LogSize(1)));
    }
}
