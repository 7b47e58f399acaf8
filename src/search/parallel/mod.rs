//! Parallel strategy execution over several workers.
//!
//! # Architecture
//!
//! - Each **worker** is a scoped thread owning one [`Worker`](crate::resources::Worker)
//!   (search arena plus attempt state) and a private copy of the board. Worker
//!   `w` of `N` runs the roster entries `w, w + N, ...` with the same shrinking
//!   budget fractions as the sequential schedule.
//! - The **coordinator** collects attempt records and the winning solution
//!   from a channel.
//! - A **solved slot** resolves the race: the first worker to claim it is
//!   authoritative. Other workers are never interrupted inside an engine
//!   call; they simply start no further strategy.

pub mod channel;
pub mod coordinator;

pub use coordinator::run_parallel_schedule;

use crate::search::strategy::Strategy;

/// Roster entries worker `worker` of `workers` is responsible for.
pub fn strategies_for_worker(worker: usize, workers: usize) -> Vec<Strategy> {
    Strategy::ROSTER
        .iter()
        .copied()
        .skip(worker)
        .step_by(workers.max(1))
        .collect()
}
