//! Strategy scheduling over pluggable search engines
//!
//! This module decides which strategy runs, for how long and on which worker:
//! - `strategy`: the fixed roster of backward/forward pairs
//! - `controller`: the two-phase protocol for one strategy
//! - `schedule`: the sequential time-sliced schedule and the [`Solver`] entry point
//! - `parallel`: the multi-worker schedule with first-solution-wins
//!
//! The engines themselves sit behind [`SearchEngines`].

pub mod config;
pub mod context;
pub mod controller;
pub mod parallel;
pub mod result;
pub mod schedule;
pub mod strategy;

pub use config::{SearchType, SolverConfig};
pub use context::RunContext;
pub use result::{AttemptRecord, SolveResult, SolveStatistics, SolveStatus};
pub use schedule::Solver;
pub use strategy::Strategy;

use std::time::{Duration, Instant};

use crate::board::Board;
use crate::level::Level;
use crate::resources::{AttemptState, SearchArena};

/// One engine invocation: what to search, on which board and until when.
#[derive(Debug, Clone, Copy)]
pub struct EngineRequest<'a> {
    pub level: &'a Level,
    /// The work element's private copy of the puzzle
    pub board: &'a Board,
    pub search_type: SearchType,
    pub time_allocation: Duration,
    pub deadline: Instant,
}

impl<'a> EngineRequest<'a> {
    pub fn new(level: &'a Level, board: &'a Board, search_type: SearchType, time_allocation: Duration) -> Self {
        Self {
            level,
            board,
            search_type,
            time_allocation,
            deadline: Instant::now() + time_allocation,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// The three engine entry points the controller drives.
///
/// Engines report through `attempt`: `solved` and `moves` on success,
/// `parking_order` and `perimeter_found` from the backward phase. They must
/// return once `request.deadline` has passed and must not allocate nodes
/// beyond the arena's capacity.
pub trait SearchEngines: Sync {
    /// Generic best-first driver.
    fn driver_search(&self, request: &EngineRequest<'_>, arena: &mut SearchArena, attempt: &mut AttemptState);

    /// Backward phase: packing order, or the perimeter for reverse search.
    fn packing_search(&self, request: &EngineRequest<'_>, arena: &mut SearchArena, attempt: &mut AttemptState);

    /// Tree-less depth-first search.
    fn dragonfly_search(&self, request: &EngineRequest<'_>, arena: &mut SearchArena, attempt: &mut AttemptState);
}
