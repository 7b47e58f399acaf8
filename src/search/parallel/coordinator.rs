//! Parallel schedule coordinator that manages worker threads.

use crossbeam_channel::RecvTimeoutError;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::board::Board;
use crate::level::Level;
use crate::resources::Worker;
use crate::search::context::RunContext;
use crate::search::controller::{solve_work_element, WorkElement};
use crate::search::parallel::channel::{create_channels, CoordinatorChannels, WorkerChannels, WorkerMessage};
use crate::search::parallel::strategies_for_worker;
use crate::search::schedule::{ScheduleOutcome, Winner};
use crate::search::strategy::Strategy;
use crate::search::SearchEngines;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Split the roster over every worker in `workers` and run until each worker
/// has either exhausted its strategies or seen a win.
pub fn run_parallel_schedule<E: SearchEngines + ?Sized>(
    engines: &E,
    level: &Level,
    board: &Board,
    ctx: &RunContext,
    workers: &mut [Worker],
) -> ScheduleOutcome {
    let num_workers = workers.len();
    let (coordinator_channels, worker_channels) = create_channels(num_workers);

    thread::scope(|s| {
        for (worker, channels) in workers.iter_mut().zip(worker_channels) {
            let strategies = strategies_for_worker(worker.index, num_workers);
            s.spawn(move || run_worker(engines, level, board, ctx, worker, &strategies, channels));
        }

        run_coordinator(coordinator_channels, ctx)
    })
}

/// Collect messages until every worker has hung up.
fn run_coordinator(channels: CoordinatorChannels, ctx: &RunContext) -> ScheduleOutcome {
    let mut outcome = ScheduleOutcome::default();
    let mut finished = 0usize;

    loop {
        match channels.from_workers.recv_timeout(POLL_INTERVAL) {
            Ok(WorkerMessage::Attempt(record)) => {
                trace!(
                    worker = record.worker,
                    strategy = %record.strategy,
                    solved = record.solved,
                    "attempt finished"
                );
                outcome.attempts.push(record);
            }
            Ok(WorkerMessage::Solved {
                worker_id,
                strategy,
                moves,
            }) => {
                info!(worker = worker_id, strategy = %strategy, pushes = moves.len(), "puzzle solved");
                outcome.winner = Some(Winner {
                    worker: worker_id,
                    strategy,
                    moves,
                });
            }
            Ok(WorkerMessage::Finished { worker_id }) => {
                finished += 1;
                debug!(worker = worker_id, finished, "worker finished");
            }
            Err(RecvTimeoutError::Timeout) => {
                if ctx.remaining().is_zero() {
                    trace!("time limit reached, waiting for workers to return");
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    debug_assert!(outcome.winner.is_none() || channels.solved.is_claimed());
    outcome
}

/// Run this worker's share of the roster. Each strategy gets an equal share
/// of what is left of the global budget among the strategies still to run.
fn run_worker<E: SearchEngines + ?Sized>(
    engines: &E,
    level: &Level,
    board: &Board,
    ctx: &RunContext,
    worker: &mut Worker,
    strategies: &[Strategy],
    channels: WorkerChannels,
) {
    let worker_id = worker.index;

    for (k, &strategy) in strategies.iter().enumerate() {
        if channels.solved.is_claimed() {
            debug!(worker = worker_id, "another worker solved the puzzle, stopping");
            break;
        }

        let budget = ctx.search_time(1.0 / (strategies.len() - k) as f64);
        let work = WorkElement::prepare(board, budget, strategy, &mut worker.attempt);
        let record = solve_work_element(engines, level, work, &mut worker.arena);
        channels.report(WorkerMessage::Attempt(record));

        if worker.attempt.solved {
            if channels.solved.claim() {
                let delivered = channels.report(WorkerMessage::Solved {
                    worker_id,
                    strategy,
                    moves: worker.attempt.moves.clone(),
                });
                if !delivered {
                    info!(worker = worker_id, strategy = %strategy, "winning solution was not delivered");
                }
            } else {
                debug!(worker = worker_id, strategy = %strategy, "solved, but another worker was first");
            }
            break;
        }
    }

    channels.report(WorkerMessage::Finished { worker_id });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Direction, Move};
    use crate::resources::{AttemptState, MemoryConfig, ResourcePool, SearchArena};
    use crate::search::EngineRequest;
    use std::sync::Mutex;

    /// Solves on the driver only for worker `winner`, records every call.
    struct OnlyWorker {
        winner: usize,
        calls: Mutex<Vec<(usize, crate::search::SearchType)>>,
    }

    impl SearchEngines for OnlyWorker {
        fn driver_search(&self, request: &EngineRequest<'_>, _arena: &mut SearchArena, attempt: &mut AttemptState) {
            self.calls.lock().unwrap().push((attempt.worker, request.search_type));
            if attempt.worker == self.winner {
                attempt.record_solution(vec![Move {
                    from: 2,
                    to: 3,
                    sokoban_position: Direction::Left,
                    pull: false,
                }]);
            }
        }

        fn packing_search(&self, request: &EngineRequest<'_>, _arena: &mut SearchArena, attempt: &mut AttemptState) {
            self.calls.lock().unwrap().push((attempt.worker, request.search_type));
            attempt.parking_order = request.level.targets.clone();
            attempt.perimeter_found = true;
        }

        fn dragonfly_search(&self, request: &EngineRequest<'_>, _arena: &mut SearchArena, attempt: &mut AttemptState) {
            self.calls.lock().unwrap().push((attempt.worker, request.search_type));
        }
    }

    #[test]
    fn test_single_winner_reported() {
        let level = crate::engine::test_support::level("######\n#@$ .#\n######");
        let engines = OnlyWorker {
            winner: 1,
            calls: Mutex::new(Vec::new()),
        };
        let mut pool = ResourcePool::allocate(2, &MemoryConfig::default().with_log_size(8)).unwrap();
        let ctx = RunContext::start(Duration::from_secs(2));

        let outcome = run_parallel_schedule(&engines, &level, &level.initial_board, &ctx, pool.workers_mut());

        let winner = outcome.winner.expect("worker 1 solves on its first strategy");
        assert_eq!(winner.worker, 1);
        assert_eq!(winner.strategy, Strategy::B);
        assert_eq!(winner.moves.len(), 1);
        assert!(outcome.attempts.iter().any(|a| a.worker == 1 && a.solved));
        assert!(outcome.attempts.iter().all(|a| a.worker != 1 || a.strategy == Strategy::B));
    }

    #[test]
    fn test_no_winner_runs_whole_roster() {
        let level = crate::engine::test_support::level("######\n#@$ .#\n######");
        let engines = OnlyWorker {
            winner: usize::MAX,
            calls: Mutex::new(Vec::new()),
        };
        let mut pool = ResourcePool::allocate(4, &MemoryConfig::default().with_log_size(8)).unwrap();
        let ctx = RunContext::start(Duration::from_secs(2));

        let outcome = run_parallel_schedule(&engines, &level, &level.initial_board, &ctx, pool.workers_mut());

        assert!(outcome.winner.is_none());
        assert_eq!(outcome.attempts.len(), 8);
        for attempt in &outcome.attempts {
            assert_eq!(attempt.strategy.index() % 4, attempt.worker);
        }
    }
}
