//! Time-sliced strategy schedule and the solver entry point

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::board::{Board, Move};
use crate::engine::BuiltinEngines;
use crate::level::Level;
use crate::preprocess::preprocess;
use crate::resources::{ConfigError, ResourcePool, Worker};
use crate::search::config::SolverConfig;
use crate::search::context::RunContext;
use crate::search::controller::{solve_work_element, WorkElement};
use crate::search::parallel::run_parallel_schedule;
use crate::search::result::{AttemptRecord, SolveResult, SolveStatistics, SolveStatus};
use crate::search::strategy::Strategy;
use crate::search::SearchEngines;

/// The strategy that solved the puzzle and where it ran.
#[derive(Debug, Clone)]
pub struct Winner {
    pub worker: usize,
    pub strategy: Strategy,
    pub moves: Vec<Move>,
}

/// What a schedule produced, solved or not.
#[derive(Debug, Clone, Default)]
pub struct ScheduleOutcome {
    pub winner: Option<Winner>,
    pub attempts: Vec<AttemptRecord>,
}

/// Run the whole roster on one worker. Strategy `i` receives `1 / (8 - i)`
/// of whatever is left of the global budget, so later strategies inherit
/// the time earlier ones did not use.
pub fn run_sequential_schedule<E: SearchEngines + ?Sized>(
    engines: &E,
    level: &Level,
    board: &Board,
    ctx: &RunContext,
    worker: &mut Worker,
) -> ScheduleOutcome {
    let mut outcome = ScheduleOutcome::default();
    let total = Strategy::ROSTER.len();

    for (i, &strategy) in Strategy::ROSTER.iter().enumerate() {
        let budget = ctx.search_time(1.0 / (total - i) as f64);
        if budget.is_zero() {
            debug!(strategy = %strategy, "no time left, skipping");
            continue;
        }

        let work = WorkElement::prepare(board, budget, strategy, &mut worker.attempt);
        let record = solve_work_element(engines, level, work, &mut worker.arena);
        outcome.attempts.push(record);

        if worker.attempt.solved {
            outcome.winner = Some(Winner {
                worker: worker.index,
                strategy,
                moves: worker.attempt.moves.clone(),
            });
            break;
        }
    }

    outcome
}

/// Run a single strategy with the whole remaining budget.
pub fn run_forced_strategy<E: SearchEngines + ?Sized>(
    engines: &E,
    level: &Level,
    board: &Board,
    ctx: &RunContext,
    worker: &mut Worker,
    strategy: Strategy,
) -> ScheduleOutcome {
    let work = WorkElement::prepare(board, ctx.remaining(), strategy, &mut worker.attempt);
    let record = solve_work_element(engines, level, work, &mut worker.arena);

    let winner = worker.attempt.solved.then(|| Winner {
        worker: worker.index,
        strategy,
        moves: worker.attempt.moves.clone(),
    });

    ScheduleOutcome {
        winner,
        attempts: vec![record],
    }
}

/// Solves puzzles with a fixed worker pool.
///
/// The pool is allocated once in [`Solver::new`] and reused for every puzzle
/// passed to [`Solver::solve`]; each solve starts by clearing what the
/// previous one left behind.
pub struct Solver<E: SearchEngines = BuiltinEngines> {
    config: SolverConfig,
    pool: ResourcePool,
    engines: E,
}

impl Solver<BuiltinEngines> {
    pub fn new(config: SolverConfig) -> Result<Self, ConfigError> {
        Self::with_engines(config, BuiltinEngines)
    }
}

impl<E: SearchEngines> Solver<E> {
    pub fn with_engines(config: SolverConfig, engines: E) -> Result<Self, ConfigError> {
        let pool = ResourcePool::allocate(config.workers, &config.memory)?;
        Ok(Self { config, pool, engines })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn engines(&self) -> &E {
        &self.engines
    }

    /// Preprocess `board` and run the configured schedule on it.
    pub fn solve(&mut self, board: &Board) -> SolveResult {
        let mut ctx = RunContext::start(self.config.time_limit);
        self.pool.reset_attempts();

        let mut board = board.clone();
        let level = match preprocess(&mut board, &mut self.pool) {
            Ok(level) => Arc::new(level),
            Err(e) => {
                warn!("Preprocessing failed: {}", e);
                ctx.finish();
                let statistics = SolveStatistics {
                    elapsed: ctx.elapsed(),
                    attempts: Vec::new(),
                };
                return SolveResult::preprocess_failed(e, statistics);
            }
        };
        debug!(
            boxes = level.box_count(),
            cells = level.cells(),
            remaining = ?ctx.remaining(),
            "level ready"
        );

        let outcome = match self.config.forced_strategy {
            Some(strategy) => {
                info!("Running forced strategy {}", strategy);
                run_forced_strategy(&self.engines, &level, &board, &ctx, self.pool.worker_mut(0), strategy)
            }
            None if self.pool.len() == 1 => {
                run_sequential_schedule(&self.engines, &level, &board, &ctx, self.pool.worker_mut(0))
            }
            None => run_parallel_schedule(&self.engines, &level, &board, &ctx, self.pool.workers_mut()),
        };
        ctx.finish();

        let statistics = SolveStatistics {
            elapsed: ctx.elapsed(),
            attempts: outcome.attempts,
        };
        debug!("{}", statistics.format_summary());

        match outcome.winner {
            Some(winner) => SolveResult {
                status: SolveStatus::Solved,
                moves: winner.moves,
                strategy: Some(winner.strategy),
                worker: Some(winner.worker),
                level: Some(level),
                statistics,
            },
            None => SolveResult {
                status: SolveStatus::Unsolved,
                moves: Vec::new(),
                strategy: None,
                worker: None,
                level: Some(level),
                statistics,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_board;
    use crate::resources::{AttemptState, MemoryConfig, SearchArena};
    use crate::search::EngineRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const CORRIDOR: &str = "######\n#@$ .#\n######";

    /// Never solves; sleeps through part of every driver call.
    #[derive(Default)]
    struct Idle {
        driver_runs: AtomicUsize,
    }

    impl SearchEngines for Idle {
        fn driver_search(&self, request: &EngineRequest<'_>, _arena: &mut SearchArena, _attempt: &mut AttemptState) {
            self.driver_runs.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(request.time_allocation.min(Duration::from_millis(5)));
        }

        fn packing_search(&self, request: &EngineRequest<'_>, _arena: &mut SearchArena, attempt: &mut AttemptState) {
            attempt.parking_order = request.level.targets.clone();
            attempt.perimeter_found = true;
        }

        fn dragonfly_search(&self, _request: &EngineRequest<'_>, _arena: &mut SearchArena, _attempt: &mut AttemptState) {}
    }

    fn config() -> SolverConfig {
        SolverConfig::default()
            .with_time_limit(Duration::from_secs(5))
            .with_memory(MemoryConfig::default().with_log_size(10))
    }

    #[test]
    fn test_solver_solves_corridor() {
        let board = parse_board(CORRIDOR).unwrap();
        let mut solver = Solver::new(config()).unwrap();
        let result = solver.solve(&board);
        assert!(result.is_solved());
        assert_eq!(result.strategy, Some(Strategy::A));
        assert_eq!(result.moves.len(), 2);
        assert_eq!(result.statistics.attempts.len(), 1);
    }

    #[test]
    fn test_unsolved_runs_every_strategy_in_order() {
        let board = parse_board(CORRIDOR).unwrap();
        let mut solver = Solver::with_engines(config().with_time_limit(Duration::from_secs(2)), Idle::default()).unwrap();
        let result = solver.solve(&board);

        assert_eq!(result.status, SolveStatus::Unsolved);
        let order: Vec<Strategy> = result.statistics.attempts.iter().map(|a| a.strategy).collect();
        assert_eq!(order, Strategy::ROSTER.to_vec());
        assert!(result.statistics.budget_granted() <= Duration::from_secs(2));
    }

    #[test]
    fn test_forced_strategy_runs_alone() {
        let board = parse_board(CORRIDOR).unwrap();
        let mut solver = Solver::new(config().with_forced_strategy(Strategy::G)).unwrap();
        let result = solver.solve(&board);
        assert!(result.is_solved());
        assert_eq!(result.strategy, Some(Strategy::G));
        assert_eq!(result.statistics.attempts.len(), 1);
    }

    #[test]
    fn test_preprocess_failure_runs_nothing() {
        let board = parse_board("######\n#@$..#\n######").unwrap();
        let mut solver = Solver::with_engines(config(), Idle::default()).unwrap();
        let result = solver.solve(&board);

        assert!(matches!(result.status, SolveStatus::PreprocessFailed(_)));
        assert!(result.statistics.attempts.is_empty());
        assert_eq!(solver.engines().driver_runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_solver_reusable_across_puzzles() {
        let mut solver = Solver::new(config()).unwrap();
        let first = solver.solve(&parse_board(CORRIDOR).unwrap());
        let second = solver.solve(&parse_board("#####\n#@  #\n# $ #\n# . #\n#####").unwrap());
        assert!(first.is_solved());
        assert!(second.is_solved());
        assert_eq!(second.replay().unwrap().pushes, second.moves.len());
    }

    #[test]
    fn test_zero_time_limit_attempts_nothing() {
        let board = parse_board(CORRIDOR).unwrap();
        let mut solver = Solver::new(config().with_time_limit(Duration::ZERO)).unwrap();
        let result = solver.solve(&board);
        assert_eq!(result.status, SolveStatus::Unsolved);
        assert!(result.statistics.attempts.is_empty());
    }
}
