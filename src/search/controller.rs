//! Two-phase protocol for a single strategy attempt
//!
//! A strategy first spends a third of its budget on the backward (packing)
//! phase, then, if the packing artifacts pass the validation gate, hands the
//! rest of its window to the forward phase. Every early exit is a plain
//! return with `attempt.solved` left false.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::board::Board;
use crate::level::Level;
use crate::resources::{AttemptState, SearchArena};
use crate::search::config::SearchType;
use crate::search::result::AttemptRecord;
use crate::search::strategy::Strategy;
use crate::search::{EngineRequest, SearchEngines};

/// One strategy attempt dispatched to one worker. The board is a private
/// copy; the attempt state is the worker's own.
#[derive(Debug)]
pub struct WorkElement<'a> {
    pub board: Board,
    pub time_allocation: Duration,
    pub strategy: Strategy,
    pub attempt: &'a mut AttemptState,
}

impl<'a> WorkElement<'a> {
    pub fn prepare(
        board: &Board,
        time_allocation: Duration,
        strategy: Strategy,
        attempt: &'a mut AttemptState,
    ) -> Self {
        Self {
            board: board.clone(),
            time_allocation,
            strategy,
            attempt,
        }
    }
}

/// Run one work element and summarize how it went.
pub fn solve_work_element<E: SearchEngines + ?Sized>(
    engines: &E,
    level: &Level,
    work: WorkElement<'_>,
    arena: &mut SearchArena,
) -> AttemptRecord {
    let started = Instant::now();
    let WorkElement {
        board,
        time_allocation,
        strategy,
        attempt,
    } = work;

    run_strategy(engines, level, &board, time_allocation, strategy, arena, attempt);

    AttemptRecord {
        worker: attempt.worker,
        strategy,
        budget: time_allocation,
        elapsed: started.elapsed(),
        solved: attempt.solved,
        fail_reason: attempt.fail_reason.clone(),
    }
}

/// Run both phases of `strategy` within `budget`.
pub fn run_strategy<E: SearchEngines + ?Sized>(
    engines: &E,
    level: &Level,
    board: &Board,
    budget: Duration,
    strategy: Strategy,
    arena: &mut SearchArena,
    attempt: &mut AttemptState,
) {
    if budget.is_zero() {
        return;
    }

    attempt.reset();
    debug!(
        worker = attempt.worker,
        "Starting strategy {}. Time limit: {:.2?}", strategy, budget
    );

    let local_start = Instant::now();
    let window_end = local_start + budget;

    let backward = packing_search_control(engines, level, board, budget / 3, strategy.backward(), arena, attempt);
    if attempt.solved {
        return;
    }

    if !setup_plan_features(level, backward, attempt) {
        return;
    }

    let remaining = window_end.saturating_duration_since(Instant::now());
    forward_search_control(engines, level, board, remaining, strategy.forward(), arena, attempt);
}

/// Rewrite a search type for corridor-dominated levels.
pub fn set_snail_parameters(search_type: SearchType, backward: bool, level: &Level) -> SearchType {
    let planned = if backward {
        SearchType::Base
    } else {
        SearchType::ForwardWithBases
    };
    if level.shape.snail && search_type == planned {
        SearchType::Snail
    } else {
        search_type
    }
}

/// Rewrite a search type for levels made of many small rooms.
pub fn set_netlock_parameters(search_type: SearchType, backward: bool, level: &Level) -> SearchType {
    let planned = if backward {
        SearchType::Base
    } else {
        SearchType::ForwardWithBases
    };
    if level.shape.netlock && search_type == planned {
        SearchType::Netlock
    } else {
        search_type
    }
}

/// Backward phase. Returns the search type after shape rewriting.
pub fn packing_search_control<E: SearchEngines + ?Sized>(
    engines: &E,
    level: &Level,
    board: &Board,
    time_allocation: Duration,
    search_type: SearchType,
    arena: &mut SearchArena,
    attempt: &mut AttemptState,
) -> SearchType {
    let search_type = set_snail_parameters(search_type, true, level);
    let search_type = set_netlock_parameters(search_type, true, level);

    if time_allocation.is_zero() {
        return search_type;
    }

    attempt.weighted_search = true;
    let time_allocation = time_allocation * search_type.packing_budget_factor();
    let request = EngineRequest::new(level, board, search_type, time_allocation);
    trace!(worker = attempt.worker, %search_type, ?time_allocation, "backward phase");

    match search_type {
        SearchType::Rev => engines.driver_search(&request, arena, attempt),
        SearchType::Dragonfly => engines.dragonfly_search(&request, arena, attempt),
        _ => engines.packing_search(&request, arena, attempt),
    }

    search_type
}

/// Validation gate between the two phases.
pub fn setup_plan_features(level: &Level, search_type: SearchType, attempt: &mut AttemptState) -> bool {
    if search_type.is_self_contained() {
        return true;
    }

    if attempt.parking_order_num() == 0 {
        debug!(worker = attempt.worker, "No packing order");
        attempt.fail("Could not find packing order");
        return false;
    }

    attempt.verify_parking_order(level);
    attempt.reduce_parking_order(level);
    attempt.show_parking_order(level);

    if search_type == SearchType::Girl {
        return true;
    }

    attempt.prepare_zones(level);
    true
}

/// Forward phase.
pub fn forward_search_control<E: SearchEngines + ?Sized>(
    engines: &E,
    level: &Level,
    board: &Board,
    time_allocation: Duration,
    search_type: SearchType,
    arena: &mut SearchArena,
    attempt: &mut AttemptState,
) {
    if time_allocation.is_zero() {
        return;
    }
    let end_time = Instant::now() + time_allocation;

    attempt.weighted_search = true;
    let search_type = set_snail_parameters(search_type, false, level);
    let search_type = set_netlock_parameters(search_type, false, level);
    trace!(worker = attempt.worker, %search_type, ?time_allocation, "forward phase");

    let mut time_allocation = time_allocation;
    match search_type {
        SearchType::Hf => {
            attempt.weighted_search = false;
            let request = EngineRequest::new(level, board, search_type, time_allocation * 3 / 4);
            engines.driver_search(&request, arena, attempt);
            if attempt.solved {
                return;
            }

            attempt.weighted_search = true;
            let rest = end_time.saturating_duration_since(Instant::now());
            if rest.is_zero() {
                return;
            }
            let request = EngineRequest::new(level, board, search_type, rest);
            engines.driver_search(&request, arena, attempt);
            return;
        }
        SearchType::Rev => {
            let request = EngineRequest::new(level, board, search_type, time_allocation);
            engines.packing_search(&request, arena, attempt);
            if attempt.solved {
                return;
            }
            if !attempt.perimeter_found {
                attempt.fail("no perimeter found");
                return;
            }
            time_allocation = end_time.saturating_duration_since(Instant::now());
            if time_allocation.is_zero() {
                return;
            }
        }
        _ => {}
    }

    let request = EngineRequest::new(level, board, search_type, time_allocation);
    engines.driver_search(&request, arena, attempt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::level;
    use crate::engine::BuiltinEngines;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Engine double recording which entry points ran and with what type.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(&'static str, SearchType, bool)>>,
        packing_order: Vec<u16>,
        perimeter: bool,
        driver_runs: AtomicUsize,
    }

    impl Recorder {
        fn log(&self, what: &'static str, request: &EngineRequest<'_>, attempt: &AttemptState) {
            self.calls
                .lock()
                .unwrap()
                .push((what, request.search_type, attempt.weighted_search));
        }

        fn calls(&self) -> Vec<(&'static str, SearchType, bool)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SearchEngines for Recorder {
        fn driver_search(&self, request: &EngineRequest<'_>, _: &mut SearchArena, attempt: &mut AttemptState) {
            self.driver_runs.fetch_add(1, Ordering::SeqCst);
            self.log("driver", request, attempt);
        }

        fn packing_search(&self, request: &EngineRequest<'_>, _: &mut SearchArena, attempt: &mut AttemptState) {
            self.log("packing", request, attempt);
            attempt.parking_order = self.packing_order.clone();
            attempt.perimeter_found = self.perimeter;
        }

        fn dragonfly_search(&self, request: &EngineRequest<'_>, _: &mut SearchArena, attempt: &mut AttemptState) {
            self.log("dragonfly", request, attempt);
        }
    }

    const CORRIDOR: &str = "######\n#@$ .#\n######";

    fn run(engines: &Recorder, strategy: Strategy) -> AttemptState {
        let level = level(CORRIDOR);
        let mut arena = SearchArena::new(6);
        let mut attempt = AttemptState::new(0);
        let board = level.initial_board.clone();
        run_strategy(engines, &level, &board, Duration::from_millis(300), strategy, &mut arena, &mut attempt);
        attempt
    }

    #[test]
    fn test_gate_blocks_forward_phase_without_packing_order() {
        let engines = Recorder::default();
        let attempt = run(&engines, Strategy::A);
        assert_eq!(engines.calls(), vec![("packing", SearchType::Base, true)]);
        assert_eq!(engines.driver_runs.load(Ordering::SeqCst), 0);
        assert_eq!(attempt.fail_reason.as_deref(), Some("Could not find packing order"));
    }

    #[test]
    fn test_gate_passes_with_packing_order() {
        let level = level(CORRIDOR);
        let engines = Recorder {
            packing_order: level.targets.clone(),
            ..Recorder::default()
        };
        let attempt = run(&engines, Strategy::A);
        assert_eq!(
            engines.calls(),
            vec![
                ("packing", SearchType::Base, true),
                ("driver", SearchType::ForwardWithBases, true),
            ]
        );
        assert_eq!(attempt.zones[level.targets[0] as usize], 0);
    }

    #[test]
    fn test_self_contained_type_skips_gate() {
        let engines = Recorder::default();
        run(&engines, Strategy::D);
        // unweighted pass then weighted pass
        assert_eq!(
            engines.calls(),
            vec![
                ("packing", SearchType::Hf, true),
                ("driver", SearchType::Hf, false),
                ("driver", SearchType::Hf, true),
            ]
        );
    }

    #[test]
    fn test_reverse_strategy_needs_perimeter() {
        let engines = Recorder::default();
        let attempt = run(&engines, Strategy::G);
        assert_eq!(
            engines.calls(),
            vec![
                ("driver", SearchType::Rev, true),
                ("packing", SearchType::Rev, true),
            ]
        );
        assert_eq!(attempt.fail_reason.as_deref(), Some("no perimeter found"));

        let engines = Recorder {
            perimeter: true,
            ..Recorder::default()
        };
        run(&engines, Strategy::G);
        assert_eq!(engines.calls().last(), Some(&("driver", SearchType::Rev, true)));
        assert_eq!(engines.driver_runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dragonfly_backward_uses_dragonfly_engine() {
        let engines = Recorder::default();
        run(&engines, Strategy::H);
        let calls = engines.calls();
        assert_eq!(calls[0], ("dragonfly", SearchType::Dragonfly, true));
    }

    #[test]
    fn test_zero_budget_is_a_no_op() {
        let engines = Recorder::default();
        let level = level(CORRIDOR);
        let mut arena = SearchArena::new(6);
        let mut attempt = AttemptState::new(0);
        run_strategy(
            &engines,
            &level,
            &level.initial_board,
            Duration::ZERO,
            Strategy::A,
            &mut arena,
            &mut attempt,
        );
        assert!(engines.calls().is_empty());
        assert!(attempt.fail_reason.is_none());
    }

    #[test]
    fn test_attempt_is_reset_between_strategies() {
        let level = level(CORRIDOR);
        let mut arena = SearchArena::new(8);
        let mut attempt = AttemptState::new(2);
        attempt.parking_order = level.targets.clone();
        attempt.perimeter_found = true;
        let engines = Recorder::default();
        run_strategy(
            &engines,
            &level,
            &level.initial_board,
            Duration::from_millis(200),
            Strategy::A,
            &mut arena,
            &mut attempt,
        );
        assert_eq!(attempt.worker, 2);
        assert!(!attempt.perimeter_found);
        assert_eq!(attempt.parking_order_num(), 0);
    }

    #[test]
    fn test_builtin_engines_solve_corridor_with_every_strategy() {
        let level = level(CORRIDOR);
        for strategy in Strategy::ROSTER {
            let mut arena = SearchArena::new(12);
            let mut attempt = AttemptState::new(0);
            let work = WorkElement::prepare(
                &level.initial_board,
                Duration::from_secs(2),
                strategy,
                &mut attempt,
            );
            let record = solve_work_element(&BuiltinEngines, &level, work, &mut arena);
            assert!(record.solved, "strategy {} failed: {:?}", strategy, record.fail_reason);
            assert_eq!(attempt.moves.len(), 2);
        }
    }
}
