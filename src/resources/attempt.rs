//! Per-strategy attempt state
//!
//! Everything here is owned by one worker and is reset before each strategy
//! starts: the solved flag, the recorded moves, the planned packing order
//! and the search-control switches the controller flips between phases.

use tracing::debug;

use crate::board::Move;
use crate::level::Level;

/// Rank given to cells that are not part of the packing order.
pub const NO_ZONE: u32 = u32::MAX;

#[derive(Debug, Clone, Default)]
pub struct AttemptState {
    pub worker: usize,
    pub solved: bool,
    pub moves: Vec<Move>,
    /// Targets in the order they should be filled.
    pub parking_order: Vec<u16>,
    pub perimeter_found: bool,
    pub weighted_search: bool,
    /// Per cell, its position in the packing order (or [`NO_ZONE`]).
    pub zones: Vec<u32>,
    pub fail_reason: Option<String>,
}

impl AttemptState {
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.worker);
    }

    pub fn parking_order_num(&self) -> usize {
        self.parking_order.len()
    }

    pub fn record_solution(&mut self, moves: Vec<Move>) {
        self.solved = true;
        self.moves = moves;
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.fail_reason = Some(reason.into());
    }

    /// Drop entries that are not targets or repeat an earlier one. Returns
    /// whether the order was already clean.
    pub fn verify_parking_order(&mut self, level: &Level) -> bool {
        let before = self.parking_order.len();
        let mut seen = vec![false; level.cells()];
        self.parking_order.retain(|&t| {
            let keep = (t as usize) < seen.len() && level.is_target(t) && !seen[t as usize];
            if keep {
                seen[t as usize] = true;
            }
            keep
        });
        before == self.parking_order.len()
    }

    /// Drop the leading targets that already hold a box at the start; they
    /// are packed before the search begins.
    pub fn reduce_parking_order(&mut self, level: &Level) {
        let filled = self
            .parking_order
            .iter()
            .take_while(|&&t| level.initial_boxes.binary_search(&t).is_ok())
            .count();
        if filled > 0 && filled < self.parking_order.len() {
            self.parking_order.drain(..filled);
        }
    }

    pub fn show_parking_order(&self, level: &Level) {
        let cells: Vec<String> = self
            .parking_order
            .iter()
            .filter_map(|&t| level.map.coords(t))
            .map(|(y, x)| format!("({y},{x})"))
            .collect();
        debug!(worker = self.worker, "packing order: {}", cells.join(" "));
    }

    /// Rank every cell by its place in the packing order.
    pub fn prepare_zones(&mut self, level: &Level) {
        self.zones = vec![NO_ZONE; level.cells()];
        for (rank, &t) in self.parking_order.iter().enumerate() {
            if let Some(z) = self.zones.get_mut(t as usize) {
                *z = rank as u32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_board;
    use crate::preprocess::preprocess;
    use crate::resources::{MemoryConfig, ResourcePool};

    fn level(text: &str) -> Level {
        let mut board = parse_board(text).unwrap();
        let mut pool = ResourcePool::allocate(1, &MemoryConfig::default().with_log_size(8)).unwrap();
        preprocess(&mut board, &mut pool).unwrap()
    }

    #[test]
    fn test_reset_keeps_worker_index() {
        let mut attempt = AttemptState::new(3);
        attempt.solved = true;
        attempt.parking_order = vec![1, 2];
        attempt.weighted_search = true;
        attempt.fail("timeout");
        attempt.reset();
        assert_eq!(attempt.worker, 3);
        assert!(!attempt.solved);
        assert_eq!(attempt.parking_order_num(), 0);
        assert!(!attempt.weighted_search);
        assert!(attempt.fail_reason.is_none());
    }

    #[test]
    fn test_verify_drops_non_targets_and_duplicates() {
        let level = level("#######\n#@$ $.#\n#    .#\n#######");
        let t0 = level.targets[0];
        let t1 = level.targets[1];
        let mut attempt = AttemptState::new(0);
        attempt.parking_order = vec![t0, level.player_start, t0, t1];
        assert!(!attempt.verify_parking_order(&level));
        assert_eq!(attempt.parking_order, vec![t0, t1]);
        assert!(attempt.verify_parking_order(&level));
    }

    #[test]
    fn test_reduce_skips_prefilled_targets() {
        let level = level("#######\n#@ *$ #\n#    .#\n#######");
        let filled = level.map.index(1, 3).unwrap();
        let open = level.map.index(2, 5).unwrap();
        let mut attempt = AttemptState::new(0);
        attempt.parking_order = vec![filled, open];
        attempt.reduce_parking_order(&level);
        assert_eq!(attempt.parking_order, vec![open]);

        attempt.prepare_zones(&level);
        assert_eq!(attempt.zones[open as usize], 0);
        assert_eq!(attempt.zones[filled as usize], NO_ZONE);
    }
}
