//! Result channel and winner slot shared by parallel workers.

use crate::board::Move;
use crate::search::result::AttemptRecord;
use crate::search::strategy::Strategy;
use crossbeam_channel::{unbounded, Receiver, SendError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Message sent from workers to the coordinator.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// A strategy attempt finished, solved or not.
    Attempt(AttemptRecord),
    /// Worker won the race; only ever sent by the worker that claimed the slot.
    Solved {
        worker_id: usize,
        strategy: Strategy,
        moves: Vec<Move>,
    },
    /// Worker has run out of strategies or stopped after a win.
    Finished { worker_id: usize },
}

/// Single-resolution slot recording that some worker solved the puzzle.
#[derive(Debug, Default)]
pub struct SolvedSlot {
    any_core_solved: AtomicBool,
}

impl SolvedSlot {
    /// Claim the win. Returns true for the first caller only.
    pub fn claim(&self) -> bool {
        self.any_core_solved
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Whether a winner exists; workers stop starting new strategies once set.
    pub fn is_claimed(&self) -> bool {
        self.any_core_solved.load(Ordering::SeqCst)
    }
}

/// Channel endpoints for a worker.
pub struct WorkerChannels {
    /// Send messages to coordinator.
    pub to_coordinator: Sender<WorkerMessage>,
    pub solved: Arc<SolvedSlot>,
}

impl WorkerChannels {
    /// Send to the coordinator. Returns false, and logs what was lost, once
    /// the coordinator has hung up.
    pub fn report(&self, message: WorkerMessage) -> bool {
        match self.to_coordinator.send(message) {
            Ok(()) => true,
            Err(SendError(lost)) => {
                debug!(?lost, "coordinator is gone, message dropped");
                false
            }
        }
    }
}

/// Channel endpoints for the coordinator.
pub struct CoordinatorChannels {
    /// Receive messages from workers.
    pub from_workers: Receiver<WorkerMessage>,
    pub solved: Arc<SolvedSlot>,
}

/// Create channels for parallel solving with the given number of workers.
pub fn create_channels(num_workers: usize) -> (CoordinatorChannels, Vec<WorkerChannels>) {
    let solved = Arc::new(SolvedSlot::default());

    // Unbounded so a worker never blocks on the coordinator
    let (worker_tx, coordinator_rx) = unbounded();

    let worker_channels = (0..num_workers)
        .map(|_| WorkerChannels {
            to_coordinator: worker_tx.clone(),
            solved: Arc::clone(&solved),
        })
        .collect();

    let coordinator = CoordinatorChannels {
        from_workers: coordinator_rx,
        solved,
    };

    (coordinator, worker_channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_solved_slot_first_writer_wins() {
        let slot = SolvedSlot::default();
        assert!(!slot.is_claimed());
        assert!(slot.claim());
        assert!(slot.is_claimed());
        assert!(!slot.claim());
    }

    #[test]
    fn test_solved_slot_single_winner_across_threads() {
        let slot = Arc::new(SolvedSlot::default());
        let winners: usize = (0..8)
            .map(|_| {
                let slot = Arc::clone(&slot);
                thread::spawn(move || slot.claim())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_create_channels() {
        let (coordinator, workers) = create_channels(4);
        assert_eq!(workers.len(), 4);

        workers[2]
            .to_coordinator
            .send(WorkerMessage::Finished { worker_id: 2 })
            .unwrap();
        match coordinator.from_workers.recv().unwrap() {
            WorkerMessage::Finished { worker_id } => assert_eq!(worker_id, 2),
            other => panic!("Unexpected message: {:?}", other),
        }

        workers[0].solved.claim();
        assert!(coordinator.solved.is_claimed());
    }

    #[test]
    fn test_report_after_coordinator_hangs_up() {
        let (coordinator, workers) = create_channels(2);
        assert!(workers[0].report(WorkerMessage::Finished { worker_id: 0 }));
        assert!(matches!(
            coordinator.from_workers.recv(),
            Ok(WorkerMessage::Finished { worker_id: 0 })
        ));

        drop(coordinator);
        assert!(!workers[1].report(WorkerMessage::Finished { worker_id: 1 }));
    }
}
