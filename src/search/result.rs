//! Solve result types and statistics

use std::sync::Arc;
use std::time::Duration;

use crate::board::Move;
use crate::level::Level;
use crate::preprocess::PreprocessError;
use crate::replay::{replay, Replay, ReplayError};
use crate::search::strategy::Strategy;

/// Final state of one puzzle solve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    Solved,
    /// Every strategy ran out of budget or gave up
    Unsolved,
    /// The board was rejected before any search started
    PreprocessFailed(PreprocessError),
}

/// Outcome of one strategy attempt on one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub worker: usize,
    pub strategy: Strategy,
    /// Budget the scheduler granted
    pub budget: Duration,
    /// Wall-clock time actually spent
    pub elapsed: Duration,
    pub solved: bool,
    pub fail_reason: Option<String>,
}

/// Statistics from a solve
#[derive(Debug, Clone, Default)]
pub struct SolveStatistics {
    /// Total time from the start of preprocessing to the end of the schedule
    pub elapsed: Duration,
    /// Attempts in the order they finished
    pub attempts: Vec<AttemptRecord>,
}

impl SolveStatistics {
    /// Sum of the budgets handed out to attempts.
    pub fn budget_granted(&self) -> Duration {
        self.attempts.iter().map(|a| a.budget).sum()
    }

    /// Elapsed time in whole seconds, as stored in the report.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed));
        s.push_str(&format!("Attempts: {}\n", self.attempts.len()));
        for a in &self.attempts {
            s.push_str(&format!(
                "  worker {} strategy {}: {} in {:.2?} of {:.2?}",
                a.worker,
                a.strategy,
                if a.solved { "solved" } else { "unsolved" },
                a.elapsed,
                a.budget
            ));
            if let Some(reason) = &a.fail_reason {
                s.push_str(&format!(" ({})", reason));
            }
            s.push('\n');
        }
        s
    }
}

/// Result of a solve
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub status: SolveStatus,
    /// Abstract solution, empty unless solved
    pub moves: Vec<Move>,
    pub strategy: Option<Strategy>,
    pub worker: Option<usize>,
    /// The preprocessed level, absent when preprocessing failed
    pub level: Option<Arc<Level>>,
    pub statistics: SolveStatistics,
}

impl SolveResult {
    pub fn preprocess_failed(error: PreprocessError, statistics: SolveStatistics) -> Self {
        Self {
            status: SolveStatus::PreprocessFailed(error),
            moves: Vec::new(),
            strategy: None,
            worker: None,
            level: None,
            statistics,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.status == SolveStatus::Solved
    }

    /// Turn the abstract solution into a verified step string.
    pub fn replay(&self) -> Result<Replay, ReplayError> {
        match (&self.status, &self.level) {
            (SolveStatus::Solved, Some(level)) => replay(level, &self.moves),
            _ => Err(ReplayError::NoSolution),
        }
    }
}

impl std::fmt::Display for SolveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            SolveStatus::Solved => {
                write!(f, "Solved with {} pushes", self.moves.len())?;
                if let Some(strategy) = self.strategy {
                    write!(f, " by strategy {}", strategy)?;
                }
                if let Some(worker) = self.worker {
                    write!(f, " on worker {}", worker)?;
                }
                writeln!(f)?;
                for m in &self.moves {
                    writeln!(f, "  {}", m)?;
                }
            }
            SolveStatus::Unsolved => writeln!(f, "No solution found within time limit")?,
            SolveStatus::PreprocessFailed(e) => writeln!(f, "Preprocessing failed: {}", e)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(strategy: Strategy, budget_ms: u64, solved: bool) -> AttemptRecord {
        AttemptRecord {
            worker: 0,
            strategy,
            budget: Duration::from_millis(budget_ms),
            elapsed: Duration::from_millis(budget_ms / 2),
            solved,
            fail_reason: (!solved).then(|| "Could not find packing order".to_string()),
        }
    }

    #[test]
    fn test_budget_granted_sums_attempts() {
        let stats = SolveStatistics {
            elapsed: Duration::from_millis(900),
            attempts: vec![record(Strategy::A, 100, false), record(Strategy::B, 250, true)],
        };
        assert_eq!(stats.budget_granted(), Duration::from_millis(350));
        assert_eq!(stats.elapsed_secs(), 0);
    }

    #[test]
    fn test_format_summary_lists_attempts() {
        let stats = SolveStatistics {
            elapsed: Duration::from_secs(2),
            attempts: vec![record(Strategy::A, 100, false), record(Strategy::B, 250, true)],
        };
        let summary = stats.format_summary();
        assert!(summary.contains("Attempts: 2"));
        assert!(summary.contains("strategy A: unsolved"));
        assert!(summary.contains("Could not find packing order"));
        assert!(summary.contains("strategy B: solved"));
    }

    #[test]
    fn test_preprocess_failure_has_nothing_to_replay() {
        let result = SolveResult::preprocess_failed(PreprocessError::NoBoxes, SolveStatistics::default());
        assert!(!result.is_solved());
        assert_eq!(result.replay().unwrap_err(), ReplayError::NoSolution);
        assert!(result.to_string().contains("Preprocessing failed"));
    }
}
