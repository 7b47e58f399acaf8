//! Configuration types for the solver

use crate::resources::MemoryConfig;
use crate::search::strategy::Strategy;
use std::time::Duration;

/// Search variant handed to an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchType {
    /// Packing order built around already filled targets
    Base,
    MaxDist2,
    /// All targets share one room
    Girl,
    /// Heuristic-first forward search
    Hf,
    Bicon,
    MaxDist,
    /// Forward search meeting a backward perimeter
    Rev,
    /// Tree-less depth-first search
    Dragonfly,
    ForwardWithBases,
    Naive,
    /// Corridor-dominated levels
    Snail,
    /// Levels made of many small rooms
    Netlock,
}

impl SearchType {
    /// Variants whose forward phase does not need a planned packing order.
    pub fn is_self_contained(self) -> bool {
        matches!(
            self,
            SearchType::Hf
                | SearchType::Bicon
                | SearchType::MaxDist
                | SearchType::MaxDist2
                | SearchType::Rev
                | SearchType::Naive
                | SearchType::Dragonfly
        )
    }

    /// Budget multiplier applied to the backward phase.
    pub fn packing_budget_factor(self) -> u32 {
        match self {
            SearchType::Snail | SearchType::Netlock => 2,
            SearchType::Dragonfly => 3,
            _ => 1,
        }
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SearchType::Base => "base",
            SearchType::MaxDist2 => "max-dist2",
            SearchType::Girl => "girl",
            SearchType::Hf => "hf",
            SearchType::Bicon => "bicon",
            SearchType::MaxDist => "max-dist",
            SearchType::Rev => "rev",
            SearchType::Dragonfly => "dragonfly",
            SearchType::ForwardWithBases => "forward-with-bases",
            SearchType::Naive => "naive",
            SearchType::Snail => "snail",
            SearchType::Netlock => "netlock",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "base" => Ok(SearchType::Base),
            "max-dist2" => Ok(SearchType::MaxDist2),
            "girl" => Ok(SearchType::Girl),
            "hf" => Ok(SearchType::Hf),
            "bicon" => Ok(SearchType::Bicon),
            "max-dist" => Ok(SearchType::MaxDist),
            "rev" => Ok(SearchType::Rev),
            "dragonfly" => Ok(SearchType::Dragonfly),
            "forward-with-bases" => Ok(SearchType::ForwardWithBases),
            "naive" => Ok(SearchType::Naive),
            "snail" => Ok(SearchType::Snail),
            "netlock" => Ok(SearchType::Netlock),
            _ => Err(format!("Unknown search type: '{}'", s)),
        }
    }
}

/// Main solver configuration
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock budget for one puzzle
    pub time_limit: Duration,
    /// Number of worker threads (1, 2, 4 or 8)
    pub workers: usize,
    /// Run only this strategy with the whole budget
    pub forced_strategy: Option<Strategy>,
    pub memory: MemoryConfig,
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(60),
            workers: 1,
            forced_strategy: None,
            memory: MemoryConfig::default(),
            verbose: false,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_forced_strategy(mut self, strategy: Strategy) -> Self {
        self.forced_strategy = Some(strategy);
        self
    }

    pub fn with_forced_strategy_option(mut self, strategy: Option<Strategy>) -> Self {
        self.forced_strategy = strategy;
        self
    }

    pub fn with_memory(mut self, memory: MemoryConfig) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_log_size(mut self, log_size: u32) -> Self {
        self.memory = self.memory.with_log_size(log_size);
        self
    }

    pub fn with_extra_mem(mut self, extra_mem: i32) -> Self {
        self.memory = self.memory.with_extra_mem(extra_mem);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Largest supported worker count not exceeding the available cores.
pub fn default_worker_count() -> usize {
    let cores = num_cpus::get();
    [8, 4, 2, 1]
        .into_iter()
        .find(|&n| n <= cores)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_type_from_str() {
        assert_eq!("hf".parse::<SearchType>().unwrap(), SearchType::Hf);
        assert_eq!(
            "forward_with_bases".parse::<SearchType>().unwrap(),
            SearchType::ForwardWithBases
        );
        assert_eq!("MAX-DIST2".parse::<SearchType>().unwrap(), SearchType::MaxDist2);
        assert!("greedy".parse::<SearchType>().is_err());
    }

    #[test]
    fn test_search_type_display_round_trips() {
        assert_eq!(format!("{}", SearchType::Dragonfly), "dragonfly");
        assert_eq!(
            SearchType::Netlock.to_string().parse::<SearchType>().unwrap(),
            SearchType::Netlock
        );
    }

    #[test]
    fn test_self_contained_set() {
        assert!(SearchType::Rev.is_self_contained());
        assert!(SearchType::Dragonfly.is_self_contained());
        assert!(!SearchType::Base.is_self_contained());
        assert!(!SearchType::Girl.is_self_contained());
        assert!(!SearchType::Snail.is_self_contained());
    }

    #[test]
    fn test_packing_budget_factor() {
        assert_eq!(SearchType::Snail.packing_budget_factor(), 2);
        assert_eq!(SearchType::Netlock.packing_budget_factor(), 2);
        assert_eq!(SearchType::Dragonfly.packing_budget_factor(), 3);
        assert_eq!(SearchType::Hf.packing_budget_factor(), 1);
    }

    #[test]
    fn test_solver_config_builder() {
        let config = SolverConfig::default()
            .with_time_limit(Duration::from_secs(5))
            .with_workers(4)
            .with_forced_strategy(Strategy::C)
            .with_log_size(12)
            .with_extra_mem(2)
            .with_verbose(true);
        assert_eq!(config.memory.log_size_for(0), Ok(14));
        assert_eq!(config.time_limit, Duration::from_secs(5));
        assert_eq!(config.workers, 4);
        assert_eq!(config.forced_strategy, Some(Strategy::C));
        assert!(config.verbose);
    }

    #[test]
    fn test_default_worker_count_is_supported() {
        assert!([1, 2, 4, 8].contains(&default_worker_count()));
    }
}
