//! Built-in search engines
//!
//! The scheduler only talks to engines through [`SearchEngines`]; this module
//! provides the default implementation: a best-first tree search, the
//! packing planner (including the perimeter builder) and a tree-less
//! depth-first search.

pub mod deadlock;
pub mod dragonfly;
pub mod driver;
pub mod heuristic;
pub mod packing;
pub mod position;

pub use position::{Position, Scratch};

use crate::resources::{AttemptState, SearchArena};
use crate::search::{EngineRequest, SearchEngines};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEngines;

impl SearchEngines for BuiltinEngines {
    fn driver_search(&self, request: &EngineRequest<'_>, arena: &mut SearchArena, attempt: &mut AttemptState) {
        driver::best_first(request, arena, attempt);
    }

    fn packing_search(&self, request: &EngineRequest<'_>, arena: &mut SearchArena, attempt: &mut AttemptState) {
        packing::packing_search(request, arena, attempt);
    }

    fn dragonfly_search(&self, request: &EngineRequest<'_>, arena: &mut SearchArena, attempt: &mut AttemptState) {
        dragonfly::dragonfly_search(request, arena, attempt);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::level::Level;
    use crate::parser::parse_board;
    use crate::preprocess::preprocess;
    use crate::resources::{MemoryConfig, ResourcePool};

    pub fn level(text: &str) -> Level {
        let mut board = parse_board(text).unwrap();
        let mut pool = ResourcePool::allocate(1, &MemoryConfig::default().with_log_size(8)).unwrap();
        preprocess(&mut board, &mut pool).unwrap()
    }

    /// Open 40x30 room with six rows of 20 boxes above six rows of targets.
    pub fn crowded_room() -> String {
        let (width, height) = (40, 30);
        let mut rows: Vec<Vec<char>> = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| if y == 0 || x == 0 || y == height - 1 || x == width - 1 { '#' } else { ' ' })
                    .collect()
            })
            .collect();
        for band in 0..6 {
            for x in 8..28 {
                rows[4 + 2 * band][x] = '$';
                rows[16 + 2 * band][x] = '.';
            }
        }
        rows[2][2] = '@';
        rows.iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
