//! fess - adaptive multi-strategy Sokoban solver
//!
//! A level is parsed into a [`board::Board`], preprocessed once into an
//! immutable [`level::Level`] and then handed to a schedule of eight
//! backward/forward strategy pairs, run on one worker or split over several.
//! The first strategy to solve the level wins; its push solution is expanded
//! into a LURD string by [`replay`].

pub mod board;
pub mod engine;
pub mod level;
pub mod parser;
pub mod preprocess;
pub mod replay;
pub mod report;
pub mod resources;
pub mod search;

pub use board::{Board, Direction, Move};
pub use parser::{parse_board, parse_board_file, ParseError};
pub use search::{SearchType, SolveResult, SolveStatus, Solver, SolverConfig, Strategy};
