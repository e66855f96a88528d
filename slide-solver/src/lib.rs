//! slide-solver: a staged solver core for 4x4 and 5x5 sliding-tile puzzles.
//!
//! This crate provides:
//! - A compact `Copy` [`board::Board`] with moves, symmetries and shuffling
//! - A progressive-locking stage controller ([`solver::solve`]) over IDA*
//!   sub-searches with pattern-database heuristics, a transposition table,
//!   a parallel endgame dispatcher for 5x5 and a breadth-first fallback
//! - Replay-based solution validation ([`validate::validate_solution`])
//!
//! Moves are encoded as the tile number that slides into the blank, so a
//! recorded solution can be replayed without knowing where the blank started.
//!
//! Quick start:
//! ```
//! use slide_solver::board::Board;
//! use slide_solver::{solver, validate};
//!
//! let tiles = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 0, 14, 15];
//! let board = Board::from_tiles(4, &tiles).unwrap();
//! let moves = solver::solve(&board).unwrap();
//! assert_eq!(moves, vec![14, 15]);
//! assert!(validate::validate_solution(&board, &moves));
//! ```
pub mod board;
pub mod pdb;
pub mod search;
pub mod solver;
pub mod validate;
