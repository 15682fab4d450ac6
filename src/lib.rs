//! Reversi-MCTS: a Reversi/Othello engine driven by Monte Carlo Tree Search.
//!
//! The engine searches for a fixed wall-clock budget and answers with the
//! most visited move.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry and search parameters
//! - [`board`] - Canonical board, move legality and captures
//! - [`playout`] - Random source and random game simulation
//! - [`mcts`] - Search tree with UCB1 selection and the time-bounded search
//! - [`game`] - Real-color board, move notation and the interactive session
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use reversi_mcts::board::Board;
//! use reversi_mcts::mcts::search_move;
//! use reversi_mcts::playout::RandomSource;
//!
//! // Black opens with f5
//! let mut board = Board::new();
//! assert!(board.try_place(5, 4));
//!
//! // Hand the move to White and let the engine reply
//! board.flip_colors();
//! let mut rng = RandomSource::with_seed(1);
//! let reply = search_move(&board, Duration::from_millis(20), &mut rng);
//! assert!(board.next_states().contains(&reply));
//! ```

pub mod board;
pub mod constants;
pub mod game;
pub mod mcts;
pub mod playout;
