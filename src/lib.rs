//! Tictactoe-Minimax: N×N tic-tac-toe with minimax and alpha-beta players.
//!
//! ## Modules
//!
//! - [`constants`] - Board size limits and scoring constants
//! - [`board`] - Board state, move application and win detection
//! - [`search`] - Minimax, alpha-beta and the top-level move decision
//! - [`trace`] - Optional recording of the alpha-beta search tree
//! - [`player`] - Human, search-backed and model-backed players
//! - [`game`] - Turn loop
//!
//! ## Example
//!
//! ```
//! use tictactoe_minimax::board::{Board, Symbol};
//! use tictactoe_minimax::search::{find_best_move, SearchConfig};
//! use tictactoe_minimax::trace::NoopRecorder;
//!
//! let mut board = Board::new(3);
//! board.make_move(1, Symbol::X);
//!
//! let decision = find_best_move(&mut board, Symbol::O, &SearchConfig::default(), NoopRecorder)
//!     .expect("board has empty cells");
//! assert_eq!(decision.mv, 5);
//! println!("O answers with {}", decision.mv);
//! ```

pub mod board;
pub mod constants;
pub mod game;
pub mod player;
pub mod search;
pub mod trace;
