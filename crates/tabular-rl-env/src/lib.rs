//! Reference games for tabular Q-learning
//!
//! This crate provides environments and encoders including:
//! - A one-dimensional chain walk
//! - Tic-tac-toe with symmetry folding
//! - Snake with an 11-bit local-view encoding
//! - Wrappers for step limits and reward shaping

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod chain;
pub mod snake;
pub mod tictactoe;
pub mod wrappers;

// Re-export environments
pub use chain::{ChainConfig, ChainWalk, Move};
pub use snake::{Heading, SnakeConfig, SnakeEncoder, SnakeGame, SnakePosition, Turn};
pub use tictactoe::{Board, Mark, SymmetryEncoder, TicTacToe};
pub use wrappers::{RewardWrapper, TimeLimit};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ChainWalk, SnakeEncoder, SnakeGame, SymmetryEncoder, TicTacToe, TimeLimit};
    pub use tabular_rl_core::prelude::*;
}
