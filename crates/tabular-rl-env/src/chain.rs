//! One-dimensional chain walk

use serde::{Deserialize, Serialize};
use tabular_rl_core::{ensure_legal, Environment, RLError, Result, Step};

/// Move along the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Toward cell 0; stays put at 0
    Left,
    /// Toward the goal
    Right,
}

/// Chain configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Number of cells; the last one is the goal
    pub length: usize,
    /// Reward for reaching the goal
    pub goal_reward: f64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            length: 5,
            goal_reward: 1.0,
        }
    }
}

/// Walk from cell 0 to the last cell of a chain.
///
/// Every move earns nothing except the one reaching the goal, which ends the
/// episode. Wrap in [`crate::TimeLimit`] to bound episode length.
#[derive(Debug, Clone)]
pub struct ChainWalk {
    config: ChainConfig,
}

impl ChainWalk {
    /// Create a chain
    pub fn new(config: ChainConfig) -> Result<Self> {
        if config.length < 2 {
            return Err(RLError::Config(format!(
                "chain needs at least 2 cells, got {}",
                config.length
            )));
        }
        Ok(Self { config })
    }

    /// Create a chain of `length` cells with a goal reward of 1
    pub fn with_length(length: usize) -> Result<Self> {
        Self::new(ChainConfig {
            length,
            ..ChainConfig::default()
        })
    }

    /// Index of the goal cell
    #[must_use]
    pub fn goal(&self) -> usize {
        self.config.length - 1
    }
}

impl Environment for ChainWalk {
    type Position = usize;
    type Action = Move;

    fn reset(&mut self) -> Result<usize> {
        Ok(0)
    }

    fn legal_actions(&self, position: &usize) -> Vec<Move> {
        if *position >= self.goal() {
            Vec::new()
        } else {
            vec![Move::Left, Move::Right]
        }
    }

    fn step(&mut self, position: &usize, action: &Move) -> Result<Step<usize>> {
        ensure_legal(action, &self.legal_actions(position))?;
        let next = match action {
            Move::Left => position.saturating_sub(1),
            Move::Right => position + 1,
        };
        Ok(if next == self.goal() {
            Step::terminal(next, self.config.goal_reward)
        } else {
            Step::running(next, 0.0)
        })
    }
}
