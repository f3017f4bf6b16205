//! Training configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use tabular_rl_core::{RLError, Result};

use crate::schedule::{EpsilonSchedule, Schedule};

/// Which side the learner plays in a two-player game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    /// Learner moves right after reset
    #[default]
    First,
    /// Adversary opens every episode
    Second,
}

/// What the training loop does when an episode fails with a recoverable error
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Count the failure and move on to the next episode
    #[default]
    Skip,
    /// Replay the episode up to `max_attempts` times in total, then skip it
    Retry {
        /// Attempts including the first one
        max_attempts: usize,
    },
}

/// Settings shared by learning and evaluation rollouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutOptions {
    /// Seat taken by the learner
    pub learner_seat: Seat,
    /// Learner decisions after which an episode is cut short
    pub max_steps: Option<usize>,
}

impl Default for RolloutOptions {
    fn default() -> Self {
        Self {
            learner_seat: Seat::First,
            max_steps: Some(DEFAULT_MAX_STEPS),
        }
    }
}

const DEFAULT_MAX_STEPS: usize = 10_000;

/// Configuration for a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Episodes played per call to `train`
    pub episodes: usize,
    /// Step size of the Q-value update, in (0, 1]
    pub learning_rate: f64,
    /// Weight of the successor's value, in [0, 1]
    pub discount_factor: f64,
    /// Exploration schedule
    pub epsilon: EpsilonSchedule,
    /// Value of never-updated Q-entries
    pub default_q_value: f64,
    /// Learner decisions after which an episode is cut short
    pub max_steps_per_episode: Option<usize>,
    /// Seat taken by the learner in two-player games
    pub learner_seat: Seat,
    /// Handling of recoverable episode failures
    pub on_episode_error: FailurePolicy,
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Episodes between progress log lines; 0 disables them
    pub log_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 1_000,
            learning_rate: 0.1,
            discount_factor: 0.95,
            epsilon: EpsilonSchedule::default(),
            default_q_value: 0.0,
            max_steps_per_episode: Some(DEFAULT_MAX_STEPS),
            learner_seat: Seat::First,
            on_episode_error: FailurePolicy::Skip,
            seed: None,
            log_interval: 100,
        }
    }
}

impl TrainingConfig {
    /// Parse a JSON configuration and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file and validate it
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values outside their documented ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(RLError::Config(format!(
                "learning rate {} outside (0, 1]",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(RLError::Config(format!(
                "discount factor {} outside [0, 1]",
                self.discount_factor
            )));
        }
        if !self.default_q_value.is_finite() {
            return Err(RLError::Config(format!(
                "default Q-value {} is not finite",
                self.default_q_value
            )));
        }
        if self.max_steps_per_episode == Some(0) {
            return Err(RLError::Config(
                "max_steps_per_episode must be positive".to_string(),
            ));
        }
        if let FailurePolicy::Retry { max_attempts: 0 } = self.on_episode_error {
            return Err(RLError::Config(
                "retry policy needs at least one attempt".to_string(),
            ));
        }
        self.epsilon.validate()
    }

    /// Rollout settings implied by this configuration
    #[must_use]
    pub fn rollout_options(&self) -> RolloutOptions {
        RolloutOptions {
            learner_seat: self.learner_seat,
            max_steps: self.max_steps_per_episode,
        }
    }

    /// Epsilon used for the first episode
    #[must_use]
    pub fn initial_epsilon(&self) -> f64 {
        self.epsilon.value(0)
    }
}
