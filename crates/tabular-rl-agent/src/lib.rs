//! Tabular Q-learning agent
//!
//! This crate provides the learning side of the framework:
//! - A [`Trainer`] running epsilon-greedy Q-learning episodes
//! - Exploration schedules
//! - Adversaries for two-player games
//! - Greedy rollouts and evaluation of learned tables

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adversary;
pub mod config;
pub mod report;
pub mod rollout;
pub mod schedule;
pub mod trainer;

// Re-export the training loop
pub use config::{FailurePolicy, RolloutOptions, Seat, TrainingConfig};
pub use rollout::{evaluate, run_episode};
pub use trainer::{run_training, BoxedAdversary, Trainer, TrainingOutcome};

// Re-export supporting types
pub use adversary::{Adversary, FrozenQAdversary, HeuristicAdversary, RandomAdversary};
pub use report::{EpisodeFailure, EpisodeSummary, EvaluationReport, TrainingReport};
pub use schedule::{
    ConstantSchedule, EpsilonSchedule, ExponentialSchedule, LinearSchedule, Schedule,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        evaluate, run_episode, run_training, Adversary, EpsilonSchedule, RandomAdversary,
        Seat, Trainer, TrainingConfig,
    };
    pub use tabular_rl_core::prelude::*;
}
