//! Core traits and types for pluggable tabular Q-learning
//!
//! Games plug in by implementing [`Environment`] and [`StateEncoder`];
//! the learner side only ever sees encoded states, actions and the
//! [`QTable`] they key.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod environment;
pub mod error;
pub mod policy;
pub mod reward;
pub mod state;
pub mod trajectory;
pub mod value;

// Re-export core traits and types
pub use action::{ensure_legal, Action};
pub use environment::{Environment, Step};
pub use error::{RLError, Result};
pub use policy::EpsilonGreedy;
pub use reward::{Outcome, Reward};
pub use state::{IdentityEncoder, StateEncoder, StateKey};
pub use trajectory::{EpisodeEnd, Trajectory, Transition};
pub use value::{QRecord, QTable};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, Environment, EpsilonGreedy, QTable, RLError, Result, Reward, StateEncoder,
        StateKey, Step,
    };
}
