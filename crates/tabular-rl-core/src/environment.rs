//! Environment trait and step results

use crate::{Action, Reward};

/// Result of a single environment step
#[derive(Debug, Clone, PartialEq)]
pub struct Step<P> {
    /// Position after the action was applied
    pub position: P,
    /// Reward earned by the player who moved
    pub reward: Reward,
    /// Whether the episode is over
    pub done: bool,
    /// Whether the episode was cut short (e.g., time limit) rather than ended by the rules
    pub truncated: bool,
}

impl<P> Step<P> {
    /// A step that keeps the episode going
    pub fn running(position: P, reward: impl Into<Reward>) -> Self {
        Self {
            position,
            reward: reward.into(),
            done: false,
            truncated: false,
        }
    }

    /// A step that ends the episode by the game's rules
    pub fn terminal(position: P, reward: impl Into<Reward>) -> Self {
        Self {
            position,
            reward: reward.into(),
            done: true,
            truncated: false,
        }
    }
}

/// Core environment trait
///
/// An environment holds one game's rules. It is used by exactly one episode
/// at a time; any internal state it keeps (a random source for fruit
/// placement, a step counter) is reset by [`Environment::reset`].
pub trait Environment {
    /// Raw game position
    type Position: Clone + std::fmt::Debug;
    /// Action type
    type Action: Action;

    /// Start a new episode and return the initial position
    fn reset(&mut self) -> crate::Result<Self::Position>;

    /// Legal actions in `position`, in a stable order.
    ///
    /// Empty if and only if the position is terminal.
    fn legal_actions(&self, position: &Self::Position) -> Vec<Self::Action>;

    /// Apply `action` to `position`.
    ///
    /// Fails with [`crate::RLError::IllegalAction`] if `action` is not in
    /// `legal_actions(position)`.
    fn step(
        &mut self,
        position: &Self::Position,
        action: &Self::Action,
    ) -> crate::Result<Step<Self::Position>>;

    /// Translate a reward earned by the opposing player into the learner's view.
    ///
    /// Only consulted by two-player training. Zero-sum by default.
    fn counter_reward(&self, reward: Reward) -> Reward {
        -reward
    }
}
