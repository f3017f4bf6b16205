//! Environment wrappers for common transformations

use tabular_rl_core::{Environment, Result, Reward, Step};

/// Wrapper that modifies rewards
pub struct RewardWrapper<E, F> {
    /// Inner environment
    pub env: E,
    /// Reward transformation function
    pub reward_fn: F,
}

impl<E, F> RewardWrapper<E, F> {
    /// Wrap `env`, passing every step reward through `reward_fn`
    pub fn new(env: E, reward_fn: F) -> Self {
        Self { env, reward_fn }
    }
}

impl<E, F> Environment for RewardWrapper<E, F>
where
    E: Environment,
    F: Fn(Reward, &Step<E::Position>) -> Reward,
{
    type Position = E::Position;
    type Action = E::Action;

    fn reset(&mut self) -> Result<Self::Position> {
        self.env.reset()
    }

    fn legal_actions(&self, position: &Self::Position) -> Vec<Self::Action> {
        self.env.legal_actions(position)
    }

    fn step(
        &mut self,
        position: &Self::Position,
        action: &Self::Action,
    ) -> Result<Step<Self::Position>> {
        let mut step = self.env.step(position, action)?;
        step.reward = (self.reward_fn)(step.reward, &step);
        Ok(step)
    }

    fn counter_reward(&self, reward: Reward) -> Reward {
        self.env.counter_reward(reward)
    }
}

/// Time limit wrapper
///
/// Ends the episode, marked as truncated, once `max_steps` steps have been
/// applied since the last reset. In two-player games both players' moves
/// count.
pub struct TimeLimit<E> {
    /// Inner environment
    pub env: E,
    /// Maximum steps
    pub max_steps: usize,
    /// Current step count
    pub steps: usize,
}

impl<E> TimeLimit<E> {
    /// Create a new time limit wrapper
    pub fn new(env: E, max_steps: usize) -> Self {
        Self {
            env,
            max_steps,
            steps: 0,
        }
    }
}

impl<E> Environment for TimeLimit<E>
where
    E: Environment,
{
    type Position = E::Position;
    type Action = E::Action;

    fn reset(&mut self) -> Result<Self::Position> {
        self.steps = 0;
        self.env.reset()
    }

    fn legal_actions(&self, position: &Self::Position) -> Vec<Self::Action> {
        self.env.legal_actions(position)
    }

    fn step(
        &mut self,
        position: &Self::Position,
        action: &Self::Action,
    ) -> Result<Step<Self::Position>> {
        let mut step = self.env.step(position, action)?;
        self.steps += 1;

        if self.steps >= self.max_steps && !step.done {
            step.truncated = true;
            step.done = true;
        }

        Ok(step)
    }

    fn counter_reward(&self, reward: Reward) -> Reward {
        self.env.counter_reward(reward)
    }
}
