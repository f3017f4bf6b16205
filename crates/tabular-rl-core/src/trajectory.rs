//! Episode trajectories

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Outcome, Reward};

/// Single learner transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition<S, A> {
    /// Encoded state the learner acted in
    pub state: S,
    /// Action taken, in the frame of `state`
    pub action: A,
    /// Reward from the learner's point of view
    pub reward: Reward,
    /// Encoded state the learner faces next
    pub next_state: S,
    /// Whether the episode ended on this transition
    pub done: bool,
}

/// How an episode stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeEnd {
    /// Still being played
    Running,
    /// The game's rules ended it
    Terminal,
    /// A step limit cut it short
    Truncated,
}

/// Ordered learner transitions of one episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory<S, A> {
    /// Episode ID
    pub episode_id: Uuid,
    /// Sequence of transitions
    pub transitions: Vec<Transition<S, A>>,
    /// Total reward
    pub total_reward: Reward,
    /// How the episode stopped
    pub end: EpisodeEnd,
    /// Learner-side reward of a game ended before the learner moved
    #[serde(default)]
    pub terminal_reward: Option<Reward>,
}

impl<S, A> Trajectory<S, A> {
    /// Create a new empty trajectory with a fresh id
    #[must_use]
    pub fn new() -> Self {
        Self {
            episode_id: Uuid::new_v4(),
            transitions: Vec::new(),
            total_reward: Reward::ZERO,
            end: EpisodeEnd::Running,
            terminal_reward: None,
        }
    }

    /// Add a transition to the trajectory
    pub fn push(&mut self, transition: Transition<S, A>) {
        self.total_reward += transition.reward;
        self.transitions.push(transition);
    }

    /// Mark the episode as ended by the game's rules
    pub fn finish(&mut self) {
        if self.end == EpisodeEnd::Running {
            self.end = EpisodeEnd::Terminal;
        }
    }

    /// End the episode with a reward that no learner transition carries,
    /// e.g. when the opening move of the other seat already decides the game
    pub fn finish_with(&mut self, reward: Reward) {
        if self.end == EpisodeEnd::Running {
            self.total_reward += reward;
            self.terminal_reward = Some(reward);
            self.end = EpisodeEnd::Terminal;
        }
    }

    /// Mark the episode as cut short
    pub fn truncate(&mut self) {
        if self.end == EpisodeEnd::Running {
            self.end = EpisodeEnd::Truncated;
        }
    }

    /// Get the length of the trajectory
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if trajectory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Actions taken, in order
    pub fn actions(&self) -> impl Iterator<Item = &A> + '_ {
        self.transitions.iter().map(|t| &t.action)
    }

    /// Win, loss or draw judged by the final reward; `None` unless the game ended it
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        match self.end {
            EpisodeEnd::Terminal => self
                .terminal_reward
                .or_else(|| self.transitions.last().map(|t| t.reward))
                .map(Outcome::from_reward),
            EpisodeEnd::Running | EpisodeEnd::Truncated => None,
        }
    }
}

impl<S, A> Default for Trajectory<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(reward: f64, done: bool) -> Transition<u8, char> {
        Transition {
            state: 0,
            action: 'r',
            reward: Reward(reward),
            next_state: 1,
            done,
        }
    }

    #[test]
    fn test_push_accumulates_and_terminates() {
        let mut trajectory = Trajectory::new();
        trajectory.push(transition(0.0, false));
        assert_eq!(trajectory.outcome(), None);
        trajectory.push(transition(1.0, true));
        trajectory.finish();

        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.total_reward, Reward(1.0));
        assert_eq!(trajectory.end, EpisodeEnd::Terminal);
        assert_eq!(trajectory.outcome(), Some(Outcome::Win));
        assert_eq!(trajectory.actions().count(), 2);

        // a finished episode cannot become truncated
        trajectory.truncate();
        assert_eq!(trajectory.end, EpisodeEnd::Terminal);
    }

    #[test]
    fn test_truncated_has_no_outcome() {
        let mut trajectory = Trajectory::new();
        trajectory.push(transition(-1.0, false));
        trajectory.truncate();
        assert_eq!(trajectory.end, EpisodeEnd::Truncated);
        assert_eq!(trajectory.outcome(), None);
    }

    #[test]
    fn test_finish_with_scores_empty_trajectory() {
        let mut trajectory: Trajectory<u8, char> = Trajectory::new();
        assert_eq!(trajectory.outcome(), None);

        trajectory.finish_with(Reward(-1.0));
        assert!(trajectory.is_empty());
        assert_eq!(trajectory.end, EpisodeEnd::Terminal);
        assert_eq!(trajectory.total_reward, Reward(-1.0));
        assert_eq!(trajectory.outcome(), Some(Outcome::Loss));

        let mut drawn: Trajectory<u8, char> = Trajectory::new();
        drawn.finish_with(Reward::ZERO);
        assert_eq!(drawn.outcome(), Some(Outcome::Draw));
    }
}
