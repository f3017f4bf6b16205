//! Training and evaluation statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabular_rl_core::{EpisodeEnd, Outcome, Trajectory};
use uuid::Uuid;

/// Statistics for one finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Zero-based index of the episode within the run
    pub episode: usize,
    /// Trajectory id
    pub id: Uuid,
    /// Learner decisions taken
    pub steps: usize,
    /// Sum of learner rewards
    pub total_reward: f64,
    /// How the episode stopped
    pub end: EpisodeEnd,
    /// Win, loss or draw when the game ended by its rules
    pub outcome: Option<Outcome>,
    /// Exploration rate the episode was played with
    pub epsilon: f64,
}

impl EpisodeSummary {
    /// Summarize a finished trajectory
    pub fn from_trajectory<S, A>(
        episode: usize,
        trajectory: &Trajectory<S, A>,
        epsilon: f64,
    ) -> Self {
        Self {
            episode,
            id: trajectory.episode_id,
            steps: trajectory.len(),
            total_reward: trajectory.total_reward.value(),
            end: trajectory.end,
            outcome: trajectory.outcome(),
            epsilon,
        }
    }
}

/// An episode abandoned after a recoverable error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeFailure {
    /// Zero-based index of the episode
    pub episode: usize,
    /// Attempts made before giving up
    pub attempts: usize,
    /// Last error message
    pub message: String,
}

/// Cumulative statistics for a training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Episodes that ran to completion
    pub episodes_completed: usize,
    /// Episodes abandoned after errors
    pub episodes_failed: usize,
    /// Learner decisions across completed episodes
    pub total_steps: usize,
    /// Completed episodes ending with a positive final reward
    pub wins: usize,
    /// Completed episodes ending with a negative final reward
    pub losses: usize,
    /// Completed episodes ending with a zero final reward
    pub draws: usize,
    /// Episodes cut short by the step limit
    pub truncated: usize,
    /// Highest episode return seen
    pub best_reward: Option<f64>,
    /// Exploration rate after the last episode
    pub final_epsilon: f64,
    /// Entries in the Q-table after the last episode
    pub table_entries: usize,
    /// Abandoned episodes
    pub failures: Vec<EpisodeFailure>,
    /// Summary of the most recent completed episode
    pub last_episode: Option<EpisodeSummary>,
    /// When the first episode of the run started
    pub started_at: Option<DateTime<Utc>>,
    /// When the last episode of the run ended
    pub finished_at: Option<DateTime<Utc>>,
}

impl TrainingReport {
    /// Fold a completed episode into the report
    pub fn record_episode(&mut self, summary: EpisodeSummary) {
        self.episodes_completed += 1;
        self.total_steps += summary.steps;
        match summary.outcome {
            Some(Outcome::Win) => self.wins += 1,
            Some(Outcome::Loss) => self.losses += 1,
            Some(Outcome::Draw) => self.draws += 1,
            None => {}
        }
        if summary.end == EpisodeEnd::Truncated {
            self.truncated += 1;
        }
        if self.best_reward.map_or(true, |best| summary.total_reward > best) {
            self.best_reward = Some(summary.total_reward);
        }
        self.last_episode = Some(summary);
    }

    /// Record an abandoned episode
    pub fn record_failure(&mut self, failure: EpisodeFailure) {
        self.episodes_failed += 1;
        self.failures.push(failure);
    }

    /// Episodes attempted, completed or not
    #[must_use]
    pub fn episodes_played(&self) -> usize {
        self.episodes_completed + self.episodes_failed
    }

    /// Mean learner decisions per completed episode
    #[must_use]
    pub fn mean_steps(&self) -> f64 {
        if self.episodes_completed == 0 {
            0.0
        } else {
            self.total_steps as f64 / self.episodes_completed as f64
        }
    }
}

/// Result of greedy evaluation episodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Episodes played
    pub episodes: usize,
    /// Episodes won by the learner
    pub wins: usize,
    /// Episodes lost by the learner
    pub losses: usize,
    /// Episodes drawn
    pub draws: usize,
    /// Episodes cut short by the step limit
    pub truncated: usize,
    /// Mean episode return
    pub mean_reward: f64,
    /// Mean learner decisions per episode
    pub mean_steps: f64,
    /// Highest episode return, the analogue of a best score
    pub best_reward: Option<f64>,
}

impl EvaluationReport {
    /// Aggregate finished trajectories
    pub fn from_trajectories<'a, S: 'a, A: 'a, I>(trajectories: I) -> Self
    where
        I: IntoIterator<Item = &'a Trajectory<S, A>>,
    {
        let mut report = Self::default();
        let mut reward_sum = 0.0;
        let mut step_sum = 0;
        for trajectory in trajectories {
            report.episodes += 1;
            let total = trajectory.total_reward.value();
            reward_sum += total;
            step_sum += trajectory.len();
            if report.best_reward.map_or(true, |best| total > best) {
                report.best_reward = Some(total);
            }
            match (trajectory.end, trajectory.outcome()) {
                (EpisodeEnd::Truncated, _) => report.truncated += 1,
                (_, Some(Outcome::Win)) => report.wins += 1,
                (_, Some(Outcome::Loss)) => report.losses += 1,
                (_, Some(Outcome::Draw)) => report.draws += 1,
                _ => {}
            }
        }
        if report.episodes > 0 {
            report.mean_reward = reward_sum / report.episodes as f64;
            report.mean_steps = step_sum as f64 / report.episodes as f64;
        }
        report
    }

    /// Fraction of episodes won
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.wins as f64 / self.episodes as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabular_rl_core::{Reward, Transition};

    fn finished(rewards: &[f64]) -> Trajectory<u8, u8> {
        let mut trajectory = Trajectory::new();
        for (i, r) in rewards.iter().enumerate() {
            trajectory.push(Transition {
                state: i as u8,
                action: 0,
                reward: Reward(*r),
                next_state: i as u8 + 1,
                done: i + 1 == rewards.len(),
            });
        }
        trajectory.finish();
        trajectory
    }

    #[test]
    fn test_training_report_counts_outcomes() {
        let mut report = TrainingReport::default();
        report.record_episode(EpisodeSummary::from_trajectory(0, &finished(&[0.0, 1.0]), 0.5));
        report.record_episode(EpisodeSummary::from_trajectory(1, &finished(&[-1.0]), 0.4));
        report.record_failure(EpisodeFailure {
            episode: 2,
            attempts: 1,
            message: "boom".into(),
        });

        assert_eq!(report.wins, 1);
        assert_eq!(report.losses, 1);
        assert_eq!(report.total_steps, 3);
        assert_eq!(report.best_reward, Some(1.0));
        assert_eq!(report.episodes_played(), 3);
        assert_eq!(report.mean_steps(), 1.5);
        assert_eq!(report.last_episode.as_ref().map(|s| s.episode), Some(1));
    }

    #[test]
    fn test_evaluation_report() {
        let runs = [finished(&[1.0]), finished(&[0.0, 0.0]), finished(&[1.0])];
        let report = EvaluationReport::from_trajectories(&runs);
        assert_eq!(report.episodes, 3);
        assert_eq!(report.wins, 2);
        assert_eq!(report.draws, 1);
        assert!((report.win_rate() - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.mean_steps - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_evaluation() {
        let none: Vec<Trajectory<u8, u8>> = Vec::new();
        let report = EvaluationReport::from_trajectories(&none);
        assert_eq!(report.win_rate(), 0.0);
        assert_eq!(report.best_reward, None);
    }
}
