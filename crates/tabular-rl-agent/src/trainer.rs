//! Q-learning training loop

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use metrics::{counter, gauge};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tabular_rl_core::{Environment, EpsilonGreedy, QTable, Result, StateEncoder, Trajectory};
use tracing::{info, warn};

use crate::adversary::Adversary;
use crate::config::{FailurePolicy, TrainingConfig};
use crate::report::{EpisodeFailure, EpisodeSummary, EvaluationReport, TrainingReport};
use crate::rollout::{self, play_episode, Learning};
use crate::schedule::Schedule;

/// Adversary stored by a [`Trainer`] for environment `E`
pub type BoxedAdversary<E> =
    Box<dyn Adversary<<E as Environment>::Position, <E as Environment>::Action>>;

/// Learned table and statistics of a finished run
#[derive(Debug, Clone)]
pub struct TrainingOutcome<S, A> {
    /// The learned Q-table
    pub table: QTable<S, A>,
    /// Statistics of the run
    pub report: TrainingReport,
}

/// Tabular Q-learning trainer
///
/// Owns the environment, the encoder and the Q-table for the duration of a
/// run. Episodes are played one after another; the table is only mutated
/// between a learner move and its successor's selection.
pub struct Trainer<E, C>
where
    E: Environment,
    C: StateEncoder<E::Position, E::Action>,
{
    env: E,
    encoder: C,
    table: QTable<C::State, E::Action>,
    config: TrainingConfig,
    policy: EpsilonGreedy,
    rng: StdRng,
    adversary: Option<BoxedAdversary<E>>,
    episodes_played: usize,
    floor_reported: bool,
    report: TrainingReport,
}

impl<E, C> Trainer<E, C>
where
    E: Environment,
    C: StateEncoder<E::Position, E::Action>,
{
    /// Create a trainer with an empty Q-table
    pub fn new(env: E, encoder: C, config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let policy = EpsilonGreedy::new(config.initial_epsilon())?;
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Ok(Self {
            env,
            encoder,
            table: QTable::new(config.default_q_value),
            config,
            policy,
            rng,
            adversary: None,
            episodes_played: 0,
            floor_reported: false,
            report: TrainingReport::default(),
        })
    }

    /// Continue learning from an existing table
    #[must_use]
    pub fn with_table(mut self, table: QTable<C::State, E::Action>) -> Self {
        self.table = table;
        self
    }

    /// Play against `adversary` in a two-player game
    #[must_use]
    pub fn with_adversary<O>(self, adversary: O) -> Self
    where
        O: Adversary<E::Position, E::Action> + 'static,
    {
        self.with_boxed_adversary(Box::new(adversary))
    }

    /// Play against an already boxed adversary
    #[must_use]
    pub fn with_boxed_adversary(mut self, adversary: BoxedAdversary<E>) -> Self {
        self.adversary = Some(adversary);
        self
    }

    /// Play the configured number of episodes
    pub fn train(&mut self) -> Result<&TrainingReport> {
        self.train_until(&AtomicBool::new(false))
    }

    /// Play the configured number of episodes, stopping early once `stop` is set.
    ///
    /// The flag is checked between episodes; the episode in flight always
    /// completes.
    pub fn train_until(&mut self, stop: &AtomicBool) -> Result<&TrainingReport> {
        info!(
            episodes = self.config.episodes,
            learning_rate = self.config.learning_rate,
            discount_factor = self.config.discount_factor,
            epsilon = self.policy.epsilon(),
            "starting training"
        );

        for _ in 0..self.config.episodes {
            if stop.load(Ordering::Relaxed) {
                info!(episodes = self.episodes_played, "training stopped");
                break;
            }
            self.train_episode()?;
        }

        info!(
            completed = self.report.episodes_completed,
            failed = self.report.episodes_failed,
            wins = self.report.wins,
            best_reward = ?self.report.best_reward,
            table_entries = self.table.len(),
            "training finished"
        );
        Ok(&self.report)
    }

    /// Play one learning episode and decay epsilon.
    ///
    /// Returns `None` when the episode was abandoned under the failure
    /// policy. Errors that are not local to the episode are returned.
    pub fn train_episode(&mut self) -> Result<Option<EpisodeSummary>> {
        let episode = self.episodes_played;
        let epsilon = self.policy.epsilon();
        let max_attempts = match self.config.on_episode_error {
            FailurePolicy::Skip => 1,
            FailurePolicy::Retry { max_attempts } => max_attempts,
        };

        if self.report.started_at.is_none() {
            self.report.started_at = Some(Utc::now());
        }

        let mut attempt = 0;
        let summary = loop {
            attempt += 1;
            match self.play_learning_episode() {
                Ok(trajectory) => {
                    break Some(EpisodeSummary::from_trajectory(episode, &trajectory, epsilon));
                }
                Err(err) if err.is_episode_local() => {
                    warn!(episode, attempt, error = %err, "episode failed");
                    if attempt >= max_attempts {
                        counter!("tabular_rl_episodes_failed_total", 1);
                        self.report.record_failure(EpisodeFailure {
                            episode,
                            attempts: attempt,
                            message: err.to_string(),
                        });
                        break None;
                    }
                }
                Err(err) => return Err(err),
            }
        };

        if let Some(summary) = &summary {
            counter!("tabular_rl_episodes_total", 1);
            counter!("tabular_rl_steps_total", summary.steps as u64);
            self.report.record_episode(summary.clone());
        }

        self.episodes_played += 1;
        self.decay_epsilon()?;

        self.report.final_epsilon = self.policy.epsilon();
        self.report.table_entries = self.table.len();
        self.report.finished_at = Some(Utc::now());
        gauge!("tabular_rl_table_entries", self.table.len() as f64);

        if self.config.log_interval > 0 && self.episodes_played % self.config.log_interval == 0 {
            info!(
                episode = self.episodes_played,
                epsilon = self.policy.epsilon(),
                wins = self.report.wins,
                losses = self.report.losses,
                draws = self.report.draws,
                mean_steps = self.report.mean_steps(),
                "training progress"
            );
        }

        Ok(summary)
    }

    fn play_learning_episode(&mut self) -> Result<Trajectory<C::State, E::Action>> {
        let options = self.config.rollout_options();
        play_episode(
            &mut self.env,
            &self.encoder,
            Learning::Update {
                table: &mut self.table,
                learning_rate: self.config.learning_rate,
                discount_factor: self.config.discount_factor,
            },
            &self.policy,
            &mut self.rng,
            self.adversary.as_deref_mut(),
            &options,
        )
    }

    /// Epsilon never increases, whatever the schedule says
    fn decay_epsilon(&mut self) -> Result<()> {
        let next = self
            .config
            .epsilon
            .value(self.episodes_played)
            .min(self.policy.epsilon());
        self.policy.set_epsilon(next)?;
        gauge!("tabular_rl_epsilon", next);

        if !self.floor_reported && next <= self.config.epsilon.floor() {
            self.floor_reported = true;
            info!(
                episode = self.episodes_played,
                epsilon = next,
                "exploration reached its minimum"
            );
        }
        Ok(())
    }

    /// Play one greedy episode without learning
    pub fn run_greedy_episode(&mut self) -> Result<Trajectory<C::State, E::Action>> {
        rollout::run_episode(
            &mut self.env,
            &self.encoder,
            &self.table,
            self.adversary.as_deref_mut(),
            &self.config.rollout_options(),
        )
    }

    /// Play `episodes` greedy episodes without learning
    pub fn evaluate(&mut self, episodes: usize) -> Result<EvaluationReport> {
        let report = rollout::evaluate(
            &mut self.env,
            &self.encoder,
            &self.table,
            self.adversary.as_deref_mut(),
            &self.config.rollout_options(),
            episodes,
        )?;
        info!(
            episodes = report.episodes,
            win_rate = report.win_rate(),
            mean_reward = report.mean_reward,
            "evaluation finished"
        );
        Ok(report)
    }

    /// Forget everything learned and start over from the configured state
    pub fn reset(&mut self) -> Result<()> {
        self.table.clear();
        self.policy.set_epsilon(self.config.initial_epsilon())?;
        if let Some(seed) = self.config.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.episodes_played = 0;
        self.floor_reported = false;
        self.report = TrainingReport::default();
        Ok(())
    }

    /// The Q-table learned so far
    pub fn table(&self) -> &QTable<C::State, E::Action> {
        &self.table
    }

    /// Consume the trainer, keeping the table
    pub fn into_table(self) -> QTable<C::State, E::Action> {
        self.table
    }

    /// Consume the trainer, keeping the table and statistics
    pub fn into_outcome(self) -> TrainingOutcome<C::State, E::Action> {
        TrainingOutcome {
            table: self.table,
            report: self.report,
        }
    }

    /// Current exploration rate
    pub fn epsilon(&self) -> f64 {
        self.policy.epsilon()
    }

    /// Episodes attempted since creation or the last reset
    pub fn episodes_played(&self) -> usize {
        self.episodes_played
    }

    /// Statistics so far
    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    /// Active configuration
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// The environment
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The state encoder
    pub fn encoder(&self) -> &C {
        &self.encoder
    }
}

/// Train a fresh table for `config.episodes` episodes
pub fn run_training<E, C>(
    env: E,
    encoder: C,
    config: TrainingConfig,
    adversary: Option<BoxedAdversary<E>>,
) -> Result<TrainingOutcome<C::State, E::Action>>
where
    E: Environment,
    C: StateEncoder<E::Position, E::Action>,
{
    let mut trainer = Trainer::new(env, encoder, config)?;
    if let Some(adversary) = adversary {
        trainer = trainer.with_boxed_adversary(adversary);
    }
    trainer.train()?;
    Ok(trainer.into_outcome())
}
