//! Episode rollouts
//!
//! One rollout plays a game from `reset` to a terminal position or the step
//! limit. In two-player games each learner transition spans the learner's
//! move and the adversary's reply, so the learner always bootstraps from a
//! position where it is to move.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tabular_rl_core::{
    Action, Environment, EpsilonGreedy, QTable, RLError, Result, StateEncoder, Trajectory,
    Transition,
};
use tracing::debug;

use crate::adversary::Adversary;
use crate::config::{RolloutOptions, Seat};
use crate::report::EvaluationReport;

/// How a rollout treats the Q-table
pub(crate) enum Learning<'a, S, A> {
    /// Apply the Q-learning update after every learner transition
    Update {
        table: &'a mut QTable<S, A>,
        learning_rate: f64,
        discount_factor: f64,
    },
    /// Read the table only
    Frozen(&'a QTable<S, A>),
}

impl<S, A> Learning<'_, S, A> {
    fn table(&self) -> &QTable<S, A> {
        match self {
            Learning::Update { table, .. } => &**table,
            Learning::Frozen(table) => *table,
        }
    }
}

/// Candidate actions expressed in the encoded state's frame
fn keyed_actions<P, A, C>(encoder: &C, position: &P, legal: &[A]) -> Vec<A>
where
    A: Action,
    C: StateEncoder<P, A>,
{
    legal
        .iter()
        .map(|action| encoder.encode_action(position, action))
        .collect()
}

/// Play one episode.
///
/// Terminal successors are never queried for legal actions or values; their
/// target is the transition reward alone.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn play_episode<E, C, R>(
    env: &mut E,
    encoder: &C,
    mut learning: Learning<'_, C::State, E::Action>,
    policy: &EpsilonGreedy,
    rng: &mut R,
    mut adversary: Option<&mut (dyn Adversary<E::Position, E::Action> + '_)>,
    options: &RolloutOptions,
) -> Result<Trajectory<C::State, E::Action>>
where
    E: Environment,
    C: StateEncoder<E::Position, E::Action>,
    R: Rng + ?Sized,
{
    let mut trajectory = Trajectory::new();
    let mut position = env.reset()?;

    if options.learner_seat == Seat::Second {
        let opponent = adversary.as_deref_mut().ok_or_else(|| {
            RLError::Config("learner plays second but no adversary is set".to_string())
        })?;
        let opening = env.legal_actions(&position);
        if opening.is_empty() {
            trajectory.finish();
            return Ok(trajectory);
        }
        let reply = opponent.act(&position, &opening)?;
        let step = env.step(&position, &reply)?;
        position = step.position;
        if step.done {
            // Nothing to learn from, but the game still counts for the learner
            if step.truncated {
                trajectory.truncate();
            } else {
                trajectory.finish_with(env.counter_reward(step.reward));
            }
            return Ok(trajectory);
        }
    }

    let mut state = encoder.encode(&position)?;
    let mut legal = env.legal_actions(&position);

    loop {
        if legal.is_empty() {
            trajectory.finish();
            break;
        }
        if options.max_steps.is_some_and(|limit| trajectory.len() >= limit) {
            debug!(steps = trajectory.len(), "step limit reached");
            trajectory.truncate();
            break;
        }

        let keyed = keyed_actions(encoder, &position, &legal);
        let index = policy.select_index(learning.table(), &state, &keyed, rng)?;
        let step = env.step(&position, &legal[index])?;

        let mut reward = step.reward;
        let mut done = step.done;
        let mut truncated = step.truncated;
        let mut next_position = step.position;

        if !done {
            if let Some(opponent) = adversary.as_deref_mut() {
                let replies = env.legal_actions(&next_position);
                if !replies.is_empty() {
                    let reply = opponent.act(&next_position, &replies)?;
                    let answer = env.step(&next_position, &reply)?;
                    reward += env.counter_reward(answer.reward);
                    done = answer.done;
                    truncated = answer.truncated;
                    next_position = answer.position;
                }
            }
        }

        let next_state = encoder.encode(&next_position)?;
        let next_legal = if done {
            Vec::new()
        } else {
            env.legal_actions(&next_position)
        };

        if let Learning::Update {
            table,
            learning_rate,
            discount_factor,
        } = &mut learning
        {
            let target = if next_legal.is_empty() {
                reward.value()
            } else {
                let next_keyed = keyed_actions(encoder, &next_position, &next_legal);
                let next_value = table
                    .max_value(&next_state, &next_keyed)
                    .unwrap_or_else(|| table.default_value());
                reward.value() + *discount_factor * next_value
            };
            table.update(&state, &keyed[index], target, *learning_rate)?;
        }

        trajectory.push(Transition {
            state,
            action: keyed[index].clone(),
            reward,
            next_state: next_state.clone(),
            done,
        });

        if done {
            if truncated {
                trajectory.truncate();
            } else {
                trajectory.finish();
            }
            break;
        }

        position = next_position;
        state = next_state;
        legal = next_legal;
    }

    debug!(
        steps = trajectory.len(),
        total_reward = trajectory.total_reward.value(),
        end = ?trajectory.end,
        "episode finished"
    );
    Ok(trajectory)
}

/// Play one greedy episode against `table` without updating it
pub fn run_episode<E, C>(
    env: &mut E,
    encoder: &C,
    table: &QTable<C::State, E::Action>,
    adversary: Option<&mut (dyn Adversary<E::Position, E::Action> + '_)>,
    options: &RolloutOptions,
) -> Result<Trajectory<C::State, E::Action>>
where
    E: Environment,
    C: StateEncoder<E::Position, E::Action>,
{
    // Greedy selection never draws from the generator
    let mut rng = StdRng::seed_from_u64(0);
    play_episode(
        env,
        encoder,
        Learning::Frozen(table),
        &EpsilonGreedy::greedy(),
        &mut rng,
        adversary,
        options,
    )
}

/// Play `episodes` greedy episodes and aggregate their outcomes
pub fn evaluate<E, C>(
    env: &mut E,
    encoder: &C,
    table: &QTable<C::State, E::Action>,
    mut adversary: Option<&mut (dyn Adversary<E::Position, E::Action> + '_)>,
    options: &RolloutOptions,
    episodes: usize,
) -> Result<EvaluationReport>
where
    E: Environment,
    C: StateEncoder<E::Position, E::Action>,
{
    let mut trajectories = Vec::with_capacity(episodes);
    for _ in 0..episodes {
        trajectories.push(run_episode(
            env,
            encoder,
            table,
            adversary.as_deref_mut(),
            options,
        )?);
    }
    Ok(EvaluationReport::from_trajectories(&trajectories))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adversary::RandomAdversary;
    use tabular_rl_core::{EpisodeEnd, IdentityEncoder, Step};

    /// Counter that ends when it reaches 3; action `true` adds one
    struct Counter;

    impl Environment for Counter {
        type Position = u8;
        type Action = bool;

        fn reset(&mut self) -> Result<u8> {
            Ok(0)
        }

        fn legal_actions(&self, position: &u8) -> Vec<bool> {
            assert!(*position < 3, "queried a terminal position");
            vec![false, true]
        }

        fn step(&mut self, position: &u8, action: &bool) -> Result<Step<u8>> {
            let next = position + u8::from(*action);
            Ok(if next >= 3 {
                Step::terminal(next, 1.0)
            } else {
                Step::running(next, 0.0)
            })
        }
    }

    fn learn(table: &mut QTable<u8, bool>) -> Learning<'_, u8, bool> {
        Learning::Update {
            table,
            learning_rate: 1.0,
            discount_factor: 0.5,
        }
    }

    #[test]
    fn test_terminal_transition_uses_reward_only() {
        let mut table = QTable::new(0.0);
        // Prefer `true` everywhere so the episode ends in three steps
        table.update(&0, &true, 0.1, 1.0).unwrap();
        table.update(&1, &true, 0.1, 1.0).unwrap();
        table.update(&2, &true, 0.1, 1.0).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let trajectory = play_episode(
            &mut Counter,
            &IdentityEncoder::new(),
            learn(&mut table),
            &EpsilonGreedy::greedy(),
            &mut rng,
            None,
            &RolloutOptions::default(),
        )
        .unwrap();

        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.end, EpisodeEnd::Terminal);
        assert_eq!(table.value(&2, &true), 1.0);
        // Updated before their successors were, so they bootstrap from 0.1
        assert_eq!(table.value(&1, &true), 0.05);
        assert_eq!(table.value(&0, &true), 0.05);
    }

    #[test]
    fn test_step_limit_truncates() {
        let table = QTable::new(0.0);
        let options = RolloutOptions {
            max_steps: Some(4),
            ..RolloutOptions::default()
        };
        // Greedy on an empty table picks `false` forever
        let trajectory =
            run_episode(&mut Counter, &IdentityEncoder::new(), &table, None, &options).unwrap();
        assert_eq!(trajectory.len(), 4);
        assert_eq!(trajectory.end, EpisodeEnd::Truncated);
        assert_eq!(trajectory.outcome(), None);
    }

    #[test]
    fn test_second_seat_requires_adversary() {
        let table = QTable::new(0.0);
        let options = RolloutOptions {
            learner_seat: Seat::Second,
            ..RolloutOptions::default()
        };
        let result = run_episode(&mut Counter, &IdentityEncoder::new(), &table, None, &options);
        assert!(matches!(result, Err(RLError::Config(_))));
    }

    /// Any first move wins
    struct FirstMoveWins;

    impl Environment for FirstMoveWins {
        type Position = u8;
        type Action = u8;

        fn reset(&mut self) -> Result<u8> {
            Ok(0)
        }

        fn legal_actions(&self, position: &u8) -> Vec<u8> {
            assert_eq!(*position, 0, "queried a terminal position");
            vec![0, 1]
        }

        fn step(&mut self, _position: &u8, action: &u8) -> Result<Step<u8>> {
            Ok(Step::terminal(action + 1, 1.0))
        }
    }

    #[test]
    fn test_opening_loss_is_scored_for_second_seat() {
        let table = QTable::new(0.0);
        let options = RolloutOptions {
            learner_seat: Seat::Second,
            ..RolloutOptions::default()
        };
        let mut random = RandomAdversary::seeded(3);
        let adversary: &mut dyn Adversary<u8, u8> = &mut random;
        let report = evaluate(
            &mut FirstMoveWins,
            &IdentityEncoder::new(),
            &table,
            Some(adversary),
            &options,
            10,
        )
        .unwrap();

        assert_eq!(report.episodes, 10);
        assert_eq!(report.losses, 10);
        assert_eq!(report.wins + report.losses + report.draws, report.episodes);
        assert_eq!(report.mean_steps, 0.0);
        assert_eq!(report.mean_reward, -1.0);
    }

    #[test]
    fn test_evaluate_counts_wins() {
        let mut table = QTable::new(0.0);
        for s in 0..3u8 {
            table.update(&s, &true, 1.0, 1.0).unwrap();
        }
        let report = evaluate(
            &mut Counter,
            &IdentityEncoder::new(),
            &table,
            None,
            &RolloutOptions::default(),
            5,
        )
        .unwrap();
        assert_eq!(report.episodes, 5);
        assert_eq!(report.wins, 5);
        assert_eq!(report.mean_steps, 3.0);
    }
}
