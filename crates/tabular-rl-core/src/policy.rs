//! Epsilon-greedy action selection over a Q-table

use rand::Rng;

use crate::{Action, QTable, RLError, StateKey};

/// Epsilon-greedy policy
///
/// With probability `epsilon` a uniformly random candidate is chosen,
/// otherwise the candidate with the highest Q-value (earliest on ties).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Create a new epsilon-greedy policy
    pub fn new(epsilon: f64) -> crate::Result<Self> {
        check_epsilon(epsilon)?;
        Ok(Self { epsilon })
    }

    /// Pure exploitation
    #[must_use]
    pub fn greedy() -> Self {
        Self { epsilon: 0.0 }
    }

    /// Current exploration rate
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Set the exploration rate
    pub fn set_epsilon(&mut self, epsilon: f64) -> crate::Result<()> {
        check_epsilon(epsilon)?;
        self.epsilon = epsilon;
        Ok(())
    }

    /// Pick one of `candidates` and return its index.
    ///
    /// The random source is only consulted when `epsilon > 0`, so greedy
    /// selection never advances it.
    pub fn select_index<S, A, R>(
        &self,
        table: &QTable<S, A>,
        state: &S,
        candidates: &[A],
        rng: &mut R,
    ) -> crate::Result<usize>
    where
        S: StateKey,
        A: Action,
        R: Rng + ?Sized,
    {
        if candidates.is_empty() {
            return Err(RLError::EmptyActionSet);
        }

        if self.epsilon > 0.0 && rng.gen::<f64>() < self.epsilon {
            // Explore: random action
            Ok(rng.gen_range(0..candidates.len()))
        } else {
            // Exploit: best known action
            table
                .best_index(state, candidates)
                .ok_or(RLError::EmptyActionSet)
        }
    }

    /// Pick one of `candidates`
    pub fn select<S, A, R>(
        &self,
        table: &QTable<S, A>,
        state: &S,
        candidates: &[A],
        rng: &mut R,
    ) -> crate::Result<A>
    where
        S: StateKey,
        A: Action,
        R: Rng + ?Sized,
    {
        self.select_index(table, state, candidates, rng)
            .map(|index| candidates[index].clone())
    }
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self::greedy()
    }
}

fn check_epsilon(epsilon: f64) -> crate::Result<()> {
    if (0.0..=1.0).contains(&epsilon) {
        Ok(())
    } else {
        Err(RLError::InvalidParameter(format!(
            "epsilon {epsilon} outside [0, 1]"
        )))
    }
}
