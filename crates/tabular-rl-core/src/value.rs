//! Tabular action-value store

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Action, RLError, StateKey};

/// One enumerated Q-table entry
///
/// This is the unit an external persistence layer reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QRecord<S, A> {
    /// Encoded state
    pub state: S,
    /// Action in the frame of `state`
    pub action: A,
    /// Estimated return
    pub value: f64,
}

/// Tabular Q-function mapping `(state, action)` to an estimated return
///
/// Unseen pairs read as the configured default. Entries are created lazily
/// by [`QTable::update`] or [`QTable::value_or_insert`] and only removed by
/// [`QTable::clear`]. Rows keep insertion order so enumeration is
/// reproducible.
#[derive(Debug, Clone)]
pub struct QTable<S, A> {
    rows: IndexMap<S, IndexMap<A, f64>>,
    default_value: f64,
    len: usize,
}

impl<S: StateKey, A: Action> QTable<S, A> {
    /// Create an empty table whose unseen entries read as `default_value`
    #[must_use]
    pub fn new(default_value: f64) -> Self {
        Self {
            rows: IndexMap::new(),
            default_value,
            len: 0,
        }
    }

    /// Rebuild a table from enumerated records; later duplicates win
    pub fn from_records<I>(default_value: f64, records: I) -> Self
    where
        I: IntoIterator<Item = QRecord<S, A>>,
    {
        let mut table = Self::new(default_value);
        for record in records {
            table.insert(record.state, record.action, record.value);
        }
        table
    }

    /// Value returned for pairs that have never been written
    #[must_use]
    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    /// Current estimate for `(state, action)`
    #[must_use]
    pub fn value(&self, state: &S, action: &A) -> f64 {
        self.rows
            .get(state)
            .and_then(|row| row.get(action))
            .copied()
            .unwrap_or(self.default_value)
    }

    /// Current estimate for `(state, action)`, materializing the entry at the default
    pub fn value_or_insert(&mut self, state: &S, action: &A) -> f64 {
        if let Some(value) = self.rows.get(state).and_then(|row| row.get(action)) {
            return *value;
        }
        self.insert(state.clone(), action.clone(), self.default_value);
        self.default_value
    }

    /// Largest estimate among `candidates`, `None` if there are none
    #[must_use]
    pub fn max_value(&self, state: &S, candidates: &[A]) -> Option<f64> {
        self.best_index(state, candidates)
            .map(|index| self.value(state, &candidates[index]))
    }

    /// Index of the best candidate; ties go to the earliest one
    #[must_use]
    pub fn best_index(&self, state: &S, candidates: &[A]) -> Option<usize> {
        let row = self.rows.get(state);
        let lookup = |action: &A| {
            row.and_then(|row| row.get(action))
                .copied()
                .unwrap_or(self.default_value)
        };

        let mut best: Option<(usize, f64)> = None;
        for (index, action) in candidates.iter().enumerate() {
            let value = lookup(action);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((index, value)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Best candidate action in `state`
    pub fn best_action(&self, state: &S, candidates: &[A]) -> crate::Result<A> {
        self.best_index(state, candidates)
            .map(|index| candidates[index].clone())
            .ok_or(RLError::EmptyActionSet)
    }

    /// Move `Q(state, action)` toward `target`.
    ///
    /// Applies `Q ← Q + lr·(target − Q)` written as `(1 − lr)·Q + lr·target`,
    /// so `lr = 1` stores `target` and `lr = 0` keeps `Q` bit for bit.
    /// Returns the new estimate.
    pub fn update(
        &mut self,
        state: &S,
        action: &A,
        target: f64,
        learning_rate: f64,
    ) -> crate::Result<f64> {
        if !(0.0..=1.0).contains(&learning_rate) {
            return Err(RLError::InvalidParameter(format!(
                "learning rate {learning_rate} outside [0, 1]"
            )));
        }
        if !target.is_finite() {
            return Err(RLError::InvalidParameter(format!(
                "non-finite update target {target} for {state:?}/{action:?}"
            )));
        }

        let default_value = self.default_value;
        let row = self.rows.entry(state.clone()).or_default();
        let mut created = false;
        let slot = row.entry(action.clone()).or_insert_with(|| {
            created = true;
            default_value
        });
        let updated = (1.0 - learning_rate) * *slot + learning_rate * target;
        *slot = updated;
        if created {
            self.len += 1;
        }
        Ok(updated)
    }

    /// Number of stored `(state, action)` entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been stored yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct states with at least one entry
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.rows.len()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.rows.clear();
        self.len = 0;
    }

    /// Borrowing iterator over all entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&S, &A, f64)> + '_ {
        self.rows
            .iter()
            .flat_map(|(state, row)| row.iter().map(move |(action, value)| (state, action, *value)))
    }

    /// Owned records for external serialization
    #[must_use]
    pub fn records(&self) -> Vec<QRecord<S, A>> {
        self.iter()
            .map(|(state, action, value)| QRecord {
                state: state.clone(),
                action: action.clone(),
                value,
            })
            .collect()
    }

    fn insert(&mut self, state: S, action: A, value: f64) {
        if self.rows.entry(state).or_default().insert(action, value).is_none() {
            self.len += 1;
        }
    }
}

impl<S: StateKey, A: Action> Default for QTable<S, A> {
    fn default() -> Self {
        Self::new(0.0)
    }
}
