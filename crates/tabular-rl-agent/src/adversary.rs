//! Opponent strategies for two-player training
//!
//! An adversary answers each learner move. It owns its randomness and never
//! sees the learner's Q-table.

use std::marker::PhantomData;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tabular_rl_core::{ensure_legal, Action, QTable, RLError, Result, StateEncoder};

/// Trait for opponent policies
pub trait Adversary<P, A: Action> {
    /// Choose a reply among `legal` in `position`
    fn act(&mut self, position: &P, legal: &[A]) -> Result<A>;
}

/// Opponent that picks uniformly among legal actions
#[derive(Debug, Clone)]
pub struct RandomAdversary<R = StdRng> {
    rng: R,
}

impl RandomAdversary<StdRng> {
    /// Create a random adversary with a reproducible seed
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomAdversary<R> {
    /// Create a random adversary around an existing random source
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    fn pick<A: Action>(&mut self, legal: &[A]) -> Result<A> {
        if legal.is_empty() {
            return Err(RLError::EmptyActionSet);
        }
        Ok(legal[self.rng.gen_range(0..legal.len())].clone())
    }
}

impl<P, A: Action, R: Rng> Adversary<P, A> for RandomAdversary<R> {
    fn act(&mut self, _position: &P, legal: &[A]) -> Result<A> {
        self.pick(legal)
    }
}

/// Opponent driven by a fixed rule, falling back to random play
///
/// The rule returns `None` when it has no preference.
pub struct HeuristicAdversary<F, R = StdRng> {
    rule: F,
    fallback: RandomAdversary<R>,
}

impl<F> HeuristicAdversary<F, StdRng> {
    /// Create a heuristic adversary whose fallback is seeded
    pub fn seeded(rule: F, seed: u64) -> Self {
        Self {
            rule,
            fallback: RandomAdversary::seeded(seed),
        }
    }
}

impl<F, P, A, R> Adversary<P, A> for HeuristicAdversary<F, R>
where
    F: FnMut(&P, &[A]) -> Option<A>,
    A: Action,
    R: Rng,
{
    fn act(&mut self, position: &P, legal: &[A]) -> Result<A> {
        match (self.rule)(position, legal) {
            Some(action) => {
                ensure_legal(&action, legal)?;
                Ok(action)
            }
            None => self.fallback.pick(legal),
        }
    }
}

/// Opponent that plays greedily from a frozen Q-table
///
/// Typically a snapshot of a previously trained learner, with the encoder it
/// was trained with.
pub struct FrozenQAdversary<C, P, A: Action>
where
    C: StateEncoder<P, A>,
{
    encoder: C,
    table: QTable<C::State, A>,
    _position: PhantomData<fn(&P)>,
}

impl<C, P, A> FrozenQAdversary<C, P, A>
where
    C: StateEncoder<P, A>,
    A: Action,
{
    /// Freeze `table` behind `encoder`
    pub fn new(encoder: C, table: QTable<C::State, A>) -> Self {
        Self {
            encoder,
            table,
            _position: PhantomData,
        }
    }

    /// The frozen table
    pub fn table(&self) -> &QTable<C::State, A> {
        &self.table
    }
}

impl<C, P, A> Adversary<P, A> for FrozenQAdversary<C, P, A>
where
    C: StateEncoder<P, A>,
    A: Action,
{
    fn act(&mut self, position: &P, legal: &[A]) -> Result<A> {
        let state = self.encoder.encode(position)?;
        let keyed: Vec<A> = legal
            .iter()
            .map(|action| self.encoder.encode_action(position, action))
            .collect();
        self.table
            .best_index(&state, &keyed)
            .map(|index| legal[index].clone())
            .ok_or(RLError::EmptyActionSet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabular_rl_core::IdentityEncoder;

    #[test]
    fn test_random_adversary_is_reproducible() {
        let legal = [1u8, 2, 3, 4];
        let mut a = RandomAdversary::seeded(9);
        let mut b = RandomAdversary::seeded(9);
        for _ in 0..20 {
            let x = a.act(&(), &legal).unwrap();
            assert_eq!(x, b.act(&(), &legal).unwrap());
            assert!(legal.contains(&x));
        }
    }

    #[test]
    fn test_random_adversary_empty() {
        let mut adversary = RandomAdversary::seeded(0);
        let legal: [u8; 0] = [];
        assert!(matches!(adversary.act(&(), &legal), Err(RLError::EmptyActionSet)));
    }

    #[test]
    fn test_heuristic_prefers_rule() {
        let mut adversary = HeuristicAdversary::seeded(
            |_: &u8, legal: &[u8]| legal.iter().copied().max(),
            1,
        );
        assert_eq!(adversary.act(&0, &[3, 9, 4]).unwrap(), 9);
    }

    #[test]
    fn test_heuristic_falls_back_and_checks_legality() {
        let mut declines = HeuristicAdversary::seeded(|_: &u8, _: &[u8]| None, 2);
        let choice = declines.act(&0, &[5, 6]).unwrap();
        assert!(choice == 5 || choice == 6);

        let mut cheats = HeuristicAdversary::seeded(|_: &u8, _: &[u8]| Some(42), 2);
        assert!(matches!(cheats.act(&0, &[5, 6]), Err(RLError::IllegalAction(_))));
    }

    #[test]
    fn test_frozen_adversary_plays_greedy() {
        let mut table = QTable::new(0.0);
        table.update(&7u32, &'b', 2.0, 1.0).unwrap();
        let mut adversary = FrozenQAdversary::new(IdentityEncoder::<u32>::new(), table);

        assert_eq!(adversary.act(&7, &['a', 'b']).unwrap(), 'b');
        assert_eq!(adversary.act(&8, &['a', 'b']).unwrap(), 'a');
        assert_eq!(adversary.table().len(), 1);
    }
}
