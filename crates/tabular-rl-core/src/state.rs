//! State keys and state encoders

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::Action;

/// Trait for canonical state keys
///
/// A state key is immutable once produced. Two positions a game considers
/// equivalent must encode to equal keys, all others to distinct keys.
pub trait StateKey: Clone + Debug + Eq + Hash {}

impl<T> StateKey for T where T: Clone + Debug + Eq + Hash {}

/// Converts raw game positions into canonical state keys
///
/// Encoders must be deterministic and total over every reachable position.
pub trait StateEncoder<P, A: Action> {
    /// The key type stored in the Q-table
    type State: StateKey;

    /// Encode a raw position
    fn encode(&self, position: &P) -> crate::Result<Self::State>;

    /// Express `action`, legal in `position`, in the frame of the encoded state.
    ///
    /// Encoders that fold symmetric positions together must map actions
    /// through the same transform. The default is the identity.
    fn encode_action(&self, _position: &P, action: &A) -> A {
        action.clone()
    }
}

/// Encoder for games whose positions are already usable as state keys
#[derive(Debug)]
pub struct IdentityEncoder<P> {
    _marker: PhantomData<fn(&P)>,
}

impl<P> IdentityEncoder<P> {
    /// Create a new identity encoder
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<P> Default for IdentityEncoder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for IdentityEncoder<P> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<P, A> StateEncoder<P, A> for IdentityEncoder<P>
where
    P: StateKey,
    A: Action,
{
    type State = P;

    fn encode(&self, position: &P) -> crate::Result<P> {
        Ok(position.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_encoder() {
        let encoder = IdentityEncoder::<(u8, u8)>::new();
        let state = StateEncoder::<_, char>::encode(&encoder, &(1, 2)).unwrap();
        assert_eq!(state, (1, 2));
        assert_eq!(encoder.encode_action(&(1, 2), &'x'), 'x');
    }
}
