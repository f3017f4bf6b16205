//! Action representation

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for actions a game can offer
///
/// Actions are opaque to the learner. They only need to be comparable and
/// hashable so they can key the Q-table next to a state.
pub trait Action: Clone + Debug + Eq + Hash {}

impl<T> Action for T where T: Clone + Debug + Eq + Hash {}

/// Check that `action` is one of `legal`, reporting an illegal action otherwise.
///
/// Environments call this at the top of `step`.
pub fn ensure_legal<A: Action>(action: &A, legal: &[A]) -> crate::Result<()> {
    if legal.contains(action) {
        Ok(())
    } else {
        Err(crate::RLError::IllegalAction(format!(
            "{action:?} is not among {legal:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RLError;

    #[test]
    fn test_ensure_legal() {
        let legal = vec!['a', 'b'];
        assert!(ensure_legal(&'a', &legal).is_ok());
        assert!(matches!(
            ensure_legal(&'c', &legal),
            Err(RLError::IllegalAction(_))
        ));
        assert!(ensure_legal(&'a', &[]).is_err());
    }
}
