//! Reward signals and episode outcomes

use serde::{Deserialize, Serialize};

/// Reward signal from the environment
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Reward(pub f64);

impl Reward {
    /// No reward
    pub const ZERO: Self = Self(0.0);

    /// Create a new reward
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the reward value
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Reward {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Reward> for f64 {
    fn from(reward: Reward) -> Self {
        reward.0
    }
}

impl std::ops::Add for Reward {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl std::ops::AddAssign for Reward {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl std::ops::Mul<f64> for Reward {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self(self.0 * scalar)
    }
}

impl std::ops::Neg for Reward {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

/// Result of a finished episode from the learner's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Positive terminal reward
    Win,
    /// Negative terminal reward
    Loss,
    /// Zero terminal reward
    Draw,
}

impl Outcome {
    /// Classify a terminal reward by its sign
    #[must_use]
    pub fn from_reward(reward: Reward) -> Self {
        if reward.0 > 0.0 {
            Self::Win
        } else if reward.0 < 0.0 {
            Self::Loss
        } else {
            Self::Draw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_arithmetic() {
        let mut total = Reward::ZERO;
        total += Reward(1.5);
        total += Reward::from(-0.5);
        assert_eq!(total, Reward(1.0));
        assert_eq!(-(Reward(2.0) * 0.5), Reward(-1.0));
        assert_eq!(f64::from(Reward(3.0) + Reward(1.0)), 4.0);
    }

    #[test]
    fn test_outcome_from_reward() {
        assert_eq!(Outcome::from_reward(Reward(1.0)), Outcome::Win);
        assert_eq!(Outcome::from_reward(Reward(-10.0)), Outcome::Loss);
        assert_eq!(Outcome::from_reward(Reward::ZERO), Outcome::Draw);
    }
}
