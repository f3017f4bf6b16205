//! Error types for the tabular RL core library

use thiserror::Error;

/// Core error type for tabular RL operations
#[derive(Error, Debug)]
pub enum RLError {
    /// An action outside the legal set was proposed
    #[error("Illegal action: {0}")]
    IllegalAction(String),

    /// Action selection was attempted with no legal actions
    #[error("Empty action set: selection attempted at a terminal position")]
    EmptyActionSet,

    /// A raw position could not be turned into a state key
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Game-specific failure reported by an environment
    #[error("Environment error: {0}")]
    Environment(String),

    /// A numeric argument outside its contract (learning rate, epsilon, target)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration rejected during validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RLError {
    /// Whether the error only invalidates the episode it happened in.
    ///
    /// Environment and encoder failures are recoverable by skipping the
    /// episode. Everything else is a contract violation between components
    /// and must stop the run.
    #[must_use]
    pub fn is_episode_local(&self) -> bool {
        matches!(self, Self::Encoding(_) | Self::Environment(_) | Self::Other(_))
    }
}

/// Result type alias for RL operations
pub type Result<T> = std::result::Result<T, RLError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_local_classification() {
        assert!(RLError::Encoding("bad board".into()).is_episode_local());
        assert!(RLError::Environment("crashed".into()).is_episode_local());
        assert!(RLError::Other(anyhow::anyhow!("io hiccup")).is_episode_local());

        assert!(!RLError::IllegalAction("left".into()).is_episode_local());
        assert!(!RLError::EmptyActionSet.is_episode_local());
        assert!(!RLError::InvalidParameter("lr".into()).is_episode_local());
        assert!(!RLError::Config("episodes".into()).is_episode_local());
    }
}
