//! Exploration schedules
//!
//! A schedule maps the number of finished episodes to the epsilon used for
//! the next one. Every schedule here is non-increasing and never drops below
//! its floor.

use serde::{Deserialize, Serialize};
use tabular_rl_core::RLError;

/// Trait for epsilon schedules
pub trait Schedule {
    /// Epsilon for the episode after `episode` episodes have finished
    fn value(&self, episode: usize) -> f64;

    /// Lowest value the schedule can reach
    fn floor(&self) -> f64;
}

/// Linear schedule that decays from start to end over a number of episodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearSchedule {
    /// Starting value
    pub start: f64,
    /// Ending value
    pub end: f64,
    /// Number of episodes for decay
    pub episodes: usize,
}

impl Schedule for LinearSchedule {
    fn value(&self, episode: usize) -> f64 {
        if episode >= self.episodes {
            self.end
        } else {
            let progress = episode as f64 / self.episodes as f64;
            (self.start + (self.end - self.start) * progress).max(self.end)
        }
    }

    fn floor(&self) -> f64 {
        self.end
    }
}

/// Multiplicative decay with a floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialSchedule {
    /// Starting value
    pub start: f64,
    /// Minimum value
    pub min_value: f64,
    /// Factor applied once per episode
    pub decay_rate: f64,
}

impl ExponentialSchedule {
    /// Decay rate that takes `start` down to `min_value` after `episodes` episodes
    #[must_use]
    pub fn reaching(start: f64, min_value: f64, episodes: usize) -> Self {
        let decay_rate = if episodes == 0 || start <= 0.0 || min_value <= 0.0 {
            0.0
        } else {
            (min_value / start).powf(1.0 / episodes as f64).min(1.0)
        };
        Self {
            start,
            min_value,
            decay_rate,
        }
    }
}

impl Schedule for ExponentialSchedule {
    fn value(&self, episode: usize) -> f64 {
        let exponent = i32::try_from(episode).unwrap_or(i32::MAX);
        (self.start * self.decay_rate.powi(exponent)).max(self.min_value)
    }

    fn floor(&self) -> f64 {
        self.min_value
    }
}

/// Constant schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantSchedule {
    /// Constant value
    pub value: f64,
}

impl Schedule for ConstantSchedule {
    fn value(&self, _episode: usize) -> f64 {
        self.value
    }

    fn floor(&self) -> f64 {
        self.value
    }
}

/// Configurable epsilon schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EpsilonSchedule {
    /// Fixed exploration rate
    Constant(ConstantSchedule),
    /// Straight-line decay
    Linear(LinearSchedule),
    /// Multiplicative decay
    Exponential(ExponentialSchedule),
}

impl EpsilonSchedule {
    /// Check the schedule stays inside `[0, 1]` and never increases
    pub fn validate(&self) -> tabular_rl_core::Result<()> {
        let in_unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(RLError::Config(format!("epsilon {name} {value} outside [0, 1]")))
            }
        };

        match self {
            Self::Constant(s) => in_unit("value", s.value),
            Self::Linear(s) => {
                in_unit("start", s.start)?;
                in_unit("end", s.end)?;
                if s.end > s.start {
                    return Err(RLError::Config(format!(
                        "linear epsilon schedule increases from {} to {}",
                        s.start, s.end
                    )));
                }
                Ok(())
            }
            Self::Exponential(s) => {
                in_unit("start", s.start)?;
                in_unit("floor", s.min_value)?;
                if s.min_value > s.start {
                    return Err(RLError::Config(format!(
                        "epsilon floor {} above start {}",
                        s.min_value, s.start
                    )));
                }
                if !(0.0..=1.0).contains(&s.decay_rate) {
                    return Err(RLError::Config(format!(
                        "epsilon decay rate {} outside [0, 1]",
                        s.decay_rate
                    )));
                }
                Ok(())
            }
        }
    }
}

impl Schedule for EpsilonSchedule {
    fn value(&self, episode: usize) -> f64 {
        match self {
            Self::Constant(s) => s.value(episode),
            Self::Linear(s) => s.value(episode),
            Self::Exponential(s) => s.value(episode),
        }
    }

    fn floor(&self) -> f64 {
        match self {
            Self::Constant(s) => s.floor(),
            Self::Linear(s) => s.floor(),
            Self::Exponential(s) => s.floor(),
        }
    }
}

impl Default for EpsilonSchedule {
    fn default() -> Self {
        Self::Exponential(ExponentialSchedule {
            start: 1.0,
            min_value: 0.01,
            decay_rate: 0.995,
        })
    }
}

impl From<LinearSchedule> for EpsilonSchedule {
    fn from(schedule: LinearSchedule) -> Self {
        Self::Linear(schedule)
    }
}

impl From<ExponentialSchedule> for EpsilonSchedule {
    fn from(schedule: ExponentialSchedule) -> Self {
        Self::Exponential(schedule)
    }
}

impl From<ConstantSchedule> for EpsilonSchedule {
    fn from(schedule: ConstantSchedule) -> Self {
        Self::Constant(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_linear_schedule() {
        let schedule = LinearSchedule {
            start: 1.0,
            end: 0.1,
            episodes: 10,
        };
        assert_relative_eq!(schedule.value(0), 1.0);
        assert_relative_eq!(schedule.value(5), 0.55);
        assert_relative_eq!(schedule.value(10), 0.1);
        assert_relative_eq!(schedule.value(1_000), 0.1);
    }

    #[test]
    fn test_exponential_reaching() {
        let schedule = ExponentialSchedule::reaching(1.0, 0.05, 300);
        assert_relative_eq!(schedule.value(0), 1.0);
        assert_relative_eq!(schedule.value(300), 0.05, epsilon = 1e-9);
        assert_eq!(schedule.value(301), 0.05);
    }

    #[test]
    fn test_validation() {
        assert!(EpsilonSchedule::default().validate().is_ok());
        let rising = EpsilonSchedule::Linear(LinearSchedule {
            start: 0.1,
            end: 0.5,
            episodes: 5,
        });
        assert!(rising.validate().is_err());
        let high_floor = EpsilonSchedule::Exponential(ExponentialSchedule {
            start: 0.2,
            min_value: 0.3,
            decay_rate: 0.9,
        });
        assert!(high_floor.validate().is_err());
        let out_of_range = EpsilonSchedule::Constant(ConstantSchedule { value: 1.5 });
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_serde_representation() {
        let json = r#"{"kind":"exponential","start":1.0,"min_value":0.05,"decay_rate":0.99}"#;
        let schedule: EpsilonSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(
            schedule,
            EpsilonSchedule::Exponential(ExponentialSchedule {
                start: 1.0,
                min_value: 0.05,
                decay_rate: 0.99,
            })
        );
    }

    proptest! {
        #[test]
        fn prop_exponential_non_increasing_with_floor(
            start in 0.0f64..=1.0,
            floor_ratio in 0.0f64..=1.0,
            decay_rate in 0.0f64..=1.0,
            episode in 0usize..5_000,
        ) {
            let schedule = ExponentialSchedule {
                start,
                min_value: start * floor_ratio,
                decay_rate,
            };
            prop_assert!(schedule.value(episode + 1) <= schedule.value(episode));
            prop_assert!(schedule.value(episode) >= schedule.floor());
        }

        #[test]
        fn prop_linear_non_increasing_with_floor(
            start in 0.0f64..=1.0,
            end_ratio in 0.0f64..=1.0,
            episodes in 1usize..1_000,
            episode in 0usize..2_000,
        ) {
            let schedule = LinearSchedule {
                start,
                end: start * end_ratio,
                episodes,
            };
            prop_assert!(schedule.value(episode + 1) <= schedule.value(episode) + 1e-12);
            prop_assert!(schedule.value(episode) >= schedule.floor());
        }
    }
}
