//! Exploration schedules
//!
//! A schedule maps an episode index to an exploration probability ε. The
//! schedule itself holds no counter; callers pass the episode explicitly.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Episode index -> ε
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EpsilonSchedule {
    /// `ε(e) = max(end, start - e * decay_per_episode)`
    Linear {
        start: f64,
        end: f64,
        decay_per_episode: f64,
    },
    /// `ε(e) = end + (start - end) * exp(-rate * e)`
    Exponential { start: f64, end: f64, rate: f64 },
    /// Fixed ε for every episode
    Constant { epsilon: f64 },
}

impl EpsilonSchedule {
    /// Linear decay from `start` to `end`, reduced by `decay_per_episode` each episode
    pub fn linear(start: f64, end: f64, decay_per_episode: f64) -> Result<Self> {
        let schedule = Self::Linear {
            start,
            end,
            decay_per_episode,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Linear decay that reaches `end` at episode `episodes`
    pub fn linear_over(start: f64, end: f64, episodes: usize) -> Result<Self> {
        if episodes == 0 {
            return Err(Error::invalid_config(
                "linear schedule needs at least one episode to decay over",
            ));
        }
        Self::linear(start, end, (start - end) / episodes as f64)
    }

    /// Exponential decay from `start` towards `end`
    pub fn exponential(start: f64, end: f64, rate: f64) -> Result<Self> {
        let schedule = Self::Exponential { start, end, rate };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn constant(epsilon: f64) -> Result<Self> {
        let schedule = Self::Constant { epsilon };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Exploration probability for `episode`
    pub fn epsilon(&self, episode: usize) -> f64 {
        let e = episode as f64;
        match *self {
            Self::Linear {
                start,
                end,
                decay_per_episode,
            } => end.max(start - e * decay_per_episode),
            Self::Exponential { start, end, rate } => end + (start - end) * (-rate * e).exp(),
            Self::Constant { epsilon } => epsilon,
        }
    }

    /// Check every parameter; schedules deserialized from config files
    /// bypass the constructors, so callers run this after loading.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Linear {
                start,
                end,
                decay_per_episode,
            } => {
                check_probability("start", start)?;
                check_probability("end", end)?;
                check_non_negative("decay_per_episode", decay_per_episode)
            }
            Self::Exponential { start, end, rate } => {
                check_probability("start", start)?;
                check_probability("end", end)?;
                check_non_negative("rate", rate)
            }
            Self::Constant { epsilon } => check_probability("epsilon", epsilon),
        }
    }
}

impl Default for EpsilonSchedule {
    fn default() -> Self {
        Self::Linear {
            start: 1.0,
            end: 0.01,
            decay_per_episode: 0.002,
        }
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "epsilon {name} must lie in [0, 1], got {value}"
        )))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "epsilon {name} must be finite and non-negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_starts_at_start() {
        let schedule = EpsilonSchedule::linear(1.0, 0.1, 0.1).unwrap();
        assert_eq!(schedule.epsilon(0), 1.0);
    }

    #[test]
    fn test_linear_reaches_end_and_stays() {
        let schedule = EpsilonSchedule::linear(1.0, 0.2, 0.25).unwrap();
        assert!((schedule.epsilon(2) - 0.5).abs() < 1e-12);
        assert_eq!(schedule.epsilon(4), 0.2);
        assert_eq!(schedule.epsilon(1_000), 0.2);
    }

    #[test]
    fn test_linear_over_hits_end_at_horizon() {
        let schedule = EpsilonSchedule::linear_over(1.0, 0.01, 500).unwrap();
        assert!((schedule.epsilon(500) - 0.01).abs() < 1e-9);
        assert!(schedule.epsilon(250) > 0.4);
        assert!(EpsilonSchedule::linear_over(1.0, 0.0, 0).is_err());
    }

    #[test]
    fn test_exponential_starts_at_start_and_approaches_end() {
        let schedule = EpsilonSchedule::exponential(0.9, 0.05, 0.01).unwrap();
        assert_eq!(schedule.epsilon(0), 0.9);
        let late = schedule.epsilon(2_000);
        assert!(late > 0.05);
        assert!(late - 0.05 < 1e-6);
    }

    #[test]
    fn test_constant() {
        let schedule = EpsilonSchedule::constant(0.3).unwrap();
        assert_eq!(schedule.epsilon(0), 0.3);
        assert_eq!(schedule.epsilon(99), 0.3);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(EpsilonSchedule::linear(1.5, 0.1, 0.1).is_err());
        assert!(EpsilonSchedule::linear(1.0, 0.1, -0.1).is_err());
        assert!(EpsilonSchedule::exponential(1.0, f64::NAN, 0.1).is_err());
        assert!(EpsilonSchedule::exponential(1.0, 0.1, f64::INFINITY).is_err());
        assert!(EpsilonSchedule::constant(-0.01).is_err());
    }

    #[test]
    fn test_serde_tagged_representation() {
        let schedule = EpsilonSchedule::exponential(1.0, 0.1, 0.05).unwrap();
        let json = serde_json::to_value(schedule).unwrap();
        assert_eq!(json["kind"], "exponential");
        let back: EpsilonSchedule = serde_json::from_value(json).unwrap();
        assert_eq!(back, schedule);
    }
}
