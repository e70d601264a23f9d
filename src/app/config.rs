//! Run configuration for training sessions.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    q_learning::{EpsilonGreedy, EpsilonSchedule, LearningConfig},
};

/// Configuration for one training run.
///
/// This type provides a builder-style API and JSON load/save so runs can be
/// reproduced from a file.
///
/// # Examples
///
/// ```
/// use qlearn::app::RunConfig;
/// use qlearn::q_learning::{EpsilonSchedule, LearningConfig};
///
/// let config = RunConfig::new(500)
///     .with_max_steps(100)
///     .with_learning(LearningConfig::new(0.1, 0.9)?)
///     .with_epsilon(EpsilonSchedule::linear_over(1.0, 0.01, 500)?)
///     .with_seed(42);
/// config.validate()?;
/// # Ok::<(), qlearn::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RunConfigFile")]
pub struct RunConfig {
    /// Number of training episodes
    pub episodes: usize,
    /// Step budget per episode; `None` is unbounded
    pub max_steps_per_episode: Option<usize>,
    /// Learning rate and discount factor
    pub learning: LearningConfig,
    /// Exploration schedule
    pub epsilon: EpsilonSchedule,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl RunConfig {
    /// Create a configuration for `episodes` episodes.
    ///
    /// Uses default values for other parameters:
    /// - Step budget: 100
    /// - Learning: α = 0.1, γ = 0.9
    /// - Epsilon: linear from 1.0 to 0.01 over the run
    /// - Seed: None (non-deterministic)
    pub fn new(episodes: usize) -> Self {
        Self {
            episodes,
            max_steps_per_episode: Some(100),
            learning: LearningConfig::default(),
            epsilon: Self::default_epsilon(episodes),
            seed: None,
        }
    }

    /// Linear decay from 1.0 to 0.01, reaching the floor on the last episode
    pub fn default_epsilon(episodes: usize) -> EpsilonSchedule {
        EpsilonSchedule::linear_over(1.0, 0.01, episodes).unwrap_or_default()
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps_per_episode = Some(max_steps);
        self
    }

    /// Remove the per-episode step budget.
    pub fn unbounded(mut self) -> Self {
        self.max_steps_per_episode = None;
        self
    }

    pub fn with_learning(mut self, learning: LearningConfig) -> Self {
        self.learning = learning;
        self
    }

    pub fn with_epsilon(mut self, epsilon: EpsilonSchedule) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the fields the type system does not.
    pub fn validate(&self) -> Result<()> {
        if self.episodes == 0 {
            return Err(Error::invalid_config("episodes must be positive"));
        }
        if self.max_steps_per_episode == Some(0) {
            return Err(Error::invalid_config(
                "max_steps_per_episode must be positive when set",
            ));
        }
        self.epsilon.validate()
    }

    /// Build the ε-greedy policy this configuration describes.
    pub fn policy(&self) -> EpsilonGreedy {
        match self.seed {
            Some(seed) => EpsilonGreedy::seeded(self.epsilon, seed),
            None => EpsilonGreedy::new(self.epsilon),
        }
    }

    /// Save configuration to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load configuration from JSON file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(500)
    }
}

/// On-disk form of [`RunConfig`]; absent fields take their defaults, and an
/// absent schedule is derived from the file's own episode count
#[derive(Deserialize)]
#[serde(default)]
struct RunConfigFile {
    episodes: usize,
    max_steps_per_episode: Option<usize>,
    learning: LearningConfig,
    epsilon: Option<EpsilonSchedule>,
    seed: Option<u64>,
}

impl Default for RunConfigFile {
    fn default() -> Self {
        let defaults = RunConfig::default();
        Self {
            episodes: defaults.episodes,
            max_steps_per_episode: defaults.max_steps_per_episode,
            learning: defaults.learning,
            epsilon: None,
            seed: defaults.seed,
        }
    }
}

impl From<RunConfigFile> for RunConfig {
    fn from(file: RunConfigFile) -> Self {
        Self {
            episodes: file.episodes,
            max_steps_per_episode: file.max_steps_per_episode,
            learning: file.learning,
            epsilon: file
                .epsilon
                .unwrap_or_else(|| RunConfig::default_epsilon(file.episodes)),
            seed: file.seed,
        }
    }
}
