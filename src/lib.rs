//! Tabular Q-learning over arbitrary discrete state and action spaces
//!
//! This crate provides:
//! - A string-keyed Q-value store with pluggable state/action encoders
//! - Linear, exponential and constant epsilon schedules
//! - An epsilon-greedy policy with an injectable uniform source
//! - A Q-learning agent with potential-based reward shaping and greedy rollouts
//! - Snapshot persistence (JSON and MessagePack)
//! - Stock training observers and two example environments
//!
//! # Quick start
//!
//! ```no_run
//! use qlearn::{
//!     EpsilonGreedy, EpsilonSchedule, LearningConfig, QLearningAgent,
//!     envs::{GridWorld, Position},
//! };
//!
//! let grid = GridWorld::new(3, 3, Position::new(0, 0), Position::new(2, 2))?;
//! let policy = EpsilonGreedy::seeded(EpsilonSchedule::linear_over(1.0, 0.01, 500)?, 42);
//! let mut agent = QLearningAgent::new(grid, policy, LearningConfig::new(0.1, 0.9)?);
//!
//! agent.train(500, Some(100), &mut ())?;
//! let rollout = agent.roll_out(None, Some(20))?;
//! println!("{} steps, reward {}", rollout.steps(), rollout.total_reward);
//! # Ok::<(), qlearn::Error>(())
//! ```

pub mod adapters;
pub mod app;
pub mod cli;
pub mod encoding;
pub mod envs;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;

pub use encoding::{ActionKey, DefaultEncoder, KeyEncoder, StateKey, UnorderedEncoder};
pub use error::{Error, Result};
pub use ports::{DiscreteEnv, EpisodeScheduled, Policy, TrainingObserver, Transition};
pub use q_learning::{
    BestAction, EpisodeSummary, EpsilonGreedy, EpsilonSchedule, LearningConfig, QLearningAgent,
    QSnapshot, QTable, Rollout, SnapshotFormat, TrainingSummary, UniformSource, UpdateEvent,
    load_snapshot, save_snapshot,
};
