//! Tabular Q-learning
//!
//! This module implements off-policy temporal difference control over
//! arbitrary discrete state and action types.
//!
//! ## Pieces
//!
//! - [`QTable`]: encoded (state, action) -> value store, 0.0 by default
//! - [`EpsilonSchedule`]: episode index -> exploration probability
//! - [`EpsilonGreedy`]: the reference [`Policy`](crate::ports::Policy)
//! - [`QLearningAgent`]: the training loop and greedy rollouts
//!
//! ## Usage Example
//!
//! ```no_run
//! use qlearn::envs::GridWorld;
//! use qlearn::q_learning::{EpsilonGreedy, EpsilonSchedule, LearningConfig, QLearningAgent};
//!
//! let env = GridWorld::new(3, 3, (0, 0), (2, 2))?;
//! let policy = EpsilonGreedy::seeded(EpsilonSchedule::linear_over(1.0, 0.01, 500)?, 42);
//! let mut agent = QLearningAgent::new(env, policy, LearningConfig::new(0.1, 0.9)?);
//!
//! agent.train(500, Some(100), &mut ())?;
//! let rollout = agent.roll_out(None, Some(20))?;
//! println!("{:?} ({})", rollout.path, rollout.total_reward);
//! # Ok::<(), qlearn::Error>(())
//! ```

pub mod agent;
pub mod events;
pub mod policy;
pub mod q_table;
pub mod schedule;
pub mod serialization;

// Public re-exports
pub use agent::{LearningConfig, QLearningAgent, Rollout};
pub use events::{EpisodeSummary, TrainingSummary, UpdateEvent};
pub use policy::{EpsilonGreedy, UniformSource};
pub use q_table::{BestAction, QSnapshot, QTable};
pub use schedule::EpsilonSchedule;
pub use serialization::{SnapshotFormat, load_snapshot, save_snapshot};
