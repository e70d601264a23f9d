//! Ports (trait boundaries) for external collaborators.
//!
//! The learning core owns these traits; environments, policies, observers and
//! storage formats implement them.

pub mod environment;
pub mod observer;
pub mod policy;
pub mod repository;

pub use environment::{DiscreteEnv, Transition};
pub use observer::TrainingObserver;
pub use policy::{EpisodeScheduled, Policy};
pub use repository::SnapshotRepository;
