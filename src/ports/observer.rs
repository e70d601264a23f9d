//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling the training
//! loop to specific output formats or metrics.

use crate::{
    Result,
    q_learning::{EpisodeSummary, TrainingSummary, UpdateEvent},
};

/// Observer trait for monitoring training
///
/// Observers are called synchronously and in order from inside the training
/// loop. They cannot change what the loop does; returning an error aborts
/// training and hands that error to the caller of `train`.
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_update(...)` - After every TD update
///    - `on_episode_end(...)`
/// 3. `on_training_end(...)` - Once at the end
///
/// # Examples
///
/// ```
/// use qlearn::{ports::TrainingObserver, q_learning::EpisodeSummary};
///
/// struct RewardLog(Vec<f64>);
///
/// impl<S, A> TrainingObserver<S, A> for RewardLog {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> qlearn::Result<()> {
///         self.0.push(summary.total_reward);
///         Ok(())
///     }
/// }
/// ```
pub trait TrainingObserver<S, A> {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each Q-value update.
    fn on_update(&mut self, _event: &UpdateEvent<'_, S, A>) -> Result<()> {
        Ok(())
    }

    /// Called once per episode, after its last update.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    fn on_training_end(&mut self, _summary: &TrainingSummary) -> Result<()> {
        Ok(())
    }
}

/// No-op observer
impl<S, A> TrainingObserver<S, A> for () {}

impl<S, A, O> TrainingObserver<S, A> for &mut O
where
    O: TrainingObserver<S, A> + ?Sized,
{
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        (**self).on_training_start(total_episodes)
    }

    fn on_update(&mut self, event: &UpdateEvent<'_, S, A>) -> Result<()> {
        (**self).on_update(event)
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        (**self).on_episode_end(summary)
    }

    fn on_training_end(&mut self, summary: &TrainingSummary) -> Result<()> {
        (**self).on_training_end(summary)
    }
}
