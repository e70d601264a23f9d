//! Observer implementations for the training loop
//!
//! Observers allow composable data collection during training without coupling
//! the loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    ports::TrainingObserver,
    q_learning::{EpisodeSummary, TrainingSummary, UpdateEvent},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    reward_sum: f64,
    episodes_seen: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            reward_sum: 0.0,
            episodes_seen: 0,
        }
    }

    fn mean_reward(&self) -> f64 {
        if self.episodes_seen == 0 {
            0.0
        } else {
            self.reward_sum / self.episodes_seen as f64
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> TrainingObserver<S, A> for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.reward_sum += summary.total_reward;
        self.episodes_seen += 1;

        if let Some(pb) = &self.progress_bar {
            pb.set_position(self.episodes_seen as u64);
            pb.set_message(format!("mean reward {:.2}", self.mean_reward()));
        }
        Ok(())
    }

    fn on_training_end(&mut self, summary: &TrainingSummary) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("mean reward {:.2}", summary.mean_reward));
        }
        Ok(())
    }
}

/// Metrics observer - Tracks per-episode training metrics
#[derive(Debug, Default)]
pub struct MetricsObserver {
    episode_rewards: Vec<f64>,
    episode_steps: Vec<usize>,
    terminated: usize,
    updates: usize,
    /// Sum of |new_q - old_q| over all updates
    total_abs_change: f64,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn episode_rewards(&self) -> &[f64] {
        &self.episode_rewards
    }

    pub fn episode_steps(&self) -> &[usize] {
        &self.episode_steps
    }

    /// Average total reward per episode
    pub fn mean_reward(&self) -> f64 {
        if self.episode_rewards.is_empty() {
            0.0
        } else {
            self.episode_rewards.iter().sum::<f64>() / self.episode_rewards.len() as f64
        }
    }

    /// Average total reward over the last `window` episodes
    pub fn moving_average(&self, window: usize) -> f64 {
        let start = self.episode_rewards.len().saturating_sub(window.max(1));
        let tail = &self.episode_rewards[start..];
        if tail.is_empty() {
            0.0
        } else {
            tail.iter().sum::<f64>() / tail.len() as f64
        }
    }

    /// Fraction of episodes that ended before the step budget ran out
    pub fn termination_rate(&self) -> f64 {
        if self.episode_rewards.is_empty() {
            0.0
        } else {
            self.terminated as f64 / self.episode_rewards.len() as f64
        }
    }

    /// Mean absolute Q-value change per update
    pub fn mean_abs_update(&self) -> f64 {
        if self.updates == 0 {
            0.0
        } else {
            self.total_abs_change / self.updates as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.episode_rewards.len(),
            updates: self.updates,
            mean_reward: self.mean_reward(),
            last_100_mean_reward: self.moving_average(100),
            termination_rate: self.termination_rate(),
            avg_episode_length: if self.episode_steps.is_empty() {
                0.0
            } else {
                self.episode_steps.iter().sum::<usize>() as f64 / self.episode_steps.len() as f64
            },
            mean_abs_update: self.mean_abs_update(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub updates: usize,
    pub mean_reward: f64,
    pub last_100_mean_reward: f64,
    pub termination_rate: f64,
    pub avg_episode_length: f64,
    pub mean_abs_update: f64,
}

impl<S, A> TrainingObserver<S, A> for MetricsObserver {
    fn on_update(&mut self, event: &UpdateEvent<'_, S, A>) -> Result<()> {
        self.updates += 1;
        self.total_abs_change += (event.new_q - event.old_q).abs();
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.episode_rewards.push(summary.total_reward);
        self.episode_steps.push(summary.steps);
        if summary.terminated {
            self.terminated += 1;
        }
        Ok(())
    }
}

/// JSONL observer - Writes one episode summary per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl<S, A> TrainingObserver<S, A> for JsonlObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        serde_json::to_writer(&mut self.writer, summary)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self, _summary: &TrainingSummary) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Fans every event out to several observers, in insertion order
pub struct ObserverSet<'o, S, A> {
    observers: Vec<Box<dyn TrainingObserver<S, A> + 'o>>,
}

impl<'o, S, A> ObserverSet<'o, S, A> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Add an observer to the set
    pub fn with_observer(mut self, observer: impl TrainingObserver<S, A> + 'o) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn push(&mut self, observer: impl TrainingObserver<S, A> + 'o) {
        self.observers.push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<S, A> Default for ObserverSet<'_, S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> TrainingObserver<S, A> for ObserverSet<'_, S, A> {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_training_start(total_episodes)?;
        }
        Ok(())
    }

    fn on_update(&mut self, event: &UpdateEvent<'_, S, A>) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_update(event)?;
        }
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_episode_end(summary)?;
        }
        Ok(())
    }

    fn on_training_end(&mut self, summary: &TrainingSummary) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_training_end(summary)?;
        }
        Ok(())
    }
}
