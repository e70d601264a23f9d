//! Events emitted by the training loop

use serde::{Deserialize, Serialize};

/// One applied TD update
///
/// `reward` is the environment's reward; the shaped signal used for learning
/// is not reported.
#[derive(Debug)]
pub struct UpdateEvent<'a, S, A> {
    pub episode: usize,
    pub step: usize,
    pub state: &'a S,
    pub action: &'a A,
    pub reward: f64,
    pub next_state: &'a S,
    pub done: bool,
    pub old_q: f64,
    pub new_q: f64,
}

/// End-of-episode report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    /// Sum of unshaped rewards
    pub total_reward: f64,
    /// False when the step budget ran out before the episode ended on its own
    pub terminated: bool,
    /// Exploration rate in effect, if the policy has one
    pub epsilon: Option<f64>,
}

/// Aggregate of a whole `train` call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub total_steps: usize,
    pub terminated_episodes: usize,
    pub mean_reward: f64,
    pub last_reward: f64,
}

/// Running totals folded into a [`TrainingSummary`] as episodes finish
#[derive(Debug, Default)]
pub(crate) struct SummaryTotals {
    episodes: usize,
    total_steps: usize,
    terminated_episodes: usize,
    reward_sum: f64,
    last_reward: f64,
}

impl SummaryTotals {
    pub(crate) fn record(&mut self, episode: &EpisodeSummary) {
        self.episodes += 1;
        self.total_steps += episode.steps;
        self.terminated_episodes += usize::from(episode.terminated);
        self.reward_sum += episode.total_reward;
        self.last_reward = episode.total_reward;
    }

    pub(crate) fn finish(&self) -> TrainingSummary {
        let mean_reward = if self.episodes == 0 {
            0.0
        } else {
            self.reward_sum / self.episodes as f64
        };
        TrainingSummary {
            episodes: self.episodes,
            total_steps: self.total_steps,
            terminated_episodes: self.terminated_episodes,
            mean_reward,
            last_reward: self.last_reward,
        }
    }
}
