//! ε-greedy action selection

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    ports::{EpisodeScheduled, Policy},
    q_learning::schedule::EpsilonSchedule,
};

/// Source of uniform samples in `[0, 1)`
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl UniformSource for StdRng {
    fn next_uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// ε-greedy policy with an episode-indexed schedule
///
/// Explores with probability ε(current episode), choosing uniformly among the
/// legal actions; otherwise takes the first action with the strictly highest
/// value.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<R = StdRng> {
    schedule: EpsilonSchedule,
    episode: usize,
    rng: R,
}

impl EpsilonGreedy<StdRng> {
    /// Create a policy drawing from an entropy-seeded `StdRng`
    pub fn new(schedule: EpsilonSchedule) -> Self {
        Self::with_source(schedule, build_rng(None))
    }

    /// Create a reproducible policy
    pub fn seeded(schedule: EpsilonSchedule, seed: u64) -> Self {
        Self::with_source(schedule, build_rng(Some(seed)))
    }
}

impl<R: UniformSource> EpsilonGreedy<R> {
    /// Create a policy drawing from a caller-supplied uniform source
    pub fn with_source(schedule: EpsilonSchedule, rng: R) -> Self {
        Self {
            schedule,
            episode: 0,
            rng,
        }
    }

    pub fn schedule(&self) -> &EpsilonSchedule {
        &self.schedule
    }

    /// ε for the current episode
    pub fn epsilon(&self) -> f64 {
        self.schedule.epsilon(self.episode)
    }
}

impl<S, A, R: UniformSource> Policy<S, A> for EpsilonGreedy<R> {
    fn select<'a>(
        &mut self,
        state: &S,
        legal_actions: &'a [A],
        values: &dyn Fn(&S, &A) -> f64,
    ) -> Option<&'a A> {
        if legal_actions.is_empty() {
            return None;
        }

        if self.rng.next_uniform() < self.epsilon() {
            // Explore
            let draw = self.rng.next_uniform();
            let index = ((draw * legal_actions.len() as f64).floor() as usize)
                .min(legal_actions.len() - 1);
            return legal_actions.get(index);
        }

        // Exploit: strictly greater keeps the first of equal values
        let mut best = &legal_actions[0];
        let mut best_value = values(state, best);
        for action in &legal_actions[1..] {
            let value = values(state, action);
            if value > best_value {
                best = action;
                best_value = value;
            }
        }
        Some(best)
    }

    fn as_scheduled(&mut self) -> Option<&mut dyn EpisodeScheduled> {
        Some(self)
    }

    fn exploration_rate(&self) -> Option<f64> {
        Some(self.epsilon())
    }
}

impl<R> EpisodeScheduled for EpsilonGreedy<R> {
    fn set_episode(&mut self, episode: usize) {
        self.episode = episode;
    }

    fn episode(&self) -> usize {
        self.episode
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Replays a fixed list of draws
    struct Scripted(VecDeque<f64>);

    impl UniformSource for Scripted {
        fn next_uniform(&mut self) -> f64 {
            self.0.pop_front().expect("script exhausted")
        }
    }

    fn scripted(draws: &[f64]) -> Scripted {
        Scripted(draws.iter().copied().collect())
    }

    fn lookup(_state: &&str, action: &char) -> f64 {
        match action {
            'a' => 1.0,
            'b' => 3.0,
            'c' => 3.0,
            _ => 0.0,
        }
    }

    #[test]
    fn test_empty_actions_select_none() {
        let mut policy = EpsilonGreedy::seeded(EpsilonSchedule::constant(0.5).unwrap(), 1);
        let actions: [char; 0] = [];
        assert!(policy.select(&"s", &actions, &lookup).is_none());
    }

    #[test]
    fn test_explore_maps_second_draw_to_index() {
        let schedule = EpsilonSchedule::constant(0.5).unwrap();
        let mut policy = EpsilonGreedy::with_source(schedule, scripted(&[0.1, 0.75]));
        let actions = ['a', 'b', 'c', 'd'];
        assert_eq!(policy.select(&"s", &actions, &lookup), Some(&'d'));
    }

    #[test]
    fn test_exploit_when_draw_not_below_epsilon() {
        let schedule = EpsilonSchedule::constant(0.5).unwrap();
        let mut policy = EpsilonGreedy::with_source(schedule, scripted(&[0.5]));
        let actions = ['a', 'b', 'c'];
        // 'b' and 'c' tie; the first wins
        assert_eq!(policy.select(&"s", &actions, &lookup), Some(&'b'));
    }

    #[test]
    fn test_set_episode_moves_along_schedule() {
        let schedule = EpsilonSchedule::linear(1.0, 0.0, 0.5).unwrap();
        let mut policy = EpsilonGreedy::with_source(schedule, scripted(&[0.6, 0.6]));
        let actions = ['a', 'b'];

        // Episode 0: ε = 1.0, 0.6 < 1.0 explores; second draw 0.6 -> index 1
        assert_eq!(policy.select(&"s", &actions, &lookup), Some(&'b'));

        Policy::<&str, char>::as_scheduled(&mut policy)
            .unwrap()
            .set_episode(2);
        assert_eq!(EpisodeScheduled::episode(&policy), 2);
        assert_eq!(policy.epsilon(), 0.0);
    }

    #[test]
    fn test_exploration_rate_reports_epsilon() {
        let policy = EpsilonGreedy::seeded(EpsilonSchedule::constant(0.25).unwrap(), 3);
        assert_eq!(Policy::<&str, char>::exploration_rate(&policy), Some(0.25));
    }
}
