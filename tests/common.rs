//! Common test utilities for the qlearn test suite.
//!
//! Agent builders for the bundled grid world plus small recording observers.

#![allow(dead_code)]

use qlearn::{
    EpisodeSummary, EpsilonGreedy, EpsilonSchedule, LearningConfig, QLearningAgent, Result,
    TrainingObserver, TrainingSummary, UpdateEvent,
    envs::{GridWorld, Position},
};

pub type GridAgent = QLearningAgent<GridWorld, EpsilonGreedy>;

/// The 3x3 grid from (0,0) to (2,2) with the default -1/+10 rewards
pub fn grid_3x3() -> GridWorld {
    GridWorld::new(3, 3, Position::new(0, 0), Position::new(2, 2)).unwrap()
}

/// Agent with α = 0.1, γ = 0.9 and ε decaying linearly 1.0 → 0.01 over `episodes`
pub fn grid_agent(grid: GridWorld, episodes: usize, seed: u64) -> GridAgent {
    let schedule = EpsilonSchedule::linear_over(1.0, 0.01, episodes).unwrap();
    let policy = EpsilonGreedy::seeded(schedule, seed);
    QLearningAgent::new(grid, policy, LearningConfig::new(0.1, 0.9).unwrap())
}

/// Event log entry captured by [`Recorder`]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Start(usize),
    Update {
        episode: usize,
        step: usize,
        reward: f64,
        old_q: f64,
        new_q: f64,
        done: bool,
    },
    EpisodeEnd(EpisodeSummary),
    End(TrainingSummary),
}

/// Records every observer callback in order
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl Recorder {
    pub fn episodes(&self) -> Vec<EpisodeSummary> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::EpisodeEnd(summary) => Some(*summary),
                _ => None,
            })
            .collect()
    }

    pub fn update_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::Update { .. }))
            .count()
    }
}

impl<S, A> TrainingObserver<S, A> for Recorder {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        self.events.push(Event::Start(total_episodes));
        Ok(())
    }

    fn on_update(&mut self, event: &UpdateEvent<'_, S, A>) -> Result<()> {
        self.events.push(Event::Update {
            episode: event.episode,
            step: event.step,
            reward: event.reward,
            old_q: event.old_q,
            new_q: event.new_q,
            done: event.done,
        });
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.events.push(Event::EpisodeEnd(*summary));
        Ok(())
    }

    fn on_training_end(&mut self, summary: &TrainingSummary) -> Result<()> {
        self.events.push(Event::End(*summary));
        Ok(())
    }
}
