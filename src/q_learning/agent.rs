//! Q-learning agent
//!
//! The agent owns an environment, a policy and a Q-table, and runs the
//! off-policy TD loop:
//!
//! ```text
//! shaped  = r + γ·Φ(s') − Φ(s)
//! target  = shaped + γ·max_a' Q(s', a')
//! Q(s,a) ← Q(s,a) + α·(target − Q(s,a))
//! ```
//!
//! With the default Φ = 0 this is plain Q-learning. Reported rewards are
//! always the environment's own rewards.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::{
    Error, Result,
    encoding::{DefaultEncoder, KeyEncoder},
    ports::{DiscreteEnv, Policy, TrainingObserver, Transition},
    q_learning::{
        events::{EpisodeSummary, SummaryTotals, TrainingSummary, UpdateEvent},
        q_table::{QSnapshot, QTable},
    },
};

/// Learning rate α and discount factor γ
///
/// Validated on construction and on deserialization: α ∈ (0, 1], γ ∈ [0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLearningConfig")]
pub struct LearningConfig {
    learning_rate: f64,
    discount_factor: f64,
}

#[derive(Deserialize)]
struct RawLearningConfig {
    learning_rate: f64,
    discount_factor: f64,
}

impl TryFrom<RawLearningConfig> for LearningConfig {
    type Error = Error;

    fn try_from(raw: RawLearningConfig) -> Result<Self> {
        Self::new(raw.learning_rate, raw.discount_factor)
    }
}

impl LearningConfig {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Result<Self> {
        if !(learning_rate > 0.0 && learning_rate <= 1.0) {
            return Err(Error::invalid_config(format!(
                "learning rate must lie in (0, 1], got {learning_rate}"
            )));
        }
        if !(0.0..1.0).contains(&discount_factor) {
            return Err(Error::invalid_config(format!(
                "discount factor must lie in [0, 1), got {discount_factor}"
            )));
        }
        Ok(Self {
            learning_rate,
            discount_factor,
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// One step of `old` towards `target`: `old + α·(target − old)`
    pub fn td_update(&self, old: f64, target: f64) -> f64 {
        old + self.learning_rate * (target - old)
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
        }
    }
}

/// Greedy evaluation trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rollout<S> {
    /// Visited states, starting state included
    pub path: Vec<S>,
    pub total_reward: f64,
}

impl<S> Rollout<S> {
    /// Number of transitions taken
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Tabular Q-learning agent over a [`DiscreteEnv`]
pub struct QLearningAgent<E, P, SE = DefaultEncoder, AE = DefaultEncoder>
where
    E: DiscreteEnv,
{
    env: E,
    policy: P,
    config: LearningConfig,
    q_table: QTable<E::State, E::Action, SE, AE>,
}

impl<E, P> QLearningAgent<E, P>
where
    E: DiscreteEnv,
    DefaultEncoder: KeyEncoder<E::State> + KeyEncoder<E::Action>,
{
    /// Create an agent with an empty Q-table and default key encoders
    pub fn new(env: E, policy: P, config: LearningConfig) -> Self {
        Self::with_q_table(env, policy, config, QTable::new())
    }
}

impl<E, P, SE, AE> QLearningAgent<E, P, SE, AE>
where
    E: DiscreteEnv,
    SE: KeyEncoder<E::State>,
    AE: KeyEncoder<E::Action>,
{
    /// Create an agent with an empty Q-table keyed by custom encoders
    pub fn with_encoders(
        env: E,
        policy: P,
        config: LearningConfig,
        state_encoder: SE,
        action_encoder: AE,
    ) -> Self {
        Self::with_q_table(
            env,
            policy,
            config,
            QTable::with_encoders(state_encoder, action_encoder),
        )
    }

    /// Create an agent around an existing Q-table, e.g. one restored from a snapshot
    pub fn with_q_table(
        env: E,
        policy: P,
        config: LearningConfig,
        q_table: QTable<E::State, E::Action, SE, AE>,
    ) -> Self {
        Self {
            env,
            policy,
            config,
            q_table,
        }
    }

    pub fn q_table(&self) -> &QTable<E::State, E::Action, SE, AE> {
        &self.q_table
    }

    pub fn into_q_table(self) -> QTable<E::State, E::Action, SE, AE> {
        self.q_table
    }

    pub fn export_snapshot(&self) -> QSnapshot {
        self.q_table.export_snapshot()
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    /// Train for `episodes` episodes of at most `max_steps` steps each
    ///
    /// `None` leaves episodes unbounded; they then end only when the
    /// environment runs out of actions, signals `done`, or the policy
    /// declines to act.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for zero episodes or a zero step
    /// budget. Errors from the environment or the observer abort training and
    /// are returned unchanged; updates applied before the failure are kept.
    pub fn train<O>(
        &mut self,
        episodes: usize,
        max_steps: Option<usize>,
        observer: &mut O,
    ) -> Result<TrainingSummary>
    where
        P: Policy<E::State, E::Action>,
        O: TrainingObserver<E::State, E::Action> + ?Sized,
    {
        if episodes == 0 {
            return Err(Error::invalid_config("episodes must be positive"));
        }
        if max_steps == Some(0) {
            return Err(Error::invalid_config(
                "max steps per episode must be positive",
            ));
        }

        info!(
            episodes,
            max_steps = ?max_steps,
            learning_rate = self.config.learning_rate,
            discount_factor = self.config.discount_factor,
            "starting Q-learning"
        );
        observer.on_training_start(episodes)?;

        let mut totals = SummaryTotals::default();
        for episode in 0..episodes {
            if let Some(scheduled) = self.policy.as_scheduled() {
                scheduled.set_episode(episode);
            }

            let summary = self.run_episode(episode, max_steps, observer)?;
            debug!(
                episode,
                steps = summary.steps,
                total_reward = summary.total_reward,
                terminated = summary.terminated,
                epsilon = ?summary.epsilon,
                "episode finished"
            );
            observer.on_episode_end(&summary)?;
            totals.record(&summary);
        }

        let summary = totals.finish();
        info!(
            episodes = summary.episodes,
            total_steps = summary.total_steps,
            mean_reward = summary.mean_reward,
            states = self.q_table.state_keys().len(),
            "training finished"
        );
        observer.on_training_end(&summary)?;
        Ok(summary)
    }

    fn run_episode<O>(
        &mut self,
        episode: usize,
        max_steps: Option<usize>,
        observer: &mut O,
    ) -> Result<EpisodeSummary>
    where
        P: Policy<E::State, E::Action>,
        O: TrainingObserver<E::State, E::Action> + ?Sized,
    {
        let gamma = self.config.discount_factor;
        let epsilon = self.policy.exploration_rate();

        let mut state = self.env.reset()?;
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut terminated = false;

        while max_steps.is_none_or(|limit| steps < limit) {
            let legal_actions = self.env.actions(&state)?;
            if legal_actions.is_empty() {
                terminated = true;
                break;
            }

            let q_table = &self.q_table;
            let Some(action) =
                self.policy
                    .select(&state, &legal_actions, &|s, a| q_table.get(s, a))
            else {
                terminated = true;
                break;
            };

            let Transition {
                next_state,
                reward,
                done,
            } = self.env.step(&state, action)?;

            let shaped =
                reward + gamma * self.env.potential(&next_state)? - self.env.potential(&state)?;

            // `done` ends the episode but does not gate the bootstrap; a next
            // state with no legal actions contributes 0
            let next_actions = self.env.actions(&next_state)?;
            let max_next_q = self
                .q_table
                .max_over_actions(&next_state, &next_actions)
                .map_or(0.0, |best| best.value);
            let target = shaped + gamma * max_next_q;

            let old_q = self.q_table.get(&state, action);
            let new_q = self.config.td_update(old_q, target);
            self.q_table.set(&state, action, new_q);
            trace!(episode, step = steps, reward, shaped, old_q, new_q, "TD update");

            observer.on_update(&UpdateEvent {
                episode,
                step: steps,
                state: &state,
                action,
                reward,
                next_state: &next_state,
                done,
                old_q,
                new_q,
            })?;

            total_reward += reward;
            steps += 1;
            state = next_state;

            if done {
                terminated = true;
                break;
            }
        }

        Ok(EpisodeSummary {
            episode,
            steps,
            total_reward,
            terminated,
            epsilon,
        })
    }

    /// Follow the greedy policy without exploring or learning
    ///
    /// Starts from `start`, or from a fresh `reset()` when `None`. Stops when
    /// no legal action remains, the environment signals `done`, or `max_steps`
    /// transitions have been taken.
    pub fn roll_out(
        &mut self,
        start: Option<E::State>,
        max_steps: Option<usize>,
    ) -> Result<Rollout<E::State>>
    where
        E::State: Clone,
    {
        let mut state = match start {
            Some(state) => state,
            None => self.env.reset()?,
        };
        let mut path = vec![state.clone()];
        let mut total_reward = 0.0;
        let mut steps = 0;

        while max_steps.is_none_or(|limit| steps < limit) {
            let legal_actions = self.env.actions(&state)?;
            let Some(best) = self.q_table.max_over_actions(&state, &legal_actions) else {
                break;
            };

            let transition = self.env.step(&state, best.action)?;
            total_reward += transition.reward;
            steps += 1;
            path.push(transition.next_state.clone());
            state = transition.next_state;

            if transition.done {
                break;
            }
        }

        debug!(steps, total_reward, "rollout finished");
        Ok(Rollout { path, total_reward })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::q_learning::{EpsilonGreedy, EpsilonSchedule};

    /// 0 -> 1 -> 2 along a line; reaching 2 pays 1.0 and ends the episode
    struct Line {
        resets: usize,
    }

    impl DiscreteEnv for Line {
        type State = u8;
        type Action = i8;

        fn reset(&mut self) -> Result<u8> {
            self.resets += 1;
            Ok(0)
        }

        fn actions(&self, state: &u8) -> Result<Vec<i8>> {
            Ok(if *state == 2 { vec![] } else { vec![-1, 1] })
        }

        fn step(&mut self, state: &u8, action: &i8) -> Result<Transition<u8>> {
            let next = (*state as i8 + action).clamp(0, 2) as u8;
            Ok(Transition::new(next, if next == 2 { 1.0 } else { 0.0 }, next == 2))
        }
    }

    fn greedy() -> EpsilonGreedy {
        EpsilonGreedy::seeded(EpsilonSchedule::constant(0.0).unwrap(), 0)
    }

    #[test]
    fn test_learning_config_validation() {
        assert!(LearningConfig::new(0.1, 0.9).is_ok());
        assert!(LearningConfig::new(1.0, 0.0).is_ok());
        assert!(LearningConfig::new(0.0, 0.9).is_err());
        assert!(LearningConfig::new(1.1, 0.9).is_err());
        assert!(LearningConfig::new(0.5, 1.0).is_err());
        assert!(LearningConfig::new(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn test_learning_config_deserialization_validates() {
        let ok: LearningConfig =
            serde_json::from_str(r#"{"learning_rate":0.5,"discount_factor":0.9}"#).unwrap();
        assert_eq!(ok.learning_rate(), 0.5);
        let bad = serde_json::from_str::<LearningConfig>(
            r#"{"learning_rate":0.5,"discount_factor":1.5}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_td_update_moves_toward_target() {
        let config = LearningConfig::new(0.5, 0.9).unwrap();
        assert_eq!(config.td_update(0.0, 2.0), 1.0);
        assert_eq!(config.td_update(4.0, 2.0), 3.0);
    }

    #[test]
    fn test_single_update_value() {
        let config = LearningConfig::new(0.5, 0.9).unwrap();
        let mut agent = QLearningAgent::new(Line { resets: 0 }, greedy(), config);
        agent.train(1, Some(1), &mut ()).unwrap();

        // Greedy on an empty table picks the first action (-1): 0 -> 0, reward 0,
        // both next-state values 0, so Q stays 0 but the entry now exists.
        assert_eq!(agent.q_table().get(&0, &-1), 0.0);
        assert_eq!(agent.q_table().len(), 1);
    }

    #[test]
    fn test_train_rejects_bad_budgets() {
        let mut agent =
            QLearningAgent::new(Line { resets: 0 }, greedy(), LearningConfig::default());
        assert!(agent.train(0, None, &mut ()).is_err());
        assert!(agent.train(1, Some(0), &mut ()).is_err());
        assert_eq!(agent.env().resets, 0);
    }

    #[test]
    fn test_rollout_after_training_reaches_goal() {
        let schedule = EpsilonSchedule::constant(0.5).unwrap();
        let policy = EpsilonGreedy::seeded(schedule, 9);
        let mut agent = QLearningAgent::new(Line { resets: 0 }, policy, LearningConfig::default());
        agent.train(50, Some(20), &mut ()).unwrap();
        assert_eq!(agent.env().resets, 50);

        let rollout = agent.roll_out(None, Some(10)).unwrap();
        assert_eq!(rollout.path, vec![0, 1, 2]);
        assert_eq!(rollout.total_reward, 1.0);
        assert_eq!(rollout.steps(), 2);
    }

    #[test]
    fn test_rollout_from_terminal_start() {
        let mut agent =
            QLearningAgent::new(Line { resets: 0 }, greedy(), LearningConfig::default());
        let rollout = agent.roll_out(Some(2), None).unwrap();
        assert_eq!(rollout.path, vec![2]);
        assert_eq!(rollout.total_reward, 0.0);
        assert_eq!(agent.env().resets, 0);
    }
}
