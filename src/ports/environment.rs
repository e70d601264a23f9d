//! Environment port - the discrete world an agent learns in
//!
//! Environments are supplied by callers. The learning loop never catches
//! their errors: anything returned from these methods aborts the current
//! `train` or `roll_out` call and reaches the caller unchanged.

use crate::Result;

/// Outcome of a single transition
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    pub next_state: S,
    pub reward: f64,
    pub done: bool,
}

impl<S> Transition<S> {
    pub fn new(next_state: S, reward: f64, done: bool) -> Self {
        Self {
            next_state,
            reward,
            done,
        }
    }
}

/// Discrete environment with explicit state passing
///
/// # Examples
///
/// ```
/// use qlearn::ports::{DiscreteEnv, Transition};
///
/// /// Walk right along a corridor until position 3.
/// struct Corridor;
///
/// impl DiscreteEnv for Corridor {
///     type State = u8;
///     type Action = i8;
///
///     fn reset(&mut self) -> qlearn::Result<u8> {
///         Ok(0)
///     }
///
///     fn actions(&self, state: &u8) -> qlearn::Result<Vec<i8>> {
///         Ok(if *state == 3 { vec![] } else { vec![-1, 1] })
///     }
///
///     fn step(&mut self, state: &u8, action: &i8) -> qlearn::Result<Transition<u8>> {
///         let next = (*state as i8 + action).clamp(0, 3) as u8;
///         Ok(Transition::new(next, if next == 3 { 1.0 } else { 0.0 }, next == 3))
///     }
/// }
/// ```
pub trait DiscreteEnv {
    type State;
    type Action;

    /// Start a new episode and return its initial state.
    fn reset(&mut self) -> Result<Self::State>;

    /// Legal actions in `state`. An empty list marks a terminal state.
    fn actions(&self, state: &Self::State) -> Result<Vec<Self::Action>>;

    /// Apply `action` in `state`.
    fn step(&mut self, state: &Self::State, action: &Self::Action)
    -> Result<Transition<Self::State>>;

    /// Shaping potential Φ(state).
    ///
    /// The default is 0 everywhere, which disables shaping.
    fn potential(&self, _state: &Self::State) -> Result<f64> {
        Ok(0.0)
    }
}
