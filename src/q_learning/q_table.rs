//! Q-table implementation for temporal difference learning

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
    marker::PhantomData,
};

use crate::encoding::{ActionKey, DefaultEncoder, KeyEncoder, StateKey};

/// Flat export of a Q-table: state key -> (action key -> Q-value)
///
/// Ordered maps keep exported JSON stable between runs.
pub type QSnapshot = BTreeMap<StateKey, BTreeMap<ActionKey, f64>>;

/// Greedy choice among a given list of actions
#[derive(Debug, PartialEq)]
pub struct BestAction<'a, A> {
    pub action: &'a A,
    pub value: f64,
}

impl<A> Clone for BestAction<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for BestAction<'_, A> {}

/// Q-table mapping (state, action) pairs to Q-values
///
/// States and actions are stored under the keys produced by the injected
/// encoders. Unseen pairs read as 0.0.
pub struct QTable<S, A, SE = DefaultEncoder, AE = DefaultEncoder> {
    /// Q-values: state_key -> (action_key -> Q-value)
    q_values: HashMap<StateKey, HashMap<ActionKey, f64>>,
    state_encoder: SE,
    action_encoder: AE,
    _marker: PhantomData<fn(&S, &A)>,
}

impl<S, A> QTable<S, A>
where
    DefaultEncoder: KeyEncoder<S> + KeyEncoder<A>,
{
    /// Create an empty Q-table using [`DefaultEncoder`] for states and actions
    pub fn new() -> Self {
        Self::with_encoders(DefaultEncoder, DefaultEncoder)
    }
}

impl<S, A> Default for QTable<S, A>
where
    DefaultEncoder: KeyEncoder<S> + KeyEncoder<A>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A, SE, AE> QTable<S, A, SE, AE>
where
    SE: KeyEncoder<S>,
    AE: KeyEncoder<A>,
{
    /// Create an empty Q-table with custom state and action encoders
    pub fn with_encoders(state_encoder: SE, action_encoder: AE) -> Self {
        Self {
            q_values: HashMap::new(),
            state_encoder,
            action_encoder,
            _marker: PhantomData,
        }
    }

    /// Rebuild a Q-table from a snapshot produced by [`QTable::export_snapshot`]
    pub fn from_snapshot(snapshot: &QSnapshot, state_encoder: SE, action_encoder: AE) -> Self {
        let mut table = Self::with_encoders(state_encoder, action_encoder);
        for (state_key, actions) in snapshot {
            for (action_key, &value) in actions {
                table.set_encoded(state_key.clone(), action_key.clone(), value);
            }
        }
        table
    }

    pub fn state_key(&self, state: &S) -> StateKey {
        self.state_encoder.encode(state)
    }

    pub fn action_key(&self, action: &A) -> ActionKey {
        self.action_encoder.encode(action)
    }

    /// Get Q-value for a state-action pair (0.0 when never set)
    pub fn get(&self, state: &S, action: &A) -> f64 {
        self.get_encoded(&self.state_key(state), &self.action_key(action))
    }

    /// Set Q-value for a state-action pair
    ///
    /// Any `f64` is accepted, including non-finite values.
    pub fn set(&mut self, state: &S, action: &A, value: f64) {
        let state_key = self.state_key(state);
        let action_key = self.action_key(action);
        self.set_encoded(state_key, action_key, value);
    }

    /// Pick the highest-valued action among `actions`
    ///
    /// Only the listed actions are considered. Ties go to the earliest action
    /// in the slice. Returns `None` for an empty slice.
    pub fn max_over_actions<'a>(&self, state: &S, actions: &'a [A]) -> Option<BestAction<'a, A>> {
        let state_key = self.state_key(state);
        let mut best: Option<BestAction<'a, A>> = None;
        for action in actions {
            let value = self.get_encoded(&state_key, &self.action_key(action));
            if best.is_none_or(|current| value > current.value) {
                best = Some(BestAction { action, value });
            }
        }
        best
    }

    /// Maximum Q-value over every action ever stored for `state`
    ///
    /// Returns 0.0 for a state with no stored actions, which is
    /// indistinguishable from a state whose best stored value is 0.0.
    pub fn state_max_q(&self, state: &S) -> f64 {
        self.state_max_q_encoded(&self.state_key(state))
    }
}

impl<S, A, SE, AE> QTable<S, A, SE, AE> {
    /// Get Q-value by already-encoded keys
    pub fn get_encoded(&self, state_key: &str, action_key: &str) -> f64 {
        self.q_values
            .get(state_key)
            .and_then(|actions| actions.get(action_key))
            .copied()
            .unwrap_or(0.0)
    }

    /// Set Q-value by already-encoded keys
    pub fn set_encoded(&mut self, state_key: StateKey, action_key: ActionKey, value: f64) {
        self.q_values
            .entry(state_key)
            .or_default()
            .insert(action_key, value);
    }

    fn state_max_q_encoded(&self, state_key: &str) -> f64 {
        self.q_values
            .get(state_key)
            .and_then(|actions| actions.values().copied().reduce(f64::max))
            .unwrap_or(0.0)
    }

    /// Dump every stored entry, and nothing else
    pub fn export_snapshot(&self) -> QSnapshot {
        self.q_values
            .iter()
            .map(|(state_key, actions)| {
                let actions = actions
                    .iter()
                    .map(|(action_key, &value)| (action_key.clone(), value))
                    .collect();
                (state_key.clone(), actions)
            })
            .collect()
    }

    /// Keys of all states with at least one stored action value
    pub fn state_keys(&self) -> BTreeSet<StateKey> {
        self.q_values
            .iter()
            .filter(|(_, actions)| !actions.is_empty())
            .map(|(state_key, _)| state_key.clone())
            .collect()
    }

    /// State key -> best stored value, the flat form the heat-map tooling reads
    pub fn state_max_values(&self) -> BTreeMap<StateKey, f64> {
        self.state_keys()
            .into_iter()
            .map(|key| {
                let value = self.state_max_q_encoded(&key);
                (key, value)
            })
            .collect()
    }

    /// Total number of stored (state, action) entries
    pub fn len(&self) -> usize {
        self.q_values.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget all Q-values
    pub fn clear(&mut self) {
        self.q_values.clear();
    }
}

impl<S, A, SE: Clone, AE: Clone> Clone for QTable<S, A, SE, AE> {
    fn clone(&self) -> Self {
        Self {
            q_values: self.q_values.clone(),
            state_encoder: self.state_encoder.clone(),
            action_encoder: self.action_encoder.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S, A, SE, AE> fmt::Debug for QTable<S, A, SE, AE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QTable")
            .field("states", &self.q_values.len())
            .field("entries", &self.len())
            .finish()
    }
}
