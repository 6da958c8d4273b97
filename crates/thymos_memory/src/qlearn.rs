//! Tabular Q-learning over (location, emotion) states and category actions.
//!
//! One table per session instance; nothing is shared between sessions. The
//! "next state" term is approximated by the maximum over the *same* state's
//! action values: no successor transition is modeled, and changing that
//! would change learning dynamics, so the approximation is kept as-is.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thymos_core::{Emotion, ThymosError};

/// Composite state key. Opaque to the model beyond hashing and equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    pub location: String,
    pub emotion: Emotion,
}

impl StateKey {
    pub fn new(location: impl Into<String>, emotion: Emotion) -> Self {
        Self {
            location: location.into(),
            emotion,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location, self.emotion)
    }
}

/// Estimated values for (state, action) pairs, updated from user feedback.
#[derive(Debug, Clone)]
pub struct FeedbackModel {
    q_table: HashMap<StateKey, HashMap<String, f64>>,
    alpha: f64,
    gamma: f64,
}

pub const DEFAULT_ALPHA: f64 = 0.1;
pub const DEFAULT_GAMMA: f64 = 0.9;

impl FeedbackModel {
    pub fn new() -> Self {
        Self {
            q_table: HashMap::new(),
            alpha: DEFAULT_ALPHA,
            gamma: DEFAULT_GAMMA,
        }
    }

    /// Both parameters must lie in (0, 1].
    pub fn with_params(alpha: f64, gamma: f64) -> Result<Self, ThymosError> {
        if !(alpha > 0.0 && alpha <= 1.0) || !(gamma > 0.0 && gamma <= 1.0) {
            return Err(ThymosError::Configuration(format!(
                "learning parameters out of range: alpha={}, gamma={} (both must be in (0, 1])",
                alpha, gamma
            )));
        }
        Ok(Self {
            q_table: HashMap::new(),
            alpha,
            gamma,
        })
    }

    /// Apply one feedback reward to a (state, action) pair.
    ///
    /// Unset pairs read as 0 when first referenced, and the pair being
    /// updated participates in the `max_next` term. No bounds clamping.
    pub fn update(&mut self, state: &StateKey, action: &str, reward: f64) {
        let actions = self.q_table.entry(state.clone()).or_default();
        let current = *actions.entry(action.to_string()).or_insert(0.0);

        let max_next = actions
            .values()
            .copied()
            .reduce(f64::max)
            .unwrap_or(0.0);

        let updated = current + self.alpha * (reward + self.gamma * max_next - current);
        actions.insert(action.to_string(), updated);

        tracing::debug!(
            state = %state,
            action,
            reward,
            value = updated,
            "feedback applied"
        );
    }

    /// Current estimate for a pair; 0 when never updated.
    pub fn value(&self, state: &StateKey, action: &str) -> f64 {
        self.q_table
            .get(state)
            .and_then(|actions| actions.get(action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Highest-valued action recorded for `state`, or `None` for an unseen
    /// state. Ties break to the lexicographically smallest action, so the
    /// answer is deterministic regardless of table iteration order.
    pub fn best_action(&self, state: &StateKey) -> Option<&str> {
        let actions = self.q_table.get(state)?;
        actions
            .iter()
            .max_by(|(a_name, a_val), (b_name, b_val)| {
                a_val
                    .partial_cmp(b_val)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b_name.cmp(a_name))
            })
            .map(|(name, _)| name.as_str())
    }

    /// Number of distinct states seen.
    pub fn state_count(&self) -> usize {
        self.q_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q_table.is_empty()
    }

    /// Read-only view of the full table, for persistence and inspection.
    pub fn table(&self) -> &HashMap<StateKey, HashMap<String, f64>> {
        &self.q_table
    }

    /// Restore a raw entry. Only the snapshot store should need this.
    pub(crate) fn insert_value(&mut self, state: StateKey, action: String, value: f64) {
        self.q_table.entry(state).or_default().insert(action, value);
    }
}

impl Default for FeedbackModel {
    fn default() -> Self {
        Self::new()
    }
}
