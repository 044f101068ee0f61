//! Two-action Tsetlin automaton.
//!
//! States `1..=n` report the low action, `n+1..=2n` the high action. The
//! threshold sits between `n` and `n+1`; states further from it encode a
//! stronger commitment to the current action.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::prng::Prng;

/// Which half of the state range an automaton occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Action {
    Low,
    High,
}

impl Action {
    #[inline]
    pub fn is_high(self) -> bool {
        matches!(self, Action::High)
    }
}

/// Environment response applied to a single automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Reward,
    Penalty,
}

/// Symbolic names reported for the two actions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionLabels {
    pub low: String,
    pub high: String,
}

impl ActionLabels {
    pub fn new(low: impl Into<String>, high: impl Into<String>) -> Self {
        Self {
            low: low.into(),
            high: high.into(),
        }
    }

    pub fn label(&self, action: Action) -> &str {
        match action {
            Action::Low => &self.low,
            Action::High => &self.high,
        }
    }
}

impl Default for ActionLabels {
    fn default() -> Self {
        Self::new("No", "Yes")
    }
}

#[derive(Debug, Clone)]
pub struct Automaton {
    n: u32,
    state: u32,
    labels: Arc<ActionLabels>,
}

impl Automaton {
    /// Largest `n` for which the state range `1..=2n` fits in a `u32`.
    pub const MAX_STATES_PER_ACTION: u32 = u32::MAX / 2;

    /// Create an automaton sitting on one of the two threshold-adjacent
    /// states (`n` or `n+1`), chosen uniformly with `rng`.
    pub fn new(
        states_per_action: u32,
        labels: Arc<ActionLabels>,
        rng: &mut Prng,
    ) -> Result<Self, ConfigError> {
        check_states(states_per_action)?;
        let state = if rng.gen_bool(0.5) {
            states_per_action
        } else {
            states_per_action + 1
        };
        Ok(Self {
            n: states_per_action,
            state,
            labels,
        })
    }

    /// Create an automaton at a specific state in `1..=2n`.
    pub fn with_state(
        states_per_action: u32,
        state: u32,
        labels: Arc<ActionLabels>,
    ) -> Result<Self, ConfigError> {
        check_states(states_per_action)?;
        let max = 2 * states_per_action;
        if state == 0 || state > max {
            return Err(ConfigError::StateOutOfRange { state, max });
        }
        Ok(Self {
            n: states_per_action,
            state,
            labels,
        })
    }

    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    pub fn states_per_action(&self) -> u32 {
        self.n
    }

    pub fn labels(&self) -> &ActionLabels {
        &self.labels
    }

    #[inline]
    pub fn action(&self) -> Action {
        if self.state <= self.n {
            Action::Low
        } else {
            Action::High
        }
    }

    /// Label of the action the automaton currently reports.
    pub fn decide(&self) -> &str {
        self.labels.label(self.action())
    }

    /// Distance from the threshold: 1 next to it, `n` at the outer boundary.
    pub fn depth(&self) -> u32 {
        if self.state <= self.n {
            self.n - self.state + 1
        } else {
            self.state - self.n
        }
    }

    /// Step deeper into the current action; saturates at states 1 and 2n.
    pub fn reward(&mut self) {
        if self.state > 1 && self.state <= self.n {
            self.state -= 1;
        } else if self.state > self.n && self.state < 2 * self.n {
            self.state += 1;
        }
    }

    /// Step toward the opposite action. Never leaves `1..=2n`: from the low
    /// half the result is at most `n+1`, from the high half at least `n`.
    pub fn penalize(&mut self) {
        if self.state <= self.n {
            self.state += 1;
        } else {
            self.state -= 1;
        }
    }

    pub fn apply(&mut self, feedback: Feedback) {
        match feedback {
            Feedback::Reward => self.reward(),
            Feedback::Penalty => self.penalize(),
        }
    }
}

/// Rejects `n` outside `1..=MAX_STATES_PER_ACTION`.
pub fn check_states(states_per_action: u32) -> Result<(), ConfigError> {
    if states_per_action == 0 {
        return Err(ConfigError::ZeroStates);
    }
    if states_per_action > Automaton::MAX_STATES_PER_ACTION {
        return Err(ConfigError::StatesTooLarge {
            states: states_per_action,
            max: Automaton::MAX_STATES_PER_ACTION,
        });
    }
    Ok(())
}
