//! Cyclic evaluation state for one (student, activity) pair.
//!
//! # Invariants
//! - State `0` means "unset" and is never stored; absence of the map key is
//!   the only representation of it.
//! - Advancing is `(current + 1) mod (K + 1)`.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Smallest supported number of named states.
pub const MIN_EVALUATION_STATES: u8 = 1;
/// Largest supported number of named states.
pub const MAX_EVALUATION_STATES: u8 = 9;
/// Unset/validated/acquired/not-acquired.
pub const DEFAULT_EVALUATION_STATES: u8 = 3;

/// One named, non-null evaluation mark (`1..=K`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationState(u8);

impl EvaluationState {
    /// Returns `None` for the null state `0`.
    pub fn new(value: u8) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Display class used by activity cards.
    pub fn css_class(self) -> Cow<'static, str> {
        match self.0 {
            1 => Cow::Borrowed("valide"),
            2 => Cow::Borrowed("acquis"),
            3 => Cow::Borrowed("non-acquis"),
            other => Cow::Owned(format!("etat-{other}")),
        }
    }
}

/// Cycle of `K` named states plus the implicit null state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationCycle {
    states: u8,
}

impl EvaluationCycle {
    /// Builds a cycle with `states` named states.
    ///
    /// Returns `None` outside `MIN_EVALUATION_STATES..=MAX_EVALUATION_STATES`.
    pub fn new(states: u8) -> Option<Self> {
        (MIN_EVALUATION_STATES..=MAX_EVALUATION_STATES)
            .contains(&states)
            .then_some(Self { states })
    }

    /// Number of named states (`K`).
    pub fn states(self) -> u8 {
        self.states
    }

    /// Next state after `current`; `None` is the null state.
    pub fn advance(self, current: Option<EvaluationState>) -> Option<EvaluationState> {
        let current = current.map_or(0, EvaluationState::value);
        let next = (u16::from(current) + 1) % (u16::from(self.states) + 1);
        // `next <= K <= MAX_EVALUATION_STATES`, so it fits in u8.
        EvaluationState::new(next as u8)
    }

    /// Whether `state` is one of this cycle's named states.
    pub fn contains(self, state: EvaluationState) -> bool {
        (1..=self.states).contains(&state.value())
    }
}

impl Default for EvaluationCycle {
    fn default() -> Self {
        Self {
            states: DEFAULT_EVALUATION_STATES,
        }
    }
}
