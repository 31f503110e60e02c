//! Student record.
//!
//! # Invariants
//! - `name` is non-empty and already normalized.
//! - `activity_states` keys are activity indexes; values are never the null
//!   state (see `EvaluationState`).
//!
//! Serialized field names (`type`, `activityStates`) match the stored
//! `students` record.

use super::evaluation::EvaluationState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sparse map from activity index to evaluation state.
pub type ActivityStates = BTreeMap<usize, EvaluationState>;

/// Age/class tier of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudentCategory {
    /// Younger tier ("petite section").
    #[serde(rename = "PS")]
    TierA,
    /// Older tier ("moyenne section").
    #[serde(rename = "MS")]
    TierB,
}

impl StudentCategory {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::TierA => "ps-student",
            Self::TierB => "ms-student",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<StudentCategory>,
    #[serde(rename = "activityStates", default)]
    pub activity_states: ActivityStates,
}

impl Student {
    /// Creates a student with no evaluation recorded yet.
    pub fn new(name: impl Into<String>, category: Option<StudentCategory>) -> Self {
        Self {
            name: name.into(),
            category,
            activity_states: ActivityStates::new(),
        }
    }

    /// Current state for one activity; `None` means unset.
    pub fn state_for(&self, activity_index: usize) -> Option<EvaluationState> {
        self.activity_states.get(&activity_index).copied()
    }
}
