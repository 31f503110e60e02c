//! Roster configuration.
//!
//! # Responsibility
//! - Hold the tunables that differ between deployments: cycle length,
//!   category tagging, long-press thresholds.
//! - Validate them before any component is built from them.
//!
//! # Invariants
//! - A validated config always yields a usable `EvaluationCycle`.

use crate::model::evaluation::{
    EvaluationCycle, DEFAULT_EVALUATION_STATES, MAX_EVALUATION_STATES, MIN_EVALUATION_STATES,
};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default sustained-press duration before a hold counts as a delete request.
pub const DEFAULT_LONG_PRESS_MS: u64 = 800;
/// Default pointer travel tolerated during a hold.
pub const DEFAULT_LONG_PRESS_SLOP_PX: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    /// Number of named evaluation states (`K`).
    pub evaluation_states: u8,
    /// Ask for and display the student tier.
    pub category_tagging: bool,
    pub long_press_ms: u64,
    pub long_press_slop_px: f32,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            evaluation_states: DEFAULT_EVALUATION_STATES,
            category_tagging: true,
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            long_press_slop_px: DEFAULT_LONG_PRESS_SLOP_PX,
        }
    }
}

impl RosterConfig {
    /// Parses and validates a JSON config document. Missing fields keep
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if EvaluationCycle::new(self.evaluation_states).is_none() {
            return Err(ConfigError::EvaluationStatesOutOfRange(
                self.evaluation_states,
            ));
        }
        if self.long_press_ms == 0 {
            return Err(ConfigError::ZeroLongPressDuration);
        }
        if !self.long_press_slop_px.is_finite() || self.long_press_slop_px < 0.0 {
            return Err(ConfigError::InvalidSlop(self.long_press_slop_px));
        }
        Ok(())
    }

    /// Evaluation cycle described by this config.
    pub fn cycle(&self) -> Result<EvaluationCycle, ConfigError> {
        EvaluationCycle::new(self.evaluation_states)
            .ok_or(ConfigError::EvaluationStatesOutOfRange(self.evaluation_states))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    EvaluationStatesOutOfRange(u8),
    ZeroLongPressDuration,
    InvalidSlop(f32),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid roster config: {err}"),
            Self::EvaluationStatesOutOfRange(value) => write!(
                f,
                "evaluation_states must be within {MIN_EVALUATION_STATES}..={MAX_EVALUATION_STATES}, got {value}"
            ),
            Self::ZeroLongPressDuration => write!(f, "long_press_ms must be greater than zero"),
            Self::InvalidSlop(value) => {
                write!(f, "long_press_slop_px must be a non-negative number, got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}
