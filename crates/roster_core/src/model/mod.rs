//! Roster domain model.
//!
//! # Responsibility
//! - Define students, activities and evaluation states.
//! - Keep every mutation and index-renumbering rule in one place.
//!
//! # Invariants
//! - Entity identity is positional (original index in its sequence).
//! - Evaluation-state keys always reference live activity indexes.

pub mod activity;
pub mod evaluation;
pub mod roster;
pub mod student;

/// One of the two entity sequences of a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Students,
    Activities,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Activities => "activities",
        }
    }
}
