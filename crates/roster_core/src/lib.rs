//! Core logic for the student/activity roster tracker.
//! This crate owns the roster invariants; presentation layers only render
//! what it projects and send back handles of what the user touched.

pub mod app;
pub mod config;
pub mod controller;
pub mod db;
pub mod dispatch;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use app::{AppError, InputFlow, RosterApp};
pub use config::{ConfigError, RosterConfig};
pub use controller::selection::{
    DeleteMode, IgnoreReason, PendingConfirmation, SelectionController, Transition,
};
pub use dispatch::command::{Command, UiEvent};
pub use dispatch::gesture::{Gesture, GestureRouter, Point, PointerEvent, PressThresholds, PressTracker};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::activity::Activity;
pub use model::evaluation::{EvaluationCycle, EvaluationState};
pub use model::roster::{Mutation, MutationOutcome, Rejection, RepairReport, Roster};
pub use model::student::{ActivityStates, Student, StudentCategory};
pub use model::Collection;
pub use repo::kv_repo::{KeyValueRepository, RepoError, RepoResult, SqliteKeyValueRepository};
pub use repo::roster_repo::{KvRosterRepository, RosterRepository, RosterSnapshot};
pub use service::roster_service::{RosterService, RosterServiceError, RosterServiceResult};
pub use view::render::{
    ActivityCard, ActivityList, DeleteToggle, GridItem, ItemHandle, StudentCard, StudentGrid,
};
pub use view::sink::{ConfirmationRequest, InputRequest, MemorySink, Notice, RenderSink};
pub use view::{Screen, ViewId};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
