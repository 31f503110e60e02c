//! Rendering sink contract and a recording implementation.
//!
//! # Responsibility
//! - Describe everything the core asks of a presentation layer: repopulate
//!   a container, show/hide a view, ask for input, ask for confirmation,
//!   show a notice.
//!
//! # Invariants
//! - Sinks receive complete lists; there is no incremental diff contract.

use super::render::{ActivityList, ItemHandle, StudentGrid};
use super::ViewId;

/// Text the user is asked to provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRequest {
    StudentName,
    /// Second step of the add-student flow when tagging is enabled.
    StudentCategory { name: String },
    ActivityName,
}

/// Human acknowledgement requested before a single-item removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub handle: ItemHandle,
    /// Name of the entity that would be removed.
    pub entity_name: String,
}

/// Short user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NameRequired,
    /// Changes are kept for this session but were not saved.
    PersistenceFailed { message: String },
}

/// Presentation layer driven by the application context.
pub trait RenderSink {
    /// Clears and repopulates the student grid container.
    fn replace_student_grid(&mut self, grid: &StudentGrid);
    /// Clears and repopulates the activity container.
    fn replace_activity_list(&mut self, list: &ActivityList);
    fn set_view_visible(&mut self, view: ViewId, visible: bool);
    fn request_input(&mut self, request: InputRequest);
    fn request_confirmation(&mut self, request: ConfirmationRequest);
    fn notify(&mut self, notice: Notice);
}

/// Sink that records every call, for headless hosts and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    pub student_grids: Vec<StudentGrid>,
    pub activity_lists: Vec<ActivityList>,
    pub main_visible: bool,
    pub student_visible: bool,
    pub input_requests: Vec<InputRequest>,
    pub confirmations: Vec<ConfirmationRequest>,
    pub notices: Vec<Notice>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_student_grid(&self) -> Option<&StudentGrid> {
        self.student_grids.last()
    }

    pub fn last_activity_list(&self) -> Option<&ActivityList> {
        self.activity_lists.last()
    }
}

impl RenderSink for MemorySink {
    fn replace_student_grid(&mut self, grid: &StudentGrid) {
        self.student_grids.push(grid.clone());
    }

    fn replace_activity_list(&mut self, list: &ActivityList) {
        self.activity_lists.push(list.clone());
    }

    fn set_view_visible(&mut self, view: ViewId, visible: bool) {
        match view {
            ViewId::Main => self.main_visible = visible,
            ViewId::Student => self.student_visible = visible,
        }
    }

    fn request_input(&mut self, request: InputRequest) {
        self.input_requests.push(request);
    }

    fn request_confirmation(&mut self, request: ConfirmationRequest) {
        self.confirmations.push(request);
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
