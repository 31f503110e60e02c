//! Application context.
//!
//! # Responsibility
//! - Own the roster service, the selection controller, the gesture router
//!   and the render sink for one session.
//! - Run each command to completion: mutate, persist, re-render.
//!
//! # Invariants
//! - Every rendered list is a fresh projection of the current state.
//! - Changing screen resets any delete interaction without committing.
//! - A failed save is reported to the sink; the session keeps the change.

use crate::config::{ConfigError, RosterConfig};
use crate::controller::selection::{SelectionController, Transition};
use crate::dispatch::command::{translate, Command, DispatchContext, UiEvent};
use crate::dispatch::gesture::{Gesture, GestureRouter, PointerEvent, PressThresholds};
use crate::model::roster::{normalize_name, shifted_index, Mutation, MutationOutcome, Rejection, Roster};
use crate::model::student::StudentCategory;
use crate::model::Collection;
use crate::repo::roster_repo::RosterRepository;
use crate::service::roster_service::{RosterService, RosterServiceError, RosterServiceResult};
use crate::view::render::{render_activity_list, render_student_grid, ItemHandle};
use crate::view::sink::{ConfirmationRequest, InputRequest, Notice, RenderSink};
use crate::view::{Screen, ViewId};
use log::{debug, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Pending text/choice prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputFlow {
    #[default]
    Idle,
    AwaitingStudentName,
    AwaitingStudentCategory {
        name: String,
    },
    AwaitingActivityName,
}

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Service(RosterServiceError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Service(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RosterServiceError> for AppError {
    fn from(value: RosterServiceError) -> Self {
        Self::Service(value)
    }
}

pub struct RosterApp<R: RosterRepository, S: RenderSink> {
    config: RosterConfig,
    service: RosterService<R>,
    controller: SelectionController,
    gestures: GestureRouter,
    screen: Screen,
    input: InputFlow,
    sink: S,
}

impl<R: RosterRepository, S: RenderSink> RosterApp<R, S> {
    /// Loads the stored roster and renders the student grid.
    pub fn open(repo: R, sink: S, config: RosterConfig) -> Result<Self, AppError> {
        config.validate()?;
        let service = RosterService::load(repo, config.cycle()?)?;

        let mut app = Self {
            gestures: GestureRouter::new(PressThresholds::from_config(&config)),
            config,
            service,
            controller: SelectionController::new(),
            screen: Screen::Main,
            input: InputFlow::Idle,
            sink,
        };
        app.render_students();
        app.sink.set_view_visible(ViewId::Main, true);
        app.sink.set_view_visible(ViewId::Student, false);
        info!(
            "event=app_open module=app status=ok evaluation_states={} category_tagging={}",
            app.config.evaluation_states, app.config.category_tagging
        );
        Ok(app)
    }

    pub fn roster(&self) -> &Roster {
        self.service.roster()
    }

    pub fn service(&self) -> &RosterService<R> {
        &self.service
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn input_flow(&self) -> &InputFlow {
        &self.input
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Handles one UI event to completion.
    pub fn handle_event(&mut self, event: UiEvent) {
        let context = DispatchContext {
            screen: self.screen,
            mode: self.controller.mode(),
            awaiting_input: self.input != InputFlow::Idle,
            confirmation_pending: self.controller.pending_confirmation().is_some(),
        };
        match translate(event, &context) {
            Some(command) => self.execute(command),
            None => debug!("event=ui_event module=app status=dropped"),
        }
    }

    /// Feeds a pointer event for one rendered item.
    pub fn pointer(&mut self, handle: ItemHandle, event: PointerEvent) {
        if let Some(gesture) = self.gestures.pointer(handle, event) {
            self.handle_gesture(handle, gesture);
        }
    }

    /// Fires hold timers that are due at `now_ms`.
    pub fn tick(&mut self, now_ms: u64) {
        for (handle, gesture) in self.gestures.tick(now_ms) {
            self.handle_gesture(handle, gesture);
        }
    }

    /// Earliest pending hold deadline, for host timer scheduling.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.gestures.next_deadline_ms()
    }

    pub fn rename_student(&mut self, index: usize, name: &str) {
        let result = self.service.rename_student(index, name);
        self.after_mutation(result);
    }

    pub fn rename_activity(&mut self, index: usize, name: &str) {
        let result = self.service.rename_activity(index, name);
        self.after_mutation(result);
    }

    fn handle_gesture(&mut self, handle: ItemHandle, gesture: Gesture) {
        let event = match gesture {
            Gesture::Tap => UiEvent::ItemTapped(handle),
            Gesture::LongPress => UiEvent::ItemLongPressed(handle),
        };
        self.handle_event(event);
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::OpenStudent(index) => self.open_student(index),
            Command::ShowMain => self.show_main(),
            Command::ToggleActivityState { student, activity } => {
                let result = self.service.toggle_activity_state(student, activity);
                self.after_mutation(result);
            }
            Command::BeginAddStudent => self.prompt(InputFlow::AwaitingStudentName),
            Command::BeginAddActivity => self.prompt(InputFlow::AwaitingActivityName),
            Command::SubmitInput(text) => self.submit_input(text),
            Command::ChooseCategory(category) => self.choose_category(category),
            Command::CancelInput => self.input = InputFlow::Idle,
            Command::ToggleDeleteMode(collection) => {
                let transition = self.controller.toggle_delete_mode(collection);
                self.apply_transition(transition);
            }
            Command::ToggleSelection(handle) => {
                if handle.original_index >= self.roster().len_of(handle.collection) {
                    return;
                }
                let transition = self
                    .controller
                    .toggle_item(handle.collection, handle.original_index);
                self.apply_transition(transition);
            }
            Command::CommitSelection(collection) => {
                let transition = self.controller.commit(collection);
                self.apply_transition(transition);
            }
            Command::CancelSelection(collection) => {
                let transition = self.controller.cancel(collection);
                self.apply_transition(transition);
            }
            Command::RequestDelete(handle) => self.request_delete(handle),
            Command::ResolveConfirmation(confirmed) => {
                let transition = self.controller.resolve_confirmation(confirmed);
                self.apply_transition(transition);
            }
        }
    }

    fn open_student(&mut self, index: usize) {
        if self.roster().student(index).is_none() {
            return;
        }
        if self.controller.reset() {
            self.render_students();
        }
        self.screen = Screen::Student(index);
        self.gestures.clear();
        self.render_activities();
        self.sink.set_view_visible(ViewId::Main, false);
        self.sink.set_view_visible(ViewId::Student, true);
    }

    fn show_main(&mut self) {
        self.controller.reset();
        self.screen = Screen::Main;
        self.gestures.clear();
        self.render_students();
        self.sink.set_view_visible(ViewId::Main, true);
        self.sink.set_view_visible(ViewId::Student, false);
    }

    fn prompt(&mut self, flow: InputFlow) {
        let request = match &flow {
            InputFlow::AwaitingStudentName => InputRequest::StudentName,
            InputFlow::AwaitingActivityName => InputRequest::ActivityName,
            InputFlow::AwaitingStudentCategory { name } => {
                InputRequest::StudentCategory { name: name.clone() }
            }
            InputFlow::Idle => return,
        };
        self.input = flow;
        self.sink.request_input(request);
    }

    fn submit_input(&mut self, text: String) {
        match std::mem::take(&mut self.input) {
            InputFlow::AwaitingStudentName => match normalize_name(&text) {
                None => self.sink.notify(Notice::NameRequired),
                Some(name) if self.config.category_tagging => {
                    self.prompt(InputFlow::AwaitingStudentCategory { name });
                }
                Some(name) => {
                    let result = self.service.add_student(&name, None);
                    self.after_mutation(result);
                }
            },
            InputFlow::AwaitingActivityName => {
                let result = self.service.add_activity(&text);
                self.after_mutation(result);
            }
            // The category step answers with a choice, not text.
            flow @ InputFlow::AwaitingStudentCategory { .. } => self.input = flow,
            InputFlow::Idle => {}
        }
    }

    fn choose_category(&mut self, category: StudentCategory) {
        match std::mem::take(&mut self.input) {
            InputFlow::AwaitingStudentCategory { name } => {
                let result = self.service.add_student(&name, Some(category));
                self.after_mutation(result);
            }
            other => self.input = other,
        }
    }

    fn request_delete(&mut self, handle: ItemHandle) {
        let Some(entity_name) = self
            .roster()
            .name_of(handle.collection, handle.original_index)
            .map(str::to_string)
        else {
            return;
        };
        match self
            .controller
            .request_single_delete(handle.collection, handle.original_index)
        {
            Transition::ConfirmationRequested(_) => {
                self.sink
                    .request_confirmation(ConfirmationRequest { handle, entity_name });
            }
            other => self.apply_transition(other),
        }
    }

    fn apply_transition(&mut self, transition: Transition) {
        match transition {
            Transition::Entered(collection)
            | Transition::Cancelled(collection)
            | Transition::Toggled {
                target: collection,
                ..
            } => self.render_collection(collection),
            Transition::Committed { target, indexes } => self.remove(target, &indexes),
            Transition::Confirmed(pending) => {
                self.remove(pending.target, &BTreeSet::from([pending.index]));
            }
            Transition::ConfirmationRequested(_) | Transition::Declined(_) => {}
            Transition::Ignored(reason) => {
                debug!("event=delete_flow module=app status=ignored reason={reason:?}");
            }
        }
    }

    fn remove(&mut self, collection: Collection, indexes: &BTreeSet<usize>) {
        info!(
            "event=delete_commit module=app status=start collection={} count={}",
            collection.as_str(),
            indexes.len()
        );
        let result = match collection {
            Collection::Students => self.service.remove_students(indexes),
            Collection::Activities => self.service.remove_activities(indexes),
        };
        // Rejected removals still leave delete mode, so the list is redrawn.
        if matches!(result, Ok(MutationOutcome::Rejected(_))) {
            self.render_collection(collection);
        }
        self.after_mutation(result);
    }

    fn after_mutation(&mut self, result: RosterServiceResult<MutationOutcome>) {
        let mutation = match result {
            Ok(MutationOutcome::Applied(mutation)) => mutation,
            Ok(MutationOutcome::Rejected(Rejection::EmptyName)) => {
                self.sink.notify(Notice::NameRequired);
                return;
            }
            Ok(MutationOutcome::Rejected(_)) => return,
            Err(err) => {
                self.sink.notify(Notice::PersistenceFailed {
                    message: err.to_string(),
                });
                match err {
                    RosterServiceError::Persistence { mutation, .. } => mutation,
                    RosterServiceError::Load(_) => return,
                }
            }
        };

        if let Mutation::StudentsRemoved { removed } = &mutation {
            self.gestures.clear();
            if let Screen::Student(viewed) = self.screen {
                match shifted_index(viewed, removed) {
                    Some(index) => self.screen = Screen::Student(index),
                    None => {
                        self.show_main();
                        return;
                    }
                }
            }
        }
        if matches!(mutation, Mutation::ActivitiesRemoved { .. }) {
            self.gestures.clear();
        }

        for collection in [Collection::Students, Collection::Activities] {
            if mutation.touches(collection) {
                self.render_collection(collection);
            }
        }
        // Student header shows the name.
        if let (Mutation::StudentRenamed { index }, Screen::Student(viewed)) =
            (&mutation, self.screen)
        {
            if *index == viewed {
                self.render_activities();
            }
        }
    }

    fn render_collection(&mut self, collection: Collection) {
        match collection {
            Collection::Students => self.render_students(),
            Collection::Activities => self.render_activities(),
        }
    }

    fn render_students(&mut self) {
        let grid = render_student_grid(self.service.roster(), &self.controller);
        self.sink.replace_student_grid(&grid);
    }

    /// Renders only while a student is viewed.
    fn render_activities(&mut self) {
        let Screen::Student(index) = self.screen else {
            return;
        };
        if let Some(list) = render_activity_list(self.service.roster(), &self.controller, index) {
            self.sink.replace_activity_list(&list);
        }
    }
}
