//! Translation of UI events into application commands.
//!
//! # Invariants
//! - Translation is pure: it reads the current interaction state and never
//!   mutates anything.
//! - While an input or confirmation prompt is open, only its answer is
//!   accepted; every other event is dropped.
//! - In delete mode, taps select instead of performing their normal action,
//!   and the add tile does nothing.

use crate::controller::selection::DeleteMode;
use crate::model::student::StudentCategory;
use crate::model::Collection;
use crate::view::render::ItemHandle;
use crate::view::Screen;

/// Abstract user input, already resolved to a rendered item when relevant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ItemTapped(ItemHandle),
    ItemLongPressed(ItemHandle),
    AddStudentTapped,
    AddActivityTapped,
    /// Edit/validate button of a list.
    DeleteToggleTapped(Collection),
    CommitTapped(Collection),
    CancelTapped(Collection),
    BackTapped,
    InputSubmitted(String),
    CategoryChosen(StudentCategory),
    InputCancelled,
    ConfirmationAnswered(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenStudent(usize),
    ToggleActivityState { student: usize, activity: usize },
    BeginAddStudent,
    BeginAddActivity,
    ToggleDeleteMode(Collection),
    ToggleSelection(ItemHandle),
    CommitSelection(Collection),
    CancelSelection(Collection),
    RequestDelete(ItemHandle),
    ResolveConfirmation(bool),
    ShowMain,
    SubmitInput(String),
    ChooseCategory(StudentCategory),
    CancelInput,
}

/// Interaction state the translation depends on.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext<'a> {
    pub screen: Screen,
    pub mode: &'a DeleteMode,
    pub awaiting_input: bool,
    pub confirmation_pending: bool,
}

impl DispatchContext<'_> {
    fn selecting(&self) -> Option<Collection> {
        match self.mode {
            DeleteMode::Selecting { target, .. } => Some(*target),
            DeleteMode::Normal => None,
        }
    }

    fn shows(&self, collection: Collection) -> bool {
        matches!(
            (self.screen, collection),
            (Screen::Main, Collection::Students) | (Screen::Student(_), Collection::Activities)
        )
    }
}

/// Maps one UI event to the command it stands for, if any.
pub fn translate(event: UiEvent, ctx: &DispatchContext<'_>) -> Option<Command> {
    if ctx.awaiting_input {
        return match event {
            UiEvent::InputSubmitted(text) => Some(Command::SubmitInput(text)),
            UiEvent::CategoryChosen(category) => Some(Command::ChooseCategory(category)),
            UiEvent::InputCancelled => Some(Command::CancelInput),
            _ => None,
        };
    }
    if ctx.confirmation_pending {
        return match event {
            UiEvent::ConfirmationAnswered(confirmed) => {
                Some(Command::ResolveConfirmation(confirmed))
            }
            _ => None,
        };
    }

    match event {
        UiEvent::ItemTapped(handle) if ctx.shows(handle.collection) => {
            match ctx.selecting() {
                Some(target) if target == handle.collection => {
                    Some(Command::ToggleSelection(handle))
                }
                Some(_) => None,
                None => normal_action(handle, ctx.screen),
            }
        }
        UiEvent::ItemLongPressed(handle) if ctx.shows(handle.collection) => {
            match ctx.selecting() {
                // A hold inside selection mode selects like a tap.
                Some(target) if target == handle.collection => {
                    Some(Command::ToggleSelection(handle))
                }
                Some(_) => None,
                None => Some(Command::RequestDelete(handle)),
            }
        }
        UiEvent::AddStudentTapped
            if ctx.screen == Screen::Main && ctx.selecting().is_none() =>
        {
            Some(Command::BeginAddStudent)
        }
        UiEvent::AddActivityTapped
            if matches!(ctx.screen, Screen::Student(_)) && ctx.selecting().is_none() =>
        {
            Some(Command::BeginAddActivity)
        }
        UiEvent::DeleteToggleTapped(collection) if ctx.shows(collection) => {
            Some(Command::ToggleDeleteMode(collection))
        }
        UiEvent::CommitTapped(collection) => Some(Command::CommitSelection(collection)),
        UiEvent::CancelTapped(collection) => Some(Command::CancelSelection(collection)),
        UiEvent::BackTapped if matches!(ctx.screen, Screen::Student(_)) => Some(Command::ShowMain),
        _ => None,
    }
}

fn normal_action(handle: ItemHandle, screen: Screen) -> Option<Command> {
    match (handle.collection, screen) {
        (Collection::Students, Screen::Main) => Some(Command::OpenStudent(handle.original_index)),
        (Collection::Activities, Screen::Student(student)) => {
            Some(Command::ToggleActivityState {
                student,
                activity: handle.original_index,
            })
        }
        _ => None,
    }
}
