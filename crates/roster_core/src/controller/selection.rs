//! Selection/delete controller.
//!
//! # Responsibility
//! - Track the ephemeral delete interaction: batch selection mode and the
//!   single-item confirmation flow.
//! - Hand committed index sets to the caller; never mutate the roster itself.
//!
//! # Invariants
//! - At most one collection is in `Selecting` at a time.
//! - At most one confirmation is pending at a time.
//! - A collection with a pending confirmation cannot enter `Selecting`, and
//!   a collection in `Selecting` cannot start a confirmation.
//! - Selected indexes are original (unsorted) indexes.

use crate::model::Collection;
use std::collections::BTreeSet;

/// Batch-deletion mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteMode {
    #[default]
    Normal,
    Selecting {
        target: Collection,
        selected: BTreeSet<usize>,
    },
}

/// Single-item removal awaiting a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub target: Collection,
    pub index: usize,
}

/// Why a controller command changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Some collection is already in `Selecting`.
    AlreadySelecting(Collection),
    /// A single-item confirmation is in flight.
    ConfirmationPending,
    /// Command targets a collection that is not in `Selecting`.
    NotSelecting(Collection),
    EmptySelection,
    NoPendingConfirmation,
}

/// Observable effect of a controller command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Entered(Collection),
    Toggled {
        target: Collection,
        index: usize,
        selected: bool,
    },
    /// Mode left; the caller must remove `indexes` from `target`.
    Committed {
        target: Collection,
        indexes: BTreeSet<usize>,
    },
    /// Mode left without any removal.
    Cancelled(Collection),
    ConfirmationRequested(PendingConfirmation),
    /// The caller must remove `index` from `target`.
    Confirmed(PendingConfirmation),
    Declined(PendingConfirmation),
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    mode: DeleteMode,
    pending: Option<PendingConfirmation>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &DeleteMode {
        &self.mode
    }

    pub fn pending_confirmation(&self) -> Option<PendingConfirmation> {
        self.pending
    }

    /// Whether `target` is currently in `Selecting`.
    pub fn is_selecting(&self, target: Collection) -> bool {
        matches!(&self.mode, DeleteMode::Selecting { target: active, .. } if *active == target)
    }

    /// Whether `index` of `target` is marked for removal.
    pub fn is_selected(&self, target: Collection, index: usize) -> bool {
        match &self.mode {
            DeleteMode::Selecting {
                target: active,
                selected,
            } => *active == target && selected.contains(&index),
            DeleteMode::Normal => false,
        }
    }

    pub fn enter_selection(&mut self, target: Collection) -> Transition {
        if let DeleteMode::Selecting { target: active, .. } = &self.mode {
            return Transition::Ignored(IgnoreReason::AlreadySelecting(*active));
        }
        if self.pending.is_some_and(|pending| pending.target == target) {
            return Transition::Ignored(IgnoreReason::ConfirmationPending);
        }
        self.mode = DeleteMode::Selecting {
            target,
            selected: BTreeSet::new(),
        };
        Transition::Entered(target)
    }

    /// Flips membership of `index`. Bounds are checked by the caller.
    pub fn toggle_item(&mut self, target: Collection, index: usize) -> Transition {
        match &mut self.mode {
            DeleteMode::Selecting {
                target: active,
                selected,
            } if *active == target => {
                let now_selected = if selected.remove(&index) {
                    false
                } else {
                    selected.insert(index);
                    true
                };
                Transition::Toggled {
                    target,
                    index,
                    selected: now_selected,
                }
            }
            _ => Transition::Ignored(IgnoreReason::NotSelecting(target)),
        }
    }

    /// Leaves `Selecting` and hands over the selection.
    ///
    /// With nothing selected this is a no-op and the mode is kept.
    pub fn commit(&mut self, target: Collection) -> Transition {
        match &self.mode {
            DeleteMode::Selecting {
                target: active,
                selected,
            } if *active == target => {
                if selected.is_empty() {
                    return Transition::Ignored(IgnoreReason::EmptySelection);
                }
            }
            _ => return Transition::Ignored(IgnoreReason::NotSelecting(target)),
        }

        match std::mem::take(&mut self.mode) {
            DeleteMode::Selecting { target, selected } => Transition::Committed {
                target,
                indexes: selected,
            },
            DeleteMode::Normal => Transition::Ignored(IgnoreReason::NotSelecting(target)),
        }
    }

    /// Leaves `Selecting` and discards the selection.
    pub fn cancel(&mut self, target: Collection) -> Transition {
        if !self.is_selecting(target) {
            return Transition::Ignored(IgnoreReason::NotSelecting(target));
        }
        self.mode = DeleteMode::Normal;
        Transition::Cancelled(target)
    }

    /// Edit/validate toggle: enters `Selecting`, or leaves it by committing
    /// a non-empty selection and cancelling an empty one.
    pub fn toggle_delete_mode(&mut self, target: Collection) -> Transition {
        if !self.is_selecting(target) {
            return self.enter_selection(target);
        }
        match self.commit(target) {
            Transition::Ignored(IgnoreReason::EmptySelection) => self.cancel(target),
            transition => transition,
        }
    }

    /// Starts the single-item flow for `index` of `target`.
    pub fn request_single_delete(&mut self, target: Collection, index: usize) -> Transition {
        if self.pending.is_some() {
            return Transition::Ignored(IgnoreReason::ConfirmationPending);
        }
        if self.is_selecting(target) {
            return Transition::Ignored(IgnoreReason::AlreadySelecting(target));
        }
        let pending = PendingConfirmation { target, index };
        self.pending = Some(pending);
        Transition::ConfirmationRequested(pending)
    }

    /// Resolves the pending confirmation.
    pub fn resolve_confirmation(&mut self, confirmed: bool) -> Transition {
        match self.pending.take() {
            Some(pending) if confirmed => Transition::Confirmed(pending),
            Some(pending) => Transition::Declined(pending),
            None => Transition::Ignored(IgnoreReason::NoPendingConfirmation),
        }
    }

    /// Drops any selection and pending confirmation without committing.
    ///
    /// Returns whether anything was active.
    pub fn reset(&mut self) -> bool {
        let was_active = self.mode != DeleteMode::Normal || self.pending.is_some();
        self.mode = DeleteMode::Normal;
        self.pending = None;
        was_active
    }
}
