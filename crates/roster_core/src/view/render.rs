//! Pure projection from roster + controller state to display lists.
//!
//! # Invariants
//! - Every rendered entity carries an `ItemHandle` with its original index;
//!   that handle is the only thing interactions send back.
//! - Students are sorted by name; activities are listed newest first.
//! - The add-student tile is always the last grid item.

use super::collation::compare_names;
use crate::controller::selection::SelectionController;
use crate::model::evaluation::EvaluationState;
use crate::model::roster::Roster;
use crate::model::student::StudentCategory;
use crate::model::Collection;
use std::borrow::Cow;

/// Reference to one entity by original index, captured at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemHandle {
    pub collection: Collection,
    pub original_index: usize,
}

impl ItemHandle {
    pub fn student(original_index: usize) -> Self {
        Self {
            collection: Collection::Students,
            original_index,
        }
    }

    pub fn activity(original_index: usize) -> Self {
        Self {
            collection: Collection::Activities,
            original_index,
        }
    }
}

/// State of a list's edit/validate button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteToggle {
    Edit,
    Validate,
}

impl DeleteToggle {
    fn for_collection(controller: &SelectionController, collection: Collection) -> Self {
        if controller.is_selecting(collection) {
            Self::Validate
        } else {
            Self::Edit
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentCard {
    pub handle: ItemHandle,
    pub name: String,
    pub category: Option<StudentCategory>,
    pub delete_mode: bool,
    pub selected: bool,
}

impl StudentCard {
    pub fn classes(&self) -> Vec<&'static str> {
        let mut classes = vec!["card"];
        classes.extend(self.category.map(StudentCategory::css_class));
        if self.delete_mode {
            classes.push("delete-mode");
        }
        if self.selected {
            classes.push("selected");
        }
        classes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridItem {
    Student(StudentCard),
    /// Disabled while the student list is in delete mode.
    AddStudent { enabled: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentGrid {
    pub items: Vec<GridItem>,
    pub delete_toggle: DeleteToggle,
}

impl StudentGrid {
    pub fn cards(&self) -> impl Iterator<Item = &StudentCard> {
        self.items.iter().filter_map(|item| match item {
            GridItem::Student(card) => Some(card),
            GridItem::AddStudent { .. } => None,
        })
    }

    /// Student names in display order.
    pub fn names(&self) -> Vec<&str> {
        self.cards().map(|card| card.name.as_str()).collect()
    }

    /// Handle of the student shown at display `position`.
    pub fn handle_at(&self, position: usize) -> Option<ItemHandle> {
        self.cards().nth(position).map(|card| card.handle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCard {
    pub handle: ItemHandle,
    pub name: String,
    pub state: Option<EvaluationState>,
    pub delete_mode: bool,
    pub selected: bool,
}

impl ActivityCard {
    pub fn classes(&self) -> Vec<Cow<'static, str>> {
        let mut classes = vec![Cow::Borrowed("activity-card")];
        classes.extend(self.state.map(EvaluationState::css_class));
        if self.delete_mode {
            classes.push(Cow::Borrowed("delete-mode"));
        }
        if self.selected {
            classes.push(Cow::Borrowed("selected"));
        }
        classes
    }
}

/// Activities of the viewed student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityList {
    pub student: ItemHandle,
    pub student_name: String,
    pub cards: Vec<ActivityCard>,
    pub delete_toggle: DeleteToggle,
}

impl ActivityList {
    pub fn names(&self) -> Vec<&str> {
        self.cards.iter().map(|card| card.name.as_str()).collect()
    }

    pub fn handle_at(&self, position: usize) -> Option<ItemHandle> {
        self.cards.get(position).map(|card| card.handle)
    }
}

/// Projects every student, sorted by name, followed by the add tile.
pub fn render_student_grid(roster: &Roster, controller: &SelectionController) -> StudentGrid {
    let delete_mode = controller.is_selecting(Collection::Students);

    let mut ordered: Vec<(usize, &str)> = roster
        .students()
        .iter()
        .enumerate()
        .map(|(index, student)| (index, student.name.as_str()))
        .collect();
    // Stable sort: equal names keep insertion order.
    ordered.sort_by(|(_, left), (_, right)| compare_names(left, right));

    let mut items: Vec<GridItem> = ordered
        .into_iter()
        .filter_map(|(index, _)| {
            let student = roster.student(index)?;
            Some(GridItem::Student(StudentCard {
                handle: ItemHandle::student(index),
                name: student.name.clone(),
                category: student.category,
                delete_mode,
                selected: controller.is_selected(Collection::Students, index),
            }))
        })
        .collect();
    items.push(GridItem::AddStudent {
        enabled: !delete_mode,
    });

    StudentGrid {
        items,
        delete_toggle: DeleteToggle::for_collection(controller, Collection::Students),
    }
}

/// Projects the activity list of one student, most recent activity first.
///
/// Returns `None` when `student_index` is not a live student.
pub fn render_activity_list(
    roster: &Roster,
    controller: &SelectionController,
    student_index: usize,
) -> Option<ActivityList> {
    let student = roster.student(student_index)?;
    let delete_mode = controller.is_selecting(Collection::Activities);

    let cards = roster
        .activities()
        .iter()
        .enumerate()
        .rev()
        .map(|(index, activity)| ActivityCard {
            handle: ItemHandle::activity(index),
            name: activity.name.clone(),
            state: student.state_for(index),
            delete_mode,
            selected: controller.is_selected(Collection::Activities, index),
        })
        .collect();

    Some(ActivityList {
        student: ItemHandle::student(student_index),
        student_name: student.name.clone(),
        cards,
        delete_toggle: DeleteToggle::for_collection(controller, Collection::Activities),
    })
}
