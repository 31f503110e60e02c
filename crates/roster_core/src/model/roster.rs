//! In-memory roster: students, activities and per-pair evaluation states.
//!
//! # Responsibility
//! - Own every mutation of the student/activity sequences.
//! - Renumber activity-state keys when activities are removed.
//!
//! # Invariants
//! - Every key of every `Student::activity_states` is `< activities.len()`.
//! - Every stored state is a named state of the configured cycle.
//! - Sequences never contain gaps: removal compacts, nothing is tombstoned.
//! - Removal sets are always interpreted in the pre-removal index space.

use super::activity::Activity;
use super::evaluation::{EvaluationCycle, EvaluationState};
use super::student::{ActivityStates, Student, StudentCategory};
use super::Collection;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Trims a user-supplied name and collapses inner whitespace runs.
///
/// Returns `None` when nothing but whitespace was supplied.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(WHITESPACE_RE.replace_all(trimmed, " ").into_owned())
}

/// Position of `index` after removing `removed`, or `None` when `index`
/// itself is removed.
///
/// `i' = i - |{d in removed : d < i}|`
pub fn shifted_index(index: usize, removed: &BTreeSet<usize>) -> Option<usize> {
    if removed.contains(&index) {
        return None;
    }
    Some(index - removed.range(..index).count())
}

/// Rebuilds a state map after removing the activities in `removed`.
///
/// Reads only from `states` and writes only into the returned map, so every
/// key is shifted against the original index space.
pub fn renumber_states(states: &ActivityStates, removed: &BTreeSet<usize>) -> ActivityStates {
    states
        .iter()
        .filter_map(|(&key, &state)| shifted_index(key, removed).map(|next| (next, state)))
        .collect()
}

fn compact<T>(items: Vec<T>, removed: &BTreeSet<usize>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !removed.contains(index))
        .map(|(_, item)| item)
        .collect()
}

/// A mutation that was applied to the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    StudentAdded {
        index: usize,
    },
    ActivityAdded {
        index: usize,
    },
    StudentRenamed {
        index: usize,
    },
    ActivityRenamed {
        index: usize,
    },
    StateToggled {
        student: usize,
        activity: usize,
        state: Option<EvaluationState>,
    },
    StudentsRemoved {
        removed: BTreeSet<usize>,
    },
    ActivitiesRemoved {
        removed: BTreeSet<usize>,
        /// Number of evaluation states dropped together with the activities.
        cleared_states: usize,
    },
}

impl Mutation {
    /// Collections whose projection changed.
    pub fn touches(&self, collection: Collection) -> bool {
        match self {
            Self::StudentAdded { .. }
            | Self::StudentRenamed { .. }
            | Self::StudentsRemoved { .. } => collection == Collection::Students,
            Self::ActivityAdded { .. }
            | Self::ActivityRenamed { .. }
            | Self::StateToggled { .. }
            | Self::ActivitiesRemoved { .. } => collection == Collection::Activities,
        }
    }
}

/// Why a requested mutation did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Name was empty or whitespace-only.
    EmptyName,
    /// Index does not address a live entity.
    OutOfRange { collection: Collection, index: usize },
    /// Removal requested with nothing selected.
    EmptySelection,
}

/// Result of a roster operation. Rejections leave the roster untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied(Mutation),
    Rejected(Rejection),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn mutation(&self) -> Option<&Mutation> {
        match self {
            Self::Applied(mutation) => Some(mutation),
            Self::Rejected(_) => None,
        }
    }
}

/// Entries dropped while adopting persisted data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// State keys pointing past the last activity.
    pub dangling_keys: usize,
    /// State values outside the configured cycle.
    pub invalid_states: usize,
    /// Records whose name was blank.
    pub blank_names: usize,
    /// States attached to a dropped blank-named activity.
    pub orphaned_states: usize,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    students: Vec<Student>,
    activities: Vec<Activity>,
    cycle: EvaluationCycle,
}

impl Roster {
    pub fn new(cycle: EvaluationCycle) -> Self {
        Self {
            students: Vec::new(),
            activities: Vec::new(),
            cycle,
        }
    }

    /// Adopts persisted sequences, dropping whatever breaks the invariants.
    pub fn from_parts(
        students: Vec<Student>,
        activities: Vec<Activity>,
        cycle: EvaluationCycle,
    ) -> (Self, RepairReport) {
        let mut report = RepairReport::default();

        let mut blank_activities = BTreeSet::new();
        let activities: Vec<Activity> = activities
            .into_iter()
            .enumerate()
            .filter_map(|(index, activity)| match normalize_name(&activity.name) {
                Some(name) => Some(Activity { name }),
                None => {
                    blank_activities.insert(index);
                    None
                }
            })
            .collect();
        report.blank_names += blank_activities.len();
        let activity_count = activities.len();

        let students = students
            .into_iter()
            .filter_map(|mut student| {
                let Some(name) = normalize_name(&student.name) else {
                    report.blank_names += 1;
                    return None;
                };
                student.name = name;
                if !blank_activities.is_empty() {
                    let renumbered = renumber_states(&student.activity_states, &blank_activities);
                    report.orphaned_states += student.activity_states.len() - renumbered.len();
                    student.activity_states = renumbered;
                }
                student.activity_states.retain(|&key, state| {
                    if key >= activity_count {
                        report.dangling_keys += 1;
                        false
                    } else if !cycle.contains(*state) {
                        report.invalid_states += 1;
                        false
                    } else {
                        true
                    }
                });
                Some(student)
            })
            .collect();

        (
            Self {
                students,
                activities,
                cycle,
            },
            report,
        )
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn student(&self, index: usize) -> Option<&Student> {
        self.students.get(index)
    }

    pub fn activity(&self, index: usize) -> Option<&Activity> {
        self.activities.get(index)
    }

    pub fn cycle(&self) -> EvaluationCycle {
        self.cycle
    }

    /// Number of entities in `collection`.
    pub fn len_of(&self, collection: Collection) -> usize {
        match collection {
            Collection::Students => self.students.len(),
            Collection::Activities => self.activities.len(),
        }
    }

    /// Display name of one entity, if the index is live.
    pub fn name_of(&self, collection: Collection, index: usize) -> Option<&str> {
        match collection {
            Collection::Students => self.student(index).map(|student| student.name.as_str()),
            Collection::Activities => self.activity(index).map(|activity| activity.name.as_str()),
        }
    }

    /// Checks the central key/range invariant.
    pub fn is_consistent(&self) -> bool {
        let activity_count = self.activities.len();
        self.students.iter().all(|student| {
            student
                .activity_states
                .iter()
                .all(|(&key, &state)| key < activity_count && self.cycle.contains(state))
        })
    }

    /// Appends a student at index `students.len()`.
    pub fn add_student(&mut self, name: &str, category: Option<StudentCategory>) -> MutationOutcome {
        let Some(name) = normalize_name(name) else {
            return MutationOutcome::Rejected(Rejection::EmptyName);
        };
        self.students.push(Student::new(name, category));
        MutationOutcome::Applied(Mutation::StudentAdded {
            index: self.students.len() - 1,
        })
    }

    /// Appends an activity at index `activities.len()`.
    pub fn add_activity(&mut self, name: &str) -> MutationOutcome {
        let Some(name) = normalize_name(name) else {
            return MutationOutcome::Rejected(Rejection::EmptyName);
        };
        self.activities.push(Activity::new(name));
        MutationOutcome::Applied(Mutation::ActivityAdded {
            index: self.activities.len() - 1,
        })
    }

    pub fn rename_student(&mut self, index: usize, name: &str) -> MutationOutcome {
        let Some(name) = normalize_name(name) else {
            return MutationOutcome::Rejected(Rejection::EmptyName);
        };
        let Some(student) = self.students.get_mut(index) else {
            return out_of_range(Collection::Students, index);
        };
        student.name = name;
        MutationOutcome::Applied(Mutation::StudentRenamed { index })
    }

    pub fn rename_activity(&mut self, index: usize, name: &str) -> MutationOutcome {
        let Some(name) = normalize_name(name) else {
            return MutationOutcome::Rejected(Rejection::EmptyName);
        };
        let Some(activity) = self.activities.get_mut(index) else {
            return out_of_range(Collection::Activities, index);
        };
        activity.name = name;
        MutationOutcome::Applied(Mutation::ActivityRenamed { index })
    }

    /// Advances the (student, activity) state by one step of the cycle.
    ///
    /// Reaching the null state removes the map entry.
    pub fn toggle_activity_state(
        &mut self,
        student_index: usize,
        activity_index: usize,
    ) -> MutationOutcome {
        if activity_index >= self.activities.len() {
            return out_of_range(Collection::Activities, activity_index);
        }
        let cycle = self.cycle;
        let Some(student) = self.students.get_mut(student_index) else {
            return out_of_range(Collection::Students, student_index);
        };

        let next = cycle.advance(student.state_for(activity_index));
        match next {
            Some(state) => {
                student.activity_states.insert(activity_index, state);
            }
            None => {
                student.activity_states.remove(&activity_index);
            }
        }

        MutationOutcome::Applied(Mutation::StateToggled {
            student: student_index,
            activity: activity_index,
            state: next,
        })
    }

    /// Removes every student in `indexes` in one step.
    ///
    /// Activity-state keys are untouched: they index activities.
    pub fn remove_students(&mut self, indexes: &BTreeSet<usize>) -> MutationOutcome {
        if let Some(rejection) = check_removal(indexes, self.students.len(), Collection::Students) {
            return MutationOutcome::Rejected(rejection);
        }
        self.students = compact(std::mem::take(&mut self.students), indexes);
        MutationOutcome::Applied(Mutation::StudentsRemoved {
            removed: indexes.clone(),
        })
    }

    /// Removes every activity in `indexes` and renumbers all state maps.
    ///
    /// States attached to a removed activity are dropped unconditionally.
    pub fn remove_activities(&mut self, indexes: &BTreeSet<usize>) -> MutationOutcome {
        if let Some(rejection) =
            check_removal(indexes, self.activities.len(), Collection::Activities)
        {
            return MutationOutcome::Rejected(rejection);
        }

        self.activities = compact(std::mem::take(&mut self.activities), indexes);

        let mut cleared_states = 0;
        for student in &mut self.students {
            let renumbered = renumber_states(&student.activity_states, indexes);
            cleared_states += student.activity_states.len() - renumbered.len();
            student.activity_states = renumbered;
        }

        debug_assert!(self.is_consistent());
        MutationOutcome::Applied(Mutation::ActivitiesRemoved {
            removed: indexes.clone(),
            cleared_states,
        })
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(EvaluationCycle::default())
    }
}

fn out_of_range(collection: Collection, index: usize) -> MutationOutcome {
    MutationOutcome::Rejected(Rejection::OutOfRange { collection, index })
}

fn check_removal(
    indexes: &BTreeSet<usize>,
    len: usize,
    collection: Collection,
) -> Option<Rejection> {
    match indexes.last() {
        None => Some(Rejection::EmptySelection),
        Some(&index) if index >= len => Some(Rejection::OutOfRange { collection, index }),
        Some(_) => None,
    }
}
