//! Roster use-case service.
//!
//! # Responsibility
//! - Apply roster mutations and persist the result after each one.
//! - Log every mutation as metadata only (indexes and counts, never names).
//!
//! # Invariants
//! - Rejected operations never reach the repository.
//! - The in-memory roster stays authoritative when a save fails: the
//!   mutation is kept and the failure is returned to the caller.

use crate::model::evaluation::EvaluationCycle;
use crate::model::roster::{Mutation, MutationOutcome, Roster};
use crate::model::student::StudentCategory;
use crate::repo::kv_repo::RepoError;
use crate::repo::roster_repo::RosterRepository;
use log::{error, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RosterServiceResult<T> = Result<T, RosterServiceError>;

#[derive(Debug)]
pub enum RosterServiceError {
    /// Stored roster could not be read at startup.
    Load(RepoError),
    /// Mutation applied in memory, but the save failed.
    Persistence {
        mutation: Mutation,
        source: RepoError,
    },
}

impl RosterServiceError {
    /// Mutation that stayed applied despite the failure, if any.
    pub fn applied_mutation(&self) -> Option<&Mutation> {
        match self {
            Self::Load(_) => None,
            Self::Persistence { mutation, .. } => Some(mutation),
        }
    }
}

impl Display for RosterServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load roster: {err}"),
            Self::Persistence { source, .. } => write!(f, "failed to save roster: {source}"),
        }
    }
}

impl Error for RosterServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Persistence { source, .. } => Some(source),
        }
    }
}

/// Roster facade over a repository implementation.
pub struct RosterService<R: RosterRepository> {
    roster: Roster,
    repo: R,
}

impl<R: RosterRepository> RosterService<R> {
    /// Loads the stored roster and repairs anything that breaks invariants.
    pub fn load(repo: R, cycle: EvaluationCycle) -> RosterServiceResult<Self> {
        let snapshot = repo.load().map_err(|err| {
            error!("event=roster_load module=service status=error error={err}");
            RosterServiceError::Load(err)
        })?;

        let (roster, report) = Roster::from_parts(snapshot.students, snapshot.activities, cycle);
        if report.is_clean() {
            info!(
                "event=roster_load module=service status=ok students={} activities={}",
                roster.students().len(),
                roster.activities().len()
            );
        } else {
            warn!(
                "event=roster_load module=service status=repaired students={} activities={} dangling_keys={} invalid_states={} blank_names={} orphaned_states={}",
                roster.students().len(),
                roster.activities().len(),
                report.dangling_keys,
                report.invalid_states,
                report.blank_names,
                report.orphaned_states
            );
        }

        Ok(Self { roster, repo })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn add_student(
        &mut self,
        name: &str,
        category: Option<StudentCategory>,
    ) -> RosterServiceResult<MutationOutcome> {
        let outcome = self.roster.add_student(name, category);
        self.commit(outcome)
    }

    pub fn add_activity(&mut self, name: &str) -> RosterServiceResult<MutationOutcome> {
        let outcome = self.roster.add_activity(name);
        self.commit(outcome)
    }

    pub fn rename_student(&mut self, index: usize, name: &str) -> RosterServiceResult<MutationOutcome> {
        let outcome = self.roster.rename_student(index, name);
        self.commit(outcome)
    }

    pub fn rename_activity(
        &mut self,
        index: usize,
        name: &str,
    ) -> RosterServiceResult<MutationOutcome> {
        let outcome = self.roster.rename_activity(index, name);
        self.commit(outcome)
    }

    pub fn toggle_activity_state(
        &mut self,
        student_index: usize,
        activity_index: usize,
    ) -> RosterServiceResult<MutationOutcome> {
        let outcome = self
            .roster
            .toggle_activity_state(student_index, activity_index);
        self.commit(outcome)
    }

    pub fn remove_students(
        &mut self,
        indexes: &BTreeSet<usize>,
    ) -> RosterServiceResult<MutationOutcome> {
        let outcome = self.roster.remove_students(indexes);
        self.commit(outcome)
    }

    pub fn remove_activities(
        &mut self,
        indexes: &BTreeSet<usize>,
    ) -> RosterServiceResult<MutationOutcome> {
        let outcome = self.roster.remove_activities(indexes);
        self.commit(outcome)
    }

    fn commit(&mut self, outcome: MutationOutcome) -> RosterServiceResult<MutationOutcome> {
        let mutation = match &outcome {
            MutationOutcome::Applied(mutation) => mutation,
            MutationOutcome::Rejected(rejection) => {
                info!("event=roster_mutation module=service status=rejected reason={rejection:?}");
                return Ok(outcome);
            }
        };

        match self
            .repo
            .save(self.roster.students(), self.roster.activities())
        {
            Ok(()) => {
                info!(
                    "event=roster_mutation module=service status=ok kind={}",
                    mutation_kind(mutation)
                );
                Ok(outcome)
            }
            Err(source) => {
                error!(
                    "event=roster_save module=service status=error kind={} error={source}",
                    mutation_kind(mutation)
                );
                Err(RosterServiceError::Persistence {
                    mutation: mutation.clone(),
                    source,
                })
            }
        }
    }
}

fn mutation_kind(mutation: &Mutation) -> String {
    match mutation {
        Mutation::StudentAdded { index } => format!("student_added index={index}"),
        Mutation::ActivityAdded { index } => format!("activity_added index={index}"),
        Mutation::StudentRenamed { index } => format!("student_renamed index={index}"),
        Mutation::ActivityRenamed { index } => format!("activity_renamed index={index}"),
        Mutation::StateToggled {
            student,
            activity,
            state,
        } => format!(
            "state_toggled student={student} activity={activity} state={}",
            state.map_or(0, |state| state.value())
        ),
        Mutation::StudentsRemoved { removed } => {
            format!("students_removed count={}", removed.len())
        }
        Mutation::ActivitiesRemoved {
            removed,
            cleared_states,
        } => format!(
            "activities_removed count={} cleared_states={cleared_states}",
            removed.len()
        ),
    }
}
