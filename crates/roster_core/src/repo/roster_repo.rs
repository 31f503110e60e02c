//! Roster record persistence over a key-value repository.
//!
//! # Responsibility
//! - Store the `students` and `activities` sequences as two JSON records.
//! - Decode stored records without guessing: malformed data is an error.
//!
//! # Invariants
//! - Absent records load as empty sequences.
//! - Both records are written together or not at all.

use crate::model::activity::Activity;
use crate::model::student::Student;
use crate::repo::kv_repo::{KeyValueRepository, RepoError, RepoResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Storage key of the student sequence.
pub const STUDENTS_KEY: &str = "students";
/// Storage key of the activity sequence.
pub const ACTIVITIES_KEY: &str = "activities";

/// Raw persisted roster, before invariant repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSnapshot {
    pub students: Vec<Student>,
    pub activities: Vec<Activity>,
}

/// Repository interface for whole-roster load/save.
pub trait RosterRepository {
    fn load(&self) -> RepoResult<RosterSnapshot>;
    fn save(&self, students: &[Student], activities: &[Activity]) -> RepoResult<()>;
}

/// Roster repository storing JSON records in a key-value repository.
pub struct KvRosterRepository<K: KeyValueRepository> {
    kv: K,
}

impl<K: KeyValueRepository> KvRosterRepository<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Underlying key-value repository.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    fn read_record<T: DeserializeOwned>(&self, key: &str) -> RepoResult<Vec<T>> {
        match self.kv.get(key)? {
            Some(json) => serde_json::from_str(&json).map_err(|source| RepoError::Serialization {
                key: key.to_string(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }
}

impl<K: KeyValueRepository> RosterRepository for KvRosterRepository<K> {
    fn load(&self) -> RepoResult<RosterSnapshot> {
        Ok(RosterSnapshot {
            students: self.read_record(STUDENTS_KEY)?,
            activities: self.read_record(ACTIVITIES_KEY)?,
        })
    }

    fn save(&self, students: &[Student], activities: &[Activity]) -> RepoResult<()> {
        let students_json = encode_record(STUDENTS_KEY, students)?;
        let activities_json = encode_record(ACTIVITIES_KEY, activities)?;
        self.kv.set_many(&[
            (STUDENTS_KEY, students_json.as_str()),
            (ACTIVITIES_KEY, activities_json.as_str()),
        ])
    }
}

fn encode_record<T: Serialize>(key: &str, items: &[T]) -> RepoResult<String> {
    serde_json::to_string(items).map_err(|source| RepoError::Serialization {
        key: key.to_string(),
        source,
    })
}
