//! Persistent store for the roster.
//!
//! # Responsibility
//! - `kv_repo`: durable get/set by string key.
//! - `roster_repo`: the `students` and `activities` records on top of it.
//!
//! # Invariants
//! - Repositories return transport and decoding errors unchanged; they never
//!   substitute an empty roster for unreadable data.

pub mod kv_repo;
pub mod roster_repo;
