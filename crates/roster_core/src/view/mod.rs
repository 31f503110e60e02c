//! View renderer and the abstract rendering sink.
//!
//! # Responsibility
//! - Project roster + controller state into display lists (`render`).
//! - Order student names the way a reader expects (`collation`).
//! - Define what the core needs from a presentation layer (`sink`).

pub mod collation;
pub mod render;
pub mod sink;

/// One of the two view containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewId {
    /// Student grid.
    Main,
    /// Activity list of one student.
    Student,
}

/// What the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Main,
    /// Viewing the student at this original index.
    Student(usize),
}
