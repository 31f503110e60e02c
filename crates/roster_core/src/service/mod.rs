//! Core use-case services.
//!
//! # Responsibility
//! - Pair roster mutations with persistence.
//! - Keep controllers and the application context free of storage details.

pub mod roster_service;
