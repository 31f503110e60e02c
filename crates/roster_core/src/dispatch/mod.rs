//! Gesture/command dispatcher.
//!
//! # Responsibility
//! - `gesture`: recognize taps and long presses from pointer events.
//! - `command`: map UI events to application commands.

pub mod command;
pub mod gesture;
