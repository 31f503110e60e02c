//! Interaction controllers sitting between the dispatcher and the model.

pub mod selection;
