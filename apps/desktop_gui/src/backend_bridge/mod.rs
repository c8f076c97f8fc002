//! Bridge between the egui thread and the registry worker thread.

pub mod commands;
pub mod runtime;
