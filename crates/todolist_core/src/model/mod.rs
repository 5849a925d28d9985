//! Domain model for the to-do list.
//!
//! # Responsibility
//! - Define the task record and its validation rules.
//! - Keep display text helpers next to the data they render.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Tasks imported from the remote API keep their remote id in `server_id`.

pub mod plural;
pub mod task;
