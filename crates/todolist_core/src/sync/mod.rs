//! One-way sync from the remote demo API into the local task store.
//!
//! # Responsibility
//! - Describe the remote wire records and the source that fetches them.
//! - Drive fetch-then-merge as one sync pass.
//!
//! # Invariants
//! - Sync never pushes local changes to the remote side.
//! - Remote records are matched to local tasks by `server_id` only.

pub mod remote;
pub mod synchronizer;
