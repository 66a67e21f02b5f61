//! Shared-state containers.
//!
//! # Design Decisions
//! - One lock per container, owned by that container only
//! - Reads copy out; no reference escapes the lock

pub mod sync_list;

pub use sync_list::SyncList;
