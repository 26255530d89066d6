//! Domain model for bookmarks.
//!
//! # Responsibility
//! - Define the persisted bookmark record and its reminder enumeration.
//!
//! # Invariants
//! - Model types hold data only; write-time rules live in `validation`.

pub mod bookmark;
pub mod reminder_type;
