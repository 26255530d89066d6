//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the bookmark persistence contract the validator runs inside.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must run `BookmarkValidator` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `UniqueViolation`)
//!   in addition to DB transport errors.

pub mod bookmark_repo;
