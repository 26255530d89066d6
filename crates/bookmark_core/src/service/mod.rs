//! Bookmark use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Translate storage-level duplicate failures into user-facing validation errors.

pub mod bookmark_service;
