//! Core domain logic for post bookmarks.
//! This crate owns the bookmark record, its write-time rules and its storage.

pub mod clock;
pub mod db;
pub mod i18n;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use i18n::{EnglishCatalog, Message, MessageArg, MessageCatalog, MessageId};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::bookmark::{Bookmark, BookmarkId, PostId, TopicId, UserId};
pub use model::reminder_type::ReminderType;
pub use repo::bookmark_repo::{BookmarkRepository, RepoError, RepoResult, SqliteBookmarkRepository};
pub use service::bookmark_service::{
    BookmarkService, BookmarkServiceError, CreateBookmarkRequest, ServiceResult,
};
pub use validation::{
    BookmarkLookup, BookmarkValidator, ErrorField, ReminderWindow, ValidationError,
    ValidationErrors,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
