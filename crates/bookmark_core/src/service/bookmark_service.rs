//! Bookmark use-case service.
//!
//! # Responsibility
//! - Provide create/edit/delete/list entry points for bookmark callers.
//! - Delegate validation and persistence to repository implementations.
//! - Map the storage uniqueness backstop onto the same error users see from
//!   the application-level duplicate check.
//!
//! # Invariants
//! - Service APIs never bypass repository `save`.
//! - A duplicate `(user_id, post_id)` always surfaces as
//!   `MessageId::AlreadyBookmarkedPost`, whichever layer caught it.

use crate::i18n::MessageId;
use crate::model::bookmark::{Bookmark, BookmarkId, PostId, TopicId, UserId};
use crate::model::reminder_type::ReminderType;
use crate::repo::bookmark_repo::{BookmarkRepository, RepoError};
use crate::validation::{ValidationError, ValidationErrors};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for bookmark use-cases.
#[derive(Debug)]
pub enum BookmarkServiceError {
    /// User-correctable rule violations.
    Invalid(ValidationErrors),
    /// Target bookmark does not exist.
    NotFound(BookmarkId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl BookmarkServiceError {
    /// Returns validation errors when this is a user-correctable failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

impl Display for BookmarkServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "{errors}"),
            Self::NotFound(id) => write!(f, "bookmark not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BookmarkServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for BookmarkServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(errors) => Self::Invalid(errors),
            RepoError::NotFound(id) => Self::NotFound(id),
            err if err.is_duplicate_bookmark() => Self::Invalid(
                ValidationError::base(MessageId::AlreadyBookmarkedPost).into(),
            ),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, BookmarkServiceError>;

/// Request model for bookmarking a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookmarkRequest {
    pub user_id: UserId,
    pub post_id: PostId,
    pub topic_id: TopicId,
    pub name: Option<String>,
    pub reminder_type: Option<ReminderType>,
    pub reminder_at: Option<DateTime<Utc>>,
}

impl CreateBookmarkRequest {
    /// Plain bookmark without name or reminder.
    pub fn new(user_id: UserId, post_id: PostId, topic_id: TopicId) -> Self {
        Self {
            user_id,
            post_id,
            topic_id,
            name: None,
            reminder_type: None,
            reminder_at: None,
        }
    }
}

/// Bookmark service facade over repository implementations.
pub struct BookmarkService<R: BookmarkRepository> {
    repo: R,
}

impl<R: BookmarkRepository> BookmarkService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Bookmarks a post for a user.
    pub fn create_bookmark(&self, request: CreateBookmarkRequest) -> ServiceResult<Bookmark> {
        let mut candidate = Bookmark::new(request.user_id, request.post_id, request.topic_id);
        candidate.name = request.name;
        candidate.reminder_type = request.reminder_type;
        candidate.reminder_at = request.reminder_at;
        Ok(self.repo.save(&candidate)?)
    }

    /// Replaces reminder type and time of an existing bookmark.
    ///
    /// Passing `None` for both clears the reminder.
    pub fn update_reminder(
        &self,
        id: BookmarkId,
        reminder_type: Option<ReminderType>,
        reminder_at: Option<DateTime<Utc>>,
    ) -> ServiceResult<Bookmark> {
        let mut bookmark = self.load(id)?;
        bookmark.reminder_type = reminder_type;
        bookmark.reminder_at = reminder_at;
        Ok(self.repo.save(&bookmark)?)
    }

    /// Sets or clears the bookmark label.
    pub fn rename_bookmark(&self, id: BookmarkId, name: Option<String>) -> ServiceResult<Bookmark> {
        let mut bookmark = self.load(id)?;
        bookmark.name = name;
        Ok(self.repo.save(&bookmark)?)
    }

    pub fn delete_bookmark(&self, id: BookmarkId) -> ServiceResult<()> {
        Ok(self.repo.delete_bookmark(id)?)
    }

    pub fn get_bookmark(&self, id: BookmarkId) -> ServiceResult<Option<Bookmark>> {
        Ok(self.repo.get_bookmark(id)?)
    }

    /// Lists a user's bookmarks, most recently updated first.
    pub fn list_user_bookmarks(&self, user_id: UserId) -> ServiceResult<Vec<Bookmark>> {
        Ok(self.repo.list_user_bookmarks(user_id)?)
    }

    fn load(&self, id: BookmarkId) -> ServiceResult<Bookmark> {
        self.repo
            .get_bookmark(id)?
            .ok_or(BookmarkServiceError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::{BookmarkService, BookmarkServiceError, CreateBookmarkRequest};
    use crate::i18n::MessageId;
    use crate::model::bookmark::{Bookmark, BookmarkId, PostId, UserId};
    use crate::repo::bookmark_repo::{BookmarkRepository, RepoError, RepoResult};
    use chrono::{DateTime, Utc};

    /// Repository whose writes always hit the unique index, as a losing
    /// concurrent writer would after passing validation.
    struct RacingRepo;

    impl BookmarkRepository for RacingRepo {
        fn find_by_user_and_post(
            &self,
            _user_id: UserId,
            _post_id: PostId,
        ) -> RepoResult<Option<Bookmark>> {
            Ok(None)
        }

        fn get_bookmark(&self, _id: BookmarkId) -> RepoResult<Option<Bookmark>> {
            Ok(None)
        }

        fn save(&self, _candidate: &Bookmark) -> RepoResult<Bookmark> {
            Err(RepoError::UniqueViolation {
                columns: vec!["user_id".to_string(), "post_id".to_string()],
            })
        }

        fn delete_bookmark(&self, id: BookmarkId) -> RepoResult<()> {
            Err(RepoError::NotFound(id))
        }

        fn list_user_bookmarks(&self, _user_id: UserId) -> RepoResult<Vec<Bookmark>> {
            Ok(Vec::new())
        }

        fn mark_reminder_sent(&self, id: BookmarkId, _sent_at: DateTime<Utc>) -> RepoResult<()> {
            Err(RepoError::NotFound(id))
        }

        fn count_pending_reminders(&self) -> RepoResult<u64> {
            Ok(0)
        }
    }

    #[test]
    fn unique_violation_is_reported_as_already_bookmarked() {
        let service = BookmarkService::new(RacingRepo);
        let err = service
            .create_bookmark(CreateBookmarkRequest::new(1, 5, 9))
            .unwrap_err();

        let errors = err.validation_errors().expect("duplicate should be user-facing");
        assert_eq!(errors.ids(), vec![MessageId::AlreadyBookmarkedPost]);
    }

    #[test]
    fn other_unique_violations_stay_repository_errors() {
        let err = BookmarkServiceError::from(RepoError::UniqueViolation {
            columns: vec!["id".to_string()],
        });
        assert!(matches!(err, BookmarkServiceError::Repo(_)));
    }

    #[test]
    fn edits_of_missing_bookmarks_are_not_found() {
        let service = BookmarkService::new(RacingRepo);
        let err = service.rename_bookmark(42, Some("x".to_string())).unwrap_err();
        assert!(matches!(err, BookmarkServiceError::NotFound(42)));

        let err = service.delete_bookmark(43).unwrap_err();
        assert!(matches!(err, BookmarkServiceError::NotFound(43)));
    }
}
