//! Bookmark domain model.
//!
//! # Responsibility
//! - Define the record a user keeps for a discussion post.
//! - Carry optional reminder scheduling fields.
//!
//! # Invariants
//! - `id` is `None` until the persistence layer assigns one.
//! - `user_id`, `post_id` and `topic_id` are weak references owned by other stores.
//! - At most one bookmark exists per `(user_id, post_id)`.

use crate::model::reminder_type::ReminderType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by storage on first insert.
pub type BookmarkId = i64;
pub type UserId = i64;
pub type PostId = i64;
pub type TopicId = i64;

/// A user's saved reference to a post, optionally with a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// `None` for candidates that were never saved.
    pub id: Option<BookmarkId>,
    pub user_id: UserId,
    pub post_id: PostId,
    pub topic_id: TopicId,
    /// Free-form label. Not validated.
    pub name: Option<String>,
    pub reminder_type: Option<ReminderType>,
    /// UTC instant the reminder should fire at.
    pub reminder_at: Option<DateTime<Utc>>,
    /// Written by the reminder dispatcher only.
    pub reminder_last_sent_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Bookmark {
    /// Creates an unsaved bookmark without name or reminder.
    pub fn new(user_id: UserId, post_id: PostId, topic_id: TopicId) -> Self {
        Self {
            id: None,
            user_id,
            post_id,
            topic_id,
            name: None,
            reminder_type: None,
            reminder_at: None,
            reminder_last_sent_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets reminder type and time together.
    ///
    /// This does not validate the pair; see `BookmarkValidator`.
    pub fn with_reminder(
        mut self,
        reminder_type: ReminderType,
        reminder_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.reminder_type = Some(reminder_type);
        self.reminder_at = reminder_at;
        self
    }

    /// Returns whether storage has assigned an identifier.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Returns whether a scheduled reminder has not been delivered yet.
    ///
    /// A reminder counts as delivered when `reminder_last_sent_at` is at or
    /// after `reminder_at`.
    pub fn has_pending_reminder(&self) -> bool {
        match (self.reminder_at, self.reminder_last_sent_at) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(at), Some(sent)) => sent < at,
        }
    }
}
