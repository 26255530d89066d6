//! Bookmark repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the persistence layer bookmarks are saved through.
//! - Run `BookmarkValidator` before every `save` write.
//! - Translate storage constraint failures into semantic errors.
//!
//! # Invariants
//! - `save` validates and writes inside one immediate transaction.
//! - The unique `(user_id, post_id)` index is the final arbiter of duplicates;
//!   a violation surfaces as `RepoError::UniqueViolation`.
//! - Read paths reject unknown `reminder_type` codes instead of masking them.
//! - `mark_reminder_sent` is a targeted column write and skips model validation.

use crate::clock::{Clock, SystemClock};
use crate::db::DbError;
use crate::model::bookmark::{Bookmark, BookmarkId, PostId, UserId};
use crate::model::reminder_type::ReminderType;
use crate::validation::{BookmarkLookup, BookmarkValidator, ReminderWindow, ValidationErrors};
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, error, info, warn};
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Row};
use rusqlite::{Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const BOOKMARK_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    post_id,
    topic_id,
    name,
    reminder_type,
    reminder_at,
    reminder_last_sent_at,
    created_at,
    updated_at
FROM bookmarks";

const UNIQUE_FAILED_PREFIX: &str = "UNIQUE constraint failed:";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for bookmark persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Candidate failed write-time rules. Nothing was written.
    Validation(ValidationErrors),
    /// A unique index rejected the write. Columns are unqualified names.
    UniqueViolation { columns: Vec<String> },
    /// A referenced user, topic or post row does not exist.
    ForeignKeyViolation,
    NotFound(BookmarkId),
    InvalidData(String),
    Db(DbError),
}

impl RepoError {
    /// Returns whether this is the `(user_id, post_id)` uniqueness backstop.
    pub fn is_duplicate_bookmark(&self) -> bool {
        match self {
            Self::UniqueViolation { columns } => columns == &["user_id", "post_id"],
            _ => false,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UniqueViolation { columns } => {
                write!(f, "unique constraint violated on ({})", columns.join(", "))
            }
            Self::ForeignKeyViolation => {
                write!(f, "bookmark references a missing user, topic or post")
            }
            Self::NotFound(id) => write!(f, "bookmark not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted bookmark data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for RepoError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for bookmarks.
pub trait BookmarkRepository {
    /// Reads the bookmark for `(user_id, post_id)` from current storage state.
    fn find_by_user_and_post(&self, user_id: UserId, post_id: PostId)
        -> RepoResult<Option<Bookmark>>;
    fn get_bookmark(&self, id: BookmarkId) -> RepoResult<Option<Bookmark>>;
    /// Validates then inserts (`id == None`) or updates the candidate.
    ///
    /// Returns the stored record as read back from storage.
    fn save(&self, candidate: &Bookmark) -> RepoResult<Bookmark>;
    /// Hard-deletes one bookmark.
    fn delete_bookmark(&self, id: BookmarkId) -> RepoResult<()>;
    /// Lists a user's bookmarks, most recently updated first.
    fn list_user_bookmarks(&self, user_id: UserId) -> RepoResult<Vec<Bookmark>>;
    /// Records reminder delivery. Used by the external dispatcher.
    fn mark_reminder_sent(&self, id: BookmarkId, sent_at: DateTime<Utc>) -> RepoResult<()>;
    /// Counts bookmarks whose reminder has not been delivered yet.
    fn count_pending_reminders(&self) -> RepoResult<u64>;
}

/// SQLite-backed bookmark repository.
pub struct SqliteBookmarkRepository<'conn, C: Clock = SystemClock> {
    conn: &'conn Connection,
    clock: C,
    validator: BookmarkValidator,
}

impl<'conn> SqliteBookmarkRepository<'conn> {
    /// Constructs a repository over a migrated connection using wall-clock time.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_clock(conn, SystemClock)
    }
}

impl<'conn, C: Clock> SqliteBookmarkRepository<'conn, C> {
    pub fn with_clock(conn: &'conn Connection, clock: C) -> Self {
        Self {
            conn,
            clock,
            validator: BookmarkValidator::default(),
        }
    }

    /// Replaces the accepted reminder horizon.
    pub fn with_window(mut self, window: ReminderWindow) -> Self {
        self.validator = BookmarkValidator::new(window);
        self
    }

    fn insert_row(&self, candidate: &Bookmark, now: DateTime<Utc>) -> RepoResult<BookmarkId> {
        let now_ms = now.timestamp_millis();
        self.conn
            .execute(
                "INSERT INTO bookmarks (
                    user_id,
                    post_id,
                    topic_id,
                    name,
                    reminder_type,
                    reminder_at,
                    reminder_last_sent_at,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8);",
                params![
                    candidate.user_id,
                    candidate.post_id,
                    candidate.topic_id,
                    candidate.name.as_deref(),
                    candidate.reminder_type.map(ReminderType::code),
                    candidate.reminder_at.map(|at| at.timestamp_millis()),
                    candidate.reminder_last_sent_at.map(|at| at.timestamp_millis()),
                    now_ms,
                ],
            )
            .map_err(map_write_error)?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_row(
        &self,
        id: BookmarkId,
        candidate: &Bookmark,
        now: DateTime<Utc>,
    ) -> RepoResult<BookmarkId> {
        let changed = self
            .conn
            .execute(
                "UPDATE bookmarks
                 SET
                    user_id = ?2,
                    post_id = ?3,
                    topic_id = ?4,
                    name = ?5,
                    reminder_type = ?6,
                    reminder_at = ?7,
                    reminder_last_sent_at = ?8,
                    updated_at = ?9
                 WHERE id = ?1;",
                params![
                    id,
                    candidate.user_id,
                    candidate.post_id,
                    candidate.topic_id,
                    candidate.name.as_deref(),
                    candidate.reminder_type.map(ReminderType::code),
                    candidate.reminder_at.map(|at| at.timestamp_millis()),
                    candidate.reminder_last_sent_at.map(|at| at.timestamp_millis()),
                    now.timestamp_millis(),
                ],
            )
            .map_err(map_write_error)?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(id)
    }

    fn write_validated(&self, candidate: &Bookmark) -> RepoResult<Bookmark> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let now = self.clock.now();

        self.validator
            .validate(candidate, &RepoLookup(self), now)?
            .into_result()?;

        let id = match candidate.id {
            None => self.insert_row(candidate, now)?,
            Some(id) => self.update_row(id, candidate, now)?,
        };
        let saved = self.get_bookmark(id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(saved)
    }
}

/// Routes validator lookups through a repository.
struct RepoLookup<'r, R>(&'r R);

impl<R: BookmarkRepository> BookmarkLookup for RepoLookup<'_, R> {
    type Error = RepoError;

    fn find_by_user_and_post(
        &self,
        user_id: UserId,
        post_id: PostId,
    ) -> RepoResult<Option<Bookmark>> {
        self.0.find_by_user_and_post(user_id, post_id)
    }
}

impl<C: Clock> BookmarkRepository for SqliteBookmarkRepository<'_, C> {
    fn find_by_user_and_post(
        &self,
        user_id: UserId,
        post_id: PostId,
    ) -> RepoResult<Option<Bookmark>> {
        let row = self
            .conn
            .query_row(
                &format!("{BOOKMARK_SELECT_SQL} WHERE user_id = ?1 AND post_id = ?2;"),
                params![user_id, post_id],
                |row| Ok(parse_bookmark_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn get_bookmark(&self, id: BookmarkId) -> RepoResult<Option<Bookmark>> {
        let row = self
            .conn
            .query_row(
                &format!("{BOOKMARK_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_bookmark_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn save(&self, candidate: &Bookmark) -> RepoResult<Bookmark> {
        let started_at = Instant::now();
        let op = if candidate.is_persisted() {
            "update"
        } else {
            "insert"
        };

        match self.write_validated(candidate) {
            Ok(saved) => {
                info!(
                    "event=bookmark_save module=repo status=ok op={op} bookmark_id={} duration_ms={}",
                    saved.id.unwrap_or_default(),
                    started_at.elapsed().as_millis()
                );
                Ok(saved)
            }
            Err(RepoError::Validation(errors)) => {
                warn!(
                    "event=bookmark_save module=repo status=rejected op={op} user_id={} post_id={} errors={}",
                    candidate.user_id,
                    candidate.post_id,
                    errors
                        .ids()
                        .iter()
                        .map(|id| id.key())
                        .collect::<Vec<_>>()
                        .join(",")
                );
                Err(RepoError::Validation(errors))
            }
            Err(err) => {
                error!(
                    "event=bookmark_save module=repo status=error op={op} user_id={} post_id={} duration_ms={} error={err}",
                    candidate.user_id,
                    candidate.post_id,
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    fn delete_bookmark(&self, id: BookmarkId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        debug!("event=bookmark_delete module=repo status=ok bookmark_id={id}");
        Ok(())
    }

    fn list_user_bookmarks(&self, user_id: UserId) -> RepoResult<Vec<Bookmark>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOOKMARK_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY updated_at DESC, id DESC;"
        ))?;

        let mut rows = stmt.query([user_id])?;
        let mut bookmarks = Vec::new();
        while let Some(row) = rows.next()? {
            bookmarks.push(parse_bookmark_row(row)?);
        }
        Ok(bookmarks)
    }

    fn mark_reminder_sent(&self, id: BookmarkId, sent_at: DateTime<Utc>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE bookmarks
             SET
                reminder_last_sent_at = ?2,
                updated_at = ?3
             WHERE id = ?1;",
            params![
                id,
                sent_at.timestamp_millis(),
                self.clock.now().timestamp_millis()
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn count_pending_reminders(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM bookmarks
             WHERE reminder_at IS NOT NULL
               AND (reminder_last_sent_at IS NULL OR reminder_last_sent_at < reminder_at);",
            [],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative bookmark count `{count}`")))
    }
}

fn parse_bookmark_row(row: &Row<'_>) -> RepoResult<Bookmark> {
    let reminder_type = match row.get::<_, Option<i64>>("reminder_type")? {
        Some(code) => Some(ReminderType::from_code(code).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid reminder type `{code}` in bookmarks.reminder_type"
            ))
        })?),
        None => None,
    };

    Ok(Bookmark {
        id: Some(row.get("id")?),
        user_id: row.get("user_id")?,
        post_id: row.get("post_id")?,
        topic_id: row.get("topic_id")?,
        name: row.get("name")?,
        reminder_type,
        reminder_at: optional_timestamp(row, "reminder_at")?,
        reminder_last_sent_at: optional_timestamp(row, "reminder_last_sent_at")?,
        created_at: Some(timestamp(row, "created_at")?),
        updated_at: Some(timestamp(row, "updated_at")?),
    })
}

fn optional_timestamp(row: &Row<'_>, column: &str) -> RepoResult<Option<DateTime<Utc>>> {
    row.get::<_, Option<i64>>(column)?
        .map(|millis| millis_to_datetime(millis, column))
        .transpose()
}

fn timestamp(row: &Row<'_>, column: &str) -> RepoResult<DateTime<Utc>> {
    let millis: i64 = row.get(column)?;
    millis_to_datetime(millis, column)
}

fn millis_to_datetime(millis: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
        RepoError::InvalidData(format!(
            "timestamp `{millis}` out of range in bookmarks.{column}"
        ))
    })
}

fn map_write_error(err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            {
                return RepoError::UniqueViolation {
                    columns: message
                        .as_deref()
                        .map(unique_violation_columns)
                        .unwrap_or_default(),
                };
            }
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                return RepoError::ForeignKeyViolation;
            }
        }
    }
    err.into()
}

/// Parses `UNIQUE constraint failed: bookmarks.user_id, bookmarks.post_id`.
fn unique_violation_columns(message: &str) -> Vec<String> {
    let Some(columns) = message.strip_prefix(UNIQUE_FAILED_PREFIX) else {
        return Vec::new();
    };
    columns
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(|column| {
            column
                .rsplit_once('.')
                .map_or(column, |(_, name)| name)
                .to_string()
        })
        .collect()
}
