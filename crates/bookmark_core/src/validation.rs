//! Write-time validation for bookmark candidates.
//!
//! # Responsibility
//! - Decide whether a bookmark candidate may be persisted.
//! - Report every violated rule as a structured, localizable error.
//!
//! # Invariants
//! - Validation failures are returned as data, never as `Err`.
//! - `Err` is reserved for lookup (transport) failures.
//! - All rules are evaluated on every call; nothing short-circuits.
//! - The uniqueness lookup reads current storage state; nothing is cached.

use crate::i18n::{Message, MessageArg, MessageId};
use crate::model::bookmark::{Bookmark, PostId, UserId};
use crate::model::reminder_type::ReminderType;
use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_MAX_REMINDER_YEARS: u32 = 10;

/// What a validation error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorField {
    /// The record as a whole.
    Base,
    ReminderAt,
}

/// One violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: ErrorField,
    pub message: Message,
}

impl ValidationError {
    pub fn base(id: MessageId) -> Self {
        Self {
            field: ErrorField::Base,
            message: Message::new(id),
        }
    }

    pub fn id(&self) -> MessageId {
        self.message.id
    }
}

/// Ordered collection of validation errors for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether any error carries `id`.
    pub fn contains(&self, id: MessageId) -> bool {
        self.0.iter().any(|error| error.id() == id)
    }

    /// Message ids in rule order.
    pub fn ids(&self) -> Vec<MessageId> {
        self.0.iter().map(ValidationError::id).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Converts into `Err(self)` when non-empty.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(value: ValidationError) -> Self {
        Self(vec![value])
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let keys = self
            .0
            .iter()
            .map(|error| error.id().key())
            .collect::<Vec<_>>();
        write!(f, "bookmark validation failed: {}", keys.join(", "))
    }
}

impl Error for ValidationErrors {}

/// Read access to durable bookmark state needed by the uniqueness rule.
pub trait BookmarkLookup {
    type Error;

    fn find_by_user_and_post(
        &self,
        user_id: UserId,
        post_id: PostId,
    ) -> Result<Option<Bookmark>, Self::Error>;
}

/// Accepted horizon for `reminder_at`, in calendar years from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub max_years: u32,
}

impl Default for ReminderWindow {
    fn default() -> Self {
        Self {
            max_years: DEFAULT_MAX_REMINDER_YEARS,
        }
    }
}

impl ReminderWindow {
    /// Latest accepted reminder instant relative to `now`.
    ///
    /// Saturates to the maximum representable instant on overflow.
    pub fn latest(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_months(Months::new(self.max_years.saturating_mul(12)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Applies the bookmark write rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookmarkValidator {
    window: ReminderWindow,
}

impl BookmarkValidator {
    pub fn new(window: ReminderWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> ReminderWindow {
        self.window
    }

    /// Validates `candidate` against `lookup` at instant `now`.
    ///
    /// # Errors
    /// - Returns `Err` only when `lookup` fails; rule violations are in the
    ///   returned collection.
    pub fn validate<L: BookmarkLookup>(
        &self,
        candidate: &Bookmark,
        lookup: &L,
        now: DateTime<Utc>,
    ) -> Result<ValidationErrors, L::Error> {
        let mut errors = ValidationErrors::new();
        check_reminder_time_present(candidate, &mut errors);
        check_unique_per_post(candidate, lookup, &mut errors)?;
        self.check_reminder_window(candidate, now, &mut errors);
        Ok(errors)
    }

    fn check_reminder_window(
        &self,
        candidate: &Bookmark,
        now: DateTime<Utc>,
        errors: &mut ValidationErrors,
    ) {
        let Some(reminder_at) = candidate.reminder_at else {
            return;
        };

        if reminder_at < now {
            errors.push(ValidationError::base(MessageId::CannotSetPastReminder));
        }
        if reminder_at > self.window.latest(now) {
            errors.push(ValidationError::base(
                MessageId::CannotSetReminderInDistantFuture,
            ));
        }
    }
}

fn check_reminder_time_present(candidate: &Bookmark, errors: &mut ValidationErrors) {
    let needs_time = candidate
        .reminder_type
        .is_some_and(ReminderType::requires_time);
    if needs_time && candidate.reminder_at.is_none() {
        errors.push(ValidationError {
            field: ErrorField::ReminderAt,
            message: Message::new(MessageId::TimeMustBeProvided).with_param(
                "reminder_type",
                MessageArg::Key(ReminderType::AtDesktop.label_key()),
            ),
        });
    }
}

fn check_unique_per_post<L: BookmarkLookup>(
    candidate: &Bookmark,
    lookup: &L,
    errors: &mut ValidationErrors,
) -> Result<(), L::Error> {
    let existing = lookup.find_by_user_and_post(candidate.user_id, candidate.post_id)?;
    match existing {
        Some(existing) if existing.id != candidate.id => {
            errors.push(ValidationError::base(MessageId::AlreadyBookmarkedPost));
        }
        _ => {}
    }
    Ok(())
}
