//! Reminder type enumeration.
//!
//! # Responsibility
//! - Define the closed set of reminder strategies a bookmark can carry.
//! - Own the integer codes persisted in `bookmarks.reminder_type`.
//!
//! # Invariants
//! - Codes are stable and never renumbered; new variants take the next unused code.
//! - Only `AtDesktop` may be stored without a `reminder_at` time.

use serde::{Deserialize, Serialize};

/// Strategy describing when a bookmark reminder should fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    /// Fire next time the user is active on a desktop client.
    AtDesktop = 0,
    LaterToday = 1,
    NextBusinessDay = 2,
    Tomorrow = 3,
    NextWeek = 4,
    NextMonth = 5,
    /// Caller-chosen `reminder_at`.
    Custom = 6,
}

impl ReminderType {
    /// All variants ordered by persisted code.
    pub const ALL: [ReminderType; 7] = [
        Self::AtDesktop,
        Self::LaterToday,
        Self::NextBusinessDay,
        Self::Tomorrow,
        Self::NextWeek,
        Self::NextMonth,
        Self::Custom,
    ];

    /// Returns the persisted integer code.
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Resolves a persisted integer code. Unknown codes return `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Returns the symbolic snake_case name.
    pub fn key(self) -> &'static str {
        match self {
            Self::AtDesktop => "at_desktop",
            Self::LaterToday => "later_today",
            Self::NextBusinessDay => "next_business_day",
            Self::Tomorrow => "tomorrow",
            Self::NextWeek => "next_week",
            Self::NextMonth => "next_month",
            Self::Custom => "custom",
        }
    }

    /// Returns the localization key of the human-readable label.
    pub fn label_key(self) -> &'static str {
        match self {
            Self::AtDesktop => "bookmarks.reminders.at_desktop",
            Self::LaterToday => "bookmarks.reminders.later_today",
            Self::NextBusinessDay => "bookmarks.reminders.next_business_day",
            Self::Tomorrow => "bookmarks.reminders.tomorrow",
            Self::NextWeek => "bookmarks.reminders.next_week",
            Self::NextMonth => "bookmarks.reminders.next_month",
            Self::Custom => "bookmarks.reminders.custom",
        }
    }

    /// Whether this reminder type needs an explicit `reminder_at`.
    pub fn requires_time(self) -> bool {
        self != Self::AtDesktop
    }
}
