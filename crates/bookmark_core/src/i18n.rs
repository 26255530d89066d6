//! Localization contract for bookmark messages.
//!
//! # Responsibility
//! - Identify user-facing messages by stable key plus named parameters.
//! - Provide a default English catalog with `%{name}` interpolation.
//!
//! # Invariants
//! - Validation code only ever builds `Message` values; rendering happens at the edge.
//! - Unknown keys render as the key itself rather than failing.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%\{([a-z_]+)\}").expect("valid placeholder regex"));

/// Message identities emitted by bookmark validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageId {
    /// Parameterized by `reminder_type`, the label of the at-desktop type.
    TimeMustBeProvided,
    AlreadyBookmarkedPost,
    CannotSetPastReminder,
    CannotSetReminderInDistantFuture,
}

impl MessageId {
    pub fn key(self) -> &'static str {
        match self {
            Self::TimeMustBeProvided => "bookmarks.errors.time_must_be_provided",
            Self::AlreadyBookmarkedPost => "bookmarks.errors.already_bookmarked_post",
            Self::CannotSetPastReminder => "bookmarks.errors.cannot_set_past_reminder",
            Self::CannotSetReminderInDistantFuture => {
                "bookmarks.errors.cannot_set_reminder_in_distant_future"
            }
        }
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Value bound to a named message parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MessageArg {
    /// Inserted verbatim.
    Text(String),
    /// Another catalog key, rendered before interpolation.
    Key(&'static str),
}

/// A localizable message: identity plus parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub params: Vec<(&'static str, MessageArg)>,
}

impl Message {
    pub fn new(id: MessageId) -> Self {
        Self {
            id,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: &'static str, value: MessageArg) -> Self {
        self.params.push((name, value));
        self
    }

    /// Looks up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&MessageArg> {
        self.params
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| value)
    }
}

/// Renders messages into display text.
pub trait MessageCatalog {
    /// Returns the raw template for `key`, if the catalog knows it.
    fn template(&self, key: &str) -> Option<&str>;

    /// Renders one message, resolving nested keys and placeholders.
    fn render(&self, message: &Message) -> String {
        let template = self.template(message.id.key()).unwrap_or(message.id.key());
        let params = message
            .params
            .iter()
            .map(|(name, arg)| (*name, self.render_arg(arg)))
            .collect::<HashMap<_, _>>();
        interpolate(template, &params)
    }

    /// Renders a parameter value. Keys resolve through `template` one level deep.
    fn render_arg(&self, arg: &MessageArg) -> String {
        match arg {
            MessageArg::Text(text) => text.clone(),
            MessageArg::Key(key) => self.template(key).unwrap_or(*key).to_string(),
        }
    }
}

/// Built-in English strings.
#[derive(Debug, Clone)]
pub struct EnglishCatalog {
    entries: HashMap<&'static str, String>,
}

impl Default for EnglishCatalog {
    fn default() -> Self {
        let entries = [
            (
                "bookmarks.errors.time_must_be_provided",
                "time must be provided for all reminders except '%{reminder_type}'",
            ),
            (
                "bookmarks.errors.already_bookmarked_post",
                "You cannot bookmark the same post twice.",
            ),
            (
                "bookmarks.errors.cannot_set_past_reminder",
                "You cannot set a bookmark reminder in the past.",
            ),
            (
                "bookmarks.errors.cannot_set_reminder_in_distant_future",
                "You cannot set a bookmark reminder more than 10 years in the future.",
            ),
            (
                "bookmarks.reminders.at_desktop",
                "Next time I'm at my desktop",
            ),
            ("bookmarks.reminders.later_today", "Later today"),
            ("bookmarks.reminders.next_business_day", "Next business day"),
            ("bookmarks.reminders.tomorrow", "Tomorrow"),
            ("bookmarks.reminders.next_week", "Next week"),
            ("bookmarks.reminders.next_month", "Next month"),
            ("bookmarks.reminders.custom", "Custom date and time"),
        ]
        .into_iter()
        .map(|(key, text)| (key, text.to_string()))
        .collect();

        Self { entries }
    }
}

impl EnglishCatalog {
    /// Overrides or adds one template.
    pub fn insert(&mut self, key: &'static str, template: impl Into<String>) {
        self.entries.insert(key, template.into());
    }
}

impl MessageCatalog for EnglishCatalog {
    fn template(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Replaces `%{name}` placeholders. Unbound placeholders are left as-is.
fn interpolate(template: &str, params: &HashMap<&str, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
