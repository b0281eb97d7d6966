//! Data types for todo records.
//!
//! - [`Todo`] - a stored record
//! - [`NewTodo`] - creation input (everything the store does not assign)
//! - [`TodoPatch`] - partial update, every field optional
//! - [`TodoQuery`] - combined category / search / status filter
//! - [`Priority`] - `low`, `medium`, `high`

use crate::error::{Result, TodoError};
use crate::util::time::{rfc3339, rfc3339_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category used when none is given.
pub const DEFAULT_CATEGORY: &str = "General";

/// Task priority. Ordered `Low < Medium < High`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[value(alias = "l")]
    Low,
    #[default]
    #[value(aliases = ["m", "med"])]
    Medium,
    #[value(alias = "h")]
    High,
}

impl Priority {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Numeric rank used for sorting; higher sorts first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Ok(Self::Low),
            "medium" | "med" | "m" => Ok(Self::Medium),
            "high" | "h" => Ok(Self::High),
            other => Err(TodoError::validation(
                "priority",
                format!("'{other}' is not one of low, medium, high"),
            )),
        }
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// A stored todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "rfc3339_option")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339")]
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Build a record from creation input plus store-assigned fields.
    #[must_use]
    pub fn from_new(id: i64, new: &NewTodo, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title.clone(),
            description: new.description.clone(),
            category: new.category_or_default().to_string(),
            priority: new.priority,
            due_date: new.due_date,
            completed: new.completed,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Creation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "rfc3339_option")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
}

impl NewTodo {
    /// New input with defaults: empty description, `General`, medium, no due date.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: default_category(),
            priority: Priority::default(),
            due_date: None,
            completed: false,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub const fn due(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = due_date;
        self
    }

    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Category to persist; blank means the default.
    #[must_use]
    pub fn category_or_default(&self) -> &str {
        if self.category.trim().is_empty() {
            DEFAULT_CATEGORY
        } else {
            &self.category
        }
    }
}

/// Partial update.
///
/// `None` leaves a field alone. `due_date` is doubly optional so that
/// `Some(None)` clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.completed.is_none()
    }

    /// Patch that only sets `completed`.
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Category value to persist, with blank mapped to the default.
    #[must_use]
    pub fn category_or_default(&self) -> Option<&str> {
        self.category.as_deref().map(|c| {
            if c.trim().is_empty() {
                DEFAULT_CATEGORY
            } else {
                c
            }
        })
    }

    /// Apply present fields to `todo` and stamp `updated_at`.
    ///
    /// Returns `false` (and touches nothing) for an empty patch.
    pub fn apply_to(&self, todo: &mut Todo, now: DateTime<Utc>) -> bool {
        if self.is_empty() {
            return false;
        }
        if let Some(ref title) = self.title {
            todo.title.clone_from(title);
        }
        if let Some(ref description) = self.description {
            todo.description.clone_from(description);
        }
        if let Some(category) = self.category_or_default() {
            todo.category = category.to_string();
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = due_date;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        todo.updated_at = now.max(todo.updated_at);
        true
    }
}

/// Completion filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    #[must_use]
    pub const fn accepts(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Active => !completed,
            Self::Completed => completed,
        }
    }

    /// Required value of the `completed` column, if any.
    #[must_use]
    pub const fn completed_value(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Active => Some(false),
            Self::Completed => Some(true),
        }
    }
}

/// Combined listing filter. All present conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoQuery {
    /// Exact, case-sensitive category match.
    pub category: Option<String>,
    /// ASCII-case-insensitive substring of title or description.
    pub search: Option<String>,
    pub status: StatusFilter,
}

impl TodoQuery {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn in_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matching(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, todo: &Todo) -> bool {
        if let Some(ref category) = self.category {
            if todo.category != *category {
                return false;
            }
        }
        if !self.status.accepts(todo.completed) {
            return false;
        }
        match self.search.as_deref() {
            Some(needle) => {
                contains_ignore_ascii_case(&todo.title, needle)
                    || contains_ignore_ascii_case(&todo.description, needle)
            }
            None => true,
        }
    }
}

/// Substring test with ASCII-only case folding, matching SQLite `LIKE`.
#[must_use]
pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// Completion counts for a set of todos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
}

impl TodoStats {
    #[must_use]
    pub fn from_todos<'a>(todos: impl IntoIterator<Item = &'a Todo>) -> Self {
        let mut stats = Self::default();
        for todo in todos {
            stats.total += 1;
            if todo.completed {
                stats.completed += 1;
            } else {
                stats.active += 1;
            }
        }
        stats
    }
}
