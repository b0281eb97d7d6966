//! Error types for `todo_store`.
//!
//! Storage failures are split the way callers need to react to them:
//! - [`TodoError::StorageInit`] when the backing resource cannot be opened
//! - [`TodoError::StorageWrite`] when a create/update/delete fails at the I/O layer
//! - read-path failures surface as [`TodoError::Database`], [`TodoError::Io`]
//!   or [`TodoError::Json`]
//!
//! A missing record is never an error at the store boundary; lookups return
//! `Option` and updates report [`crate::storage::UpdateOutcome::NotFound`].

use crate::config::Backend;
use serde::Serialize;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TodoError>;

/// Low-level cause of a storage failure.
#[derive(Debug, Error)]
pub enum StorageFault {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Primary error type.
#[derive(Debug, Error)]
pub enum TodoError {
    /// The backing database file or key-value namespace could not be opened.
    #[error("failed to initialize {backend} store at {location}: {source}")]
    StorageInit {
        backend: Backend,
        location: String,
        #[source]
        source: StorageFault,
    },

    /// A mutation failed at the I/O layer.
    #[error("failed to {op} todo: {source}")]
    StorageWrite {
        op: &'static str,
        #[source]
        source: StorageFault,
    },

    #[error("todo not found: {id}")]
    TodoNotFound { id: i64 },

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TodoError {
    pub(crate) fn init(
        backend: Backend,
        location: impl Into<String>,
        source: impl Into<StorageFault>,
    ) -> Self {
        Self::StorageInit {
            backend,
            location: location.into(),
            source: source.into(),
        }
    }

    pub(crate) fn write(op: &'static str, source: impl Into<StorageFault>) -> Self {
        Self::StorageWrite {
            op,
            source: source.into(),
        }
    }

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::StorageInit { .. } => ErrorCode::StorageInitFailed,
            Self::StorageWrite { .. } => ErrorCode::StorageWriteFailed,
            Self::TodoNotFound { .. } => ErrorCode::TodoNotFound,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::Config(_) | Self::Yaml(_) => ErrorCode::ConfigError,
            Self::Database(_) | Self::Io(_) => ErrorCode::StorageReadFailed,
            Self::Json(_) => ErrorCode::InternalError,
        }
    }

    /// Optional remediation hint shown alongside the message.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::StorageInit { location, .. } => Some(format!(
                "check that {location} is writable, or pick another location with --dir"
            )),
            Self::TodoNotFound { .. } => Some("run `todo list` to see existing ids".to_string()),
            Self::Validation { field, .. } => Some(format!("fix the {field} value and retry")),
            _ => None,
        }
    }
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    StorageInitFailed,
    StorageWriteFailed,
    StorageReadFailed,
    TodoNotFound,
    ValidationFailed,
    ConfigError,
    InternalError,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StorageInitFailed => "STORAGE_INIT_FAILED",
            Self::StorageWriteFailed => "STORAGE_WRITE_FAILED",
            Self::StorageReadFailed => "STORAGE_READ_FAILED",
            Self::TodoNotFound => "TODO_NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Process exit code used by the `todo` binary.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InternalError => 1,
            Self::ValidationFailed | Self::ConfigError => 2,
            Self::TodoNotFound => 3,
            Self::StorageInitFailed | Self::StorageWriteFailed | Self::StorageReadFailed => 4,
        }
    }
}

/// Error envelope printed in JSON mode.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    pub code: ErrorCode,
    pub message: String,
    pub hint: Option<String>,
}

impl From<&TodoError> for StructuredError {
    fn from(err: &TodoError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            hint: err.hint(),
        }
    }
}

impl StructuredError {
    /// Render as `{"error": {...}}`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "error": self })
    }
}
