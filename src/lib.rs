//! `todo_store` - local persistence for a personal todo list
//!
//! One record type ([`model::Todo`]) behind one contract
//! ([`storage::TodoStore`]) with two interchangeable backends:
//! a `SQLite` file with indexed columns, and a JSON collection in a flat
//! key-value directory. The `todo` binary picks one from configuration.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Todo, NewTodo, TodoPatch, TodoQuery)
//! - [`storage`] - The store trait and both backends
//! - [`config`] - Layered configuration and backend selection
//! - [`error`] - Error types and handling
//! - [`format`] - Output formatting (text, JSON)
//! - [`logging`] - Tracing subscriber setup
//! - [`validation`] - Caller-side input checks
//! - [`util`] - Timestamp helpers

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod storage;
pub mod util;
pub mod validation;

pub use config::{Backend, StoreConfig};
pub use error::{ErrorCode, Result, StructuredError, TodoError};
pub use model::{NewTodo, Priority, StatusFilter, Todo, TodoPatch, TodoQuery, TodoStats};
pub use storage::{FlatStore, SqliteStore, TodoStore, UpdateOutcome, open_store};
