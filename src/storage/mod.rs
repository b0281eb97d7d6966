//! Storage layer for `todo_store`.
//!
//! Two interchangeable backends implement [`TodoStore`]:
//! - [`SqliteStore`] - one `SQLite` file, filtering and ordering in SQL
//! - [`FlatStore`] - one JSON collection plus an id counter in a key-value
//!   namespace, filtering and ordering in Rust
//!
//! # Submodules
//!
//! - [`flat`] - Flat key-value store
//! - [`kv`] - Key-value namespaces the flat store writes through
//! - [`order`] - Canonical listing order shared by both backends
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main `SQLite` storage implementation

pub mod flat;
pub mod kv;
pub mod order;
pub mod schema;
pub mod sqlite;

pub use flat::FlatStore;
pub use kv::{FileKv, KeyValueStore, MemoryKv};
pub use sqlite::{DbLocation, SqliteStore};

use crate::config::{Backend, StoreConfig};
use crate::error::Result;
use crate::model::{NewTodo, Todo, TodoPatch, TodoQuery, TodoStats};

/// Result of [`TodoStore::update`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// At least one field was written and `updated_at` refreshed.
    Applied,
    /// The patch carried no fields; nothing was written.
    Empty,
    /// No record has that id; nothing was written.
    NotFound,
}

/// Record CRUD and query contract shared by every backend.
///
/// Listing operations return records in canonical order (see [`order`]).
/// A missing id is never an error: lookups return `None`, deletes return
/// `false` and updates return [`UpdateOutcome::NotFound`].
pub trait TodoStore {
    fn backend(&self) -> Backend;

    /// Acquire the backing resource and prepare it. Safe to call repeatedly;
    /// every other operation initializes on first use.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TodoError::StorageInit`] if the resource cannot be
    /// opened or created.
    fn initialize(&self) -> Result<()>;

    /// Insert a record and return its newly assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TodoError::StorageWrite`] if the write fails.
    fn create(&mut self, new: &NewTodo) -> Result<i64>;

    /// Apply the fields present in `patch`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TodoError::StorageWrite`] if the write fails.
    fn update(&mut self, id: i64, patch: &TodoPatch) -> Result<UpdateOutcome>;

    /// Remove a record. Returns whether one was removed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TodoError::StorageWrite`] if the write fails.
    fn delete(&mut self, id: i64) -> Result<bool>;

    /// # Errors
    ///
    /// Returns an error if the backing resource cannot be read.
    fn fetch_by_id(&self, id: i64) -> Result<Option<Todo>>;

    /// Records matching every condition in `query`, in canonical order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing resource cannot be read.
    fn query(&self, query: &TodoQuery) -> Result<Vec<Todo>>;

    /// Distinct categories in ascending byte order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing resource cannot be read.
    fn list_categories(&self) -> Result<Vec<String>>;

    /// # Errors
    ///
    /// Returns an error if the backing resource cannot be read.
    fn fetch_all(&self) -> Result<Vec<Todo>> {
        self.query(&TodoQuery::all())
    }

    /// # Errors
    ///
    /// Returns an error if the backing resource cannot be read.
    fn fetch_by_category(&self, category: &str) -> Result<Vec<Todo>> {
        self.query(&TodoQuery::in_category(category))
    }

    /// Case-insensitive (ASCII) substring search over title and description.
    /// An empty query matches everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing resource cannot be read.
    fn search(&self, text: &str) -> Result<Vec<Todo>> {
        self.query(&TodoQuery::matching(text))
    }

    /// # Errors
    ///
    /// Returns an error if the backing resource cannot be read.
    fn stats(&self, query: &TodoQuery) -> Result<TodoStats> {
        Ok(TodoStats::from_todos(&self.query(query)?))
    }

    /// Flip `completed`. Returns the new value, or `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or written.
    fn toggle_completed(&mut self, id: i64) -> Result<Option<bool>> {
        let Some(todo) = self.fetch_by_id(id)? else {
            return Ok(None);
        };
        let completed = !todo.completed;
        match self.update(id, &TodoPatch::completed(completed))? {
            UpdateOutcome::NotFound => Ok(None),
            UpdateOutcome::Applied | UpdateOutcome::Empty => Ok(Some(completed)),
        }
    }

    /// Release the backing resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend reports a failure while closing.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Build the store selected by `config`. The backing resource is opened
/// lazily; call [`TodoStore::initialize`] to surface open errors early.
#[must_use]
pub fn open_store(config: &StoreConfig) -> Box<dyn TodoStore> {
    match config.backend {
        Backend::Sqlite => Box::new(SqliteStore::new(&config.db_path)),
        Backend::Flat => Box::new(FlatStore::new(&config.kv_dir)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(temp: &TempDir, backend: Backend) -> StoreConfig {
        StoreConfig {
            backend,
            db_path: temp.path().join("todos.db"),
            kv_dir: temp.path().join("kv"),
        }
    }

    #[test]
    fn open_store_picks_backend() {
        let temp = TempDir::new().unwrap();
        for backend in [Backend::Sqlite, Backend::Flat] {
            let store = open_store(&config(&temp, backend));
            assert_eq!(store.backend(), backend);
            store.initialize().unwrap();
            store.close().unwrap();
        }
        assert!(temp.path().join("todos.db").exists());
        assert!(temp.path().join("kv").is_dir());
    }

    #[test]
    fn toggle_flips_and_reports_missing() {
        let temp = TempDir::new().unwrap();
        for backend in [Backend::Sqlite, Backend::Flat] {
            let mut store = open_store(&config(&temp, backend));
            let id = store.create(&NewTodo::new("flip me")).unwrap();

            assert_eq!(store.toggle_completed(id).unwrap(), Some(true));
            assert!(store.fetch_by_id(id).unwrap().unwrap().completed);
            assert_eq!(store.toggle_completed(id).unwrap(), Some(false));
            assert_eq!(store.toggle_completed(id + 1000).unwrap(), None);
            store.close().unwrap();
        }
    }

    #[test]
    fn default_stats_match_sql_stats() {
        let temp = TempDir::new().unwrap();
        let mut sqlite = open_store(&config(&temp, Backend::Sqlite));
        let mut flat = open_store(&config(&temp, Backend::Flat));

        for store in [&mut sqlite, &mut flat] {
            store.create(&NewTodo::new("a").category("Work")).unwrap();
            store
                .create(&NewTodo::new("b").category("Work").completed(true))
                .unwrap();
            store.create(&NewTodo::new("c")).unwrap();
        }

        for query in [TodoQuery::all(), TodoQuery::in_category("Work")] {
            assert_eq!(sqlite.stats(&query).unwrap(), flat.stats(&query).unwrap());
        }
    }
}
