//! Flat key-value storage implementation.
//!
//! The whole collection lives under one key as a JSON array; a second key
//! holds the last id handed out. Every write reads the collection, changes
//! it in memory and writes it back. Filtering, search and ordering run over
//! the deserialized collection with the same predicate and comparator the
//! SQL backend documents.

use crate::config::Backend;
use crate::error::{Result, StorageFault, TodoError};
use crate::model::{NewTodo, Todo, TodoPatch, TodoQuery};
use crate::storage::kv::{FileKv, KeyValueStore, MemoryKv};
use crate::storage::order::sort_canonical;
use crate::storage::{TodoStore, UpdateOutcome};
use crate::util::time;
use chrono::Utc;
use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Key holding the serialized collection.
pub const TODOS_KEY: &str = "todos";
/// Key holding the last issued id.
pub const COUNTER_KEY: &str = "todos_counter";

/// Whole-collection store over a [`KeyValueStore`].
#[derive(Debug)]
pub struct FlatStore<K: KeyValueStore = FileKv> {
    kv: K,
}

impl FlatStore<FileKv> {
    /// Describe a store rooted at `dir` without touching the filesystem.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_kv(FileKv::new(dir))
    }

    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::StorageInit`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(dir);
        store.initialize()?;
        Ok(store)
    }
}

impl FlatStore<MemoryKv> {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_kv(MemoryKv::new())
    }
}

impl<K: KeyValueStore> FlatStore<K> {
    #[must_use]
    pub const fn with_kv(kv: K) -> Self {
        Self { kv }
    }

    #[must_use]
    pub const fn kv(&self) -> &K {
        &self.kv
    }

    #[must_use]
    pub fn into_inner(self) -> K {
        self.kv
    }

    /// Read the collection.
    ///
    /// A missing blob, or one that is not valid JSON, reads as empty. Valid
    /// JSON that does not decode into records is an error, so the next write
    /// cannot replace records that are merely unreadable to this version.
    fn load(&self) -> std::result::Result<Vec<Todo>, StorageFault> {
        let raw = match self.kv.get(TODOS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(location = %self.kv.describe(), error = %e, "Todo collection is unreadable; treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&raw) {
            Ok(todos) => Ok(todos),
            Err(e) if e.is_data() => Err(e.into()),
            Err(e) => {
                warn!(location = %self.kv.describe(), error = %e, "Todo collection is corrupt; treating as empty");
                Ok(Vec::new())
            }
        }
    }

    fn load_for_write(&self, op: &'static str) -> Result<Vec<Todo>> {
        self.load().map_err(|e| TodoError::write(op, e))
    }

    fn load_for_read(&self) -> Result<Vec<Todo>> {
        self.load().map_err(|fault| match fault {
            StorageFault::Sqlite(e) => TodoError::Database(e),
            StorageFault::Io(e) => TodoError::Io(e),
            StorageFault::Serialize(e) => TodoError::Json(e),
        })
    }

    fn save(&mut self, todos: &[Todo], op: &'static str) -> Result<()> {
        let json = serde_json::to_string(todos).map_err(|e| TodoError::write(op, e))?;
        self.kv
            .set(TODOS_KEY, &json)
            .map_err(|e| TodoError::write(op, e))
    }

    /// Hand out the next id and persist it as the new counter value.
    ///
    /// The counter never goes below the largest stored id. A missing counter
    /// seeds from the stored ids; an unreadable one falls back to the current
    /// time in milliseconds, which keeps ids unique against stored records
    /// but can skip far ahead.
    fn next_id(&mut self, todos: &[Todo]) -> Result<i64> {
        let max_existing = todos.iter().map(|t| t.id).max().unwrap_or(0);

        let seed = match self.kv.get(COUNTER_KEY) {
            Ok(None) => max_existing,
            Ok(Some(raw)) => match raw.trim().parse::<i64>() {
                Ok(counter) => counter.max(max_existing),
                Err(e) => {
                    let seed = time_seed(max_existing);
                    warn!(raw = %raw.trim(), error = %e, seed, "Id counter is corrupt; reseeding from the clock");
                    seed
                }
            },
            Err(e) => {
                let seed = time_seed(max_existing);
                warn!(error = %e, seed, "Id counter is unreadable; reseeding from the clock");
                seed
            }
        };

        let next = seed
            .checked_add(1)
            .ok_or_else(|| TodoError::write("create", io::Error::other("id counter overflow")))?;

        self.kv
            .set(COUNTER_KEY, &next.to_string())
            .map_err(|e| TodoError::write("create", e))?;

        Ok(next)
    }
}

fn time_seed(max_existing: i64) -> i64 {
    Utc::now().timestamp_millis().max(max_existing)
}

impl<K: KeyValueStore> TodoStore for FlatStore<K> {
    fn backend(&self) -> Backend {
        Backend::Flat
    }

    fn initialize(&self) -> Result<()> {
        self.kv
            .ensure()
            .map_err(|e| TodoError::init(Backend::Flat, self.kv.describe(), e))?;
        info!(location = %self.kv.describe(), "Opened flat todo store");
        Ok(())
    }

    fn create(&mut self, new: &NewTodo) -> Result<i64> {
        let mut todos = self.load_for_write("create")?;
        let id = self.next_id(&todos)?;

        todos.push(Todo::from_new(id, new, time::now()));
        self.save(&todos, "create")?;

        debug!(id, title = %new.title, "Created todo");
        Ok(id)
    }

    fn update(&mut self, id: i64, patch: &TodoPatch) -> Result<UpdateOutcome> {
        let mut todos = self.load_for_write("update")?;

        let Some(todo) = todos.iter_mut().find(|t| t.id == id) else {
            warn!(id, "Update skipped: no todo with this id");
            return Ok(UpdateOutcome::NotFound);
        };

        if !patch.apply_to(todo, time::now()) {
            return Ok(UpdateOutcome::Empty);
        }

        self.save(&todos, "update")?;
        debug!(id, "Updated todo");
        Ok(UpdateOutcome::Applied)
    }

    fn delete(&mut self, id: i64) -> Result<bool> {
        let mut todos = self.load_for_write("delete")?;
        let before = todos.len();
        todos.retain(|t| t.id != id);

        let removed = todos.len() != before;
        if removed {
            self.save(&todos, "delete")?;
        }

        debug!(id, removed, "Deleted todo");
        Ok(removed)
    }

    fn fetch_by_id(&self, id: i64) -> Result<Option<Todo>> {
        Ok(self.load_for_read()?.into_iter().find(|t| t.id == id))
    }

    fn query(&self, query: &TodoQuery) -> Result<Vec<Todo>> {
        let mut todos: Vec<Todo> = self
            .load_for_read()?
            .into_iter()
            .filter(|t| query.matches(t))
            .collect();
        sort_canonical(&mut todos);

        debug!(?query, count = todos.len(), "Queried todos");
        Ok(todos)
    }

    fn list_categories(&self) -> Result<Vec<String>> {
        let categories: BTreeSet<String> = self
            .load_for_read()?
            .into_iter()
            .map(|t| t.category)
            .collect();
        Ok(categories.into_iter().collect())
    }

    fn close(self: Box<Self>) -> Result<()> {
        debug!(location = %self.kv.describe(), "Closed flat todo store");
        Ok(())
    }
}
