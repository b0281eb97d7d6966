//! `SQLite` storage implementation.

use crate::config::Backend;
use crate::error::{Result, TodoError};
use crate::model::{NewTodo, Priority, Todo, TodoPatch, TodoQuery, TodoStats};
use crate::storage::order::ORDER_BY_SQL;
use crate::storage::schema::apply_schema;
use crate::storage::{TodoStore, UpdateOutcome};
use crate::util::time::{self, format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use once_cell::unsync::OnceCell;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, ToSql};
use std::fmt;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const TODO_COLUMNS: &str =
    "id, title, description, category, priority, due_date, completed, created_at, updated_at";

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

impl fmt::Display for DbLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str(":memory:"),
        }
    }
}

/// SQLite-based storage backend.
///
/// The connection is opened on first use (or by [`SqliteStore::connection`])
/// and held until [`SqliteStore::close`] or drop.
#[derive(Debug)]
pub struct SqliteStore {
    location: DbLocation,
    conn: OnceCell<Connection>,
}

impl SqliteStore {
    /// Describe a store backed by the file at `path` without opening it.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DbLocation::File(path.into()),
            conn: OnceCell::new(),
        }
    }

    /// Open (creating if needed) the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::StorageInit`] if the file cannot be opened or the
    /// schema cannot be applied.
    pub fn open(path: &Path) -> Result<Self> {
        let store = Self::new(path);
        store.connection()?;
        Ok(store)
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::StorageInit`] if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let store = Self {
            location: DbLocation::Memory,
            conn: OnceCell::new(),
        };
        store.connection()?;
        Ok(store)
    }

    #[must_use]
    pub const fn location(&self) -> &DbLocation {
        &self.location
    }

    /// The open connection, opening and preparing it on first call.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::StorageInit`] if opening fails. A failed open is
    /// not cached; the next call tries again.
    pub fn connection(&self) -> Result<&Connection> {
        self.conn.get_or_try_init(|| self.open_connection())
    }

    fn open_connection(&self) -> Result<Connection> {
        let init_err = |e: rusqlite::Error| TodoError::init(Backend::Sqlite, self.location.to_string(), e);

        let conn = match &self.location {
            DbLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|e| {
                        TodoError::init(Backend::Sqlite, self.location.to_string(), e)
                    })?;
                }
                Connection::open(path).map_err(init_err)?
            }
            DbLocation::Memory => Connection::open_in_memory().map_err(init_err)?,
        };

        apply_schema(&conn).map_err(init_err)?;
        info!(location = %self.location, "Opened todo database");
        Ok(conn)
    }

    /// Close the connection, reporting any error SQLite raises while
    /// finalizing. Closing a store that was never opened is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the error from `sqlite3_close`.
    pub fn close(self) -> Result<()> {
        if let Some(conn) = self.conn.into_inner() {
            conn.close().map_err(|(_, e)| TodoError::Database(e))?;
            debug!(location = %self.location, "Closed todo database");
        }
        Ok(())
    }

    fn exists(&self, id: i64) -> Result<bool> {
        let conn = self.connection()?;
        let found = conn
            .prepare_cached("SELECT 1 FROM todos WHERE id = ?")?
            .exists([id])?;
        Ok(found)
    }
}

impl TodoStore for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn initialize(&self) -> Result<()> {
        self.connection().map(|_| ())
    }

    fn create(&mut self, new: &NewTodo) -> Result<i64> {
        let conn = self.connection()?;
        let now = format_timestamp(&time::now());

        conn.execute(
            "INSERT INTO todos (
                title, description, category, priority, due_date, completed,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            rusqlite::params![
                new.title,
                new.description,
                new.category_or_default(),
                new.priority,
                new.due_date.as_ref().map(format_timestamp),
                new.completed,
                now,
            ],
        )
        .map_err(|e| TodoError::write("create", e))?;

        let id = conn.last_insert_rowid();
        debug!(id, title = %new.title, "Created todo");
        Ok(id)
    }

    fn update(&mut self, id: i64, patch: &TodoPatch) -> Result<UpdateOutcome> {
        if patch.is_empty() {
            return if self.exists(id)? {
                Ok(UpdateOutcome::Empty)
            } else {
                warn!(id, "Update skipped: no todo with this id");
                Ok(UpdateOutcome::NotFound)
            };
        }

        let conn = self.connection()?;
        let mut assignments = patch_assignments(patch);

        // Never move updated_at backwards, even if the clock does
        assignments.push((
            "updated_at = MAX(?, updated_at)",
            Box::new(format_timestamp(&time::now())),
        ));

        let (set_clauses, mut params): (Vec<&str>, Vec<Box<dyn ToSql>>) =
            assignments.into_iter().unzip();
        let sql = format!("UPDATE todos SET {} WHERE id = ?", set_clauses.join(", "));
        params.push(Box::new(id));

        let params_refs: Vec<&dyn ToSql> = params.iter().map(AsRef::as_ref).collect();
        let rows = conn
            .execute(&sql, params_refs.as_slice())
            .map_err(|e| TodoError::write("update", e))?;

        if rows == 0 {
            warn!(id, "Update skipped: no todo with this id");
            return Ok(UpdateOutcome::NotFound);
        }

        debug!(id, fields = set_clauses.len() - 1, "Updated todo");
        Ok(UpdateOutcome::Applied)
    }

    fn delete(&mut self, id: i64) -> Result<bool> {
        let conn = self.connection()?;
        let rows = conn
            .execute("DELETE FROM todos WHERE id = ?", [id])
            .map_err(|e| TodoError::write("delete", e))?;
        debug!(id, removed = rows > 0, "Deleted todo");
        Ok(rows > 0)
    }

    fn fetch_by_id(&self, id: i64) -> Result<Option<Todo>> {
        let conn = self.connection()?;
        let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?");
        let todo = conn
            .prepare_cached(&sql)?
            .query_row([id], todo_from_row)
            .optional()?;
        Ok(todo)
    }

    fn query(&self, query: &TodoQuery) -> Result<Vec<Todo>> {
        let conn = self.connection()?;
        let (where_sql, params) = where_clause(query);

        let mut sql = format!("SELECT {TODO_COLUMNS} FROM todos{where_sql}");
        let _ = write!(sql, " ORDER BY {ORDER_BY_SQL}");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn ToSql> = params.iter().map(AsRef::as_ref).collect();
        let todos = stmt
            .query_map(params_refs.as_slice(), todo_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(?query, count = todos.len(), "Queried todos");
        Ok(todos)
    }

    fn list_categories(&self) -> Result<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT DISTINCT category FROM todos ORDER BY category ASC")?;
        let categories = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(categories)
    }

    fn stats(&self, query: &TodoQuery) -> Result<TodoStats> {
        let conn = self.connection()?;
        let (where_sql, params) = where_clause(query);
        let sql = format!("SELECT count(*), COALESCE(SUM(completed), 0) FROM todos{where_sql}");

        let params_refs: Vec<&dyn ToSql> = params.iter().map(AsRef::as_ref).collect();
        let (total, completed): (i64, i64) = conn.query_row(&sql, params_refs.as_slice(), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;

        let total = usize::try_from(total).unwrap_or(0);
        let completed = usize::try_from(completed).unwrap_or(0);
        Ok(TodoStats {
            total,
            completed,
            active: total.saturating_sub(completed),
        })
    }

    fn close(self: Box<Self>) -> Result<()> {
        (*self).close()
    }
}

/// Column assignments for the fields present in `patch`.
fn patch_assignments(patch: &TodoPatch) -> Vec<(&'static str, Box<dyn ToSql>)> {
    let mut assignments: Vec<(&'static str, Box<dyn ToSql>)> = Vec::new();

    if let Some(ref title) = patch.title {
        assignments.push(("title = ?", Box::new(title.clone())));
    }
    if let Some(ref description) = patch.description {
        assignments.push(("description = ?", Box::new(description.clone())));
    }
    if let Some(category) = patch.category_or_default() {
        assignments.push(("category = ?", Box::new(category.to_string())));
    }
    if let Some(priority) = patch.priority {
        assignments.push(("priority = ?", Box::new(priority)));
    }
    if let Some(due_date) = patch.due_date {
        assignments.push((
            "due_date = ?",
            Box::new(due_date.as_ref().map(format_timestamp)),
        ));
    }
    if let Some(completed) = patch.completed {
        assignments.push(("completed = ?", Box::new(completed)));
    }

    assignments
}

/// `WHERE` clause (with leading space, or empty) and its parameters.
fn where_clause(query: &TodoQuery) -> (String, Vec<Box<dyn ToSql>>) {
    let mut conditions: Vec<&str> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(ref category) = query.category {
        conditions.push("category = ?");
        params.push(Box::new(category.clone()));
    }

    if let Some(completed) = query.status.completed_value() {
        conditions.push("completed = ?");
        params.push(Box::new(completed));
    }

    if let Some(text) = query.search.as_deref().filter(|t| !t.is_empty()) {
        conditions.push(r"(title LIKE ? ESCAPE '\' OR description LIKE ? ESCAPE '\')");
        let pattern = format!("%{}%", escape_like(text));
        params.push(Box::new(pattern.clone()));
        params.push(Box::new(pattern));
    }

    if conditions.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), params)
    }
}

/// Escape `LIKE` wildcards so the query text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn todo_from_row(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        category: row.get(3)?,
        priority: row.get(4)?,
        due_date: optional_timestamp_at(row, 5)?,
        completed: row.get(6)?,
        created_at: timestamp_at(row, 7)?,
        updated_at: timestamp_at(row, 8)?,
    })
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn optional_timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) if !raw.trim().is_empty() => parse_timestamp(&raw)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())),
        _ => Ok(None),
    }
}

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Priority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(FromSqlError::Other(
                format!("unknown priority '{other}'").into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> SqliteStore {
        SqliteStore::open_memory().unwrap()
    }

    fn raw_string(store: &SqliteStore, sql: &str, id: i64) -> String {
        store
            .connection()
            .unwrap()
            .query_row(sql, [id], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_open_memory() {
        let storage = SqliteStore::open_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_create_assigns_ids_and_timestamps() {
        let mut storage = store();
        let first = storage.create(&NewTodo::new("first")).unwrap();
        let second = storage.create(&NewTodo::new("second")).unwrap();
        assert!(second > first);

        let created = raw_string(&storage, "SELECT created_at FROM todos WHERE id = ?", first);
        let updated = raw_string(&storage, "SELECT updated_at FROM todos WHERE id = ?", first);
        assert_eq!(created, updated);
        assert_eq!(created.len(), "2025-01-01T00:00:00.000Z".len());
        assert!(created.ends_with('Z'));
    }

    #[test]
    fn test_create_stores_priority_as_text() {
        let mut storage = store();
        let id = storage
            .create(&NewTodo::new("p").priority(Priority::High))
            .unwrap();
        assert_eq!(
            raw_string(&storage, "SELECT priority FROM todos WHERE id = ?", id),
            "high"
        );
    }

    #[test]
    fn test_blank_category_becomes_default() {
        let mut storage = store();
        let id = storage.create(&NewTodo::new("c").category("")).unwrap();
        let todo = storage.fetch_by_id(id).unwrap().unwrap();
        assert_eq!(todo.category, "General");
    }

    #[test]
    fn test_update_only_touches_present_columns() {
        let mut storage = store();
        let due = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let id = storage
            .create(
                &NewTodo::new("t")
                    .description("keep me")
                    .category("Work")
                    .due(Some(due)),
            )
            .unwrap();

        let outcome = storage
            .update(
                id,
                &TodoPatch {
                    title: Some("renamed".into()),
                    ..TodoPatch::default()
                },
            )
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Applied);

        let todo = storage.fetch_by_id(id).unwrap().unwrap();
        assert_eq!(todo.title, "renamed");
        assert_eq!(todo.description, "keep me");
        assert_eq!(todo.category, "Work");
        assert_eq!(todo.due_date, Some(due));
    }

    #[test]
    fn test_update_clears_due_date() {
        let mut storage = store();
        let due = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let id = storage.create(&NewTodo::new("t").due(Some(due))).unwrap();

        let patch = TodoPatch {
            due_date: Some(None),
            ..TodoPatch::default()
        };
        assert_eq!(storage.update(id, &patch).unwrap(), UpdateOutcome::Applied);

        let todo = storage.fetch_by_id(id).unwrap().unwrap();
        assert!(todo.due_date.is_none());
    }

    #[test]
    fn test_update_missing_id_is_flagged_not_error() {
        let mut storage = store();
        let outcome = storage.update(99, &TodoPatch::completed(true)).unwrap();
        assert_eq!(outcome, UpdateOutcome::NotFound);
        assert_eq!(
            storage.update(99, &TodoPatch::default()).unwrap(),
            UpdateOutcome::NotFound
        );
    }

    #[test]
    fn test_empty_update_is_not_written() {
        let mut storage = store();
        let id = storage.create(&NewTodo::new("t")).unwrap();
        let before = raw_string(&storage, "SELECT updated_at FROM todos WHERE id = ?", id);

        let changes_before = storage.connection().unwrap().total_changes();
        let outcome = storage.update(id, &TodoPatch::default()).unwrap();
        assert_eq!(outcome, UpdateOutcome::Empty);
        assert_eq!(storage.connection().unwrap().total_changes(), changes_before);

        let after = raw_string(&storage, "SELECT updated_at FROM todos WHERE id = ?", id);
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_never_moves_updated_at_backwards() {
        let mut storage = store();
        let id = storage.create(&NewTodo::new("t")).unwrap();
        storage
            .connection()
            .unwrap()
            .execute(
                "UPDATE todos SET created_at = '2999-01-01T00:00:00.000Z',
                                  updated_at = '2999-01-01T00:00:00.000Z' WHERE id = ?",
                [id],
            )
            .unwrap();

        assert_eq!(
            storage.update(id, &TodoPatch::completed(true)).unwrap(),
            UpdateOutcome::Applied
        );
        assert_eq!(
            raw_string(&storage, "SELECT updated_at FROM todos WHERE id = ?", id),
            "2999-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn test_search_escapes_wildcards() {
        let mut storage = store();
        storage.create(&NewTodo::new("100% done")).unwrap();
        storage.create(&NewTodo::new("1000 things")).unwrap();
        storage.create(&NewTodo::new("snake_case")).unwrap();
        storage.create(&NewTodo::new("snakeXcase")).unwrap();

        let pct = storage.search("0%").unwrap();
        assert_eq!(pct.len(), 1);
        assert_eq!(pct[0].title, "100% done");

        let underscore = storage.search("e_c").unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].title, "snake_case");
    }

    #[test]
    fn test_unknown_priority_in_row_is_an_error() {
        let storage = store();
        let conn = storage.connection().unwrap();
        // Bypass the CHECK constraint to simulate a foreign writer
        conn.execute_batch(
            "PRAGMA ignore_check_constraints = ON;
             INSERT INTO todos (title, priority, created_at, updated_at)
             VALUES ('bad', 'urgent', '2025-01-01T00:00:00.000Z', '2025-01-01T00:00:00.000Z');
             PRAGMA ignore_check_constraints = OFF;",
        )
        .unwrap();

        assert!(storage.fetch_all().is_err());
    }

    #[test]
    fn test_stats_in_sql() {
        let mut storage = store();
        storage.create(&NewTodo::new("a").category("Work")).unwrap();
        storage
            .create(&NewTodo::new("b").category("Work").completed(true))
            .unwrap();
        storage.create(&NewTodo::new("c")).unwrap();

        let all = storage.stats(&TodoQuery::all()).unwrap();
        assert_eq!((all.total, all.completed, all.active), (3, 1, 2));

        let work = storage.stats(&TodoQuery::in_category("Work")).unwrap();
        assert_eq!((work.total, work.completed, work.active), (2, 1, 1));

        let empty = storage.stats(&TodoQuery::in_category("None")).unwrap();
        assert_eq!(empty, TodoStats::default());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like(r"a%b_c\d"), r"a\%b\_c\\d");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_lazy_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("todos.db");
        let store = SqliteStore::new(&path);
        assert!(!path.exists());

        store.initialize().unwrap();
        store.initialize().unwrap();
        assert!(path.exists());
        store.close().unwrap();
    }

    #[test]
    fn test_open_failure_is_init_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let err = SqliteStore::open(&blocker.join("todos.db")).unwrap_err();
        assert!(matches!(
            err,
            TodoError::StorageInit {
                backend: Backend::Sqlite,
                ..
            }
        ));
    }
}
