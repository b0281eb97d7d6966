use chrono::{DateTime, TimeZone, Utc};
use todo_store::model::{NewTodo, Priority, Todo};
use todo_store::storage::TodoStore;

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// A: high, open, undated. B: low, open, due 2025-01-01. C: high, done.
pub fn scenario_abc() -> [NewTodo; 3] {
    [
        NewTodo::new("A").priority(Priority::High),
        NewTodo::new("B")
            .priority(Priority::Low)
            .due(Some(date(2025, 1, 1))),
        NewTodo::new("C").priority(Priority::High).completed(true),
    ]
}

pub fn create_all(store: &mut dyn TodoStore, todos: &[NewTodo]) -> Vec<i64> {
    todos
        .iter()
        .map(|t| store.create(t).expect("create"))
        .collect()
}

pub fn titles(todos: &[Todo]) -> Vec<&str> {
    todos.iter().map(|t| t.title.as_str()).collect()
}
