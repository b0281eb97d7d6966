mod common;

use std::fs;
use tempfile::TempDir;
use todo_store::model::{NewTodo, Todo};
use todo_store::storage::flat::{COUNTER_KEY, TODOS_KEY};
use todo_store::storage::{FlatStore, TodoStore};
use todo_store::util::time;

fn kv_dir() -> TempDir {
    common::init_test_logging();
    TempDir::new().expect("tempdir")
}

fn write_collection(dir: &TempDir, todos: &[Todo]) {
    fs::write(
        dir.path().join(TODOS_KEY),
        serde_json::to_string(todos).unwrap(),
    )
    .unwrap();
}

#[test]
fn blob_layout_on_disk() {
    let dir = kv_dir();
    let mut store = FlatStore::open(dir.path()).unwrap();
    let id = store.create(&NewTodo::new("on disk")).unwrap();

    let counter = fs::read_to_string(dir.path().join(COUNTER_KEY)).unwrap();
    assert_eq!(counter, id.to_string());

    let blob: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(TODOS_KEY)).unwrap()).unwrap();
    let first = &blob[0];
    assert_eq!(first["title"], "on disk");
    assert_eq!(first["category"], "General");
    assert_eq!(first["priority"], "medium");
    assert!(first["dueDate"].is_null());
    assert!(first["createdAt"].as_str().unwrap().ends_with('Z'));
    assert_eq!(first["createdAt"], first["updatedAt"]);
}

#[test]
fn corrupt_blob_reads_as_empty_and_is_replaced() {
    let dir = kv_dir();
    fs::write(dir.path().join(TODOS_KEY), "[{\"id\": 1, \"title\": ").unwrap();

    let mut store = FlatStore::open(dir.path()).unwrap();
    assert!(store.fetch_all().unwrap().is_empty());
    assert!(store.fetch_by_id(1).unwrap().is_none());

    store.create(&NewTodo::new("fresh start")).unwrap();
    let reread = FlatStore::open(dir.path()).unwrap();
    assert_eq!(reread.fetch_all().unwrap().len(), 1);
}

#[test]
fn non_utf8_blob_reads_as_empty() {
    let dir = kv_dir();
    fs::write(dir.path().join(TODOS_KEY), [0xc3, 0x28, 0xff]).unwrap();
    let store = FlatStore::open(dir.path()).unwrap();
    assert!(store.fetch_all().unwrap().is_empty());
}

#[test]
fn missing_counter_continues_after_existing_ids() {
    let dir = kv_dir();
    let now = time::now();
    write_collection(
        &dir,
        &[
            Todo::from_new(3, &NewTodo::new("three"), now),
            Todo::from_new(9, &NewTodo::new("nine"), now),
        ],
    );

    let mut store = FlatStore::open(dir.path()).unwrap();
    assert_eq!(store.create(&NewTodo::new("next")).unwrap(), 10);
}

#[test]
fn corrupt_counter_never_collides_with_stored_ids() {
    let dir = kv_dir();
    let far_future_id = i64::from(u32::MAX) * 1_000;
    write_collection(
        &dir,
        &[Todo::from_new(far_future_id, &NewTodo::new("big id"), time::now())],
    );
    fs::write(dir.path().join(COUNTER_KEY), "🙃").unwrap();

    let mut store = FlatStore::open(dir.path()).unwrap();
    let id = store.create(&NewTodo::new("after corruption")).unwrap();
    assert!(id > far_future_id);

    let persisted: i64 = fs::read_to_string(dir.path().join(COUNTER_KEY))
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(persisted, id);
}

#[test]
fn records_with_missing_optional_fields_load() {
    let dir = kv_dir();
    fs::write(
        dir.path().join(TODOS_KEY),
        r#"[{"id":5,"title":"sparse","createdAt":"2025-01-01T00:00:00.000Z","updatedAt":"2025-01-01T00:00:00.000Z"}]"#,
    )
    .unwrap();

    let store = FlatStore::open(dir.path()).unwrap();
    let todo = store.fetch_by_id(5).unwrap().expect("sparse record");
    assert_eq!(todo.category, "General");
    assert!(todo.description.is_empty());
    assert!(!todo.completed);
}

#[test]
fn no_temp_files_left_behind() {
    let dir = kv_dir();
    let mut store = FlatStore::open(dir.path()).unwrap();
    for i in 0..5 {
        store.create(&NewTodo::new(format!("t{i}"))).unwrap();
    }

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, [TODOS_KEY, COUNTER_KEY]);
}

#[test]
fn valid_blob_with_unknown_priority_is_not_overwritten() {
    let dir = kv_dir();
    let blob = r#"[{"id":1,"title":"keep me","priority":"urgent","createdAt":"2025-01-01T00:00:00.000Z","updatedAt":"2025-01-01T00:00:00.000Z"}]"#;
    fs::write(dir.path().join(TODOS_KEY), blob).unwrap();

    let mut store = FlatStore::open(dir.path()).unwrap();
    assert!(store.fetch_all().is_err());
    assert!(store.create(&NewTodo::new("new")).is_err());

    assert_eq!(fs::read_to_string(dir.path().join(TODOS_KEY)).unwrap(), blob);
}
