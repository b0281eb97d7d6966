#![allow(dead_code)]

use std::sync::Once;
use tempfile::TempDir;
use todo_store::config::{Backend, StoreConfig};
use todo_store::storage::{TodoStore, open_store};

pub mod cli;
pub mod fixtures;

static INIT: Once = Once::new();

pub const BACKENDS: [Backend; 2] = [Backend::Sqlite, Backend::Flat];

pub fn init_test_logging() {
    INIT.call_once(|| {
        todo_store::logging::init_test_logging();
    });
}

/// Store config rooted in a fresh temp dir.
pub fn temp_config(backend: Backend) -> (StoreConfig, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = StoreConfig::in_dir(&dir.path().join(".todos"), backend);
    (config, dir)
}

/// Initialized on-disk store of the given kind. Keep the `TempDir` alive.
pub fn test_store(backend: Backend) -> (Box<dyn TodoStore>, TempDir) {
    let (config, dir) = temp_config(backend);
    let store = open_store(&config);
    store.initialize().expect("Failed to initialize test store");
    (store, dir)
}
