//! Logging configuration and initialization.
//!
//! Storage operations log through `tracing`: `debug!` per operation,
//! `info!` when a backend is opened, `warn!` for recovered corruption and
//! updates aimed at missing ids. The `todo` binary installs a stderr
//! subscriber filtered by `RUST_LOG` or `-v`/`-q`, plus an optional JSON
//! file layer.

use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::{Mutex, Once};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize logging for the CLI.
///
/// `RUST_LOG` wins when set; otherwise the filter comes from
/// [`default_filter`].
///
/// # Errors
///
/// Returns an error if the filter is invalid, the log file cannot be
/// created, or a global subscriber is already installed.
pub fn init_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbosity, quiet)))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .with_level(true)
        .with_file(cfg!(debug_assertions) && verbosity >= 3)
        .with_line_number(cfg!(debug_assertions) && verbosity >= 3)
        .with_ansi(std::io::stderr().is_terminal());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
        let file = fs::File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        let file_layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .json();
        tracing::subscriber::set_global_default(subscriber.with(file_layer))?;
    } else {
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

/// Filter used when `RUST_LOG` is unset.
///
/// Plain runs only surface warnings (recovered corruption, missing ids);
/// each `-v` adds a level, and `-vvv` includes rusqlite.
#[must_use]
pub fn default_filter(verbosity: u8, quiet: bool) -> String {
    if quiet {
        return "error".to_string();
    }

    match verbosity {
        0 => "todo_store=warn".to_string(),
        1 => "todo_store=info".to_string(),
        2 => "todo_store=debug".to_string(),
        _ => "todo_store=trace,rusqlite=debug".to_string(),
    }
}

/// Initialize logging for tests with the test writer.
pub fn init_test_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("todo_store=debug,test=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}
