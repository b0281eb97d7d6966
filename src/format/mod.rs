//! Output formatting for `todo_store`.
//!
//! Supports both human-readable text output and machine-parseable JSON.
//! JSON goes to stdout; diagnostics and errors go to stderr.

mod context;
mod text;

pub use context::{OutputContext, OutputMode};
pub use text::{
    format_priority_badge, format_stats, format_status_icon, format_todo_details,
    format_todo_line, terminal_width, truncate_title,
};
