//! Command-line interface for the `todo` binary.

pub mod commands;

use crate::config::Backend;
use crate::model::{Priority, StatusFilter};
use crate::util::time::parse_timestamp;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Local todo list with SQLite or flat-file storage")]
pub struct Cli {
    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Storage backend (overrides config and TODO_BACKEND)
    #[arg(long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Data directory (default: nearest .todos, or TODO_DIR)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Database file for the sqlite backend
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Key-value directory for the flat backend
    #[arg(long, global = true)]
    pub kv_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a todo
    Add(AddArgs),
    /// List todos in display order
    #[command(alias = "ls")]
    List(ListArgs),
    /// Show one todo
    Show(IdArgs),
    /// Change fields of a todo
    Edit(EditArgs),
    /// Flip a todo between active and completed
    Toggle(IdArgs),
    /// Delete a todo
    #[command(alias = "delete")]
    Rm(IdArgs),
    /// Search titles and descriptions
    Search(SearchArgs),
    /// List categories in use
    Categories,
    /// Show completion counts
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub title: String,

    #[arg(short, long, default_value = "")]
    pub description: String,

    #[arg(short, long)]
    pub category: Option<String>,

    #[arg(short, long, value_enum, ignore_case = true, default_value_t = Priority::Medium)]
    pub priority: Priority,

    /// Due date (RFC 3339, "YYYY-MM-DD HH:MM:SS" or "YYYY-MM-DD")
    #[arg(long, value_parser = parse_timestamp)]
    pub due: Option<DateTime<Utc>>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(short, long)]
    pub category: Option<String>,

    /// Only todos whose title or description contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    #[arg(long, value_enum, default_value_t = StatusFilter::All)]
    pub status: StatusFilter,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_enum, ignore_case = true)]
    pub priority: Option<Priority>,

    #[arg(long, value_parser = parse_timestamp, conflicts_with = "clear_due")]
    pub due: Option<DateTime<Utc>>,

    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,

    #[arg(long)]
    pub completed: Option<bool>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub query: String,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(short, long)]
    pub category: Option<String>,
}
