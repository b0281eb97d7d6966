//! Command implementations.
//!
//! Every command receives the opened store and the output context; opening,
//! initializing and closing the store happen in [`run`].

pub mod add;
pub mod categories;
pub mod delete;
pub mod edit;
pub mod list;
pub mod show;
pub mod stats;
pub mod toggle;

use crate::cli::{Cli, Commands};
use crate::config::{self, CliOverrides, StoreConfig};
use crate::error::Result;
use crate::format::OutputContext;
use crate::storage::{TodoStore, open_store};
use tracing::debug;

/// Resolve configuration, open the store, run the command and close the store.
///
/// # Errors
///
/// Returns the first error from configuration, the command, or closing.
pub fn run(cli: &Cli, ctx: &OutputContext) -> Result<()> {
    let data_dir = config::resolve_data_dir(cli.dir.as_deref())?;
    let overrides = CliOverrides {
        backend: cli.backend,
        db: cli.db.clone(),
        kv_dir: cli.kv_dir.clone(),
    };
    let store_config = StoreConfig::load(&data_dir, &overrides)?;
    debug!(
        data_dir = %data_dir.display(),
        backend = %store_config.backend,
        "Resolved store configuration"
    );

    let mut store = open_store(&store_config);
    store.initialize()?;

    let result = dispatch(&cli.command, store.as_mut(), ctx);
    let closed = store.close();
    result.and(closed)
}

/// Run one command against an open store.
///
/// # Errors
///
/// Returns whatever the command returns.
pub fn dispatch(command: &Commands, store: &mut dyn TodoStore, ctx: &OutputContext) -> Result<()> {
    match command {
        Commands::Add(args) => add::execute(args, store, ctx),
        Commands::List(args) => list::execute(args, store, ctx),
        Commands::Show(args) => show::execute(args, store, ctx),
        Commands::Edit(args) => edit::execute(args, store, ctx),
        Commands::Toggle(args) => toggle::execute(args, store, ctx),
        Commands::Rm(args) => delete::execute(args, store, ctx),
        Commands::Search(args) => list::search(args, store, ctx),
        Commands::Categories => categories::execute(store, ctx),
        Commands::Stats(args) => stats::execute(args, store, ctx),
    }
}
