//! Stats command implementation.

use crate::cli::StatsArgs;
use crate::error::Result;
use crate::format::{OutputContext, format_stats};
use crate::model::TodoQuery;
use crate::storage::TodoStore;

/// Execute the stats command.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute(args: &StatsArgs, store: &mut dyn TodoStore, ctx: &OutputContext) -> Result<()> {
    let query = TodoQuery {
        category: args.category.clone(),
        ..TodoQuery::default()
    };
    let stats = store.stats(&query)?;

    if ctx.is_json() {
        ctx.json_pretty(&stats);
    } else {
        ctx.line(&format_stats(&stats));
    }
    Ok(())
}
