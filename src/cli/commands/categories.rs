//! Categories command implementation.

use crate::error::Result;
use crate::format::OutputContext;
use crate::storage::TodoStore;

/// Execute the categories command.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute(store: &mut dyn TodoStore, ctx: &OutputContext) -> Result<()> {
    let categories = store.list_categories()?;

    if ctx.is_json() {
        ctx.json_pretty(&categories);
    } else if categories.is_empty() {
        ctx.message("No categories yet.");
    } else {
        for category in &categories {
            ctx.line(category);
        }
    }
    Ok(())
}
