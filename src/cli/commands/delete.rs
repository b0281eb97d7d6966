//! Delete command implementation.

use crate::cli::IdArgs;
use crate::error::{Result, TodoError};
use crate::format::OutputContext;
use crate::storage::TodoStore;
use serde_json::json;
use tracing::info;

/// Execute the rm command.
///
/// # Errors
///
/// Returns [`TodoError::TodoNotFound`] if nothing was deleted.
pub fn execute(args: &IdArgs, store: &mut dyn TodoStore, ctx: &OutputContext) -> Result<()> {
    if !store.delete(args.id)? {
        return Err(TodoError::TodoNotFound { id: args.id });
    }
    info!(id = args.id, "Deleted todo");

    if ctx.is_json() {
        ctx.json_pretty(&json!({ "deleted": args.id }));
    } else {
        ctx.message(&format!("Deleted todo #{}", args.id));
    }
    Ok(())
}
