//! Show command implementation.

use crate::cli::IdArgs;
use crate::error::{Result, TodoError};
use crate::format::{OutputContext, format_todo_details};
use crate::storage::TodoStore;

/// Execute the show command.
///
/// # Errors
///
/// Returns [`TodoError::TodoNotFound`] if no todo has the id.
pub fn execute(args: &IdArgs, store: &mut dyn TodoStore, ctx: &OutputContext) -> Result<()> {
    let todo = store
        .fetch_by_id(args.id)?
        .ok_or(TodoError::TodoNotFound { id: args.id })?;

    if ctx.is_json() {
        ctx.json_pretty(&todo);
    } else {
        ctx.line(&format_todo_details(&todo));
    }
    Ok(())
}
