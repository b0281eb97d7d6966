//! Toggle command implementation.

use crate::cli::IdArgs;
use crate::error::{Result, TodoError};
use crate::format::{OutputContext, format_todo_line};
use crate::storage::TodoStore;

/// Execute the toggle command.
///
/// # Errors
///
/// Returns [`TodoError::TodoNotFound`] if no todo has the id.
pub fn execute(args: &IdArgs, store: &mut dyn TodoStore, ctx: &OutputContext) -> Result<()> {
    let id = args.id;
    let completed = store
        .toggle_completed(id)?
        .ok_or(TodoError::TodoNotFound { id })?;

    let todo = store
        .fetch_by_id(id)?
        .ok_or(TodoError::TodoNotFound { id })?;

    if ctx.is_json() {
        ctx.json_pretty(&todo);
    } else {
        let state = if completed { "completed" } else { "active" };
        ctx.message(&format!("Marked todo #{id} {state}"));
        ctx.line(&format_todo_line(&todo, ctx.width()));
    }
    Ok(())
}
