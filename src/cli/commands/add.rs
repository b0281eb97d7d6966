//! Add command implementation.

use crate::cli::AddArgs;
use crate::error::{Result, TodoError};
use crate::format::{OutputContext, format_todo_line};
use crate::model::NewTodo;
use crate::storage::TodoStore;
use crate::validation::validate_new;
use tracing::info;

/// Execute the add command.
///
/// # Errors
///
/// Returns a validation error for bad input, or a storage error.
pub fn execute(args: &AddArgs, store: &mut dyn TodoStore, ctx: &OutputContext) -> Result<()> {
    let mut new = NewTodo::new(args.title.trim())
        .description(args.description.trim())
        .priority(args.priority)
        .due(args.due);
    if let Some(category) = &args.category {
        new = new.category(category.trim());
    }
    validate_new(&new)?;

    let id = store.create(&new)?;
    info!(id, backend = %store.backend(), "Added todo");

    let todo = store
        .fetch_by_id(id)?
        .ok_or(TodoError::TodoNotFound { id })?;

    if ctx.is_json() {
        ctx.json_pretty(&todo);
    } else {
        ctx.message(&format!("Created todo #{id}"));
        ctx.line(&format_todo_line(&todo, ctx.width()));
    }
    Ok(())
}
