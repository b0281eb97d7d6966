//! List and search command implementations.

use crate::cli::{ListArgs, SearchArgs};
use crate::error::Result;
use crate::format::{OutputContext, format_todo_line};
use crate::model::{Todo, TodoQuery};
use crate::storage::TodoStore;
use tracing::debug;

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute(args: &ListArgs, store: &mut dyn TodoStore, ctx: &OutputContext) -> Result<()> {
    let query = TodoQuery {
        category: args.category.clone(),
        search: args.search.clone(),
        status: args.status,
    };
    let todos = store.query(&query)?;
    debug!(count = todos.len(), "Listed todos");
    render(&todos, ctx);
    Ok(())
}

/// Execute the search command.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn search(args: &SearchArgs, store: &mut dyn TodoStore, ctx: &OutputContext) -> Result<()> {
    let todos = store.search(&args.query)?;
    render(&todos, ctx);
    Ok(())
}

fn render(todos: &[Todo], ctx: &OutputContext) {
    if ctx.is_json() {
        ctx.json_pretty(todos);
        return;
    }
    if todos.is_empty() {
        ctx.message("No todos found.");
        return;
    }
    for todo in todos {
        ctx.line(&format_todo_line(todo, ctx.width()));
    }
}
