//! Edit command implementation.

use crate::cli::EditArgs;
use crate::error::{Result, TodoError};
use crate::format::{OutputContext, format_todo_line};
use crate::model::TodoPatch;
use crate::storage::{TodoStore, UpdateOutcome};
use crate::validation::validate_patch;
use tracing::info;

/// Build the patch for the flags that were given.
#[must_use]
pub fn patch_from_args(args: &EditArgs) -> TodoPatch {
    let due_date = if args.clear_due {
        Some(None)
    } else {
        args.due.map(Some)
    };

    TodoPatch {
        title: args.title.as_deref().map(|t| t.trim().to_string()),
        description: args.description.as_deref().map(|d| d.trim().to_string()),
        category: args.category.as_deref().map(|c| c.trim().to_string()),
        priority: args.priority,
        due_date,
        completed: args.completed,
    }
}

/// Execute the edit command.
///
/// # Errors
///
/// Returns a validation error for bad input, [`TodoError::TodoNotFound`] for
/// an unknown id, or a storage error.
pub fn execute(args: &EditArgs, store: &mut dyn TodoStore, ctx: &OutputContext) -> Result<()> {
    let patch = patch_from_args(args);
    validate_patch(&patch)?;

    match store.update(args.id, &patch)? {
        UpdateOutcome::NotFound => return Err(TodoError::TodoNotFound { id: args.id }),
        UpdateOutcome::Empty => ctx.message("Nothing to change."),
        UpdateOutcome::Applied => info!(id = args.id, "Edited todo"),
    }

    let todo = store
        .fetch_by_id(args.id)?
        .ok_or(TodoError::TodoNotFound { id: args.id })?;

    if ctx.is_json() {
        ctx.json_pretty(&todo);
    } else {
        ctx.line(&format_todo_line(&todo, ctx.width()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::{quiet, store};
    use crate::model::{NewTodo, Priority};
    use chrono::{TimeZone, Utc};

    fn args(id: i64) -> EditArgs {
        EditArgs {
            id,
            title: None,
            description: None,
            category: None,
            priority: None,
            due: None,
            clear_due: false,
            completed: None,
        }
    }

    #[test]
    fn no_flags_is_empty_patch() {
        assert!(patch_from_args(&args(1)).is_empty());
    }

    #[test]
    fn clear_due_sets_explicit_none() {
        let patch = patch_from_args(&EditArgs {
            clear_due: true,
            ..args(1)
        });
        assert_eq!(patch.due_date, Some(None));
    }

    #[test]
    fn edit_applies_fields() {
        let mut store = store();
        let id = store.create(&NewTodo::new("draft")).unwrap();
        let due = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();

        execute(
            &EditArgs {
                title: Some(" final ".into()),
                priority: Some(Priority::High),
                due: Some(due),
                ..args(id)
            },
            &mut store,
            &quiet(),
        )
        .unwrap();

        let todo = store.fetch_by_id(id).unwrap().unwrap();
        assert_eq!(todo.title, "final");
        assert_eq!(todo.priority, Priority::High);
        assert_eq!(todo.due_date, Some(due));
    }

    #[test]
    fn edit_unknown_id_is_not_found() {
        let mut store = store();
        let err = execute(
            &EditArgs {
                completed: Some(true),
                ..args(42)
            },
            &mut store,
            &quiet(),
        )
        .unwrap_err();
        assert!(matches!(err, TodoError::TodoNotFound { id: 42 }));
    }

    #[test]
    fn edit_rejects_overlong_title() {
        let mut store = store();
        let id = store.create(&NewTodo::new("ok")).unwrap();
        let err = execute(
            &EditArgs {
                title: Some("x".repeat(101)),
                ..args(id)
            },
            &mut store,
            &quiet(),
        )
        .unwrap_err();
        assert!(matches!(err, TodoError::Validation { field: "title", .. }));
    }
}
