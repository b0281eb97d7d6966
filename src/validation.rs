//! Caller-side input checks.
//!
//! The stores persist whatever they are given; the host runs these before
//! calling `create`/`update`.

use crate::error::{Result, TodoError};
use crate::model::{NewTodo, TodoPatch};

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Validate creation input.
///
/// # Errors
///
/// Returns [`TodoError::Validation`] naming the first offending field.
pub fn validate_new(new: &NewTodo) -> Result<()> {
    validate_title(&new.title)?;
    validate_description(&new.description)
}

/// Validate the fields present in a patch.
///
/// # Errors
///
/// Returns [`TodoError::Validation`] naming the first offending field.
pub fn validate_patch(patch: &TodoPatch) -> Result<()> {
    if let Some(ref title) = patch.title {
        validate_title(title)?;
    }
    if let Some(ref description) = patch.description {
        validate_description(description)?;
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TodoError::validation("title", "title cannot be empty"));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(TodoError::validation(
            "title",
            format!("title is {len} characters (max {MAX_TITLE_CHARS})"),
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<()> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_CHARS {
        return Err(TodoError::validation(
            "description",
            format!("description is {len} characters (max {MAX_DESCRIPTION_CHARS})"),
        ));
    }
    Ok(())
}
