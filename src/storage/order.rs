//! Canonical listing order shared by both backends.
//!
//! Keys, most significant first:
//! 1. `completed` ascending (open work first)
//! 2. `priority` descending (high, medium, low)
//! 3. `due_date` ascending, records without a due date last
//! 4. `created_at` descending (newest first)
//! 5. `id` descending, so records created in the same millisecond still
//!    have a total order
//!
//! [`ORDER_BY_SQL`] and [`canonical_cmp`] must stay equivalent.

use crate::model::Todo;
use std::cmp::Ordering;

/// SQL rendering of the canonical order. Timestamps are stored in a
/// fixed-width format, so text comparison is chronological.
pub const ORDER_BY_SQL: &str = "completed ASC, \
     CASE priority WHEN 'high' THEN 3 WHEN 'medium' THEN 2 WHEN 'low' THEN 1 END DESC, \
     due_date IS NULL ASC, \
     due_date ASC, \
     created_at DESC, \
     id DESC";

/// Compare two todos in canonical order.
#[must_use]
pub fn canonical_cmp(a: &Todo, b: &Todo) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// Sort in place in canonical order.
pub fn sort_canonical(todos: &mut [Todo]) {
    todos.sort_by(canonical_cmp);
}
