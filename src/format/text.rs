//! Plain-text rendering of todos.

use crate::model::{Priority, Todo, TodoStats};
use crate::util::time::format_timestamp;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const DEFAULT_WIDTH: usize = 80;
const MIN_TITLE_WIDTH: usize = 10;

/// Terminal width from `COLUMNS`, falling back to 80.
#[must_use]
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&w| w > 0)
        .unwrap_or(DEFAULT_WIDTH)
        .max(DEFAULT_WIDTH)
}

/// Truncate to at most `max_width` display columns, ending in `…` when cut.
#[must_use]
pub fn truncate_title(title: &str, max_width: usize) -> String {
    if title.width() <= max_width {
        return title.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in title.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

#[must_use]
pub const fn format_priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "[H]",
        Priority::Medium => "[M]",
        Priority::Low => "[L]",
    }
}

#[must_use]
pub const fn format_status_icon(completed: bool) -> &'static str {
    if completed { "✓" } else { "○" }
}

/// One-line summary: `○ #12 [H] Title (Work) due 2025-01-01`.
#[must_use]
pub fn format_todo_line(todo: &Todo, width: usize) -> String {
    let prefix = format!(
        "{} #{} {} ",
        format_status_icon(todo.completed),
        todo.id,
        format_priority_badge(todo.priority)
    );
    let suffix = match todo.due_date {
        Some(due) => format!(" ({}) due {}", todo.category, due.format("%Y-%m-%d")),
        None => format!(" ({})", todo.category),
    };

    let room = width
        .saturating_sub(prefix.width() + suffix.width())
        .max(MIN_TITLE_WIDTH);
    format!("{prefix}{}{suffix}", truncate_title(&todo.title, room))
}

/// Multi-line detail view used by `show`.
#[must_use]
pub fn format_todo_details(todo: &Todo) -> String {
    let mut out = format!(
        "#{} {}\n  status:    {}\n  priority:  {}\n  category:  {}\n",
        todo.id,
        todo.title,
        if todo.completed { "completed" } else { "active" },
        todo.priority,
        todo.category,
    );
    if let Some(due) = todo.due_date {
        out.push_str(&format!("  due:       {}\n", format_timestamp(&due)));
    }
    if !todo.description.is_empty() {
        out.push_str(&format!("  notes:     {}\n", todo.description));
    }
    out.push_str(&format!(
        "  created:   {}\n  updated:   {}",
        format_timestamp(&todo.created_at),
        format_timestamp(&todo.updated_at)
    ));
    out
}

#[must_use]
pub fn format_stats(stats: &TodoStats) -> String {
    format!(
        "total: {}  active: {}  completed: {}",
        stats.total, stats.active, stats.completed
    )
}
