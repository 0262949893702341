//! Plain-text rendering of the board read model.

use std::fmt::Write as _;

use board_core::{BoardLayout, BoardView};
use shared::protocol::TaskRecord;

pub fn render_board(view: &BoardView) -> String {
    let mut out = String::new();
    for column in &view.columns {
        let _ = writeln!(
            out,
            "== {} [{}] ({} tasks, {} h)",
            column.column.title,
            column.column.id,
            column.count,
            format_hours(column.estimated_hours)
        );
        for task in &column.tasks {
            let _ = writeln!(out, "  {}", render_task(task));
        }
    }
    if !view.unplaced.is_empty() {
        let _ = writeln!(out, "== Unplaced ({} tasks)", view.unplaced.len());
        for task in &view.unplaced {
            let _ = writeln!(out, "  {} <status: {}>", render_task(task), task.status);
        }
    }
    let _ = write!(out, "total: {}", view.total_count());
    out
}

pub fn render_layout(layout: &BoardLayout) -> String {
    layout
        .columns()
        .iter()
        .map(|column| format!("{}\t{}", column.id, column.title))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_task(task: &TaskRecord) -> String {
    let mut line = format!("- {} {}", task.id, task.title);
    if let Some(priority) = task.priority {
        let _ = write!(line, " !{}", priority.as_str());
    }
    if let Some(hours) = task.estimated_hours {
        let _ = write!(line, " ~{}h", format_hours(hours));
    }
    if let Some(assignee) = &task.assignee_id {
        let _ = write!(line, " @{assignee}");
    }
    line
}

fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        format!("{hours:.1}")
    }
}

#[cfg(test)]
mod tests {
    use board_core::{DragSession, TaskFilter, TaskStore};
    use shared::domain::Priority;

    use super::*;

    #[test]
    fn renders_columns_totals_and_unplaced() {
        let mut urgent = TaskRecord::new("a", "in_progress", "Close books");
        urgent.priority = Some(Priority::Urgent);
        urgent.estimated_hours = Some(1.5);
        let store = TaskStore::new(vec![
            urgent,
            TaskRecord::new("b", "not_started", "Send invoices"),
            TaskRecord::new("c", "blocked", "Chase payment"),
        ]);

        let view = BoardView::build(
            &BoardLayout::default(),
            &store,
            &DragSession::default(),
            &TaskFilter::default(),
        );
        let text = render_board(&view);

        assert!(text.contains("== In Progress [in_progress] (1 tasks, 1.5 h)"));
        assert!(text.contains("- a Close books !urgent ~1.5h"));
        assert!(text.contains("== Unplaced (1 tasks)"));
        assert!(text.contains("<status: blocked>"));
        assert!(text.ends_with("total: 2"));
    }

    #[test]
    fn renders_layout_one_column_per_line() {
        let text = render_layout(&BoardLayout::default());
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("not_started\tNot Started"));
    }
}
