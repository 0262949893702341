//! Read model handed to renderers. Rebuilt from the store on every call and
//! never written back.

use shared::{
    domain::{ColumnId, Priority, TaskId, UserId},
    protocol::TaskRecord,
};

use crate::{layout::BoardLayout, layout::Column, session::DragSession, store::TaskStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub priority: Option<Priority>,
    pub assignee: Option<UserId>,
}

impl TaskFilter {
    pub fn matches(&self, task: &TaskRecord) -> bool {
        if let Some(priority) = self.priority {
            if task.priority != Some(priority) {
                return false;
            }
        }
        if let Some(assignee) = &self.assignee {
            if task.assignee_id.as_ref() != Some(assignee) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                task.title.to_lowercase().contains(&needle)
                    || task
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub column: Column,
    pub tasks: Vec<TaskRecord>,
    pub count: usize,
    pub estimated_hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
    /// Tasks whose status matches no configured column.
    pub unplaced: Vec<TaskRecord>,
    pub hovered: Option<ColumnId>,
    pub dragged: Option<TaskId>,
}

impl BoardView {
    pub fn build(
        layout: &BoardLayout,
        store: &TaskStore,
        session: &DragSession,
        filter: &TaskFilter,
    ) -> Self {
        let mut columns: Vec<ColumnView> = layout
            .columns()
            .iter()
            .map(|column| ColumnView {
                column: column.clone(),
                tasks: Vec::new(),
                count: 0,
                estimated_hours: 0.0,
            })
            .collect();
        let mut unplaced = Vec::new();

        for task in store.iter().filter(|task| filter.matches(task)) {
            match columns.iter_mut().find(|view| view.column.id == task.status) {
                Some(view) => {
                    view.count += 1;
                    view.estimated_hours += task.estimated_hours.unwrap_or(0.0);
                    view.tasks.push(task.clone());
                }
                None => unplaced.push(task.clone()),
            }
        }

        Self {
            columns,
            unplaced,
            hovered: session.hovered().cloned(),
            dragged: session.dragged().cloned(),
        }
    }

    pub fn column(&self, id: &ColumnId) -> Option<&ColumnView> {
        self.columns.iter().find(|view| &view.column.id == id)
    }

    pub fn total_count(&self) -> usize {
        self.columns.iter().map(|view| view.count).sum()
    }

    pub fn status_of(&self, task_id: &TaskId) -> Option<&ColumnId> {
        self.columns
            .iter()
            .flat_map(|view| view.tasks.iter())
            .chain(self.unplaced.iter())
            .find(|task| &task.id == task_id)
            .map(|task| &task.status)
    }
}
