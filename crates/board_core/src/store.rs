use std::collections::HashMap;

use shared::{
    domain::{ColumnId, TaskId},
    protocol::TaskRecord,
};

/// The board's item collection, in the order the server returned it.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<TaskRecord>,
    index: HashMap<TaskId, usize>,
}

impl TaskStore {
    pub fn new(tasks: Vec<TaskRecord>) -> Self {
        let mut store = Self::default();
        store.replace_all(tasks);
        store
    }

    /// Swap in a freshly fetched collection. A repeated id keeps its first
    /// position and its last payload.
    pub fn replace_all(&mut self, tasks: Vec<TaskRecord>) {
        self.tasks.clear();
        self.index.clear();
        for task in tasks {
            match self.index.get(&task.id) {
                Some(&pos) => self.tasks[pos] = task,
                None => {
                    self.index.insert(task.id.clone(), self.tasks.len());
                    self.tasks.push(task);
                }
            }
        }
    }

    pub fn get(&self, task_id: &TaskId) -> Option<&TaskRecord> {
        self.index.get(task_id).map(|&pos| &self.tasks[pos])
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.index.contains_key(task_id)
    }

    pub fn status_of(&self, task_id: &TaskId) -> Option<&ColumnId> {
        self.get(task_id).map(|task| &task.status)
    }

    /// Returns the previous status, or `None` when the task is gone.
    pub fn set_status(&mut self, task_id: &TaskId, status: ColumnId) -> Option<ColumnId> {
        let pos = *self.index.get(task_id)?;
        Some(std::mem::replace(&mut self.tasks[pos].status, status))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn to_vec(&self) -> Vec<TaskRecord> {
        self.tasks.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_status_returns_previous_value() {
        let mut store = TaskStore::new(vec![TaskRecord::new("a", "not_started", "Draft")]);
        let previous = store.set_status(&TaskId::new("a"), ColumnId::completed());

        assert_eq!(previous, Some(ColumnId::not_started()));
        assert_eq!(store.status_of(&TaskId::new("a")), Some(&ColumnId::completed()));
        assert_eq!(store.set_status(&TaskId::new("missing"), ColumnId::completed()), None);
    }

    #[test]
    fn replace_all_collapses_duplicate_ids() {
        let store = TaskStore::new(vec![
            TaskRecord::new("a", "not_started", "first"),
            TaskRecord::new("b", "in_progress", "other"),
            TaskRecord::new("a", "on_hold", "second"),
        ]);

        assert_eq!(store.len(), 2);
        let ids: Vec<_> = store.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(store.get(&TaskId::new("a")).map(|t| t.title.as_str()), Some("second"));
    }

    #[test]
    fn replace_all_drops_previous_collection() {
        let mut store = TaskStore::new(vec![TaskRecord::new("a", "not_started", "old")]);
        store.replace_all(vec![TaskRecord::new("z", "completed", "new")]);

        assert!(!store.contains(&TaskId::new("a")));
        assert!(store.contains(&TaskId::new("z")));
    }
}
