//! Drag-gesture bookkeeping.
//!
//! Nested elements inside a column fire their own enter/leave pairs while the
//! pointer moves, so hover is tracked with a per-column depth counter rather
//! than a flag: the highlight only clears once every enter has been matched by
//! a leave.

use std::collections::HashMap;

use shared::domain::{ColumnId, TaskId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSession {
    dragged: Option<TaskId>,
    hovered: Option<ColumnId>,
    depths: HashMap<ColumnId, u32>,
}

impl DragSession {
    pub fn dragged(&self) -> Option<&TaskId> {
        self.dragged.as_ref()
    }

    pub fn hovered(&self) -> Option<&ColumnId> {
        self.hovered.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    pub fn depth(&self, column: &ColumnId) -> u32 {
        self.depths.get(column).copied().unwrap_or(0)
    }

    /// True when nothing is dragged, nothing hovered and every counter is zero.
    pub fn is_clear(&self) -> bool {
        self.dragged.is_none() && self.hovered.is_none() && self.depths.values().all(|d| *d == 0)
    }

    pub(crate) fn begin(&mut self, task_id: TaskId) {
        self.dragged = Some(task_id);
    }

    pub(crate) fn enter(&mut self, column: &ColumnId) {
        *self.depths.entry(column.clone()).or_insert(0) += 1;
        self.hovered = Some(column.clone());
    }

    pub(crate) fn leave(&mut self, column: &ColumnId) {
        let remaining = match self.depths.get_mut(column) {
            Some(depth) => {
                *depth = depth.saturating_sub(1);
                *depth
            }
            None => 0,
        };
        if remaining == 0 {
            self.depths.remove(column);
            // Pointer may already be over a sibling column; keep that highlight.
            if self.hovered.as_ref() == Some(column) {
                self.hovered = None;
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.dragged = None;
        self.hovered = None;
        self.depths.clear();
    }
}
