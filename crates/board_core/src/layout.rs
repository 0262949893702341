use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared::domain::ColumnId;

use crate::error::BoardError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Static, ordered column configuration. Not derived from task data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    columns: Vec<Column>,
}

impl BoardLayout {
    pub fn new(columns: Vec<Column>) -> Result<Self, BoardError> {
        if columns.is_empty() {
            return Err(BoardError::EmptyLayout);
        }
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(&column.id) {
                return Err(BoardError::DuplicateColumn(column.id.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn contains(&self, id: &ColumnId) -> bool {
        self.columns.iter().any(|c| &c.id == id)
    }

    pub fn get(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            columns: vec![
                Column::new(ColumnId::not_started(), "Not Started"),
                Column::new(ColumnId::in_progress(), "In Progress"),
                Column::new(ColumnId::on_hold(), "On Hold"),
                Column::new(ColumnId::completed(), "Completed"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_finds_configured_columns_only() {
        let layout = BoardLayout::default();
        assert_eq!(
            layout.get(&ColumnId::on_hold()).map(|c| c.title.as_str()),
            Some("On Hold")
        );
        assert!(layout.get(&ColumnId::new("archived")).is_none());
    }

    #[test]
    fn default_layout_has_standard_columns_in_order() {
        let layout = BoardLayout::default();
        let ids: Vec<_> = layout.columns().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["not_started", "in_progress", "on_hold", "completed"]);
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = BoardLayout::new(vec![
            Column::new("todo", "Todo"),
            Column::new("todo", "Todo again"),
        ])
        .expect_err("duplicate");
        assert!(matches!(err, BoardError::DuplicateColumn(id) if id.as_str() == "todo"));
    }

    #[test]
    fn rejects_empty_layout() {
        assert!(matches!(BoardLayout::new(Vec::new()), Err(BoardError::EmptyLayout)));
    }
}
