use shared::{
    domain::{ColumnId, TaskId},
    error::ApiError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("task {0} is not on the board")]
    UnknownTask(TaskId),
    #[error("column {0} is configured more than once")]
    DuplicateColumn(ColumnId),
    #[error("board layout must define at least one column")]
    EmptyLayout,
    #[error("invalid task api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("task api request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("task api returned status {status}")]
    Status { status: u16 },
    #[error("task api returned status {status}: {error}")]
    Api { status: u16, error: ApiError },
    #[error("task api rejected the status change for task {0}")]
    Rejected(TaskId),
    #[error("failed to decode task api response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("task list response superseded by a newer fetch")]
    Superseded,
    #[error("no tokio runtime available to send status updates")]
    NoRuntime,
}

impl BoardError {
    /// Status code for failures that came back from the server.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } | Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
