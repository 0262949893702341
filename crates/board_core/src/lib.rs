//! Client-side core of the task board: the item collection, drag-gesture
//! bookkeeping and optimistic status changes against the task REST API.

pub mod api;
pub mod controller;
pub mod error;
pub mod layout;
pub mod session;
pub mod store;
pub mod view;

pub use api::{BoardContext, HttpTaskApi, TaskApi};
pub use controller::{
    BoardEvent, DropOutcome, StatusBoardController, StatusSettlement, StatusUpdateHandle,
};
pub use error::BoardError;
pub use layout::{BoardLayout, Column};
pub use session::DragSession;
pub use store::TaskStore;
pub use view::{BoardView, ColumnView, TaskFilter};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
