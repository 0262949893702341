use std::sync::Arc;

use parking_lot::Mutex;
use shared::{
    domain::{ColumnId, TaskId},
    protocol::{NewTask, TaskPatch, TaskRecord},
};
use tokio::{runtime::Handle, sync::broadcast, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    api::{BoardContext, TaskApi},
    error::BoardError,
    layout::BoardLayout,
    session::DragSession,
    store::TaskStore,
    view::{BoardView, TaskFilter},
};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    DragStarted {
        task_id: TaskId,
    },
    DragEnded,
    StatusCommitted {
        task_id: TaskId,
        status: ColumnId,
    },
    StatusRolledBack {
        task_id: TaskId,
        attempted: ColumnId,
        restored: ColumnId,
        reason: String,
    },
    TasksReloaded {
        count: usize,
    },
}

#[derive(Debug)]
pub enum DropOutcome {
    /// No drag was in progress.
    NotDragging,
    /// The target is not a configured column; treated as a drop outside the board.
    OutsideBoard,
    /// The dragged task vanished from the collection before the drop.
    StaleItem,
    /// The task already has the target status.
    SameColumn,
    /// Applied locally; the remote update is in flight.
    Dispatched(StatusUpdateHandle),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSettlement {
    Committed,
    RolledBack {
        /// False when the task had already left the collection.
        restored: bool,
        reason: String,
    },
    /// The update task never reported back (runtime shutdown or panic).
    Abandoned,
}

/// Tracks one in-flight status update. Dropping it does not cancel the update.
#[derive(Debug)]
pub struct StatusUpdateHandle {
    task_id: TaskId,
    previous: ColumnId,
    join: JoinHandle<StatusSettlement>,
}

impl StatusUpdateHandle {
    pub fn previous(&self) -> &ColumnId {
        &self.previous
    }

    pub async fn settled(self) -> StatusSettlement {
        match self.join.await {
            Ok(settlement) => settlement,
            Err(error) => {
                warn!(task_id = %self.task_id, %error, "board: status update task did not finish");
                StatusSettlement::Abandoned
            }
        }
    }
}

struct BoardState {
    store: TaskStore,
    session: DragSession,
    context: BoardContext,
    fetch_generation: u64,
}

/// Owns the task collection and the drag session for one board.
///
/// Gesture handlers (`begin_drag`, `enter_column`, `leave_column`, `drag_over`,
/// `end_drag`, `drop_on`) are synchronous and take effect immediately, from any
/// thread. Only the remote status update suspends; it is spawned onto the
/// runtime captured at construction, so the gesture never waits on the
/// network. A failed update restores the status captured when the drop was
/// applied.
///
/// Two drops on the same task while the first update is still in flight are not
/// serialized: each update rolls back to its own captured status, and whichever
/// response arrives last decides the local value.
#[derive(Clone)]
pub struct StatusBoardController {
    api: Arc<dyn TaskApi>,
    layout: Arc<BoardLayout>,
    state: Arc<Mutex<BoardState>>,
    events: broadcast::Sender<BoardEvent>,
    runtime: Handle,
}

impl StatusBoardController {
    /// Builds a controller bound to the current Tokio runtime.
    pub fn new(api: Arc<dyn TaskApi>, layout: BoardLayout) -> Result<Self, BoardError> {
        let runtime = Handle::try_current().map_err(|_| BoardError::NoRuntime)?;
        Ok(Self::with_runtime(api, layout, runtime))
    }

    /// Builds a controller whose status updates run on `runtime`, for callers
    /// (UI event loops) that live outside it.
    pub fn with_runtime(api: Arc<dyn TaskApi>, layout: BoardLayout, runtime: Handle) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            layout: Arc::new(layout),
            state: Arc::new(Mutex::new(BoardState {
                store: TaskStore::default(),
                session: DragSession::default(),
                context: BoardContext::default(),
                fetch_generation: 0,
            })),
            events,
            runtime,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn context(&self) -> BoardContext {
        self.state.lock().context.clone()
    }

    pub fn tasks(&self) -> Vec<TaskRecord> {
        self.state.lock().store.to_vec()
    }

    pub fn task(&self, task_id: &TaskId) -> Option<TaskRecord> {
        self.state.lock().store.get(task_id).cloned()
    }

    pub fn drag_session(&self) -> DragSession {
        self.state.lock().session.clone()
    }

    pub fn view(&self, filter: &TaskFilter) -> BoardView {
        let state = self.state.lock();
        BoardView::build(&self.layout, &state.store, &state.session, filter)
    }

    pub fn begin_drag(&self, task_id: &TaskId) -> Result<(), BoardError> {
        {
            let mut state = self.state.lock();
            if !state.store.contains(task_id) {
                return Err(BoardError::UnknownTask(task_id.clone()));
            }
            state.session.begin(task_id.clone());
        }
        debug!(%task_id, "board: drag started");
        self.emit(BoardEvent::DragStarted {
            task_id: task_id.clone(),
        });
        Ok(())
    }

    /// Ends the gesture on every path: drop, drop outside the board, cancel.
    pub fn end_drag(&self) {
        let was_active = {
            let mut state = self.state.lock();
            let was_active = !state.session.is_clear();
            state.session.clear();
            was_active
        };
        if was_active {
            self.emit(BoardEvent::DragEnded);
        }
    }

    pub fn enter_column(&self, column: &ColumnId) {
        self.state.lock().session.enter(column);
    }

    pub fn leave_column(&self, column: &ColumnId) {
        self.state.lock().session.leave(column);
    }

    /// Whether the column under the pointer should accept the drop. Never
    /// changes state.
    pub fn drag_over(&self) -> bool {
        self.state.lock().session.is_dragging()
    }

    /// Moves the dragged task to `column`.
    ///
    /// The new status is in the store before this returns; the remote update is
    /// spawned onto the controller's runtime.
    pub fn drop_on(&self, column: &ColumnId) -> DropOutcome {
        let applied = {
            let mut state = self.state.lock();
            let Some(task_id) = state.session.dragged().cloned() else {
                // Stray hover bookkeeping without a drag still ends here.
                state.session.clear();
                return DropOutcome::NotDragging;
            };
            // The session clears before the network round-trip, whatever happens next.
            state.session.clear();

            match state.store.status_of(&task_id).cloned() {
                None => {
                    debug!(%task_id, "board: dragged task no longer present");
                    Err(DropOutcome::StaleItem)
                }
                Some(current) if &current == column => Err(DropOutcome::SameColumn),
                Some(_) if !self.layout.contains(column) => {
                    debug!(%task_id, %column, "board: drop outside any column");
                    Err(DropOutcome::OutsideBoard)
                }
                Some(current) => {
                    state.store.set_status(&task_id, column.clone());
                    Ok((task_id, current))
                }
            }
        };
        self.emit(BoardEvent::DragEnded);
        let (task_id, previous) = match applied {
            Ok(applied) => applied,
            Err(outcome) => return outcome,
        };
        debug!(%task_id, from = %previous, to = %column, "board: optimistic status change");

        let join = self.runtime.spawn(self.clone().send_status_change(
            task_id.clone(),
            previous.clone(),
            column.clone(),
        ));
        DropOutcome::Dispatched(StatusUpdateHandle {
            task_id,
            previous,
            join,
        })
    }

    async fn send_status_change(
        self,
        task_id: TaskId,
        previous: ColumnId,
        target: ColumnId,
    ) -> StatusSettlement {
        let result = match self.api.update_status(&task_id, &target).await {
            Ok(ack) if ack.success => Ok(()),
            Ok(_) => Err(BoardError::Rejected(task_id.clone())),
            Err(error) => Err(error),
        };

        match result {
            Ok(()) => {
                info!(%task_id, status = %target, "board: status change confirmed");
                self.emit(BoardEvent::StatusCommitted {
                    task_id,
                    status: target,
                });
                StatusSettlement::Committed
            }
            Err(error) => {
                let restored = self
                    .state
                    .lock()
                    .store
                    .set_status(&task_id, previous.clone())
                    .is_some();
                warn!(
                    %task_id,
                    attempted = %target,
                    restored_to = %previous,
                    restored,
                    %error,
                    "board: status change failed; rolled back"
                );
                let reason = error.to_string();
                self.emit(BoardEvent::StatusRolledBack {
                    task_id,
                    attempted: target,
                    restored: previous,
                    reason: reason.clone(),
                });
                StatusSettlement::RolledBack { restored, reason }
            }
        }
    }

    /// Switches tenant or user and reloads the whole collection.
    ///
    /// The previous context's tasks leave the board as soon as the switch
    /// starts, so a failed fetch leaves it empty rather than showing them under
    /// the new context.
    pub async fn switch_context(&self, context: BoardContext) -> Result<usize, BoardError> {
        let (generation, was_dragging, cleared) = {
            let mut state = self.state.lock();
            state.context = context.clone();
            let was_dragging = !state.session.is_clear();
            state.session.clear();
            let cleared = !state.store.is_empty();
            state.store.replace_all(Vec::new());
            state.fetch_generation += 1;
            (state.fetch_generation, was_dragging, cleared)
        };
        info!(
            user_id = ?context.user_id,
            organization_id = ?context.organization_id,
            "board: context switched"
        );
        if was_dragging {
            self.emit(BoardEvent::DragEnded);
        }
        if cleared {
            self.emit(BoardEvent::TasksReloaded { count: 0 });
        }
        self.load(context, generation).await
    }

    pub async fn refresh(&self) -> Result<usize, BoardError> {
        let (context, generation) = {
            let mut state = self.state.lock();
            state.fetch_generation += 1;
            (state.context.clone(), state.fetch_generation)
        };
        self.load(context, generation).await
    }

    /// Replaces the collection with tasks obtained elsewhere. Any fetch still
    /// in flight is discarded when it lands.
    pub fn load_tasks(&self, tasks: Vec<TaskRecord>) -> usize {
        let count = {
            let mut state = self.state.lock();
            state.fetch_generation += 1;
            state.store.replace_all(tasks);
            state.store.len()
        };
        self.emit(BoardEvent::TasksReloaded { count });
        count
    }

    async fn load(&self, context: BoardContext, generation: u64) -> Result<usize, BoardError> {
        let tasks = self.api.list_tasks(&context).await?;
        let count = {
            let mut state = self.state.lock();
            if state.fetch_generation != generation {
                debug!(generation, current = state.fetch_generation, "board: dropping stale task list");
                return Err(BoardError::Superseded);
            }
            state.store.replace_all(tasks);
            state.store.len()
        };
        info!(count, "board: tasks reloaded");
        self.emit(BoardEvent::TasksReloaded { count });
        Ok(count)
    }

    pub async fn create_task(&self, mut task: NewTask) -> Result<TaskRecord, BoardError> {
        if task.organization_id.is_none() {
            task.organization_id = self.state.lock().context.organization_id.clone();
        }
        let created = self.api.create_task(&task).await?;
        info!(task_id = %created.id, "board: task created");
        self.reload_after_mutation().await;
        Ok(created)
    }

    pub async fn update_task(
        &self,
        task_id: &TaskId,
        patch: TaskPatch,
    ) -> Result<TaskRecord, BoardError> {
        let updated = self.api.update_task(task_id, &patch).await?;
        info!(%task_id, "board: task updated");
        self.reload_after_mutation().await;
        Ok(updated)
    }

    pub async fn delete_task(&self, task_id: &TaskId) -> Result<(), BoardError> {
        self.api.delete_task(task_id).await?;
        info!(%task_id, "board: task deleted");
        self.reload_after_mutation().await;
        Ok(())
    }

    // The mutation itself already succeeded; a failed reload only leaves the
    // board stale until the next refresh.
    async fn reload_after_mutation(&self) {
        match self.refresh().await {
            Ok(_) | Err(BoardError::Superseded) => {}
            Err(error) => warn!(%error, "board: reload after mutation failed"),
        }
    }

    fn emit(&self, event: BoardEvent) {
        let _ = self.events.send(event);
    }
}
