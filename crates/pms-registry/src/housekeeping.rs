//! # Housekeeping Task Queue
//!
//! Rooms landing in `dirty` or `cleaning` enqueue a cleaning task so the
//! housekeeping board picks them up. Enqueueing is idempotent per room and
//! due date: a room with a pending or in-progress task for the date never
//! gets a second one, no matter how many transitions fire.

use std::collections::HashMap;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use pms_core::{HousekeepingTaskId, RoomId, Timestamp};

// ── Tasks ──────────────────────────────────────────────────────────────

/// Where a housekeeping task sits on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Waiting for an attendant.
    Pending,
    /// An attendant is on it.
    InProgress,
    /// Finished.
    Done,
}

impl TaskState {
    /// Whether the task still occupies the room's slot for its due date.
    pub fn is_open(self) -> bool {
        matches!(self, TaskState::Pending | TaskState::InProgress)
    }
}

/// A cleaning assignment for a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HousekeepingTask {
    /// Unique task identifier.
    pub id: HousekeepingTaskId,
    /// Room to clean.
    pub room_id: RoomId,
    /// Room number, for the board display.
    pub room_number: String,
    /// Date the cleaning is due.
    pub due_date: NaiveDate,
    /// Current state on the board.
    pub state: TaskState,
    /// When the task was enqueued.
    pub created_at: Timestamp,
}

/// Result of an enqueue call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// A new task was created.
    Queued(HousekeepingTaskId),
    /// An open task already covers the room and date.
    AlreadyQueued(HousekeepingTaskId),
}

// ── Queue ──────────────────────────────────────────────────────────────

/// Sink for cleaning tasks raised by room transitions.
pub trait HousekeepingQueue: Send + Sync {
    /// Enqueue a cleaning task for the room, due on `due_date`. Idempotent
    /// while an open task for the same room and date exists.
    fn enqueue_cleaning(
        &self,
        room_id: RoomId,
        room_number: &str,
        due_date: NaiveDate,
        now: Timestamp,
    ) -> EnqueueOutcome;
}

/// In-memory queue keyed by room and due date.
#[derive(Debug, Default)]
pub struct InMemoryHousekeepingQueue {
    tasks: Mutex<HashMap<HousekeepingTaskId, HousekeepingTask>>,
}

impl InMemoryHousekeepingQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the task record.
    pub fn get(&self, id: HousekeepingTaskId) -> Option<HousekeepingTask> {
        self.tasks.lock().get(&id).cloned()
    }

    /// Move a task to a new state. Returns `false` for an unknown id.
    pub fn set_state(&self, id: HousekeepingTaskId, state: TaskState) -> bool {
        match self.tasks.lock().get_mut(&id) {
            Some(task) => {
                task.state = state;
                true
            }
            None => false,
        }
    }

    /// Open tasks due on the date, for the board.
    pub fn open_for_date(&self, due_date: NaiveDate) -> Vec<HousekeepingTask> {
        let mut open: Vec<HousekeepingTask> = self
            .tasks
            .lock()
            .values()
            .filter(|t| t.due_date == due_date && t.state.is_open())
            .cloned()
            .collect();
        open.sort_by(|a, b| a.room_number.cmp(&b.room_number));
        open
    }

    /// Number of tasks held, any state.
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Whether the queue holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}

impl HousekeepingQueue for InMemoryHousekeepingQueue {
    fn enqueue_cleaning(
        &self,
        room_id: RoomId,
        room_number: &str,
        due_date: NaiveDate,
        now: Timestamp,
    ) -> EnqueueOutcome {
        let mut tasks = self.tasks.lock();
        if let Some(existing) = tasks
            .values()
            .find(|t| t.room_id == room_id && t.due_date == due_date && t.state.is_open())
        {
            return EnqueueOutcome::AlreadyQueued(existing.id);
        }
        let task = HousekeepingTask {
            id: HousekeepingTaskId::new(),
            room_id,
            room_number: room_number.to_string(),
            due_date,
            state: TaskState::Pending,
            created_at: now,
        };
        let id = task.id;
        tasks.insert(id, task);
        EnqueueOutcome::Queued(id)
    }
}
