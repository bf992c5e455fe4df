// src/task/core.rs

//! Shared per-task bookkeeping: identity, priority, retry budget,
//! dependencies, lifecycle subscribers and the progress shadow.

use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::TaskError;
use crate::task::protocol::Task;
use crate::task::status::TaskStatus;

/// Process-wide unique task identity, monotonically assigned.
pub type TaskId = u64;

/// Progress deltas below this threshold do not fire the progress event.
pub(crate) const PROGRESS_EPSILON: f32 = 1e-3;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed)
}

/// A precondition reference held by a dependent task.
///
/// The weak handle avoids keeping prerequisites alive just because someone
/// depends on them; a dropped prerequisite simply never satisfies the gate.
pub struct Dependency {
    pub id: TaskId,
    pub task: Weak<RefCell<dyn Task>>,
}

/// Lifecycle subscriber slots. Subscription is append-only; `clear` drops
/// everything at once when a task goes back to the pool.
#[derive(Default)]
pub struct TaskEvents {
    started: Vec<Box<dyn FnMut(TaskId)>>,
    completed: Vec<Box<dyn FnMut(TaskId)>>,
    failed: Vec<Box<dyn FnMut(TaskId, &TaskError)>>,
    cancelled: Vec<Box<dyn FnMut(TaskId)>>,
    progress: Vec<Box<dyn FnMut(TaskId, f32)>>,
}

impl TaskEvents {
    fn clear(&mut self) {
        self.started.clear();
        self.completed.clear();
        self.failed.clear();
        self.cancelled.clear();
        self.progress.clear();
    }
}

/// State every task carries regardless of kind.
pub struct TaskCore {
    id: TaskId,
    pub(crate) status: TaskStatus,
    pub(crate) priority: i32,
    pub(crate) max_retries: u32,
    pub(crate) retries_used: u32,
    pub(crate) dependencies: Vec<Dependency>,
    /// Last value delivered to progress subscribers, used for debouncing.
    pub(crate) last_progress: f32,
    events: TaskEvents,
}

impl TaskCore {
    pub fn new() -> Self {
        Self {
            id: next_task_id(),
            status: TaskStatus::Pending,
            priority: 0,
            max_retries: 0,
            retries_used: 0,
            dependencies: Vec::new(),
            last_progress: 0.0,
            events: TaskEvents::default(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Whether every prerequisite has reached `Completed`.
    ///
    /// A dropped prerequisite, or one currently borrowed (a task gated on
    /// itself through a shared handle), counts as unmet.
    pub fn dependencies_met(&self) -> bool {
        self.dependencies.iter().all(|dep| match dep.task.upgrade() {
            Some(task) => match task.try_borrow() {
                Ok(task) => task.status() == TaskStatus::Completed,
                Err(_) => false,
            },
            None => false,
        })
    }

    // --- subscriptions -----------------------------------------------------

    pub fn on_started(&mut self, cb: impl FnMut(TaskId) + 'static) {
        self.events.started.push(Box::new(cb));
    }

    pub fn on_completed(&mut self, cb: impl FnMut(TaskId) + 'static) {
        self.events.completed.push(Box::new(cb));
    }

    pub fn on_failed(&mut self, cb: impl FnMut(TaskId, &TaskError) + 'static) {
        self.events.failed.push(Box::new(cb));
    }

    pub fn on_cancelled(&mut self, cb: impl FnMut(TaskId) + 'static) {
        self.events.cancelled.push(Box::new(cb));
    }

    pub fn on_progress(&mut self, cb: impl FnMut(TaskId, f32) + 'static) {
        self.events.progress.push(Box::new(cb));
    }

    // --- event dispatch (synchronous, on the ticking thread) ---------------

    pub(crate) fn fire_started(&mut self) {
        let id = self.id;
        for cb in self.events.started.iter_mut() {
            cb(id);
        }
    }

    pub(crate) fn fire_completed(&mut self) {
        let id = self.id;
        for cb in self.events.completed.iter_mut() {
            cb(id);
        }
    }

    pub(crate) fn fire_failed(&mut self, cause: &TaskError) {
        let id = self.id;
        for cb in self.events.failed.iter_mut() {
            cb(id, cause);
        }
    }

    pub(crate) fn fire_cancelled(&mut self) {
        let id = self.id;
        for cb in self.events.cancelled.iter_mut() {
            cb(id);
        }
    }

    pub(crate) fn fire_progress(&mut self, progress: f32) {
        let id = self.id;
        for cb in self.events.progress.iter_mut() {
            cb(id, progress);
        }
    }

    /// Restore the recyclable state the pool expects: priority 0, no
    /// dependencies, no subscribers. Identity is preserved.
    pub(crate) fn strip(&mut self) {
        self.priority = 0;
        self.max_retries = 0;
        self.dependencies.clear();
        self.events.clear();
    }
}

impl Default for TaskCore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskCore")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("priority", &self.priority)
            .field("retries", &format_args!("{}/{}", self.retries_used, self.max_retries))
            .field("dependencies", &self.dependencies.len())
            .finish_non_exhaustive()
    }
}
