// src/pool.rs

//! Freelists of cleared tasks, keyed by concrete kind.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::task::{Task, TaskHandle};

/// Default upper bound on each per-kind freelist.
pub const DEFAULT_MAX_PER_KIND: usize = 100;

/// Allocator/recycler over reset-capable tasks.
///
/// `release` clears the task (dropping priority, dependencies and
/// subscribers) before pooling it; once a kind's freelist is at the bound,
/// further releases are cleared and discarded.
pub struct TaskPool {
    freelists: HashMap<TypeId, Vec<TaskHandle>>,
    max_per_kind: usize,
}

impl TaskPool {
    pub fn new(max_per_kind: usize) -> Self {
        Self {
            freelists: HashMap::new(),
            max_per_kind,
        }
    }

    /// Pop a recycled task of kind `K`, or mint a default one.
    pub fn acquire<K: Task + Default + 'static>(&mut self) -> TaskHandle {
        if let Some(list) = self.freelists.get_mut(&TypeId::of::<K>()) {
            if let Some(task) = list.pop() {
                debug!(task = task.borrow().id(), "task reused from pool");
                return task;
            }
        }
        Rc::new(RefCell::new(K::default()))
    }

    /// Return a task to its kind's freelist.
    pub fn release(&mut self, task: TaskHandle) {
        let (id, kind) = {
            let task = task.borrow();
            (task.id(), task.as_any().type_id())
        };
        task.borrow_mut().clear();

        if Rc::strong_count(&task) > 1 {
            warn!(task = id, "released task still referenced elsewhere; discarding instead of pooling");
            return;
        }

        let list = self.freelists.entry(kind).or_default();
        if list.len() < self.max_per_kind {
            list.push(task);
        } else {
            debug!(task = id, "pool at bound for this kind; discarding");
        }
    }

    /// Pre-populate kind `K`'s freelist up to `count`, clamped to the bound.
    pub fn prewarm<K: Task + Default + 'static>(&mut self, count: usize) {
        let target = count.min(self.max_per_kind);
        let list = self.freelists.entry(TypeId::of::<K>()).or_default();
        while list.len() < target {
            list.push(Rc::new(RefCell::new(K::default())));
        }
    }

    /// Currently pooled instances of kind `K`.
    pub fn pooled<K: Task + 'static>(&self) -> usize {
        self.freelists
            .get(&TypeId::of::<K>())
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn clear_kind<K: Task + 'static>(&mut self) {
        self.freelists.remove(&TypeId::of::<K>());
    }

    pub fn clear_all(&mut self) {
        self.freelists.clear();
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PER_KIND)
    }
}
