// src/sched/priority.rs

//! Priority-ordered scheduler: sorted set with re-sort on resume.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::sched::{DEFAULT_MAX_PER_TICK, Scheduler, TickReport};
use crate::task::{Task, TaskHandle, TaskId};

/// Sort key: priority descending, identity ascending on ties. The identity
/// tie-break makes the ordering total, so equal-priority tasks keep
/// insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OrderKey {
    priority: i32,
    id: TaskId,
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordered set over (priority desc, id asc) plus an id -> sort-priority
/// index. The tick pops its slice up front, so re-inserts during execution
/// never perturb the iteration, and every survivor is re-keyed under its
/// current priority on the way back in.
pub struct PriorityScheduler {
    entries: BTreeMap<OrderKey, TaskHandle>,
    priorities: HashMap<TaskId, i32>,
    max_per_tick: usize,
    running: bool,
}

impl PriorityScheduler {
    pub fn new(max_per_tick: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            priorities: HashMap::new(),
            max_per_tick: max_per_tick.max(1),
            running: true,
        }
    }

    fn insert(&mut self, task: TaskHandle) {
        let (id, priority) = {
            let task = task.borrow();
            (task.id(), task.priority())
        };
        self.priorities.insert(id, priority);
        self.entries.insert(OrderKey { priority, id }, task);
    }

    /// Rebuild every key from the tasks' current priorities.
    fn resort(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        self.priorities.clear();
        for (_, task) in entries {
            self.insert(task);
        }
    }
}

impl Default for PriorityScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PER_TICK)
    }
}

impl Scheduler for PriorityScheduler {
    fn schedule(&mut self, task: TaskHandle) {
        let id = task.borrow().id();
        if self.priorities.contains_key(&id) {
            warn!(task = id, "task already scheduled; ignoring");
            return;
        }
        self.insert(task);
    }

    fn remove(&mut self, id: TaskId) -> Option<TaskHandle> {
        let priority = self.priorities.remove(&id)?;
        if let Some(task) = self.entries.remove(&OrderKey { priority, id }) {
            return Some(task);
        }
        // Priority mutated without a reprioritize call; fall back to a scan.
        let key = self.entries.keys().find(|k| k.id == id).copied()?;
        self.entries.remove(&key)
    }

    fn get(&self, id: TaskId) -> Option<TaskHandle> {
        let priority = self.priorities.get(&id)?;
        if let Some(task) = self.entries.get(&OrderKey { priority: *priority, id }) {
            return Some(task.clone());
        }
        self.entries
            .iter()
            .find(|(k, _)| k.id == id)
            .map(|(_, task)| task.clone())
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.priorities.clear();
    }

    fn pause(&mut self) {
        self.running = false;
    }

    /// Resuming re-sorts the whole set, picking up any priorities mutated
    /// while the scheduler was paused.
    fn resume(&mut self) {
        self.running = true;
        self.resort();
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn reprioritize(&mut self, id: TaskId, priority: i32) {
        let Some(task) = self.remove(id) else {
            warn!(task = id, "reprioritize for unknown task; ignoring");
            return;
        };
        task.borrow_mut().set_priority(priority);
        self.insert(task);
    }

    fn tick(&mut self, dt: f32) -> TickReport {
        let mut report = TickReport::default();
        if !self.running {
            return report;
        }

        let mut batch = Vec::with_capacity(self.max_per_tick.min(self.entries.len()));
        for _ in 0..self.max_per_tick {
            match self.entries.pop_first() {
                Some(entry) => batch.push(entry),
                None => break,
            }
        }

        for (key, task) in batch {
            report.executed += 1;
            if task.borrow_mut().execute(dt) {
                debug!(task = key.id, status = ?task.borrow().status(), "task finished; dropping from priority scheduler");
                self.priorities.remove(&key.id);
                report.removed.push(key.id);
            } else {
                // Re-insert under the current priority so mutations made
                // during execute take effect immediately.
                let priority = task.borrow().priority();
                self.priorities.insert(key.id, priority);
                self.entries.insert(OrderKey { priority, id: key.id }, task);
            }
        }

        report.drained = self.entries.is_empty();
        report
    }
}
