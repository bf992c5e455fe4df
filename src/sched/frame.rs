// src/sched/frame.rs

//! Frame-fair scheduler: FIFO with re-enqueue.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use crate::sched::{DEFAULT_MAX_PER_TICK, Scheduler, TickReport};
use crate::task::{Task, TaskHandle, TaskId};

/// Auxiliary counters exposed for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Tasks ever scheduled on this instance.
    pub scheduled: u64,
    /// Tasks dropped after reaching a terminal state.
    pub finished: u64,
    /// Tasks currently held.
    pub remaining: usize,
}

/// FIFO queue plus identity index. Each tick dequeues up to the cap,
/// executes, and re-enqueues at the tail anything that is not done, which
/// round-robins service across frames.
pub struct FrameScheduler {
    queue: VecDeque<TaskId>,
    index: HashMap<TaskId, TaskHandle>,
    max_per_tick: usize,
    running: bool,
    scheduled_total: u64,
    finished_total: u64,
    on_drained: Option<Box<dyn FnOnce()>>,
}

impl FrameScheduler {
    pub fn new(max_per_tick: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            index: HashMap::new(),
            // The cap has a floor of one task per tick.
            max_per_tick: max_per_tick.max(1),
            running: true,
            scheduled_total: 0,
            finished_total: 0,
            on_drained: None,
        }
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            scheduled: self.scheduled_total,
            finished: self.finished_total,
            remaining: self.index.len(),
        }
    }

    /// One-shot callback fired the first time a tick ends with the queue
    /// empty. Replaced by any later call.
    pub fn on_drained(&mut self, callback: impl FnOnce() + 'static) {
        self.on_drained = Some(Box::new(callback));
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PER_TICK)
    }
}

impl Scheduler for FrameScheduler {
    fn schedule(&mut self, task: TaskHandle) {
        let id = task.borrow().id();
        if self.index.contains_key(&id) {
            warn!(task = id, "task already scheduled; ignoring");
            return;
        }
        self.queue.push_back(id);
        self.index.insert(id, task);
        self.scheduled_total += 1;
    }

    fn remove(&mut self, id: TaskId) -> Option<TaskHandle> {
        let task = self.index.remove(&id)?;
        // Scrub the queue slot too; a stale slot would let a re-scheduled
        // task occupy two queue positions and run twice in one tick.
        self.queue.retain(|queued| *queued != id);
        Some(task)
    }

    fn get(&self, id: TaskId) -> Option<TaskHandle> {
        self.index.get(&id).cloned()
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.index.clear();
    }

    fn pause(&mut self) {
        self.running = false;
    }

    fn resume(&mut self) {
        self.running = true;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn reprioritize(&mut self, id: TaskId, priority: i32) {
        // Fair scheduling ignores priority for ordering; just store the
        // new value on the task.
        if let Some(task) = self.index.get(&id) {
            task.borrow_mut().set_priority(priority);
        }
    }

    fn tick(&mut self, dt: f32) -> TickReport {
        let mut report = TickReport::default();
        if !self.running {
            return report;
        }

        // Bounding pops by the pre-tick length guarantees a re-enqueued task
        // is not popped again within this tick.
        let mut pops = self.queue.len();
        while report.executed < self.max_per_tick && pops > 0 {
            let Some(id) = self.queue.pop_front() else {
                break;
            };
            pops -= 1;
            let Some(task) = self.index.get(&id).cloned() else {
                continue; // queue and index are kept in sync; nothing to run
            };

            report.executed += 1;
            if task.borrow_mut().execute(dt) {
                debug!(task = id, status = ?task.borrow().status(), "task finished; dropping from frame scheduler");
                self.index.remove(&id);
                self.finished_total += 1;
                report.removed.push(id);
            } else {
                self.queue.push_back(id);
            }
        }

        if self.index.is_empty() {
            report.drained = true;
            if let Some(callback) = self.on_drained.take() {
                callback();
            }
        }
        report
    }
}
