// src/task/combinator/parallel.rs

//! Concurrent (within one tick) execution of children.

use std::any::Any;
use std::collections::HashSet;

use crate::errors::TaskError;
use crate::task::TaskHandle;
use crate::task::core::{TaskCore, TaskId};
use crate::task::protocol::Task;

/// Completion rule for [`ParallelTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitMode {
    /// Complete once every child is done.
    #[default]
    All,
    /// Complete the first tick any child becomes done.
    Any,
}

/// Executes all not-yet-finished children each tick, in list order.
///
/// A finished child counts toward the wait rule whatever its terminal status,
/// so `All` mode terminates even when a child failed. In `Any` mode the
/// still-running siblings are left untouched when the parent completes; a
/// caller holding their handles can cancel or reuse them.
#[derive(Default)]
pub struct ParallelTask {
    core: TaskCore,
    children: Vec<TaskHandle>,
    mode: WaitMode,
    finished: HashSet<TaskId>,
}

impl ParallelTask {
    pub fn new(children: Vec<TaskHandle>, mode: WaitMode) -> Self {
        Self {
            core: TaskCore::new(),
            children,
            mode,
            finished: HashSet::new(),
        }
    }

    pub fn push(&mut self, child: TaskHandle) {
        self.children.push(child);
    }

    pub fn mode(&self) -> WaitMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: WaitMode) {
        self.mode = mode;
    }
}

impl Task for ParallelTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn step(&mut self, dt: f32) -> Result<bool, TaskError> {
        if self.children.is_empty() {
            return Ok(true);
        }

        let pending: Vec<TaskHandle> = self
            .children
            .iter()
            .filter(|c| !self.finished.contains(&c.borrow().id()))
            .cloned()
            .collect();

        for child in pending {
            if child.borrow_mut().execute(dt) {
                self.finished.insert(child.borrow().id());
                if self.mode == WaitMode::Any {
                    return Ok(true);
                }
            }
        }

        Ok(self.finished.len() == self.children.len())
    }

    fn progress_hint(&self) -> f32 {
        if self.children.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.children.iter().map(|c| c.borrow().progress()).sum();
        sum / self.children.len() as f32
    }

    fn on_reset(&mut self) {
        self.finished.clear();
        for child in &self.children {
            child.borrow_mut().reset();
        }
    }

    fn on_clear(&mut self) {
        self.children.clear();
        self.finished.clear();
        self.mode = WaitMode::default();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
