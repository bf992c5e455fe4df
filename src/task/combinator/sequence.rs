// src/task/combinator/sequence.rs

//! Ordered execution of children, one cursor position per tick.

use std::any::Any;

use tracing::debug;

use crate::errors::TaskError;
use crate::task::TaskHandle;
use crate::task::core::TaskCore;
use crate::task::protocol::Task;
use crate::task::status::TaskStatus;

/// Executes children in order; each tick advances the child at the cursor.
/// When that child finishes `Completed` the cursor moves on; a child that
/// finishes `Failed` or `Cancelled` cancels the whole sequence.
#[derive(Default)]
pub struct SequenceTask {
    core: TaskCore,
    children: Vec<TaskHandle>,
    cursor: usize,
}

impl SequenceTask {
    pub fn new(children: Vec<TaskHandle>) -> Self {
        Self {
            core: TaskCore::new(),
            children,
            cursor: 0,
        }
    }

    pub fn push(&mut self, child: TaskHandle) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Task for SequenceTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn step(&mut self, dt: f32) -> Result<bool, TaskError> {
        let Some(child) = self.children.get(self.cursor).cloned() else {
            return Ok(true);
        };

        if !child.borrow_mut().execute(dt) {
            return Ok(false);
        }

        let status = child.borrow().status();
        if status != TaskStatus::Completed {
            debug!(
                task = self.core.id(),
                child = child.borrow().id(),
                ?status,
                "sequence child aborted; cancelling sequence"
            );
            self.cancel();
            return Ok(true);
        }

        self.cursor += 1;
        Ok(self.cursor >= self.children.len())
    }

    fn progress_hint(&self) -> f32 {
        if self.children.is_empty() {
            return 0.0;
        }
        let current = self
            .children
            .get(self.cursor)
            .map(|c| c.borrow().progress())
            .unwrap_or(0.0);
        (self.cursor as f32 + current) / self.children.len() as f32
    }

    fn on_reset(&mut self) {
        self.cursor = 0;
        for child in &self.children {
            child.borrow_mut().reset();
        }
    }

    fn on_clear(&mut self) {
        self.children.clear();
        self.cursor = 0;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
