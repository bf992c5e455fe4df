// src/task/combinator/timeout.rs

//! Wall-duration guard around a child task.

use std::any::Any;

use tracing::warn;

use crate::errors::TaskError;
use crate::task::TaskHandle;
use crate::task::core::TaskCore;
use crate::task::protocol::Task;
use crate::task::status::TaskStatus;

/// Advances its own accumulator before delegating; on expiry the child is
/// cancelled and a timeout cause is raised through the failure mechanism, so
/// the wrapper itself participates in the retry policy.
#[derive(Default)]
pub struct TimeoutTask {
    core: TaskCore,
    child: Option<TaskHandle>,
    limit: f32,
    elapsed: f32,
}

impl TimeoutTask {
    pub fn new(child: TaskHandle, limit: f32) -> Self {
        Self {
            core: TaskCore::new(),
            child: Some(child),
            limit,
            elapsed: 0.0,
        }
    }

    pub fn set_limit(&mut self, limit: f32) {
        self.limit = limit;
    }
}

impl Task for TimeoutTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn step(&mut self, dt: f32) -> Result<bool, TaskError> {
        let Some(child) = self.child.clone() else {
            return Ok(true);
        };

        self.elapsed += dt;
        if self.elapsed >= self.limit {
            warn!(
                task = self.core.id(),
                child = child.borrow().id(),
                limit = self.limit,
                "task exceeded its time limit; cancelling child"
            );
            child.borrow_mut().cancel();
            return Err(TaskError::Timeout { limit: self.limit });
        }

        if !child.borrow_mut().execute(dt) {
            return Ok(false);
        }
        if child.borrow().status() != TaskStatus::Completed {
            self.cancel();
        }
        Ok(true)
    }

    fn progress_hint(&self) -> f32 {
        self.child
            .as_ref()
            .map(|c| c.borrow().progress())
            .unwrap_or(0.0)
    }

    fn on_reset(&mut self) {
        // A retried wrapper starts the clock and the child over.
        self.elapsed = 0.0;
        if let Some(child) = &self.child {
            child.borrow_mut().reset();
        }
    }

    fn on_clear(&mut self) {
        self.child = None;
        self.limit = 0.0;
        self.elapsed = 0.0;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
