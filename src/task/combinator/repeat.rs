// src/task/combinator/repeat.rs

//! Repeated execution of a single child.

use std::any::Any;

use crate::errors::TaskError;
use crate::task::TaskHandle;
use crate::task::core::TaskCore;
use crate::task::protocol::Task;
use crate::task::status::TaskStatus;

/// Iteration rule for [`LoopTask`].
pub enum LoopMode {
    /// Run the child a fixed number of times; `None` loops forever.
    Times(Option<u64>),
    /// Re-run the child until the predicate holds. Checked before each
    /// iteration and again after each child completion.
    Until(Box<dyn FnMut() -> bool>),
}

impl Default for LoopMode {
    fn default() -> Self {
        LoopMode::Times(Some(1))
    }
}

/// Drives one child to completion over and over, resetting it between
/// iterations.
#[derive(Default)]
pub struct LoopTask {
    core: TaskCore,
    child: Option<TaskHandle>,
    mode: LoopMode,
    iterations: u64,
}

impl LoopTask {
    /// Bounded loop. A negative count means unbounded.
    pub fn times(child: TaskHandle, count: i64) -> Self {
        let mode = if count < 0 {
            LoopMode::Times(None)
        } else {
            LoopMode::Times(Some(count as u64))
        };
        Self {
            core: TaskCore::new(),
            child: Some(child),
            mode,
            iterations: 0,
        }
    }

    pub fn until(child: TaskHandle, predicate: impl FnMut() -> bool + 'static) -> Self {
        Self {
            core: TaskCore::new(),
            child: Some(child),
            mode: LoopMode::Until(Box::new(predicate)),
            iterations: 0,
        }
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}

impl Task for LoopTask {
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

        match &mut self.mode {
            LoopMode::Until(predicate) => {
                if predicate() {
                    return Ok(true);
                }
            }
            LoopMode::Times(Some(0)) => return Ok(true),
            LoopMode::Times(_) => {}
        }

        if !child.borrow_mut().execute(dt) {
            return Ok(false);
        }

        if child.borrow().status() != TaskStatus::Completed {
            self.cancel();
            return Ok(true);
        }

        self.iterations += 1;
        let finished = match &mut self.mode {
            LoopMode::Times(Some(count)) => self.iterations >= *count,
            LoopMode::Times(None) => false,
            LoopMode::Until(predicate) => predicate(),
        };
        if finished {
            return Ok(true);
        }

        child.borrow_mut().reset();
        Ok(false)
    }

    fn progress_hint(&self) -> f32 {
        // Unbounded and predicate loops have no defined progress.
        let LoopMode::Times(Some(count)) = &self.mode else {
            return 0.0;
        };
        let count = *count;
        if count == 0 {
            return 0.0;
        }
        let current = self
            .child
            .as_ref()
            .map(|c| c.borrow().progress())
            .unwrap_or(0.0);
        (self.iterations as f32 + current) / count as f32
    }

    fn on_reset(&mut self) {
        self.iterations = 0;
        if let Some(child) = &self.child {
            child.borrow_mut().reset();
        }
    }

    fn on_clear(&mut self) {
        self.child = None;
        self.mode = LoopMode::default();
        self.iterations = 0;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
