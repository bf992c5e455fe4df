// src/task/combinator/branch.rs

//! Conditional branch: pick a child once, then delegate to it.

use std::any::Any;

use crate::errors::TaskError;
use crate::task::TaskHandle;
use crate::task::core::TaskCore;
use crate::task::protocol::Task;
use crate::task::status::TaskStatus;

/// Evaluates its predicate on the first advance (absent predicate defaults
/// to true), selects the matching branch and delegates every subsequent tick
/// to it. A missing branch completes immediately.
#[derive(Default)]
pub struct BranchTask {
    core: TaskCore,
    predicate: Option<Box<dyn FnMut() -> bool>>,
    when_true: Option<TaskHandle>,
    when_false: Option<TaskHandle>,
    selected: Option<TaskHandle>,
    decided: bool,
}

impl BranchTask {
    pub fn new(
        predicate: Option<Box<dyn FnMut() -> bool>>,
        when_true: Option<TaskHandle>,
        when_false: Option<TaskHandle>,
    ) -> Self {
        Self {
            core: TaskCore::new(),
            predicate,
            when_true,
            when_false,
            selected: None,
            decided: false,
        }
    }
}

impl Task for BranchTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn step(&mut self, dt: f32) -> Result<bool, TaskError> {
        if !self.decided {
            self.decided = true;
            let take_true = self.predicate.as_mut().map(|p| p()).unwrap_or(true);
            self.selected = if take_true {
                self.when_true.clone()
            } else {
                self.when_false.clone()
            };
        }

        let Some(child) = self.selected.clone() else {
            return Ok(true);
        };
        if !child.borrow_mut().execute(dt) {
            return Ok(false);
        }
        if child.borrow().status() != TaskStatus::Completed {
            self.cancel();
        }
        Ok(true)
    }

    fn progress_hint(&self) -> f32 {
        self.selected
            .as_ref()
            .map(|c| c.borrow().progress())
            .unwrap_or(0.0)
    }

    fn on_reset(&mut self) {
        self.decided = false;
        self.selected = None;
        for child in self.when_true.iter().chain(self.when_false.iter()) {
            child.borrow_mut().reset();
        }
    }

    fn on_clear(&mut self) {
        self.predicate = None;
        self.when_true = None;
        self.when_false = None;
        self.selected = None;
        self.decided = false;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
