// src/task/leaf.rs

//! Leaf task kinds: the concrete work units combinators are built from.

use std::any::Any;

use crate::errors::TaskError;
use crate::task::TaskHandle;
use crate::task::core::TaskCore;
use crate::task::protocol::Task;
use crate::task::status::TaskStatus;

/// Runs a thunk once and completes immediately after it returns.
#[derive(Default)]
pub struct ActionTask {
    core: TaskCore,
    action: Option<Box<dyn FnMut() -> Result<(), TaskError>>>,
}

impl ActionTask {
    pub fn new(mut action: impl FnMut() + 'static) -> Self {
        Self::fallible(move || {
            action();
            Ok(())
        })
    }

    /// Action whose failures go through the retry discipline.
    pub fn fallible(action: impl FnMut() -> Result<(), TaskError> + 'static) -> Self {
        Self {
            core: TaskCore::new(),
            action: Some(Box::new(action)),
        }
    }

    pub fn set_action(&mut self, action: impl FnMut() -> Result<(), TaskError> + 'static) {
        self.action = Some(Box::new(action));
    }
}

impl Task for ActionTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn step(&mut self, _dt: f32) -> Result<bool, TaskError> {
        if let Some(action) = self.action.as_mut() {
            action()?;
        }
        Ok(true)
    }

    fn on_clear(&mut self) {
        self.action = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Polls a predicate every tick and completes when it returns true.
#[derive(Default)]
pub struct ConditionTask {
    core: TaskCore,
    predicate: Option<Box<dyn FnMut() -> bool>>,
}

impl ConditionTask {
    pub fn new(predicate: impl FnMut() -> bool + 'static) -> Self {
        Self {
            core: TaskCore::new(),
            predicate: Some(Box::new(predicate)),
        }
    }

    pub fn set_predicate(&mut self, predicate: impl FnMut() -> bool + 'static) {
        self.predicate = Some(Box::new(predicate));
    }
}

impl Task for ConditionTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn step(&mut self, _dt: f32) -> Result<bool, TaskError> {
        // A condition without a predicate has nothing to wait for.
        Ok(self.predicate.as_mut().map(|p| p()).unwrap_or(true))
    }

    fn on_clear(&mut self) {
        self.predicate = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Progress-reporting operation.
///
/// The update closure receives the stored progress value and may drive it
/// toward 1 itself; external code can push it via [`ProgressTask::set_progress`].
/// Completion is signalled by the closure's boolean return, at which point
/// progress is forced to 1.
#[derive(Default)]
pub struct ProgressTask {
    core: TaskCore,
    value: f32,
    update: Option<Box<dyn FnMut(&mut f32) -> bool>>,
}

impl ProgressTask {
    pub fn new(update: impl FnMut(&mut f32) -> bool + 'static) -> Self {
        Self {
            core: TaskCore::new(),
            value: 0.0,
            update: Some(Box::new(update)),
        }
    }

    pub fn set_update(&mut self, update: impl FnMut(&mut f32) -> bool + 'static) {
        self.update = Some(Box::new(update));
    }

    pub fn set_progress(&mut self, value: f32) {
        self.value = value.clamp(0.0, 1.0);
    }
}

impl Task for ProgressTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn step(&mut self, _dt: f32) -> Result<bool, TaskError> {
        let done = match self.update.as_mut() {
            Some(update) => update(&mut self.value),
            // Without an update closure the externally-set value decides.
            None => self.value >= 1.0,
        };
        self.value = self.value.clamp(0.0, 1.0);
        if done {
            self.value = 1.0;
        }
        Ok(done)
    }

    fn progress_hint(&self) -> f32 {
        self.value
    }

    fn on_reset(&mut self) {
        self.value = 0.0;
    }

    fn on_clear(&mut self) {
        self.update = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Accumulates `dt` until a configured duration has elapsed, then optionally
/// hands over to a follow-up task.
///
/// Progress is mapped 50/50 between the two phases; without a follow-up the
/// second half is collapsed into the completion transition.
#[derive(Default)]
pub struct DelayTask {
    core: TaskCore,
    duration: f32,
    elapsed: f32,
    follow: Option<TaskHandle>,
}

impl DelayTask {
    pub fn new(duration: f32) -> Self {
        Self {
            core: TaskCore::new(),
            duration,
            elapsed: 0.0,
            follow: None,
        }
    }

    pub fn with_follow(duration: f32, follow: TaskHandle) -> Self {
        let mut task = Self::new(duration);
        task.follow = Some(follow);
        task
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl Task for DelayTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn step(&mut self, dt: f32) -> Result<bool, TaskError> {
        if self.elapsed < self.duration {
            self.elapsed += dt;
            if self.elapsed >= self.duration && self.follow.is_none() {
                return Ok(true);
            }
            return Ok(false);
        }

        let Some(follow) = self.follow.clone() else {
            return Ok(true);
        };
        if !follow.borrow_mut().execute(dt) {
            return Ok(false);
        }
        if follow.borrow().status() != TaskStatus::Completed {
            // Follow-up aborted; the delay gives up with it.
            self.cancel();
        }
        Ok(true)
    }

    fn progress_hint(&self) -> f32 {
        let waited = if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        };
        let follow = self
            .follow
            .as_ref()
            .map(|f| f.borrow().progress())
            .unwrap_or(0.0);
        0.5 * waited + 0.5 * follow
    }

    fn on_reset(&mut self) {
        self.elapsed = 0.0;
        if let Some(follow) = &self.follow {
            follow.borrow_mut().reset();
        }
    }

    fn on_clear(&mut self) {
        self.duration = 0.0;
        self.follow = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Adapter over a restartable step source: each `execute` advances the
/// iterator by one item, completing on exhaustion. Reset restarts from the
/// source.
#[derive(Default)]
pub struct IteratorTask {
    core: TaskCore,
    source: Option<Box<dyn FnMut() -> Box<dyn Iterator<Item = ()>>>>,
    active: Option<Box<dyn Iterator<Item = ()>>>,
}

impl IteratorTask {
    pub fn new(source: impl FnMut() -> Box<dyn Iterator<Item = ()>> + 'static) -> Self {
        Self {
            core: TaskCore::new(),
            source: Some(Box::new(source)),
            active: None,
        }
    }

    pub fn set_source(&mut self, source: impl FnMut() -> Box<dyn Iterator<Item = ()>> + 'static) {
        self.source = Some(Box::new(source));
        self.active = None;
    }
}

impl Task for IteratorTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn step(&mut self, _dt: f32) -> Result<bool, TaskError> {
        let Some(source) = self.source.as_mut() else {
            return Ok(true);
        };
        let steps = self.active.get_or_insert_with(|| source());
        Ok(steps.next().is_none())
    }

    fn on_reset(&mut self) {
        self.active = None;
    }

    fn on_clear(&mut self) {
        self.source = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
