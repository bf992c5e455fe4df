// src/task/protocol.rs

//! The uniform task protocol.
//!
//! `execute` is the only driver of forward motion: there is no background
//! thread, and a task suspends by returning `false`. The provided methods on
//! [`Task`] implement the protocol once; concrete kinds only supply `step`
//! (the kind-specific advance), `progress_hint` and `on_reset`.

use std::any::Any;

use tracing::{debug, error, warn};

use crate::errors::TaskError;
use crate::task::core::{PROGRESS_EPSILON, TaskCore, TaskId};
use crate::task::status::TaskStatus;

/// Uniform contract shared by leaf and combinator tasks.
pub trait Task {
    fn core(&self) -> &TaskCore;
    fn core_mut(&mut self) -> &mut TaskCore;

    /// Kind-specific advance. Returns `Ok(true)` when the task is finished.
    ///
    /// A step that has already driven the task into a terminal state (for
    /// example a combinator cancelling itself after observing an aborted
    /// child) returns `Ok(true)`; `execute` will not overwrite that status.
    fn step(&mut self, dt: f32) -> Result<bool, TaskError>;

    /// Kind-specific progress estimate in [0, 1] while not yet completed.
    fn progress_hint(&self) -> f32 {
        0.0
    }

    /// Kind-specific bookkeeping reset (cursors, accumulators, iterations).
    fn on_reset(&mut self) {}

    /// Kind-specific payload drop (closures, children, durations), making
    /// the task safe to hand out from the pool again.
    fn on_clear(&mut self) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    // --- identity and configuration ----------------------------------------

    fn id(&self) -> TaskId {
        self.core().id()
    }

    fn status(&self) -> TaskStatus {
        self.core().status
    }

    fn priority(&self) -> i32 {
        self.core().priority
    }

    /// Raise or lower priority. For a task sitting in the priority scheduler
    /// this must be followed by `Scheduler::reprioritize` unless the mutation
    /// happens inside `execute` (the tick re-sorts survivors itself).
    fn set_priority(&mut self, priority: i32) {
        self.core_mut().priority = priority;
    }

    fn set_max_retries(&mut self, max_retries: u32) {
        self.core_mut().max_retries = max_retries;
    }

    fn max_retries(&self) -> u32 {
        self.core().max_retries
    }

    /// Derived progress in [0, 1]. `Completed` always reports 1.
    fn progress(&self) -> f32 {
        if self.core().status == TaskStatus::Completed {
            1.0
        } else {
            self.progress_hint().clamp(0.0, 1.0)
        }
    }

    // --- the execute protocol ----------------------------------------------

    /// Advance the task by one tick. Returns `true` when the scheduler should
    /// drop the task (terminal status reached, now or earlier).
    fn execute(&mut self, dt: f32) -> bool {
        if self.core().status.is_terminal() {
            return true;
        }
        if self.core().status == TaskStatus::Paused {
            return false;
        }
        if !self.core().dependencies_met() {
            return false;
        }

        if self.core().status == TaskStatus::Pending {
            let core = self.core_mut();
            core.status = TaskStatus::Running;
            core.fire_started();
        }

        match self.step(dt) {
            Ok(done) => {
                if done && !self.core().status.is_terminal() {
                    self.core_mut().status = TaskStatus::Completed;
                }
                self.publish_progress();
                if done && self.core().status == TaskStatus::Completed {
                    self.core_mut().fire_completed();
                }
                done
            }
            Err(cause) => self.absorb_failure(cause),
        }
    }

    /// Fire the progress event when the derived value moved past the
    /// debounce threshold.
    fn publish_progress(&mut self) {
        let progress = self.progress();
        let core = self.core_mut();
        if (progress - core.last_progress).abs() > PROGRESS_EPSILON {
            core.last_progress = progress;
            core.fire_progress(progress);
        }
    }

    /// Retry discipline for a caught step failure. Returns the done bit
    /// `execute` should report.
    fn absorb_failure(&mut self, cause: TaskError) -> bool {
        let id = self.id();
        let retry = {
            let core = self.core_mut();
            core.retries_used += 1;
            core.retries_used <= core.max_retries
        };

        if retry {
            let core = self.core();
            warn!(
                task = id,
                attempt = core.retries_used,
                max_retries = core.max_retries,
                error = %cause,
                "task step failed; restoring for retry"
            );
            // Subscribers and the retry counter survive this reset.
            self.core_mut().status = TaskStatus::Pending;
            self.on_reset();
            false
        } else {
            error!(task = id, error = %cause, "task failed; retries exhausted");
            self.core_mut().status = TaskStatus::Failed;
            self.core_mut().fire_failed(&cause);
            true
        }
    }

    // --- lifecycle controls ------------------------------------------------

    /// Cooperative cancellation: marks the task and fires the cancelled
    /// event. The next scheduler visit observes the terminal status and
    /// drops the task. Children of a cancelled composite are not cancelled.
    fn cancel(&mut self) {
        if self.core().status.is_terminal() {
            debug!(task = self.id(), status = ?self.status(), "cancel on terminal task; ignoring");
            return;
        }
        self.core_mut().status = TaskStatus::Cancelled;
        self.core_mut().fire_cancelled();
    }

    fn pause(&mut self) {
        if self.core().status == TaskStatus::Running {
            self.core_mut().status = TaskStatus::Paused;
        } else {
            warn!(task = self.id(), status = ?self.status(), "pause on non-running task; ignoring");
        }
    }

    fn resume(&mut self) {
        if self.core().status == TaskStatus::Paused {
            self.core_mut().status = TaskStatus::Running;
        } else {
            warn!(task = self.id(), status = ?self.status(), "resume on non-paused task; ignoring");
        }
    }

    /// Restore `Pending`, zero the retry counter and progress shadow, and
    /// run the kind-specific reset. Identity and subscribers survive.
    fn reset(&mut self) {
        {
            let core = self.core_mut();
            core.status = TaskStatus::Pending;
            core.retries_used = 0;
            core.last_progress = 0.0;
        }
        self.on_reset();
    }

    /// `reset` plus dropping priority, dependencies, all subscribers and the
    /// kind-specific payload. The pool calls this before returning a task to
    /// its freelist.
    fn clear(&mut self) {
        self.reset();
        self.core_mut().strip();
        self.on_clear();
    }
}
