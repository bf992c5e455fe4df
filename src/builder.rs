// src/builder.rs

//! Fluent construction surface.
//!
//! Free factories wrap each task kind into a [`TaskHandle`]; the [`TaskExt`]
//! mutators chain configuration onto a handle:
//!
//! ```no_run
//! use ticktask::builder::{self, TaskExt};
//!
//! let fetch = builder::action(|| println!("fetch"))
//!     .with_priority(10)
//!     .with_retry(2)
//!     .then_delay(0.5)
//!     .on_complete(|id| println!("chain {id} done"));
//! ```

use crate::errors::TaskError;
use crate::task::{
    ActionTask, BranchTask, ConditionTask, DelayTask, IteratorTask, LoopTask, ParallelTask,
    ProgressTask, SequenceTask, Task, TaskHandle, TaskId, TimeoutTask, WaitMode, handle,
};

/// One-shot action, completing after the first call.
pub fn action(f: impl FnMut() + 'static) -> TaskHandle {
    handle(ActionTask::new(f))
}

/// One-shot action whose failures go through the retry discipline.
pub fn try_action(f: impl FnMut() -> Result<(), TaskError> + 'static) -> TaskHandle {
    handle(ActionTask::fallible(f))
}

/// Completes the first tick the predicate returns true.
pub fn wait_until(predicate: impl FnMut() -> bool + 'static) -> TaskHandle {
    handle(ConditionTask::new(predicate))
}

/// Progress-reporting operation; the closure drives the value toward 1 and
/// signals completion with its boolean return.
pub fn progress_fn(update: impl FnMut(&mut f32) -> bool + 'static) -> TaskHandle {
    handle(ProgressTask::new(update))
}

/// Waits for `seconds` of accumulated delta time.
pub fn delay(seconds: f32) -> TaskHandle {
    handle(DelayTask::new(seconds))
}

/// Waits for `seconds`, then runs `follow`.
pub fn delay_then(seconds: f32, follow: TaskHandle) -> TaskHandle {
    handle(DelayTask::with_follow(seconds, follow))
}

/// Advances a restartable iterator one step per tick.
pub fn iterator(source: impl FnMut() -> Box<dyn Iterator<Item = ()>> + 'static) -> TaskHandle {
    handle(IteratorTask::new(source))
}

/// Runs children in order.
pub fn sequence(children: Vec<TaskHandle>) -> TaskHandle {
    handle(SequenceTask::new(children))
}

/// Runs children together, completing when all are done.
pub fn parallel(children: Vec<TaskHandle>) -> TaskHandle {
    handle(ParallelTask::new(children, WaitMode::All))
}

/// Runs children together, completing when any is done.
pub fn parallel_any(children: Vec<TaskHandle>) -> TaskHandle {
    handle(ParallelTask::new(children, WaitMode::Any))
}

/// Repeats `child` a fixed number of times; negative counts loop forever.
pub fn repeat(child: TaskHandle, times: i64) -> TaskHandle {
    handle(LoopTask::times(child, times))
}

/// Repeats `child` until the predicate holds.
pub fn repeat_until(child: TaskHandle, predicate: impl FnMut() -> bool + 'static) -> TaskHandle {
    handle(LoopTask::until(child, predicate))
}

/// Conditional branch; either side may be absent.
pub fn branch(
    predicate: impl FnMut() -> bool + 'static,
    when_true: Option<TaskHandle>,
    when_false: Option<TaskHandle>,
) -> TaskHandle {
    handle(BranchTask::new(Some(Box::new(predicate)), when_true, when_false))
}

/// Cancels `child` and fails the wrapper after `seconds`.
pub fn timeout(child: TaskHandle, seconds: f32) -> TaskHandle {
    handle(TimeoutTask::new(child, seconds))
}

/// Chainable configuration on task handles.
pub trait TaskExt: Sized {
    fn with_priority(self, priority: i32) -> Self;
    fn with_retry(self, max_retries: u32) -> Self;
    /// Gate this task on `prerequisite` reaching `Completed`.
    fn depends_on(self, prerequisite: &TaskHandle) -> Self;
    /// Wrap this task in a timeout combinator.
    fn with_timeout(self, seconds: f32) -> TaskHandle;
    /// Chain `next` after this task in a fresh sequence.
    fn then(self, next: TaskHandle) -> TaskHandle;
    fn then_action(self, f: impl FnMut() + 'static) -> TaskHandle;
    fn then_delay(self, seconds: f32) -> TaskHandle;
    /// Wrap this task in a fixed-count loop; negative counts loop forever.
    fn repeat(self, times: i64) -> TaskHandle;
    /// Wrap this task in a loop bounded by a break predicate.
    fn repeat_until(self, predicate: impl FnMut() -> bool + 'static) -> TaskHandle;
    fn on_started(self, f: impl FnMut(TaskId) + 'static) -> Self;
    fn on_complete(self, f: impl FnMut(TaskId) + 'static) -> Self;
    fn on_failed(self, f: impl FnMut(TaskId, &TaskError) + 'static) -> Self;
    fn on_cancelled(self, f: impl FnMut(TaskId) + 'static) -> Self;
    fn on_progress(self, f: impl FnMut(TaskId, f32) + 'static) -> Self;
}

impl TaskExt for TaskHandle {
    fn with_priority(self, priority: i32) -> Self {
        self.borrow_mut().set_priority(priority);
        self
    }

    fn with_retry(self, max_retries: u32) -> Self {
        self.borrow_mut().set_max_retries(max_retries);
        self
    }

    fn depends_on(self, prerequisite: &TaskHandle) -> Self {
        let id = prerequisite.borrow().id();
        self.borrow_mut()
            .core_mut()
            .dependencies
            .push(crate::task::Dependency {
                id,
                task: std::rc::Rc::downgrade(prerequisite),
            });
        self
    }

    fn with_timeout(self, seconds: f32) -> TaskHandle {
        timeout(self, seconds)
    }

    fn then(self, next: TaskHandle) -> TaskHandle {
        sequence(vec![self, next])
    }

    fn then_action(self, f: impl FnMut() + 'static) -> TaskHandle {
        self.then(action(f))
    }

    fn then_delay(self, seconds: f32) -> TaskHandle {
        self.then(delay(seconds))
    }

    fn repeat(self, times: i64) -> TaskHandle {
        repeat(self, times)
    }

    fn repeat_until(self, predicate: impl FnMut() -> bool + 'static) -> TaskHandle {
        repeat_until(self, predicate)
    }

    fn on_started(self, f: impl FnMut(TaskId) + 'static) -> Self {
        self.borrow_mut().core_mut().on_started(f);
        self
    }

    fn on_complete(self, f: impl FnMut(TaskId) + 'static) -> Self {
        self.borrow_mut().core_mut().on_completed(f);
        self
    }

    fn on_failed(self, f: impl FnMut(TaskId, &TaskError) + 'static) -> Self {
        self.borrow_mut().core_mut().on_failed(f);
        self
    }

    fn on_cancelled(self, f: impl FnMut(TaskId) + 'static) -> Self {
        self.borrow_mut().core_mut().on_cancelled(f);
        self
    }

    fn on_progress(self, f: impl FnMut(TaskId, f32) + 'static) -> Self {
        self.borrow_mut().core_mut().on_progress(f);
        self
    }
}
