// src/task/mod.rs

//! Tasks: the uniform protocol, leaf kinds and combinators.

pub mod combinator;
pub mod core;
pub mod leaf;
pub mod protocol;
pub mod status;

use std::cell::RefCell;
use std::rc::Rc;

pub use self::combinator::{
    BranchTask, LoopMode, LoopTask, ParallelTask, SequenceTask, TimeoutTask, WaitMode,
};
pub use self::core::{Dependency, TaskCore, TaskId};
pub use self::leaf::{ActionTask, ConditionTask, DelayTask, IteratorTask, ProgressTask};
pub use self::protocol::Task;
pub use self::status::TaskStatus;

/// Shared handle to a task.
///
/// The whole core is single-threaded and cooperative, so refcounted
/// `RefCell` handles are the ownership model: schedulers, the runner
/// registry and composite parents all hold clones of the same handle.
pub type TaskHandle = Rc<RefCell<dyn Task>>;

/// Wrap a concrete task into a shareable handle.
pub fn handle<T: Task + 'static>(task: T) -> TaskHandle {
    Rc::new(RefCell::new(task))
}

/// Typed access to the concrete kind behind a handle, e.g. to reconfigure a
/// task freshly acquired from the pool. Returns `None` when the handle holds
/// a different kind.
pub fn with_task<K: Task + 'static, R>(
    task: &TaskHandle,
    f: impl FnOnce(&mut K) -> R,
) -> Option<R> {
    let mut task = task.borrow_mut();
    task.as_any_mut().downcast_mut::<K>().map(f)
}
