//! Shared task builders for integration tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ticktask::TaskRunner;
use ticktask::builder;
use ticktask::errors::TaskError;
use ticktask::task::TaskHandle;

/// Shared counter for observing how often a closure ran.
pub type Counter = Rc<Cell<u32>>;

pub fn counter() -> Counter {
    Rc::new(Cell::new(0))
}

/// Action task that increments `count` each time it runs.
pub fn counting_action(count: &Counter) -> TaskHandle {
    let count = count.clone();
    builder::action(move || count.set(count.get() + 1))
}

/// Action task that fails its first `failures` invocations, then succeeds.
/// Every invocation (failing or not) increments `count`.
pub fn flaky_action(failures: u32, count: &Counter) -> TaskHandle {
    let count = count.clone();
    builder::try_action(move || {
        count.set(count.get() + 1);
        if count.get() <= failures {
            Err(TaskError::step(format!("induced failure #{}", count.get())))
        } else {
            Ok(())
        }
    })
}

/// Condition task that becomes true on its `frames`-th execution.
pub fn condition_after(frames: u32) -> TaskHandle {
    let seen = Cell::new(0u32);
    builder::wait_until(move || {
        seen.set(seen.get() + 1);
        seen.get() >= frames
    })
}

/// Ordered record of lifecycle events, shared with subscriber closures.
pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn record(log: &EventLog, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

/// Drive the runner for `count` ticks of `dt` each.
pub fn run_ticks(runner: &mut TaskRunner, count: usize, dt: f32) {
    for _ in 0..count {
        runner.tick(dt);
    }
}
