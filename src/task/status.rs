// src/task/status.rs

//! Task status machine.

/// Lifecycle status of a task.
///
/// Transitions form a DAG:
/// Pending -> Running -> {Completed | Cancelled | Failed};
/// Running <-> Paused; Failed -> Pending only through the retry path;
/// any non-terminal status -> Cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Created or reset, not yet advanced (possibly gated on dependencies).
    Pending,
    /// Actively advanced by a scheduler tick.
    Running,
    /// Parked; `execute` returns not-done without advancing.
    Paused,
    /// Finished successfully. Implies progress == 1.
    Completed,
    /// Cancelled cooperatively. Terminal.
    Cancelled,
    /// Failed with retries exhausted. Terminal.
    Failed,
}

impl TaskStatus {
    /// Whether a scheduler should drop a task in this status.
    ///
    /// `Failed` is only ever assigned once retries are exhausted (a failing
    /// task with retries left goes back to `Pending` instead), so all three
    /// end states are unconditionally terminal.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Cancelled | TaskStatus::Failed
        )
    }
}
