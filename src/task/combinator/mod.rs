// src/task/combinator/mod.rs

//! Combinator tasks: composition of child tasks under the same protocol.
//!
//! Combinators drive their children through the children's own `execute`,
//! which means a child's retry budget is drained inside the child before the
//! parent ever observes it as done. A child seen in a terminal state other
//! than `Completed` makes the combinator cancel itself.

pub mod branch;
pub mod parallel;
pub mod repeat;
pub mod sequence;
pub mod timeout;

pub use branch::BranchTask;
pub use parallel::{ParallelTask, WaitMode};
pub use repeat::{LoopMode, LoopTask};
pub use sequence::SequenceTask;
pub use timeout::TimeoutTask;
