// src/runner.rs

//! The runner: named schedulers, the global registry and dependency wiring.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::config::model::SchedulerKind;
use crate::errors::{Result, TicktaskError};
use crate::pool::{DEFAULT_MAX_PER_KIND, TaskPool};
use crate::sched::{DEFAULT_MAX_PER_TICK, FrameScheduler, PriorityScheduler, Scheduler};
use crate::task::{Task, TaskHandle, TaskId, TaskStatus};

/// Name of the canonical frame-fair scheduler.
pub const DEFAULT_SCHEDULER: &str = "Default";
/// Name of the canonical priority-ordered scheduler.
pub const PRIORITY_SCHEDULER: &str = "Priority";

/// Owns the schedulers, the identity -> task registry, the reverse-dependency
/// map and the pool. `tick` is the single entry point the host drives.
pub struct TaskRunner {
    /// Registration order is tick fan-out order.
    schedulers: Vec<(String, Box<dyn Scheduler>)>,
    registry: HashMap<TaskId, TaskHandle>,
    /// prerequisite id -> ids of tasks gated on it.
    dependents: HashMap<TaskId, Vec<TaskId>>,
    /// Tasks returned to the pool when they leave the registry.
    auto_release: HashSet<TaskId>,
    pool: TaskPool,
    running: bool,
}

impl TaskRunner {
    /// Runner with the two canonical schedulers at their default caps.
    pub fn new() -> Self {
        let mut runner = Self::bare(DEFAULT_MAX_PER_KIND);
        runner.ensure_canonical();
        runner
    }

    /// Runner configured from a validated [`RunnerConfig`]. Configured
    /// sections override the canonical caps; extra sections register extra
    /// schedulers of the named kind.
    pub fn from_config(config: &RunnerConfig) -> Self {
        let mut runner = Self::bare(config.pool.max_per_kind);
        for (name, section) in &config.scheduler {
            let scheduler: Box<dyn Scheduler> = match section.kind {
                SchedulerKind::Frame => Box::new(FrameScheduler::new(section.max_per_tick)),
                SchedulerKind::Priority => Box::new(PriorityScheduler::new(section.max_per_tick)),
            };
            runner.register_scheduler(name.clone(), scheduler);
        }
        runner.ensure_canonical();
        runner
    }

    fn bare(pool_cap: usize) -> Self {
        Self {
            schedulers: Vec::new(),
            registry: HashMap::new(),
            dependents: HashMap::new(),
            auto_release: HashSet::new(),
            pool: TaskPool::new(pool_cap),
            running: true,
        }
    }

    fn ensure_canonical(&mut self) {
        if self.scheduler(DEFAULT_SCHEDULER).is_none() {
            self.schedulers.push((
                DEFAULT_SCHEDULER.to_string(),
                Box::new(FrameScheduler::new(DEFAULT_MAX_PER_TICK)),
            ));
        }
        if self.scheduler(PRIORITY_SCHEDULER).is_none() {
            self.schedulers.push((
                PRIORITY_SCHEDULER.to_string(),
                Box::new(PriorityScheduler::new(DEFAULT_MAX_PER_TICK)),
            ));
        }
    }

    // --- scheduler management ----------------------------------------------

    pub fn register_scheduler(&mut self, name: impl Into<String>, scheduler: Box<dyn Scheduler>) {
        let name = name.into();
        if let Some(slot) = self.schedulers.iter_mut().find(|(n, _)| *n == name) {
            warn!(scheduler = %name, "scheduler name already registered; replacing");
            slot.1 = scheduler;
        } else {
            self.schedulers.push((name, scheduler));
        }
    }

    pub fn scheduler(&self, name: &str) -> Option<&dyn Scheduler> {
        self.schedulers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_ref())
    }

    pub fn scheduler_mut(&mut self, name: &str) -> Option<&mut (dyn Scheduler + 'static)> {
        self.schedulers
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_mut())
    }

    // --- submission --------------------------------------------------------

    /// Submit onto the canonical frame-fair scheduler.
    pub fn submit(&mut self, task: TaskHandle) -> Result<TaskId> {
        self.submit_to(DEFAULT_SCHEDULER, task)
    }

    /// Submit onto a named scheduler. Registers the task globally and
    /// records its dependencies; prerequisites not (yet) known to the runner
    /// are warned about but the submission is still accepted, leaving the
    /// dependent `Pending` until the prerequisite completes.
    pub fn submit_to(&mut self, scheduler: &str, task: TaskHandle) -> Result<TaskId> {
        if self.scheduler(scheduler).is_none() {
            warn!(scheduler = %scheduler, "submit to unknown scheduler");
            return Err(TicktaskError::SchedulerNotFound(scheduler.to_string()));
        }

        let id = task.borrow().id();
        if self.registry.contains_key(&id) {
            warn!(task = id, "task already submitted; ignoring");
            return Ok(id);
        }

        let deps: Vec<TaskId> = task
            .borrow()
            .core()
            .dependencies()
            .iter()
            .map(|d| d.id)
            .collect();
        for dep in deps {
            if !self.registry.contains_key(&dep) {
                warn!(
                    task = id,
                    dependency = dep,
                    "dependency not registered with the runner; task stays pending until it completes"
                );
            }
            self.dependents.entry(dep).or_default().push(id);
        }

        self.registry.insert(id, task.clone());
        debug!(task = id, scheduler = %scheduler, "task submitted");
        if let Some(scheduler) = self.scheduler_mut(scheduler) {
            scheduler.schedule(task);
        }
        Ok(id)
    }

    pub fn submit_all(&mut self, tasks: Vec<TaskHandle>) -> Result<Vec<TaskId>> {
        self.submit_all_to(DEFAULT_SCHEDULER, tasks)
    }

    pub fn submit_all_to(&mut self, scheduler: &str, tasks: Vec<TaskHandle>) -> Result<Vec<TaskId>> {
        tasks
            .into_iter()
            .map(|task| self.submit_to(scheduler, task))
            .collect()
    }

    // --- lifecycle ---------------------------------------------------------

    /// Cancel a registered task and drop it everywhere.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let Some(task) = self.registry.remove(&id) else {
            warn!(task = id, "cancel for unknown task; ignoring");
            return false;
        };
        task.borrow_mut().cancel();
        for (_, scheduler) in self.schedulers.iter_mut() {
            scheduler.remove(id);
        }
        self.dependents.remove(&id);
        if self.auto_release.remove(&id) {
            self.pool.release(task);
        }
        true
    }

    /// Mark a task for return to the pool once it leaves the registry.
    pub fn auto_release(&mut self, task: &TaskHandle) {
        self.auto_release.insert(task.borrow().id());
    }

    /// Change a registered task's priority, re-sorting the scheduler entry
    /// that holds it.
    pub fn reprioritize(&mut self, id: TaskId, priority: i32) -> Result<()> {
        let Some(task) = self.registry.get(&id).cloned() else {
            return Err(TicktaskError::TaskNotFound(id));
        };
        for (_, scheduler) in self.schedulers.iter_mut() {
            if scheduler.contains(id) {
                scheduler.reprioritize(id, priority);
                return Ok(());
            }
        }
        // Registered but no longer queued; the value still sticks.
        task.borrow_mut().set_priority(priority);
        Ok(())
    }

    /// Advance every scheduler once, in registration order, then unregister
    /// whatever they dropped.
    pub fn tick(&mut self, dt: f32) {
        if !self.running {
            return;
        }

        let mut removed = Vec::new();
        for (_, scheduler) in self.schedulers.iter_mut() {
            removed.extend(scheduler.tick(dt).removed);
        }
        for id in removed {
            self.unregister(id);
        }
    }

    fn unregister(&mut self, id: TaskId) {
        let Some(task) = self.registry.remove(&id) else {
            return;
        };
        debug!(task = id, status = ?task.borrow().status(), "task reached terminal state; unregistered");
        self.dependents.remove(&id);
        if self.auto_release.remove(&id) {
            self.pool.release(task);
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Drop every task, dependency record and scheduler entry.
    pub fn clear(&mut self) {
        info!(tasks = self.registry.len(), "clearing runner");
        for (_, scheduler) in self.schedulers.iter_mut() {
            scheduler.clear();
        }
        self.registry.clear();
        self.dependents.clear();
        self.auto_release.clear();
    }

    // --- introspection -----------------------------------------------------

    pub fn get(&self, id: TaskId) -> Option<TaskHandle> {
        self.registry.get(&id).cloned()
    }

    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<TaskHandle> {
        self.registry
            .values()
            .filter(|t| t.borrow().status() == status)
            .cloned()
            .collect()
    }

    /// Ids recorded as gated on `id` at submission time.
    pub fn dependents_of(&self, id: TaskId) -> Vec<TaskId> {
        self.dependents.get(&id).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn pool(&mut self) -> &mut TaskPool {
        &mut self.pool
    }

    /// Human-readable snapshot of the runner state.
    pub fn statistics(&self) -> String {
        let mut counts: HashMap<TaskStatus, usize> = HashMap::new();
        for task in self.registry.values() {
            *counts.entry(task.borrow().status()).or_default() += 1;
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "runner: {} task(s), {}",
            self.registry.len(),
            if self.running { "running" } else { "paused" }
        );
        for status in [
            TaskStatus::Pending,
            TaskStatus::Running,
            TaskStatus::Paused,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
            TaskStatus::Failed,
        ] {
            if let Some(count) = counts.get(&status) {
                let _ = writeln!(out, "  {status:?}: {count}");
            }
        }
        for (name, scheduler) in &self.schedulers {
            let _ = writeln!(
                out,
                "  scheduler '{name}': {} task(s), {}",
                scheduler.len(),
                if scheduler.is_running() { "running" } else { "paused" }
            );
        }
        out
    }
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new()
    }
}
