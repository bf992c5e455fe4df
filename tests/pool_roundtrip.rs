// tests/pool_roundtrip.rs

use ticktask::TaskPool;
use ticktask::TaskRunner;
use ticktask::builder;
use ticktask::task::{ActionTask, ConditionTask, DelayTask, Task, TaskStatus, with_task};

use ticktask_test_utils::builders::counter;
use ticktask_test_utils::init_tracing;

#[test]
fn release_then_acquire_returns_a_cleared_task() {
    init_tracing();

    let mut pool = TaskPool::new(10);

    let task = pool.acquire::<DelayTask>();
    let id = task.borrow().id();
    with_task::<DelayTask, _>(&task, |delay| delay.set_duration(3.0));
    {
        let mut task = task.borrow_mut();
        task.set_priority(7);
        task.set_max_retries(4);
        task.execute(1.0);
    }
    pool.release(task);
    assert_eq!(pool.pooled::<DelayTask>(), 1);

    let again = pool.acquire::<DelayTask>();
    let again = again.borrow();
    // Identity survives the round trip; configuration does not.
    assert_eq!(again.id(), id);
    assert_eq!(again.status(), TaskStatus::Pending);
    assert_eq!(again.priority(), 0);
    assert_eq!(again.max_retries(), 0);
    assert_eq!(again.progress(), 0.0);
    assert!(again.core().dependencies().is_empty());
}

#[test]
fn acquire_mints_when_the_freelist_is_empty() {
    init_tracing();

    let mut pool = TaskPool::new(10);
    let a = pool.acquire::<ActionTask>();
    let b = pool.acquire::<ActionTask>();
    assert_ne!(a.borrow().id(), b.borrow().id());
}

#[test]
fn freelists_are_keyed_by_concrete_kind() {
    init_tracing();

    let mut pool = TaskPool::new(10);
    let action = pool.acquire::<ActionTask>();
    pool.release(action);

    assert_eq!(pool.pooled::<ActionTask>(), 1);
    assert_eq!(pool.pooled::<ConditionTask>(), 0);

    // Acquiring another kind must not consume the pooled action.
    let _condition = pool.acquire::<ConditionTask>();
    assert_eq!(pool.pooled::<ActionTask>(), 1);
}

#[test]
fn release_beyond_the_bound_discards() {
    init_tracing();

    let mut pool = TaskPool::new(2);
    for _ in 0..4 {
        let task = pool.acquire::<ActionTask>();
        pool.release(task);
        // Each round trip reuses the single pooled instance.
    }
    let fresh: Vec<_> = (0..4).map(|_| pool.acquire::<ActionTask>()).collect();
    for task in fresh {
        pool.release(task);
    }
    assert_eq!(pool.pooled::<ActionTask>(), 2);
}

#[test]
fn prewarm_is_clamped_to_the_bound() {
    init_tracing();

    let mut pool = TaskPool::new(3);
    pool.prewarm::<DelayTask>(50);
    assert_eq!(pool.pooled::<DelayTask>(), 3);
}

#[test]
fn released_task_still_referenced_elsewhere_is_not_pooled() {
    init_tracing();

    let mut pool = TaskPool::new(10);
    let task = pool.acquire::<ActionTask>();
    let keeper = task.clone();
    pool.release(task);

    assert_eq!(pool.pooled::<ActionTask>(), 0);
    // It was still cleared on the way out.
    assert_eq!(keeper.borrow().status(), TaskStatus::Pending);
}

#[test]
fn clear_kind_and_clear_all_empty_the_freelists() {
    init_tracing();

    let mut pool = TaskPool::new(10);
    pool.prewarm::<ActionTask>(2);
    pool.prewarm::<DelayTask>(2);

    pool.clear_kind::<ActionTask>();
    assert_eq!(pool.pooled::<ActionTask>(), 0);
    assert_eq!(pool.pooled::<DelayTask>(), 2);

    pool.clear_all();
    assert_eq!(pool.pooled::<DelayTask>(), 0);
}

#[test]
fn auto_release_returns_terminal_tasks_to_the_runner_pool() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let runs = counter();
    let count = runs.clone();
    let job = builder::action(move || count.set(count.get() + 1));
    runner.submit(job.clone()).unwrap();
    runner.auto_release(&job);
    drop(job);

    runner.tick(0.0);

    assert_eq!(runs.get(), 1);
    assert!(runner.is_empty());
    assert_eq!(runner.pool().pooled::<ActionTask>(), 1);
}
