// tests/leaf_tasks.rs

use ticktask::builder::{self, TaskExt};
use ticktask::task::{ProgressTask, Task, TaskStatus, with_task};
use ticktask::TaskRunner;

use ticktask_test_utils::builders::{
    condition_after, counter, counting_action, event_log, flaky_action,
};
use ticktask_test_utils::init_tracing;

#[test]
fn single_action_completes_in_one_tick() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let count = counter();
    let job = counting_action(&count);

    runner.submit(job.clone()).unwrap();
    runner.tick(0.0);

    assert_eq!(count.get(), 1);
    assert_eq!(job.borrow().status(), TaskStatus::Completed);
    assert_eq!(job.borrow().progress(), 1.0);
    // Terminal tasks leave the registry in the same tick.
    assert!(runner.is_empty());
}

#[test]
fn delay_accumulates_dt_and_reports_progress() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let wait = builder::delay(1.0);
    runner.submit(wait.clone()).unwrap();

    runner.tick(0.4);
    assert_eq!(wait.borrow().status(), TaskStatus::Running);
    assert!((wait.borrow().progress() - 0.2).abs() < 1e-3);

    runner.tick(0.4);
    assert!((wait.borrow().progress() - 0.4).abs() < 1e-3);

    // Accumulated 1.2 s >= 1.0 s.
    runner.tick(0.4);
    assert_eq!(wait.borrow().status(), TaskStatus::Completed);
    assert_eq!(wait.borrow().progress(), 1.0);
    assert!(runner.is_empty());
}

#[test]
fn delay_with_follow_up_splits_progress_between_phases() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let count = counter();
    let chain = builder::delay_then(0.5, counting_action(&count));
    runner.submit(chain.clone()).unwrap();

    runner.tick(0.25);
    assert!((chain.borrow().progress() - 0.25).abs() < 1e-3);
    assert_eq!(count.get(), 0);

    // Delay phase finishes here; the follow-up runs on the next tick.
    runner.tick(0.25);
    assert_eq!(count.get(), 0);
    assert!((chain.borrow().progress() - 0.5).abs() < 1e-3);

    runner.tick(0.0);
    assert_eq!(count.get(), 1);
    assert_eq!(chain.borrow().status(), TaskStatus::Completed);
}

#[test]
fn condition_polls_until_true() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let gate = condition_after(3);
    runner.submit(gate.clone()).unwrap();

    runner.tick(0.1);
    runner.tick(0.1);
    assert_eq!(gate.borrow().status(), TaskStatus::Running);

    runner.tick(0.1);
    assert_eq!(gate.borrow().status(), TaskStatus::Completed);
}

#[test]
fn progress_task_reports_and_forces_one_on_completion() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let log = event_log();
    let observed = log.clone();
    let work = builder::progress_fn(|value| {
        *value += 0.4;
        *value >= 1.0
    })
    .on_progress(move |_, p| observed.borrow_mut().push(format!("{p:.1}")));

    runner.submit(work.clone()).unwrap();

    runner.tick(0.0);
    assert!((work.borrow().progress() - 0.4).abs() < 1e-3);
    runner.tick(0.0);
    assert!((work.borrow().progress() - 0.8).abs() < 1e-3);
    runner.tick(0.0);
    assert_eq!(work.borrow().status(), TaskStatus::Completed);
    assert_eq!(work.borrow().progress(), 1.0);

    assert_eq!(*log.borrow(), vec!["0.4", "0.8", "1.0"]);
}

#[test]
fn progress_task_external_value_is_clamped() {
    init_tracing();

    let work = builder::progress_fn(|value| *value >= 1.0);
    let clamped = with_task::<ProgressTask, _>(&work, |task| {
        task.set_progress(2.5);
    });
    assert!(clamped.is_some());
    assert_eq!(work.borrow().progress(), 1.0);
}

#[test]
fn iterator_task_advances_one_step_per_tick() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let steps = builder::iterator(|| Box::new(std::iter::repeat(()).take(3)));
    runner.submit(steps.clone()).unwrap();

    runner.tick(0.0);
    runner.tick(0.0);
    runner.tick(0.0);
    assert_eq!(steps.borrow().status(), TaskStatus::Running);

    // Fourth advance observes exhaustion.
    runner.tick(0.0);
    assert_eq!(steps.borrow().status(), TaskStatus::Completed);
}

#[test]
fn iterator_task_restarts_from_source_after_reset() {
    init_tracing();

    let steps = builder::iterator(|| Box::new(std::iter::once(())));
    assert!(!steps.borrow_mut().execute(0.0));
    steps.borrow_mut().reset();

    // A fresh iterator again yields one step before exhaustion.
    assert!(!steps.borrow_mut().execute(0.0));
    assert!(steps.borrow_mut().execute(0.0));
    assert_eq!(steps.borrow().status(), TaskStatus::Completed);
}

#[test]
fn retry_budget_bounds_recovery() {
    init_tracing();

    // k failures then success with max_retries = k ends Completed.
    let runs = counter();
    let recovers = flaky_action(2, &runs).with_retry(2);
    let mut attempts = 0;
    while !recovers.borrow_mut().execute(0.0) {
        attempts += 1;
        assert!(attempts < 10);
    }
    assert_eq!(recovers.borrow().status(), TaskStatus::Completed);
    assert_eq!(runs.get(), 3);

    // k + 1 failures with max_retries = k ends Failed, firing the failed
    // event exactly once.
    let runs = counter();
    let failures = counter();
    let seen = failures.clone();
    let doomed = flaky_action(3, &runs)
        .with_retry(2)
        .on_failed(move |_, _| seen.set(seen.get() + 1));
    let mut attempts = 0;
    while !doomed.borrow_mut().execute(0.0) {
        attempts += 1;
        assert!(attempts < 10);
    }
    assert_eq!(doomed.borrow().status(), TaskStatus::Failed);
    assert_eq!(runs.get(), 3);
    assert_eq!(failures.get(), 1);
}

#[test]
fn reset_is_idempotent() {
    init_tracing();

    let wait = builder::delay(1.0);
    wait.borrow_mut().execute(0.6);
    assert_eq!(wait.borrow().status(), TaskStatus::Running);

    wait.borrow_mut().reset();
    let after_one = (
        wait.borrow().status(),
        wait.borrow().progress(),
    );
    wait.borrow_mut().reset();
    let after_two = (
        wait.borrow().status(),
        wait.borrow().progress(),
    );

    assert_eq!(after_one, (TaskStatus::Pending, 0.0));
    assert_eq!(after_one, after_two);
}
