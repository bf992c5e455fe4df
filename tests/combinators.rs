// tests/combinators.rs

use ticktask::builder::{self, TaskExt};
use ticktask::task::{Task, TaskStatus};
use ticktask::TaskRunner;

use ticktask_test_utils::builders::{
    condition_after, counter, counting_action, event_log, flaky_action, record, run_ticks,
};
use ticktask_test_utils::init_tracing;

#[test]
fn sequence_runs_children_in_order() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let log = event_log();
    let first = log.clone();
    let second = log.clone();
    let chain = builder::sequence(vec![
        builder::action(move || record(&first, "first")),
        builder::action(move || record(&second, "second")),
    ]);

    runner.submit(chain.clone()).unwrap();
    run_ticks(&mut runner, 2, 0.0);

    assert_eq!(*log.borrow(), vec!["first", "second"]);
    assert_eq!(chain.borrow().status(), TaskStatus::Completed);
}

#[test]
fn sequence_drains_child_retries_before_advancing() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let first_runs = counter();
    let second_runs = counter();
    // Fails twice, succeeds on the third attempt, with exactly two retries.
    let flaky = flaky_action(2, &first_runs).with_retry(2);
    let follow = counting_action(&second_runs);
    let chain = builder::sequence(vec![flaky.clone(), follow.clone()]);

    runner.submit(chain.clone()).unwrap();
    run_ticks(&mut runner, 6, 0.0);

    assert_eq!(first_runs.get(), 3);
    assert_eq!(second_runs.get(), 1);
    assert_eq!(flaky.borrow().status(), TaskStatus::Completed);
    assert_eq!(follow.borrow().status(), TaskStatus::Completed);
    assert_eq!(chain.borrow().status(), TaskStatus::Completed);
}

#[test]
fn sequence_cancels_itself_when_a_child_fails_terminally() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let runs = counter();
    let untouched = counter();
    // One failure allowed zero retries: terminal on the first tick.
    let doomed = flaky_action(10, &runs);
    let chain = builder::sequence(vec![doomed.clone(), counting_action(&untouched)]);

    runner.submit(chain.clone()).unwrap();
    run_ticks(&mut runner, 3, 0.0);

    assert_eq!(doomed.borrow().status(), TaskStatus::Failed);
    assert_eq!(chain.borrow().status(), TaskStatus::Cancelled);
    assert_eq!(untouched.get(), 0);
}

#[test]
fn parallel_wait_all_completes_with_the_slowest_child() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let both = builder::parallel(vec![condition_after(3), condition_after(5)]);
    runner.submit(both.clone()).unwrap();

    run_ticks(&mut runner, 4, 0.1);
    assert_eq!(both.borrow().status(), TaskStatus::Running);

    runner.tick(0.1);
    assert_eq!(both.borrow().status(), TaskStatus::Completed);
}

#[test]
fn parallel_wait_any_completes_with_the_fastest_child() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let fast = condition_after(3);
    let slow = condition_after(5);
    let either = builder::parallel_any(vec![fast.clone(), slow.clone()]);
    runner.submit(either.clone()).unwrap();

    run_ticks(&mut runner, 2, 0.1);
    assert_eq!(either.borrow().status(), TaskStatus::Running);

    runner.tick(0.1);
    assert_eq!(either.borrow().status(), TaskStatus::Completed);
    // The slower sibling is left as-is, not cancelled.
    assert_eq!(slow.borrow().status(), TaskStatus::Running);
}

#[test]
fn parallel_progress_is_the_mean_of_children() {
    init_tracing();

    let both = builder::parallel(vec![builder::delay(1.0), builder::delay(2.0)]);
    both.borrow_mut().execute(0.5);

    // Children sit at 0.25 and 0.125 after half a second.
    assert!((both.borrow().progress() - 0.1875).abs() < 1e-3);
}

#[test]
fn loop_runs_child_a_fixed_number_of_times() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let runs = counter();
    let thrice = builder::repeat(counting_action(&runs), 3);
    runner.submit(thrice.clone()).unwrap();

    run_ticks(&mut runner, 3, 0.0);

    assert_eq!(runs.get(), 3);
    assert_eq!(thrice.borrow().status(), TaskStatus::Completed);
}

#[test]
fn loop_zero_iterations_completes_without_running_the_child() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let runs = counter();
    let never = builder::repeat(counting_action(&runs), 0);
    runner.submit(never.clone()).unwrap();

    runner.tick(0.0);

    assert_eq!(runs.get(), 0);
    assert_eq!(never.borrow().status(), TaskStatus::Completed);
}

#[test]
fn unbounded_loop_keeps_running_and_reports_zero_progress() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let runs = counter();
    let forever = builder::repeat(counting_action(&runs), -1);
    runner.submit(forever.clone()).unwrap();

    run_ticks(&mut runner, 10, 0.0);

    assert_eq!(runs.get(), 10);
    assert_eq!(forever.borrow().status(), TaskStatus::Running);
    assert_eq!(forever.borrow().progress(), 0.0);
}

#[test]
fn loop_break_predicate_stops_the_loop() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let runs = counter();
    let seen = runs.clone();
    let bounded = builder::repeat_until(counting_action(&runs), move || seen.get() >= 4);
    runner.submit(bounded.clone()).unwrap();

    run_ticks(&mut runner, 8, 0.0);

    assert_eq!(runs.get(), 4);
    assert_eq!(bounded.borrow().status(), TaskStatus::Completed);
}

#[test]
fn branch_selects_by_predicate_once() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let hits = counter();
    let misses = counter();
    let mut flips = 0;
    let pick = builder::branch(
        move || {
            // Only the first evaluation decides; later flips must not matter.
            flips += 1;
            flips == 1
        },
        Some(counting_action(&hits)),
        Some(counting_action(&misses)),
    );
    runner.submit(pick.clone()).unwrap();

    runner.tick(0.0);

    assert_eq!(hits.get(), 1);
    assert_eq!(misses.get(), 0);
    assert_eq!(pick.borrow().status(), TaskStatus::Completed);
}

#[test]
fn branch_with_missing_side_completes_immediately() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let misses = counter();
    let pick = builder::branch(|| true, None, Some(counting_action(&misses)));
    runner.submit(pick.clone()).unwrap();

    runner.tick(0.0);

    assert_eq!(misses.get(), 0);
    assert_eq!(pick.borrow().status(), TaskStatus::Completed);
}

#[test]
fn timeout_fails_the_wrapper_and_cancels_the_child() {
    init_tracing();

    let mut runner = TaskRunner::new();
    let log = event_log();
    let causes = log.clone();
    let stuck = builder::wait_until(|| false);
    let guarded = builder::timeout(stuck.clone(), 0.5)
        .on_failed(move |_, cause| record(&causes, format!("{cause}")));

    runner.submit(guarded.clone()).unwrap();
    run_ticks(&mut runner, 3, 0.2);

    assert_eq!(guarded.borrow().status(), TaskStatus::Failed);
    assert_eq!(stuck.borrow().status(), TaskStatus::Cancelled);
    assert_eq!(*log.borrow(), vec!["timed out after 0.500s"]);
    assert!(runner.is_empty());
}

#[test]
fn timed_out_wrapper_can_retry_the_whole_subtree() {
    init_tracing();

    let mut runner = TaskRunner::new();
    // Becomes true on its second poll, but the first attempt times out
    // before getting there.
    let gate = condition_after(2);
    let guarded = builder::timeout(gate.clone(), 0.5).with_retry(1);

    runner.submit(guarded.clone()).unwrap();
    // Attempt one: 0.3 (child polled once), 0.6 -> timeout, retry.
    run_ticks(&mut runner, 2, 0.3);
    assert_eq!(guarded.borrow().status(), TaskStatus::Pending);

    // Attempt two: the child's predicate holds on the next poll.
    runner.tick(0.3);
    assert_eq!(guarded.borrow().status(), TaskStatus::Completed);
    assert_eq!(gate.borrow().status(), TaskStatus::Completed);
}
