//! Legacy bridge integration tests.
//!
//! The dynamically-typed pair must carry success and failure across the
//! boundary unchanged, including the "no value" case for void-like tasks.

use std::sync::mpsc;
use std::time::Duration;

use coldtask::legacy::{AnyObserver, AnyOutcome, AnyTask};
use coldtask::{Outcome, SerialQueue, Task, TaskError};

fn capture_any(task: AnyTask) -> AnyOutcome {
    let (tx, rx) = mpsc::channel();
    let observer: AnyObserver = Box::new(move |outcome| tx.send(outcome).unwrap());
    task.start(Some(observer));
    rx.recv_timeout(Duration::from_secs(5)).unwrap()
}

#[test]
fn typed_success_crosses_the_boundary() {
    let any = capture_any(AnyTask::from_task(Task::success(vec![1u8, 2, 3])));
    assert!(any.is_success());
    assert_eq!(any.downcast_ref::<Vec<u8>>(), Some(&vec![1, 2, 3]));
}

#[test]
fn typed_failure_crosses_the_boundary() {
    let any = capture_any(AnyTask::from_task(Task::<u8>::failure(TaskError::msg("denied"))));
    assert!(!any.is_success());
    assert_eq!(any.error_ref(), Some(&TaskError::msg("denied")));
}

#[test]
fn void_task_reports_explicit_unit() {
    let any = capture_any(AnyTask::new(|resolver| resolver.resolve(AnyOutcome::unit())));
    let (value, error) = any.into_parts();
    assert!(error.is_none());
    assert!(value.is_some_and(|value| value.is::<()>()));
}

#[test]
fn dynamic_work_recovered_as_typed_task_runs_on_a_queue() {
    let queue = SerialQueue::new();
    let (tx, rx) = mpsc::channel();

    AnyTask::new(|resolver| {
        std::thread::spawn(move || resolver.succeed(String::from("from legacy")));
    })
    .into_task::<String>()
    .tap(move |outcome| tx.send(outcome.clone()).unwrap())
    .enqueue(&queue);

    assert_eq!(
        rx.recv_timeout(Duration::from_secs(5)).unwrap(),
        Outcome::success("from legacy".to_string())
    );
}

#[test]
fn legacy_failure_reaches_typed_observer() {
    let (tx, rx) = mpsc::channel();
    AnyTask::new(|resolver| resolver.fail(TaskError::msg("legacy error")))
        .into_task::<u32>()
        .start(move |outcome| tx.send(outcome).unwrap());
    assert_eq!(rx.recv().unwrap(), Outcome::failure(TaskError::msg("legacy error")));
}
