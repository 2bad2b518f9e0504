//! Combinators that fold many tasks into one.
//!
//! Both combinators return a cold `Task<Vec<T>>` whose value lists the
//! children's values in input order. If any child fails, the aggregate fails
//! with the first failure in input order; the other children still run.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::outcome::{zip, Outcome};
use crate::queue::{QueueConfig, SerialQueue};
use crate::task::{Resolver, Task};

/// Gathers child outcomes into their input slots and resolves the aggregate
/// once every child has reported.
pub(crate) struct Collector<T> {
    state: Mutex<CollectorState<T>>,
}

struct CollectorState<T> {
    slots: Vec<Option<Outcome<T>>>,
    remaining: usize,
    resolver: Option<Resolver<Vec<T>>>,
}

impl<T> Collector<T>
where
    T: Send + 'static,
{
    pub(crate) fn new(children: usize, resolver: Resolver<Vec<T>>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(CollectorState {
                slots: (0..children).map(|_| None).collect(),
                remaining: children,
                resolver: Some(resolver),
            }),
        })
    }

    pub(crate) fn record(&self, index: usize, outcome: Outcome<T>) {
        let finished = {
            let mut state = self.state.lock();
            let Some(slot) = state.slots.get_mut(index) else {
                return;
            };
            if slot.is_some() {
                return;
            }
            *slot = Some(outcome);
            state.remaining -= 1;
            if state.remaining > 0 {
                return;
            }
            let slots = std::mem::take(&mut state.slots);
            state.resolver.take().map(|resolver| (resolver, slots))
        };

        if let Some((resolver, slots)) = finished {
            let children = slots.len();
            let outcome = zip(slots.into_iter().flatten());
            tracing::debug!(children, failed = outcome.is_failure(), "batch finished");
            resolver.resolve(outcome);
        }
    }
}

/// Runs `tasks` one at a time on a private [`SerialQueue`] and collects their
/// values in input order.
///
/// The children are only started when the returned task is. They never run
/// concurrently with each other, even when their work is asynchronous. An
/// empty list yields a task that succeeds with an empty vector.
///
/// # Examples
///
/// ```
/// use coldtask::{batch, Outcome, Task, TaskError};
///
/// let all = batch(vec![Task::success(1), Task::success(2), Task::success(3)]);
/// all.start(|outcome| assert_eq!(outcome, Outcome::success(vec![1, 2, 3])));
///
/// let broken = batch(vec![
///     Task::success(1),
///     Task::failure(TaskError::msg("second")),
///     Task::success(3),
/// ]);
/// broken.start(|outcome| assert_eq!(outcome, Outcome::failure(TaskError::msg("second"))));
/// ```
pub fn batch<T>(tasks: Vec<Task<T>>) -> Task<Vec<T>>
where
    T: Send + 'static,
{
    if tasks.is_empty() {
        return Task::success(Vec::new());
    }

    Task::new(move |resolver| {
        let children = tasks.len();
        tracing::debug!(children, "starting serial batch");
        let queue = SerialQueue::with_config(
            QueueConfig::default()
                .with_label("batch")
                .with_backlog_capacity(children),
        );
        let collector = Collector::new(children, resolver);
        for (index, task) in tasks.into_iter().enumerate() {
            let collector = Arc::clone(&collector);
            task.transform(move |outcome| {
                collector.record(index, outcome);
                Outcome::Success(())
            })
            .enqueue(&queue);
        }
    })
}

/// Starts every task at once and collects their values in input order.
///
/// The order of the aggregate follows `tasks`, not completion order. An
/// empty list yields a task that succeeds with an empty vector.
///
/// # Examples
///
/// ```
/// use std::thread;
/// use std::time::Duration;
/// use coldtask::{batch_concurrent, Outcome, Task};
///
/// let slow = Task::new(|resolver| {
///     thread::spawn(move || {
///         thread::sleep(Duration::from_millis(20));
///         resolver.succeed("slow");
///     });
/// });
/// let fast = Task::success("fast");
///
/// let (tx, rx) = std::sync::mpsc::channel();
/// batch_concurrent(vec![slow, fast]).start(move |outcome| tx.send(outcome).unwrap());
/// assert_eq!(rx.recv().unwrap(), Outcome::success(vec!["slow", "fast"]));
/// ```
pub fn batch_concurrent<T>(tasks: Vec<Task<T>>) -> Task<Vec<T>>
where
    T: Send + 'static,
{
    if tasks.is_empty() {
        return Task::success(Vec::new());
    }

    Task::new(move |resolver| {
        tracing::debug!(children = tasks.len(), "starting concurrent batch");
        let collector = Collector::new(tasks.len(), resolver);
        for (index, task) in tasks.into_iter().enumerate() {
            let collector = Arc::clone(&collector);
            task.start(move |outcome| collector.record(index, outcome));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskError;
    use std::sync::mpsc;
    use std::time::Duration;

    fn capture<T: Send + 'static>(task: Task<T>) -> Outcome<T> {
        let (tx, rx) = mpsc::channel();
        task.start(move |outcome| tx.send(outcome).unwrap());
        rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn collector_waits_for_every_slot() {
        let (tx, rx) = mpsc::channel();
        let task = Task::new(move |resolver: Resolver<Vec<u8>>| {
            let collector = Collector::new(3, resolver);
            collector.record(2, Outcome::success(30));
            collector.record(0, Outcome::success(10));
            tx.send(Arc::clone(&collector)).unwrap();
        });

        let (done_tx, done_rx) = mpsc::channel();
        task.start(move |outcome| done_tx.send(outcome).unwrap());
        assert!(done_rx.try_recv().is_err());

        rx.recv().unwrap().record(1, Outcome::success(20));
        assert_eq!(done_rx.recv().unwrap(), Outcome::success(vec![10, 20, 30]));
    }

    #[test]
    fn collector_ignores_duplicate_and_out_of_range_reports() {
        let (tx, rx) = mpsc::channel();
        Task::new(move |resolver: Resolver<Vec<u8>>| {
            let collector = Collector::new(2, resolver);
            collector.record(0, Outcome::success(1));
            collector.record(0, Outcome::success(99));
            collector.record(7, Outcome::success(99));
            collector.record(1, Outcome::success(2));
        })
        .start(move |outcome| tx.send(outcome).unwrap());

        assert_eq!(rx.recv().unwrap(), Outcome::success(vec![1, 2]));
    }

    #[test]
    fn serial_batch_reports_first_failure_by_position() {
        let task = batch(vec![
            Task::<u8>::failure(TaskError::msg("a")),
            Task::failure(TaskError::msg("b")),
        ]);
        assert_eq!(capture(task), Outcome::failure(TaskError::msg("a")));
    }

    #[test]
    fn concurrent_batch_of_nothing() {
        assert_eq!(
            capture(batch_concurrent(Vec::<Task<u8>>::new())),
            Outcome::success(vec![])
        );
    }
}
