//! FIFO queue that runs one task at a time.
//!
//! [`SerialQueue`] keeps a backlog of cold tasks and a single running slot.
//! Appending to an idle queue starts the task straight away; otherwise it
//! waits its turn. Each completion clears the slot and starts the next task,
//! until the backlog is empty.
//!
//! # Concurrency
//!
//! The backlog and running slot live behind one `parking_lot::Mutex`, so
//! `append` may be called from any thread and tasks may complete on any
//! thread. Tasks are always started with the lock released.
//!
//! The drain is a loop, not recursion: a task that completes before `start`
//! returns only clears the slot, and the thread already driving the loop
//! starts the next one. A long backlog of synchronous tasks therefore runs
//! in constant stack depth.

use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::batch::Collector;
use crate::task::Task;

/// Configuration for a [`SerialQueue`].
///
/// # Examples
///
/// ```
/// use coldtask::{QueueConfig, SerialQueue};
///
/// let queue: SerialQueue<()> = SerialQueue::with_config(
///     QueueConfig::default()
///         .with_label("uploads")
///         .with_backlog_capacity(64),
/// );
/// assert_eq!(queue.label(), "uploads");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Name attached to this queue's log events.
    pub label: String,

    /// Number of backlog slots reserved up front.
    pub backlog_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            label: "serial".to_string(),
            backlog_capacity: 16,
        }
    }
}

impl QueueConfig {
    /// Sets the label used in log events.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the initial backlog capacity.
    #[must_use]
    pub fn with_backlog_capacity(mut self, capacity: usize) -> Self {
        self.backlog_capacity = capacity;
        self
    }
}

struct State<T> {
    backlog: VecDeque<Task<T>>,
    /// A task has been started and has not reported yet.
    running: bool,
    /// Some thread is inside `drain` and will pick up the next task.
    driving: bool,
}

struct Shared<T> {
    label: String,
    state: Mutex<State<T>>,
}

/// A FIFO runner that never has more than one task in flight.
///
/// Cloning yields another handle to the same queue.
///
/// A task whose work never resolves stalls the queue for good; nothing
/// behind it will start. Work that panics inside `start` frees the slot
/// while unwinding, so a caller that catches the panic can keep appending.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use coldtask::{SerialQueue, Task};
///
/// let queue = SerialQueue::new();
/// let log = Arc::new(Mutex::new(Vec::new()));
///
/// for name in ["a", "b", "c"] {
///     let log = Arc::clone(&log);
///     Task::new(move |resolver| {
///         log.lock().unwrap().push(name);
///         resolver.succeed(());
///     })
///     .enqueue(&queue);
/// }
///
/// assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
/// assert!(queue.is_idle());
/// ```
pub struct SerialQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for SerialQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for SerialQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("SerialQueue")
            .field("label", &self.shared.label)
            .field("pending", &state.backlog.len())
            .field("running", &state.running)
            .finish()
    }
}

impl<T> Default for SerialQueue<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SerialQueue<T>
where
    T: Send + 'static,
{
    /// Creates an empty, idle queue with the default configuration.
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Creates an empty, idle queue.
    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                label: config.label,
                state: Mutex::new(State {
                    backlog: VecDeque::with_capacity(config.backlog_capacity),
                    running: false,
                    driving: false,
                }),
            }),
        }
    }

    /// The label from this queue's configuration.
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Adds `task` to the back of the backlog, starting it at once if the
    /// queue is idle.
    pub fn append(&self, task: Task<T>) {
        let pending = {
            let mut state = self.shared.state.lock();
            state.backlog.push_back(task);
            state.backlog.len()
        };
        tracing::trace!(queue = %self.shared.label, pending, "task appended");
        Self::drain(&self.shared);
    }

    /// Number of tasks waiting to start, not counting the running one.
    pub fn len(&self) -> usize {
        self.shared.state.lock().backlog.len()
    }

    /// Returns `true` if no task is waiting to start.
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().backlog.is_empty()
    }

    /// Returns `true` if a task has started and not yet reported.
    pub fn is_running(&self) -> bool {
        self.shared.state.lock().running
    }

    /// Returns `true` if nothing is running and nothing is waiting.
    pub fn is_idle(&self) -> bool {
        let state = self.shared.state.lock();
        !state.running && state.backlog.is_empty()
    }

    /// Builds a task that runs `tasks` on this queue and collects their
    /// values in input order.
    ///
    /// Unlike [`batch`](crate::batch()), the children share this queue, so
    /// they interleave in FIFO order with anything else appended to it. The
    /// children are appended only when the returned task is started. The
    /// aggregate fails with the first failure in input order.
    ///
    /// # Examples
    ///
    /// ```
    /// use coldtask::{Outcome, SerialQueue, Task};
    ///
    /// let queue = SerialQueue::new();
    /// let both = queue.batch(vec![Task::success(1), Task::success(2)]);
    /// both.start(|outcome| assert_eq!(outcome, Outcome::success(vec![1, 2])));
    /// ```
    pub fn batch(&self, tasks: Vec<Task<T>>) -> Task<Vec<T>>
    where
        T: Clone,
    {
        if tasks.is_empty() {
            return Task::success(Vec::new());
        }

        let queue = self.clone();
        Task::new(move |resolver| {
            tracing::debug!(queue = %queue.shared.label, children = tasks.len(), "starting batch");
            let collector = Collector::new(tasks.len(), resolver);
            for (index, task) in tasks.into_iter().enumerate() {
                let collector = Arc::clone(&collector);
                task.tap(move |outcome| collector.record(index, outcome.clone()))
                    .enqueue(&queue);
            }
        })
    }

    fn drain(shared: &Arc<Shared<T>>) {
        let mut state = shared.state.lock();
        if state.running || state.driving {
            return;
        }
        state.driving = true;

        loop {
            let Some(task) = state.backlog.pop_front() else {
                state.driving = false;
                tracing::trace!(queue = %shared.label, "queue idle");
                return;
            };
            state.running = true;
            let pending = state.backlog.len();
            drop(state);

            tracing::debug!(queue = %shared.label, pending, "starting queued task");
            let queue = Arc::clone(shared);
            let guard = StartGuard { shared: &**shared };
            task.start(move |outcome| {
                tracing::trace!(
                    queue = %queue.label,
                    failed = outcome.is_failure(),
                    "queued task completed"
                );
                Self::complete(&queue);
            });
            mem::forget(guard);

            state = shared.state.lock();
            if state.running {
                // still in flight; its completion resumes the drain
                state.driving = false;
                return;
            }
        }
    }

    fn complete(shared: &Arc<Shared<T>>) {
        let resume = {
            let mut state = shared.state.lock();
            state.running = false;
            !state.driving
        };
        if resume {
            Self::drain(shared);
        }
    }
}

/// Frees the running slot if a task's work unwinds out of `start`.
struct StartGuard<'a, T> {
    shared: &'a Shared<T>,
}

impl<T> Drop for StartGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        state.running = false;
        state.driving = false;
        tracing::warn!(queue = %self.shared.label, "queued task panicked while starting");
    }
}
