//! Cold, single-shot units of asynchronous work.
//!
//! A [`Task`] stores a work closure and does nothing until it is started.
//! Starting consumes the task, so the work runs at most once. The work
//! receives a [`Resolver`] that is itself consumed when it reports, so each
//! start delivers at most one [`Outcome`].
//!
//! Where the work runs is up to the work: it may resolve before `start`
//! returns, or hand the resolver to a thread, timer or callback and resolve
//! later.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::error::TaskError;
use crate::outcome::Outcome;
use crate::queue::SerialQueue;

type Work<T> = Box<dyn FnOnce(Resolver<T>) + Send + 'static>;
type Observer<T> = Box<dyn FnOnce(Outcome<T>) + Send + 'static>;

/// Reports the outcome of a started [`Task`].
///
/// Every method consumes the resolver. If the work drops it without
/// resolving, nobody is told: a [`SerialQueue`] running that task stalls.
pub struct Resolver<T> {
    observer: Observer<T>,
}

impl<T> Resolver<T> {
    fn new<F>(observer: F) -> Self
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        Self {
            observer: Box::new(observer),
        }
    }

    /// Delivers the outcome to whoever started the task.
    pub fn resolve(self, outcome: Outcome<T>) {
        (self.observer)(outcome)
    }

    /// Resolves with a success value.
    pub fn succeed(self, value: T) {
        self.resolve(Outcome::Success(value))
    }

    /// Resolves with a failure.
    pub fn fail(self, error: impl Into<TaskError>) {
        self.resolve(Outcome::Failure(error.into()))
    }

    /// Resolves from a standard `Result`.
    pub fn complete<E>(self, result: Result<T, E>)
    where
        E: Into<TaskError>,
    {
        self.resolve(result.into())
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

/// A deferred computation that produces one [`Outcome`] once started.
///
/// # Examples
///
/// ```
/// use std::sync::mpsc;
/// use coldtask::{Outcome, Task};
///
/// let task = Task::new(|resolver| resolver.succeed(21 * 2));
///
/// let (tx, rx) = mpsc::channel();
/// task.start(move |outcome| tx.send(outcome).unwrap());
/// assert_eq!(rx.recv().unwrap(), Outcome::success(42));
/// ```
pub struct Task<T> {
    work: Work<T>,
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

impl<T> Task<T>
where
    T: Send + 'static,
{
    /// Wraps `work` without running it.
    ///
    /// `work` must eventually resolve the [`Resolver`] it is given, either
    /// before returning or later from any thread.
    pub fn new<F>(work: F) -> Self
    where
        F: FnOnce(Resolver<T>) + Send + 'static,
    {
        Self {
            work: Box::new(work),
        }
    }

    /// A task that reports `outcome` as soon as it is started.
    pub fn resolved(outcome: Outcome<T>) -> Self {
        Self::new(move |resolver| resolver.resolve(outcome))
    }

    /// A task that succeeds with `value` as soon as it is started.
    pub fn success(value: T) -> Self {
        Self::resolved(Outcome::Success(value))
    }

    /// A task that fails with `error` as soon as it is started.
    pub fn failure(error: impl Into<TaskError>) -> Self {
        Self::resolved(Outcome::Failure(error.into()))
    }

    /// Wraps a synchronous, fallible function. It runs on the thread that
    /// starts the task.
    pub fn from_fn<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        E: Into<TaskError>,
    {
        Self::new(move |resolver| resolver.complete(f()))
    }

    /// Runs the work, delivering its outcome to `observer`.
    pub fn start<F>(self, observer: F)
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        (self.work)(Resolver::new(observer))
    }

    /// Runs the work for its side effects only; the outcome is discarded.
    pub fn run(self) {
        self.start(|_| {})
    }

    /// Observes the outcome before it reaches the observer passed to `start`.
    ///
    /// `handler` sees the outcome by reference and cannot change it.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use coldtask::{Outcome, Task};
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let log = Arc::clone(&seen);
    ///
    /// Task::success(5)
    ///     .tap(move |outcome| log.lock().unwrap().push(outcome.is_success()))
    ///     .start(move |outcome| assert_eq!(outcome, Outcome::success(5)));
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec![true]);
    /// ```
    pub fn tap<F>(self, handler: F) -> Self
    where
        F: FnOnce(&Outcome<T>) + Send + 'static,
    {
        Self::new(move |resolver| {
            self.start(move |outcome| {
                handler(&outcome);
                resolver.resolve(outcome);
            })
        })
    }

    /// Hands this task to `queue` instead of starting it directly.
    pub fn enqueue(self, queue: &SerialQueue<T>) {
        queue.append(self)
    }

    /// Rewrites the outcome once the work completes.
    pub fn transform<U, F>(self, f: F) -> Task<U>
    where
        U: Send + 'static,
        F: FnOnce(Outcome<T>) -> Outcome<U> + Send + 'static,
    {
        Task::new(move |resolver| self.start(move |outcome| resolver.resolve(f(outcome))))
    }

    /// Transforms the success value.
    pub fn map<U, F>(self, f: F) -> Task<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.transform(move |outcome| outcome.map(f))
    }

    /// Transforms the failure.
    pub fn map_err<F>(self, f: F) -> Self
    where
        F: FnOnce(TaskError) -> TaskError + Send + 'static,
    {
        self.transform(move |outcome| outcome.map_err(f))
    }

    /// Sequences another task after this one succeeds.
    ///
    /// The next task is built from the success value and only started then.
    /// A failure skips it and is relayed as is.
    ///
    /// # Examples
    ///
    /// ```
    /// use coldtask::{Outcome, Task};
    ///
    /// let task = Task::success(2).and_then(|v| Task::success(v + 1));
    /// task.start(|outcome| assert_eq!(outcome, Outcome::success(3)));
    /// ```
    pub fn and_then<U, F>(self, f: F) -> Task<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Task<U> + Send + 'static,
    {
        Task::new(move |resolver| {
            self.start(move |outcome| match outcome {
                Outcome::Success(value) => f(value).start(move |next| resolver.resolve(next)),
                Outcome::Failure(error) => resolver.resolve(Outcome::Failure(error)),
            })
        })
    }

    /// Converts into a future that starts the task on first poll.
    ///
    /// If the work drops its resolver without resolving, the future completes
    /// with [`TaskError::abandoned`].
    pub fn into_future(self) -> TaskFuture<T> {
        TaskFuture {
            state: FutureState::Cold(self),
        }
    }
}

impl<T> IntoFuture for Task<T>
where
    T: Send + 'static,
{
    type Output = Outcome<T>;
    type IntoFuture = TaskFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        Task::into_future(self)
    }
}

enum FutureState<T> {
    Cold(Task<T>),
    Waiting(oneshot::Receiver<Outcome<T>>),
    Done,
}

/// Future returned by [`Task::into_future`].
#[must_use = "futures do nothing unless polled"]
pub struct TaskFuture<T> {
    state: FutureState<T>,
}

impl<T> fmt::Debug for TaskFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            FutureState::Cold(_) => "cold",
            FutureState::Waiting(_) => "waiting",
            FutureState::Done => "done",
        };
        f.debug_struct("TaskFuture").field("state", &state).finish()
    }
}

impl<T> Future for TaskFuture<T>
where
    T: Send + 'static,
{
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        if let FutureState::Cold(_) = this.state {
            let (tx, rx) = oneshot::channel();
            if let FutureState::Cold(task) =
                std::mem::replace(&mut this.state, FutureState::Waiting(rx))
            {
                task.start(move |outcome| {
                    // receiver gone means the future was dropped
                    let _ = tx.send(outcome);
                });
            }
        }

        let FutureState::Waiting(rx) = &mut this.state else {
            panic!("TaskFuture polled after completion");
        };
        let outcome = match Pin::new(rx).poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Ok(outcome)) => outcome,
            Poll::Ready(Err(oneshot::Canceled)) => Outcome::Failure(TaskError::abandoned()),
        };
        this.state = FutureState::Done;
        Poll::Ready(outcome)
    }
}
