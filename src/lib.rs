//! Cold, single-shot asynchronous tasks.
//!
//! A [`Task`] wraps a unit of work that does nothing until it is started and
//! then reports exactly one [`Outcome`]: a value or a [`TaskError`]. Tasks
//! compose by sequencing ([`Task::and_then`]), observation ([`Task::tap`])
//! and batching ([`batch`], [`batch_concurrent`]).
//!
//! A [`SerialQueue`] takes independently-created tasks and runs them one at a
//! time in the order they were appended, starting each as soon as the
//! previous one reports, failure included.
//!
//! The crate imposes no executor. Work may resolve synchronously, from a
//! thread, or from any callback; [`Task::into_future`] bridges into async
//! code when needed.
//!
//! # Example
//!
//! ```
//! use coldtask::{batch, Outcome, SerialQueue, Task};
//!
//! let fetch = |id: u32| Task::new(move |resolver| resolver.succeed(id * 100));
//!
//! // Nothing has run yet.
//! let all = batch(vec![fetch(1), fetch(2), fetch(3)]);
//!
//! let queue = SerialQueue::new();
//! all.map(|values| values.iter().sum::<u32>())
//!     .tap(|outcome| assert_eq!(outcome, &Outcome::success(600)))
//!     .enqueue(&queue);
//! assert!(queue.is_idle());
//! ```
//!
//! # Module Organization
//!
//! - [`outcome`] - The success/failure result type and [`zip`](outcome::zip)
//! - [`task`] - [`Task`], its [`Resolver`] and the future adapter
//! - [`queue`] - [`SerialQueue`] and [`QueueConfig`]
//! - [`batch`](mod@batch) - Serial and concurrent batch combinators
//! - [`legacy`] - Dynamically-typed value/error bridge
//! - [`error`] - [`TaskError`] and [`BridgeError`]

pub mod batch;
pub mod error;
pub mod legacy;
#[cfg(feature = "logging")]
pub mod logging;
pub mod outcome;
pub mod queue;
pub mod task;

// Re-exports for ergonomic access
pub use batch::{batch, batch_concurrent};
pub use error::{BridgeError, Result, TaskError};
pub use outcome::Outcome;
pub use queue::{QueueConfig, SerialQueue};
pub use task::{Resolver, Task, TaskFuture};
