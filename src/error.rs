//! Error types for deferred tasks.
//!
//! The core has exactly one failure kind, [`TaskError`]: an opaque wrapper
//! around whatever error the task's work reported. Queues and batches never
//! invent errors of their own; they relay the failures of the tasks they run.
//!
//! [`BridgeError`] covers misuse of the dynamically-typed legacy bridge and is
//! the only error this crate creates itself.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Result alias whose error is a [`TaskError`].
pub type Result<T> = std::result::Result<T, TaskError>;

/// The failure carried by [`Outcome::Failure`](crate::Outcome::Failure).
///
/// Wraps an arbitrary caller-supplied error. Cloning is cheap (the inner error
/// is reference counted), so the same failure can be relayed by a batch
/// without copying it.
///
/// Any `std::error::Error + Send + Sync + 'static` converts into a
/// `TaskError` with `?` or `.into()`. Like other opaque error wrappers,
/// `TaskError` does not itself implement `std::error::Error`; use
/// [`as_error`](TaskError::as_error) when a `&dyn Error` is needed.
///
/// # Examples
///
/// ```
/// use coldtask::TaskError;
///
/// let err = TaskError::msg("disk full");
/// assert_eq!(err.to_string(), "disk full");
///
/// let io = std::io::Error::new(std::io::ErrorKind::Other, "broken pipe");
/// let err = TaskError::from(io);
/// assert!(err.downcast_ref::<std::io::Error>().is_some());
/// ```
#[derive(Clone)]
pub struct TaskError {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
}

/// Plain message error behind [`TaskError::msg`].
#[derive(Debug, Error)]
#[error("{0}")]
struct Message(String);

/// Reported by [`Task::into_future`](crate::Task::into_future) when the work
/// dropped its resolver without resolving.
#[derive(Debug, Error)]
#[error("task dropped its resolver without producing an outcome")]
struct Abandoned;

impl TaskError {
    /// Wraps an error value.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(error),
        }
    }

    /// Creates an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Message(message.into()))
    }

    /// Wraps an already boxed error.
    pub fn from_boxed(error: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self {
            inner: Arc::from(error),
        }
    }

    /// The failure produced when a resolver is dropped unresolved.
    pub fn abandoned() -> Self {
        Self::new(Abandoned)
    }

    /// Returns `true` if this is the [`abandoned`](TaskError::abandoned) failure.
    pub fn is_abandoned(&self) -> bool {
        self.downcast_ref::<Abandoned>().is_some()
    }

    /// Attempts to view the wrapped error as a concrete type.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    /// The wrapped error's own cause, if it has one.
    pub fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }

    /// Returns the wrapped error as a trait object.
    pub fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner
    }
}

impl<E> From<E> for TaskError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl From<TaskError> for Box<dyn StdError + Send + Sync + 'static> {
    fn from(error: TaskError) -> Self {
        Box::new(error.inner)
    }
}

impl From<TaskError> for Box<dyn StdError + 'static> {
    fn from(error: TaskError) -> Self {
        Box::new(error.inner)
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TaskError").field(&self.inner).finish()
    }
}

/// Two failures are equal when they share the same wrapped error or render
/// the same message.
impl PartialEq for TaskError {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
            || self.to_string() == other.to_string()
    }
}

impl AsRef<dyn StdError + Send + Sync + 'static> for TaskError {
    fn as_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.as_error()
    }
}

/// Errors raised while crossing the dynamically-typed legacy bridge.
///
/// # Examples
///
/// ```
/// use coldtask::legacy::AnyOutcome;
/// use coldtask::BridgeError;
///
/// let err = AnyOutcome::from_parts(None, None).unwrap_err();
/// assert_eq!(err, BridgeError::MissingValueAndError);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The pair had neither a value nor an error.
    #[error("legacy outcome carries neither a value nor an error")]
    MissingValueAndError,

    /// The pair had both a value and an error.
    #[error("legacy outcome carries both a value and an error")]
    ValueAndError,

    /// The dynamic value was not of the requested type.
    #[error("legacy value is not a `{expected}`")]
    TypeMismatch {
        /// Name of the type the caller asked for.
        expected: &'static str,
    },
}
