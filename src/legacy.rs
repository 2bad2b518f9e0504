//! Dynamically-typed bridge for callers that cannot name `T`.
//!
//! Older integration layers pass results around as a nullable value plus a
//! nullable error. [`AnyOutcome`] is that pair, with the invariant that
//! exactly one side is present; [`AnyTask`] is a task speaking it. Both
//! convert losslessly to and from the typed [`Outcome`] and [`Task`].
//!
//! Void-like tasks carry `()` as their value, so "no value" is still an
//! explicit success and never confused with a missing result.
//!
//! # Examples
//!
//! ```
//! use coldtask::legacy::{AnyOutcome, AnyTask};
//! use coldtask::{Outcome, Task};
//!
//! let any = AnyOutcome::from(Outcome::success(7u32));
//! assert_eq!(any.downcast_ref::<u32>(), Some(&7));
//! assert_eq!(any.into_outcome::<u32>().unwrap(), Outcome::success(7));
//!
//! let task: Task<String> = AnyTask::from_task(Task::success("hi".to_string())).into_task();
//! task.start(|outcome| assert_eq!(outcome, Outcome::success("hi".to_string())));
//! ```

use std::any::{type_name, Any};
use std::fmt;

use crate::error::{BridgeError, TaskError};
use crate::outcome::Outcome;
use crate::task::{Resolver, Task};

/// A type-erased success value.
pub type AnyValue = Box<dyn Any + Send>;

/// Observer accepted by [`AnyTask::start`].
pub type AnyObserver = Box<dyn FnOnce(AnyOutcome) + Send + 'static>;

/// A value/error pair where exactly one side is present.
pub struct AnyOutcome {
    value: Option<AnyValue>,
    error: Option<TaskError>,
}

impl AnyOutcome {
    /// A success holding `value`.
    pub fn value<V>(value: V) -> Self
    where
        V: Any + Send,
    {
        Self::boxed(Box::new(value))
    }

    /// A success holding an already type-erased value.
    pub fn boxed(value: AnyValue) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    /// A success with no meaningful value.
    pub fn unit() -> Self {
        Self::value(())
    }

    /// A failure.
    pub fn error(error: impl Into<TaskError>) -> Self {
        Self {
            value: None,
            error: Some(error.into()),
        }
    }

    /// Validates a raw pair.
    pub fn from_parts(
        value: Option<AnyValue>,
        error: Option<TaskError>,
    ) -> Result<Self, BridgeError> {
        match (value, error) {
            (Some(value), None) => Ok(Self::boxed(value)),
            (None, Some(error)) => Ok(Self::error(error)),
            (None, None) => Err(BridgeError::MissingValueAndError),
            (Some(_), Some(_)) => Err(BridgeError::ValueAndError),
        }
    }

    /// Splits into the raw pair. Exactly one side is `Some`.
    pub fn into_parts(self) -> (Option<AnyValue>, Option<TaskError>) {
        (self.value, self.error)
    }

    /// Returns `true` if this pair holds a value.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Borrows the type-erased value, if any.
    pub fn value_ref(&self) -> Option<&(dyn Any + Send)> {
        self.value.as_deref()
    }

    /// Borrows the error, if any.
    pub fn error_ref(&self) -> Option<&TaskError> {
        self.error.as_ref()
    }

    /// Borrows the value as `V` if it is one.
    pub fn downcast_ref<V>(&self) -> Option<&V>
    where
        V: Any,
    {
        self.value.as_ref().and_then(|value| value.downcast_ref::<V>())
    }

    /// Converts back into a typed outcome.
    ///
    /// Failures convert for any `T`. A value of some other type is a
    /// [`BridgeError::TypeMismatch`].
    pub fn into_outcome<T>(self) -> Result<Outcome<T>, BridgeError>
    where
        T: Any,
    {
        match self.into_any() {
            Outcome::Failure(error) => Ok(Outcome::Failure(error)),
            Outcome::Success(value) => value
                .downcast::<T>()
                .map(|value| Outcome::Success(*value))
                .map_err(|_| BridgeError::TypeMismatch {
                    expected: type_name::<T>(),
                }),
        }
    }

    /// Converts into an outcome over the erased value without downcasting.
    pub fn into_any(self) -> Outcome<AnyValue> {
        match (self.value, self.error) {
            (_, Some(error)) => Outcome::Failure(error),
            (Some(value), None) => Outcome::Success(value),
            (None, None) => Outcome::Failure(BridgeError::MissingValueAndError.into()),
        }
    }

    /// Builds a pair from an outcome over an erased value, without boxing it again.
    pub fn from_any(outcome: Outcome<AnyValue>) -> Self {
        match outcome {
            Outcome::Success(value) => Self::boxed(value),
            Outcome::Failure(error) => Self::error(error),
        }
    }
}

impl<T> From<Outcome<T>> for AnyOutcome
where
    T: Any + Send,
{
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Outcome::Success(value) => Self::value(value),
            Outcome::Failure(error) => Self::error(error),
        }
    }
}

impl fmt::Debug for AnyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(error) => f.debug_tuple("AnyOutcome::Error").field(error).finish(),
            None => f.debug_tuple("AnyOutcome::Value").field(&"..").finish(),
        }
    }
}

/// Resolver handed to [`AnyTask`] work.
#[derive(Debug)]
pub struct AnyResolver {
    inner: Resolver<AnyValue>,
}

impl AnyResolver {
    /// Delivers the pair to whoever started the task.
    pub fn resolve(self, outcome: AnyOutcome) {
        self.inner.resolve(outcome.into_any())
    }

    /// Resolves with a value.
    pub fn succeed<V>(self, value: V)
    where
        V: Any + Send,
    {
        self.resolve(AnyOutcome::value(value))
    }

    /// Resolves with a failure.
    pub fn fail(self, error: impl Into<TaskError>) {
        self.resolve(AnyOutcome::error(error))
    }
}

/// A cold task whose outcome is an [`AnyOutcome`].
#[derive(Debug)]
pub struct AnyTask {
    inner: Task<AnyValue>,
}

impl AnyTask {
    /// Wraps `work` without running it.
    pub fn new<F>(work: F) -> Self
    where
        F: FnOnce(AnyResolver) + Send + 'static,
    {
        Self {
            inner: Task::new(move |inner| work(AnyResolver { inner })),
        }
    }

    /// Erases the value type of a typed task.
    pub fn from_task<T>(task: Task<T>) -> Self
    where
        T: Any + Send,
    {
        Self {
            inner: task.map(|value| Box::new(value) as AnyValue),
        }
    }

    /// Recovers a typed task.
    ///
    /// If the work reports a value that is not a `T`, the typed task fails
    /// with the [`BridgeError`].
    pub fn into_task<T>(self) -> Task<T>
    where
        T: Any + Send,
    {
        self.inner.transform(|outcome| {
            AnyOutcome::from_any(outcome)
                .into_outcome::<T>()
                .unwrap_or_else(|error| Outcome::Failure(error.into()))
        })
    }

    /// Runs the work. Without an observer the outcome is discarded.
    pub fn start(self, observer: Option<AnyObserver>) {
        match observer {
            Some(observer) => self
                .inner
                .start(move |outcome| observer(AnyOutcome::from_any(outcome))),
            None => self.inner.run(),
        }
    }
}
