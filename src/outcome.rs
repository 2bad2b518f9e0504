//! The single result a task reports when it completes.

use crate::error::TaskError;

/// Result of running a [`Task`](crate::Task): a value or a failure, never both.
///
/// # Examples
///
/// ```
/// use coldtask::{Outcome, TaskError};
///
/// let ok: Outcome<u32> = Outcome::success(2);
/// assert_eq!(ok.map(|v| v * 10), Outcome::success(20));
///
/// let failed: Outcome<u32> = Outcome::failure(TaskError::msg("offline"));
/// assert!(failed.is_failure());
/// assert_eq!(failed.error().map(ToString::to_string), Some("offline".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The work produced a value.
    Success(T),
    /// The work failed.
    Failure(TaskError),
}

impl<T> Outcome<T> {
    /// Creates a successful outcome.
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    /// Creates a failed outcome from anything convertible into a [`TaskError`].
    pub fn failure(error: impl Into<TaskError>) -> Self {
        Self::Failure(error.into())
    }

    /// Returns `true` for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for [`Outcome::Failure`].
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Borrows the success value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Borrows the failure, if any.
    pub fn error(&self) -> Option<&TaskError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Converts `&Outcome<T>` into `Outcome<&T>`.
    pub fn as_ref(&self) -> Outcome<&T> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(error) => Outcome::Failure(error.clone()),
        }
    }

    /// Transforms the success value, relaying failures unchanged.
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Transforms the failure, leaving success values untouched.
    pub fn map_err<F>(self, f: F) -> Self
    where
        F: FnOnce(TaskError) -> TaskError,
    {
        match self {
            Self::Success(value) => Self::Success(value),
            Self::Failure(error) => Self::Failure(f(error)),
        }
    }

    /// Chains a computation that may itself fail.
    pub fn and_then<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Outcome<U>,
    {
        match self {
            Self::Success(value) => f(value),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<T, TaskError> {
        self.into()
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T>
where
    E: Into<TaskError>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error.into()),
        }
    }
}

impl<T> From<Outcome<T>> for Result<T, TaskError> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

/// Folds per-task outcomes into one.
///
/// All successes yield the values in their original order. Otherwise the
/// first failure, by position in `outcomes`, wins.
///
/// # Examples
///
/// ```
/// use coldtask::{outcome::zip, Outcome, TaskError};
///
/// assert_eq!(
///     zip(vec![Outcome::success(1), Outcome::success(2)]),
///     Outcome::success(vec![1, 2])
/// );
///
/// let zipped = zip(vec![
///     Outcome::success(1),
///     Outcome::failure(TaskError::msg("first")),
///     Outcome::failure(TaskError::msg("second")),
/// ]);
/// assert_eq!(zipped, Outcome::failure(TaskError::msg("first")));
/// ```
pub fn zip<T, I>(outcomes: I) -> Outcome<Vec<T>>
where
    I: IntoIterator<Item = Outcome<T>>,
{
    let outcomes = outcomes.into_iter();
    let mut values = Vec::with_capacity(outcomes.size_hint().0);
    for outcome in outcomes {
        match outcome {
            Outcome::Success(value) => values.push(value),
            Outcome::Failure(error) => return Outcome::Failure(error),
        }
    }
    Outcome::Success(values)
}
