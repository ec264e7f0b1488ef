//! The outcome slot shared between a task's producer and its consumers.
//!
//! An [`Outcome`] carries exactly one of two things: the value a computation
//! produced, or the [`Failure`] that ended it. Once a task stores an outcome,
//! the outcome never changes.

use std::any::Any;
use std::error::Error;
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::panic;
use std::sync::Arc;

/// An opaque captured failure.
///
/// A failure wraps an arbitrary payload behind a cheaply clonable shared
/// handle, so the same failure can be delivered to any number of consumers
/// and re-raised more than once without losing its identity.
///
/// Failures come from three places: an explicit payload handed to
/// [`Failure::new`], a panic captured at a runtime boundary via
/// [`Failure::from_panic`], or abandonment of a completion handle (payload
/// [`Abandoned`]).
///
/// # Example
///
/// ```rust
/// use signals::Failure;
///
/// let failure = Failure::new("disk on fire");
/// assert_eq!(failure.message(), Some("disk on fire"));
/// ```
#[derive(Clone)]
pub struct Failure {
    payload: Arc<dyn Any + Send + Sync>,
}

/// Stand-in payload for panic payloads that are neither a string nor a
/// [`Failure`] and therefore cannot be retained across threads.
#[derive(Debug)]
struct OpaquePanic;

impl Failure {
    /// Wraps an explicit payload into a failure.
    #[must_use]
    pub fn new<E>(payload: E) -> Self
    where
        E: Any + Send + Sync,
    {
        Self {
            payload: Arc::new(payload),
        }
    }

    /// Captures a panic payload obtained from [`std::panic::catch_unwind`].
    ///
    /// If the payload is itself a re-raised [`Failure`], the original failure
    /// is recovered so identity survives a raise/catch cycle. `String` and
    /// `&'static str` payloads (the ones `panic!` produces) keep their
    /// message; anything else is retained as an opaque marker.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<Self>() {
            Ok(failure) => *failure,
            Err(payload) => match payload.downcast::<String>() {
                Ok(message) => Self {
                    payload: Arc::new(*message),
                },
                Err(payload) => match payload.downcast::<&'static str>() {
                    Ok(message) => Self {
                        payload: Arc::new(*message),
                    },
                    Err(_) => Self {
                        payload: Arc::new(OpaquePanic),
                    },
                },
            },
        }
    }

    /// Re-raises the failure, unwinding the calling thread.
    ///
    /// The panic payload is the failure itself, so a `catch_unwind` further
    /// up the stack can recover it via [`Failure::from_panic`] with identity
    /// intact.
    pub fn raise(self) -> ! {
        panic::resume_unwind(Box::new(self))
    }

    /// Returns the failure's message, if it carries a textual payload.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.payload
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| self.payload.downcast_ref::<&'static str>().copied())
    }

    /// Borrows the payload as a concrete type, if that is what it is.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Any,
    {
        self.payload.downcast_ref::<E>()
    }

    /// Whether two failures share the same captured payload.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("message", &self.message())
            .finish_non_exhaustive()
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{message}"),
            None => write!(f, "opaque failure payload"),
        }
    }
}

/// Indicates that a task's completion handle was dropped without completing.
#[derive(Debug)]
pub struct Abandoned {
    _private: PhantomData<()>,
}

impl Abandoned {
    pub(crate) fn new() -> Self {
        Self {
            _private: PhantomData,
        }
    }
}

impl Error for Abandoned {}

impl Display for Abandoned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "completion handle was dropped without completing the task")
    }
}

/// The result of a completed computation: a value or a captured failure.
///
/// Continuations receive the outcome by shared reference; the blocking and
/// async retrieval paths clone it, which is why they carry a `T: Clone`
/// bound while subscription does not.
#[derive(Clone, Debug)]
#[allow(
    clippy::exhaustive_enums,
    reason = "Two terminal outcome kinds are inherent to the design; matching on them is the point"
)]
pub enum Outcome<T> {
    /// The computation produced a value.
    Success(T),

    /// The computation failed; the payload describes how.
    Failed(Failure),
}

impl<T> Outcome<T> {
    /// Wraps the value of a successful computation.
    #[must_use]
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    /// Wraps the failure that ended a computation.
    #[must_use]
    pub fn failure(failure: Failure) -> Self {
        Self::Failed(failure)
    }

    /// Whether this outcome carries a value.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Borrows the value, if the computation succeeded.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// Borrows the failure, if the computation failed.
    #[must_use]
    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Self::Success(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    /// Returns the value, or re-raises the captured failure.
    ///
    /// This is the retrieval path of [`Task::get_result`][crate::Task::get_result]:
    /// a caller that never checks for failure has the original failure
    /// re-raised at the point of retrieval.
    pub fn unwrap_or_raise(self) -> T {
        match self {
            Self::Success(value) => value,
            Self::Failed(failure) => failure.raise(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use static_assertions::assert_impl_all;

    use super::*;

    #[test]
    fn success_round_trips_value() {
        let outcome = Outcome::success(42);
        assert!(outcome.is_success());
        assert_eq!(outcome.value(), Some(&42));
        assert_eq!(outcome.unwrap_or_raise(), 42);
    }

    #[test]
    fn failure_preserves_message_on_raise() {
        let outcome = Outcome::<i32>::failure(Failure::new("deliberate".to_string()));

        let payload = catch_unwind(AssertUnwindSafe(|| outcome.unwrap_or_raise()))
            .expect_err("failed outcome must raise");

        let recovered = Failure::from_panic(payload);
        assert_eq!(recovered.message(), Some("deliberate"));
    }

    #[test]
    fn failure_identity_survives_raise_and_catch() {
        let original = Failure::new("identity probe");
        let twin = original.clone();

        let payload =
            catch_unwind(AssertUnwindSafe(move || twin.raise())).expect_err("raise must unwind");

        let recovered = Failure::from_panic(payload);
        assert!(recovered.ptr_eq(&original));
    }

    #[test]
    fn from_panic_keeps_string_payloads() {
        let code = 7;
        let payload = catch_unwind(move || panic!("boom: {code}")).expect_err("must panic");

        let failure = Failure::from_panic(payload);
        assert_eq!(failure.message(), Some("boom: 7"));
    }

    #[test]
    fn from_panic_keeps_static_str_payloads() {
        let payload = catch_unwind(|| panic!("static boom")).expect_err("must panic");

        let failure = Failure::from_panic(payload);
        assert_eq!(failure.message(), Some("static boom"));
    }

    #[test]
    fn from_panic_tolerates_exotic_payloads() {
        let payload = catch_unwind(|| panic::panic_any(1234_u64)).expect_err("must panic");

        let failure = Failure::from_panic(payload);
        assert_eq!(failure.message(), None);
        assert_eq!(format!("{failure}"), "opaque failure payload");
    }

    #[test]
    fn downcast_recovers_typed_payloads() {
        let failure = Failure::new(Abandoned::new());
        assert!(failure.downcast_ref::<Abandoned>().is_some());
        assert!(failure.downcast_ref::<String>().is_none());
    }

    #[test]
    fn thread_safe_types() {
        assert_impl_all!(Failure: Send, Sync, Clone);
        assert_impl_all!(Outcome<i32>: Send, Sync, Clone);
        assert_impl_all!(Abandoned: Error, Send, Sync);
    }
}
