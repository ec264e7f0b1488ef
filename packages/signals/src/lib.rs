//! Single-shot task and manual-reset event signaling primitives for
//! concurrent environments.
//!
//! This crate is a minimal asynchronous computation runtime built from two
//! primitives:
//!
//! - [`ManualResetEvent`] - a one-shot, lock-free, multi-waiter broadcast
//!   signal: any number of registrations park on an intrusive waiter list
//!   and are resumed by the thread that sets the event.
//! - [`Task<T>`] - a single-shot future/continuation object: a computation
//!   is completed exactly once with a value or a captured [`Failure`], and
//!   consumers either block for the result, subscribe continuations to it,
//!   or await it.
//!
//! There is deliberately no executor: continuations run inline,
//! synchronously, on whichever thread completes the dependency. A long
//! completion-triggered callback chain therefore executes on the producer's
//! call stack. Cancellation, timeouts and re-running a completed task are
//! out of scope.
//!
//! # Task Example
//!
//! ```rust
//! use signals::Task;
//!
//! let task = Task::spawn(|| {
//!     // Some long-running computation on another thread.
//!     6 * 7
//! });
//!
//! // Blocking retrieval; a failure would be re-raised here instead.
//! assert_eq!(task.get_result(), 42);
//! ```
//!
//! # Composition Example
//!
//! ```rust
//! use signals::Task;
//!
//! let (task, completion) = Task::new();
//!
//! let task = task
//!     .on_success(|value| println!("computed {value}"))
//!     .on_failure(|failure| eprintln!("failed: {failure}"))
//!     .on_finally(|| println!("settled either way"));
//!
//! // Whichever thread completes the task runs the handlers, in order.
//! completion.complete_with_value(7);
//! # drop(task);
//! ```
//!
//! # Event Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//!
//! use signals::ManualResetEvent;
//!
//! let event = Arc::new(ManualResetEvent::new(false));
//!
//! let setter = {
//!     let event = Arc::clone(&event);
//!     thread::spawn(move || event.set())
//! };
//!
//! // Waiters registered before the set are resumed by the setter thread;
//! // registrations after it resume inline.
//! event.register_waiter(|| println!("signaled"));
//!
//! setter.join().unwrap();
//! assert!(event.is_set());
//! ```

mod constants;
mod event;
mod outcome;
mod task;

pub(crate) use constants::ERR_POISONED_LOCK;
pub use event::{Continuation, ManualResetEvent, SetFuture};
pub use outcome::{Abandoned, Failure, Outcome};
pub use task::{Completion, Task};
