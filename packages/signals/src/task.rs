//! Single-shot tasks: thread-safe result exchange with blocking and
//! subscription-based consumption.
//!
//! A task is created pending and completed exactly once, with either a value
//! or a [`Failure`]. Consumers can block for the outcome
//! ([`Task::get_result`]), subscribe continuations to it ([`Task::subscribe`]
//! and the [`on_success`][Task::on_success] family), or await the handle as a
//! [`Future`]. Continuations queued before completion are flushed by the
//! completing thread, inline and in registration order; continuations
//! subscribed after completion run immediately on the subscribing thread.
//!
//! There is deliberately no executor behind any of this: whichever thread
//! completes the task pays for the queued continuations on its own stack.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Condvar, Mutex};
use std::task::{Context, Poll, Waker};
use std::thread;

use crate::outcome::Abandoned;
use crate::{ERR_POISONED_LOCK, Failure, Outcome};

/// A queued continuation; receives the final outcome by shared reference.
type Callback<T> = Box<dyn FnOnce(&Outcome<T>) + Send>;

/// The two states of a task. Both completion arms are terminal; the stored
/// outcome never changes once present.
enum CoreState<T> {
    /// Not yet completed; holds the continuations queued so far, in
    /// registration order.
    Pending(Vec<Callback<T>>),

    /// Completed. The outcome is shared so consumers can read it without
    /// holding the state lock.
    Completed(Arc<Outcome<T>>),
}

/// The synchronization core shared by a task's handles and continuations:
/// one mutex guarding both the outcome slot and the continuation list, plus
/// a condition for blocked retrievers.
struct TaskCore<T> {
    state: Mutex<CoreState<T>>,
    completed: Condvar,
}

impl<T> TaskCore<T>
where
    T: Send,
{
    fn new() -> Self {
        Self {
            state: Mutex::new(CoreState::Pending(Vec::new())),
            completed: Condvar::new(),
        }
    }

    /// Stores the outcome, wakes every blocked retriever and flushes every
    /// queued continuation on the calling thread, in registration order.
    ///
    /// # Panics
    ///
    /// Panics if an outcome was already stored. Double completion is a
    /// programming error, not a recoverable condition.
    #[cfg_attr(test, mutants::skip)] // Critical primitive - causes test timeouts if tampered.
    fn complete(&self, outcome: Outcome<T>) {
        let shared = Arc::new(outcome);

        let callbacks = {
            let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

            if matches!(&*state, CoreState::Completed(_)) {
                // Release the guard before panicking so the poisoned-lock
                // path is not forced on consumers of the original outcome.
                drop(state);
                panic!("task completed more than once");
            }

            let previous = mem::replace(&mut *state, CoreState::Completed(Arc::clone(&shared)));

            match previous {
                CoreState::Pending(callbacks) => callbacks,
                CoreState::Completed(_) => {
                    unreachable!("we are re-matching an already matched pattern")
                }
            }
        };

        // Broadcast: a single completion wakes every blocked retriever.
        self.completed.notify_all();

        // Continuations run outside the lock so they can subscribe further
        // work against this task without deadlocking, and so retrievers are
        // not held up behind them. A panicking continuation must not rob
        // later continuations of their exactly-once invocation, so each one
        // is guarded; the first captured panic is re-raised after the flush
        // (later payloads from the same flush are discarded).
        let mut first_panic: Option<Box<dyn Any + Send>> = None;

        for callback in callbacks {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(&shared))) {
                first_panic.get_or_insert(payload);
            }
        }

        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
    }

    /// Blocks until the outcome is present, then returns a shared handle
    /// to it. Tolerates spurious wakeups.
    fn wait(&self) -> Arc<Outcome<T>> {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        loop {
            match &*state {
                CoreState::Completed(outcome) => return Arc::clone(outcome),
                CoreState::Pending(_) => {
                    state = self.completed.wait(state).expect(ERR_POISONED_LOCK);
                }
            }
        }
    }

    /// Non-blocking peek at the outcome.
    fn peek(&self) -> Option<Arc<Outcome<T>>> {
        match &*self.state.lock().expect(ERR_POISONED_LOCK) {
            CoreState::Completed(outcome) => Some(Arc::clone(outcome)),
            CoreState::Pending(_) => None,
        }
    }

    /// Queues a continuation, or - if the task is already completed - runs
    /// it immediately on the calling thread, outside the lock.
    fn subscribe(&self, callback: Callback<T>) {
        let outcome = {
            let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

            match &mut *state {
                CoreState::Pending(pending) => {
                    pending.push(callback);
                    return;
                }
                CoreState::Completed(outcome) => Arc::clone(outcome),
            }
        };

        // Synchronous fast path. The lock is already released, so the
        // callback is free to subscribe more work; a panic here unwinds
        // into the subscriber, whose own stack this is.
        callback(&outcome);
    }
}

/// The consumer handle to a single-shot task.
///
/// A task is completed exactly once - through its [`Completion`] handle, or
/// automatically by [`Task::spawn`]'s runtime boundary - and every consumer
/// then observes that one outcome: blocking callers of
/// [`get_result`][Self::get_result], queued continuations, and awaiters of
/// the handle itself.
///
/// The handle is single-owner; moving it transfers it. Dropping it while the
/// computation is pending merely detaches the consumer - the computation
/// still runs to completion and queued continuations still fire.
///
/// # Example
///
/// ```rust
/// use signals::Task;
///
/// let task = Task::spawn(|| 6 * 7);
/// assert_eq!(task.get_result(), 42);
/// ```
pub struct Task<T>
where
    T: Send,
{
    core: Arc<TaskCore<T>>,

    /// Waker slot shared with the continuation the `Future` impl subscribes
    /// on first poll. Present only once the handle has been polled.
    awaiter: Option<Arc<Mutex<Option<Waker>>>>,
}

impl<T> Task<T>
where
    T: Send,
{
    /// Creates a pending task, returning the consumer handle and the
    /// producer's completion handle.
    ///
    /// # Example
    ///
    /// ```rust
    /// use signals::Task;
    ///
    /// let (task, completion) = Task::new();
    /// completion.complete_with_value("done");
    /// assert_eq!(task.get_result(), "done");
    /// ```
    #[must_use]
    pub fn new() -> (Self, Completion<T>) {
        let core = Arc::new(TaskCore::new());

        (
            Self {
                core: Arc::clone(&core),
                awaiter: None,
            },
            Completion { core: Some(core) },
        )
    }

    /// Runs `producer` on a new thread and returns the task for its result.
    ///
    /// This is the runtime boundary: a panic escaping `producer` is caught
    /// and routed into the failure completion automatically - it never
    /// silently terminates the producer thread while leaving the task
    /// pending forever.
    ///
    /// # Example
    ///
    /// ```rust
    /// use signals::Task;
    ///
    /// let task = Task::spawn(|| "expensive".len());
    /// assert_eq!(task.get_result(), 9);
    /// ```
    pub fn spawn<F>(producer: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
        T: Sync + 'static,
    {
        let (task, completion) = Self::new();

        // Detached on purpose; completion is reported through the task, not
        // the join handle.
        drop(thread::spawn(move || {
            match panic::catch_unwind(AssertUnwindSafe(producer)) {
                Ok(value) => completion.complete_with_value(value),
                Err(payload) => completion.complete_with_error(Failure::from_panic(payload)),
            }
        }));

        task
    }

    /// Blocks until the task completes, then returns the value or re-raises
    /// the captured failure.
    ///
    /// Safe for any number of concurrent callers sharing this handle: a
    /// single completion wakes all of them, and each receives its own clone
    /// of the value.
    pub fn get_result(&self) -> T
    where
        T: Clone,
    {
        let outcome = self.core.wait();
        (*outcome).clone().unwrap_or_raise()
    }

    /// Whether the task has completed. Never blocks.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.core.peek().is_some()
    }

    /// Registers a continuation to be invoked exactly once with the task's
    /// final outcome.
    ///
    /// If the task is already completed, the callback runs synchronously on
    /// the calling thread, before `subscribe` returns. Otherwise it is
    /// queued and later invoked - in registration order, inline - by
    /// whichever thread completes the task. A subscription racing with the
    /// completion resolves to exactly one of those paths; it is never lost.
    ///
    /// This is also the suspension integration point: a consumer suspends
    /// on a task by subscribing a continuation that resumes it. The
    /// [`Future`] implementation for this handle is exactly that pattern.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: FnOnce(&Outcome<T>) + Send + 'static,
    {
        self.core.subscribe(Box::new(callback));
    }

    /// Attaches a handler invoked with the value if the task succeeds.
    ///
    /// On failure the handler is silently skipped; observe failures with
    /// [`on_failure`][Self::on_failure] or [`get_result`][Self::get_result].
    ///
    /// Each attachment is an independent subscription; one completion
    /// triggers every attached handler exactly once, in attachment order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use signals::Task;
    ///
    /// let (task, completion) = Task::new();
    /// let task = task
    ///     .on_success(|value| println!("got {value}"))
    ///     .on_failure(|failure| eprintln!("failed: {failure}"))
    ///     .on_finally(|| println!("settled"));
    ///
    /// completion.complete_with_value(7);
    /// # drop(task);
    /// ```
    #[must_use]
    pub fn on_success<F>(self, handler: F) -> Self
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.subscribe(move |outcome| {
            if let Some(value) = outcome.value() {
                handler(value);
            }
        });
        self
    }

    /// Attaches a handler invoked with the failure if the task fails.
    #[must_use]
    pub fn on_failure<F>(self, handler: F) -> Self
    where
        F: FnOnce(&Failure) + Send + 'static,
    {
        self.subscribe(move |outcome| {
            if let Some(failure) = outcome.as_failure() {
                handler(failure);
            }
        });
        self
    }

    /// Attaches a handler invoked when the task settles, whatever the
    /// outcome. The handler cannot assume a value is available.
    #[must_use]
    pub fn on_finally<F>(self, handler: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.subscribe(move |_outcome| handler());
        self
    }
}

impl<T> fmt::Debug for Task<T>
where
    T: Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("is_completed", &self.is_completed())
            .finish_non_exhaustive()
    }
}

impl<T> Future for Task<T>
where
    T: Clone + Send,
{
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let Some(outcome) = this.core.peek() {
            return Poll::Ready((*outcome).clone());
        }

        match &this.awaiter {
            Some(slot) => {
                // Only the waker from the most recent poll should be woken.
                *slot.lock().expect(ERR_POISONED_LOCK) = Some(cx.waker().clone());
            }
            None => {
                let slot = Arc::new(Mutex::new(Some(cx.waker().clone())));
                let subscription_slot = Arc::clone(&slot);

                this.core.subscribe(Box::new(move |_outcome| {
                    // Take the waker first so the wake happens with the
                    // slot lock already released.
                    let waker = subscription_slot.lock().expect(ERR_POISONED_LOCK).take();
                    if let Some(waker) = waker {
                        waker.wake();
                    }
                }));

                this.awaiter = Some(slot);
            }
        }

        // Completion may have raced the waker store; re-check so the stored
        // waker is never the only record of this poll.
        match this.core.peek() {
            Some(outcome) => Poll::Ready((*outcome).clone()),
            None => Poll::Pending,
        }
    }
}

/// The producer handle to a single-shot task.
///
/// Both completion operations consume the handle, so completing the same
/// task twice through the public API is unrepresentable. Dropping the handle
/// without completing fails the task with an [`Abandoned`] payload, so
/// consumers are never left blocked forever.
pub struct Completion<T>
where
    T: Send,
{
    /// Taken by the completion operations; still present in `drop` only if
    /// the producer abandoned the task.
    core: Option<Arc<TaskCore<T>>>,
}

impl<T> Completion<T>
where
    T: Send,
{
    /// Completes the task with a value, waking every blocked retriever and
    /// flushing every queued continuation on this thread.
    pub fn complete_with_value(mut self, value: T) {
        self.complete(Outcome::success(value));
    }

    /// Completes the task with a failure, waking every blocked retriever and
    /// flushing every queued continuation on this thread.
    pub fn complete_with_error(mut self, failure: Failure) {
        self.complete(Outcome::failure(failure));
    }

    fn complete(&mut self, outcome: Outcome<T>) {
        let core = self
            .core
            .take()
            .expect("completion handle core is present until a completion operation consumes it");

        core.complete(outcome);
    }
}

impl<T> fmt::Debug for Completion<T>
where
    T: Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("is_consumed", &self.core.is_none())
            .finish_non_exhaustive()
    }
}

impl<T> Drop for Completion<T>
where
    T: Send,
{
    fn drop(&mut self) {
        if let Some(core) = self.core.take() {
            // The producer went away without completing; fail the task so
            // blocked and subscribed consumers are not stranded.
            core.complete(Outcome::failure(Failure::new(Abandoned::new())));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::executor::block_on;
    use static_assertions::assert_impl_all;
    use testing::{spin_until, with_watchdog};

    use super::*;

    #[test]
    fn complete_then_get_result_returns_value() {
        let (task, completion) = Task::new();
        completion.complete_with_value(42);
        assert_eq!(task.get_result(), 42);
    }

    #[test]
    fn get_result_blocks_until_completion() {
        with_watchdog(|| {
            let (task, completion) = Task::new();

            let producer = thread::spawn(move || {
                completion.complete_with_value("eventually".to_string());
            });

            assert_eq!(task.get_result(), "eventually");
            producer.join().unwrap();
        });
    }

    #[test]
    fn broadcast_wake_reaches_every_blocked_retriever() {
        with_watchdog(|| {
            const RETRIEVERS: usize = 8;

            let (task, completion) = Task::new();
            let task = Arc::new(task);
            let blocked = Arc::new(Barrier::new(RETRIEVERS + 1));

            let handles: Vec<_> = (0..RETRIEVERS)
                .map(|_| {
                    let task = Arc::clone(&task);
                    let blocked = Arc::clone(&blocked);
                    thread::spawn(move || {
                        blocked.wait();
                        task.get_result()
                    })
                })
                .collect();

            // Give every retriever a chance to actually block first.
            blocked.wait();
            thread::sleep(std::time::Duration::from_millis(10));
            completion.complete_with_value(7);

            for handle in handles {
                assert_eq!(handle.join().unwrap(), 7);
            }
        });
    }

    #[test]
    fn late_subscription_runs_synchronously() {
        let (task, completion) = Task::new();
        completion.complete_with_value(5);

        let invoked = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&invoked);

        task.subscribe(move |outcome| {
            assert_eq!(outcome.value(), Some(&5));
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // The fast path completes before subscribe returns.
        assert_eq!(invoked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn early_subscriptions_flush_in_registration_order() {
        let (task, completion) = Task::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in 1..=3 {
            let order = Arc::clone(&order);
            task.subscribe(move |outcome| {
                assert_eq!(outcome.value(), Some(&7));
                order.lock().unwrap().push(label);
            });
        }

        assert!(order.lock().unwrap().is_empty());
        completion.complete_with_value(7);
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn subscribed_handlers_and_blocked_retriever_observe_same_value() {
        with_watchdog(|| {
            let (task, completion) = Task::new();
            let task = Arc::new(task);
            let invocations = Arc::new(AtomicUsize::new(0));

            for _ in 0..2 {
                let counter = Arc::clone(&invocations);
                task.subscribe(move |outcome| {
                    assert_eq!(outcome.value(), Some(&7));
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }

            let retriever = {
                let task = Arc::clone(&task);
                thread::spawn(move || task.get_result())
            };

            completion.complete_with_value(7);

            assert_eq!(retriever.join().unwrap(), 7);
            assert_eq!(invocations.load(Ordering::SeqCst), 2);
        });
    }

    #[test]
    fn completing_twice_panics_at_the_core() {
        let (task, completion) = Task::new();
        completion.complete_with_value(1);

        // The consuming handles make this unrepresentable in the public API,
        // so aim a second completion at the core directly.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            task.core.complete(Outcome::success(2));
        }));

        assert!(result.is_err());
        // The stored outcome was not overwritten.
        assert_eq!(task.get_result(), 1);
    }

    #[test]
    fn failure_is_reraised_at_retrieval() {
        with_watchdog(|| {
            let (task, completion) = Task::<i32>::new();
            completion.complete_with_error(Failure::new("deliberate".to_string()));

            let payload = panic::catch_unwind(AssertUnwindSafe(|| task.get_result()))
                .expect_err("retrieving a failed task must raise");

            assert_eq!(Failure::from_panic(payload).message(), Some("deliberate"));
        });
    }

    #[test]
    fn spawn_routes_value() {
        with_watchdog(|| {
            let task = Task::spawn(|| 21 * 2);
            assert_eq!(task.get_result(), 42);
        });
    }

    #[test]
    fn spawn_routes_panic_into_failure() {
        with_watchdog(|| {
            let task = Task::<i32>::spawn(|| panic!("producer exploded"));

            let payload = panic::catch_unwind(AssertUnwindSafe(|| task.get_result()))
                .expect_err("the producer panic must surface at retrieval");

            let failure = Failure::from_panic(payload);
            assert_eq!(failure.message(), Some("producer exploded"));
        });
    }

    #[test]
    fn dropped_completion_fails_task_with_abandoned() {
        with_watchdog(|| {
            let (task, completion) = Task::<i32>::new();

            let observed = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&observed);
            task.subscribe(move |outcome| {
                let failure = outcome.as_failure().expect("abandonment is a failure");
                assert!(failure.downcast_ref::<Abandoned>().is_some());
                counter.fetch_add(1, Ordering::SeqCst);
            });

            drop(completion);
            assert_eq!(observed.load(Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn on_success_sees_value_and_skips_failure() {
        let successes = Arc::new(AtomicUsize::new(0));

        let (task, completion) = Task::new();
        let counter = Arc::clone(&successes);
        let _task = task.on_success(move |value| {
            assert_eq!(*value, 9);
            counter.fetch_add(1, Ordering::SeqCst);
        });
        completion.complete_with_value(9);
        assert_eq!(successes.load(Ordering::SeqCst), 1);

        let (task, completion) = Task::<i32>::new();
        let counter = Arc::clone(&successes);
        let _task = task.on_success(move |_value| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        completion.complete_with_error(Failure::new("nope"));
        assert_eq!(successes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn on_failure_sees_failure_and_skips_value() {
        let failures = Arc::new(AtomicUsize::new(0));

        let (task, completion) = Task::<i32>::new();
        let counter = Arc::clone(&failures);
        let _task = task.on_failure(move |failure| {
            assert_eq!(failure.message(), Some("observed"));
            counter.fetch_add(1, Ordering::SeqCst);
        });
        completion.complete_with_error(Failure::new("observed"));
        assert_eq!(failures.load(Ordering::SeqCst), 1);

        let (task, completion) = Task::new();
        let counter = Arc::clone(&failures);
        let _task = task.on_failure(move |_failure| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        completion.complete_with_value(3);
        assert_eq!(failures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn on_finally_runs_for_both_outcomes() {
        let settled = Arc::new(AtomicUsize::new(0));

        let (task, completion) = Task::new();
        let counter = Arc::clone(&settled);
        let _task = task.on_finally(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        completion.complete_with_value(1);

        let (task, completion) = Task::<i32>::new();
        let counter = Arc::clone(&settled);
        let _task = task.on_finally(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        completion.complete_with_error(Failure::new("still settles"));

        assert_eq!(settled.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn chained_handlers_fire_in_attachment_order() {
        let order = Arc::new(Mutex::new(Vec::new()));

        let (task, completion) = Task::new();
        let success_order = Arc::clone(&order);
        let finally_order = Arc::clone(&order);

        let _task = task
            .on_success(move |value| {
                success_order.lock().unwrap().push(format!("success:{value}"));
            })
            .on_finally(move || {
                finally_order.lock().unwrap().push("finally".to_string());
            });

        completion.complete_with_value(7);

        assert_eq!(
            *order.lock().unwrap(),
            vec!["success:7".to_string(), "finally".to_string()]
        );
    }

    #[test]
    fn panicking_continuation_does_not_rob_later_continuations() {
        let (task, completion) = Task::new();
        let invoked = Arc::new(AtomicUsize::new(0));

        task.subscribe(|_outcome| panic!("deliberate continuation panic"));

        let counter = Arc::clone(&invoked);
        task.subscribe(move |_outcome| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            completion.complete_with_value(1);
        }));

        assert!(result.is_err(), "the panic must surface on the completer");
        assert_eq!(invoked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn continuation_may_subscribe_further_work() {
        let (task, completion) = Task::new();
        let task = Arc::new(task);
        let second_ran = Arc::new(AtomicUsize::new(0));

        {
            let task = Arc::clone(&task);
            let nested = Arc::clone(&task);
            let counter = Arc::clone(&second_ran);
            task.subscribe(move |_outcome| {
                // The completer has already stored the outcome, so this inner
                // subscription takes the synchronous fast path.
                let counter = Arc::clone(&counter);
                nested.subscribe(move |outcome| {
                    assert_eq!(outcome.value(), Some(&11));
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            });
        }

        completion.complete_with_value(11);
        assert_eq!(second_ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn awaiting_a_completed_task_resolves_immediately() {
        with_watchdog(|| {
            let (task, completion) = Task::new();
            completion.complete_with_value(4);

            let outcome = block_on(task);
            assert_eq!(outcome.value(), Some(&4));
        });
    }

    #[test]
    fn awaiting_resolves_after_cross_thread_completion() {
        with_watchdog(|| {
            let (task, completion) = Task::new();

            let producer = thread::spawn(move || {
                thread::sleep(std::time::Duration::from_millis(10));
                completion.complete_with_value("awaited".to_string());
            });

            let outcome = block_on(task);
            assert_eq!(outcome.value().map(String::as_str), Some("awaited"));

            producer.join().unwrap();
        });
    }

    #[test]
    fn one_task_can_depend_on_another() {
        with_watchdog(|| {
            // A dependent computation suspends on its dependency by
            // subscribing a continuation that resumes it - no OS thread is
            // blocked on the dependency.
            let (dependency, dependency_completion) = Task::<i32>::new();
            let (dependent, dependent_completion) = Task::<i32>::new();

            let mut dependent_completion = Some(dependent_completion);
            dependency.subscribe(move |outcome| {
                let value = *outcome.value().expect("dependency succeeds in this test");
                dependent_completion
                    .take()
                    .expect("dependency completes exactly once")
                    .complete_with_value(value * 2);
            });

            dependency_completion.complete_with_value(21);

            spin_until("dependent task completes", || dependent.is_completed());
            assert_eq!(dependent.get_result(), 42);
        });
    }

    #[test]
    fn thread_safe_types() {
        assert_impl_all!(Task<i32>: Send, Sync);
        assert_impl_all!(Completion<i32>: Send);
    }
}
