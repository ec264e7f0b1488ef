//! A one-shot broadcast signal with a lock-free waiter list.
//!
//! [`ManualResetEvent`] lets any number of independent registrations wait for
//! a single broadcast signal without taking a lock. The whole event is one
//! atomic pointer-sized cell with three logical readings:
//!
//! - null: unset, no waiters;
//! - the address of a private static sentinel: set;
//! - anything else: unset, pointing at the head of an intrusive stack of
//!   waiter nodes.
//!
//! Registrations link themselves onto the stack with a compare-and-swap retry
//! loop; [`ManualResetEvent::set`] exchanges the sentinel in and walks the
//! captured stack, invoking each stored continuation. Every node is a fresh
//! allocation whose ownership round-trips through the cell, so no node address
//! is ever reused for a different logical registration while an older
//! resumption might still reference it.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use crate::ERR_POISONED_LOCK;

/// A stored resumption for a suspended computation, invoked exactly once.
///
/// This is the explicit rendition of a suspension point: whatever state the
/// suspended computation needs to continue is captured inside the closure.
pub type Continuation = Box<dyn FnOnce() + Send>;

/// One registration against the event: a link in the intrusive waiter stack
/// and the continuation to invoke on wake.
struct Waiter {
    next: *mut Waiter,
    resume: Continuation,
}

// The "set" reading of the state cell is the address of this static. It is
// distinct from null and from every possible waiter-node address, and it is
// never dereferenced. The alignment matches pointer alignment so the cast
// below is exact.
static SET_SENTINEL: usize = 0;

fn set_sentinel() -> *mut Waiter {
    (&raw const SET_SENTINEL).cast_mut().cast()
}

/// A one-shot broadcast signal supporting any number of waiters.
///
/// The event has two disjoint states, unset and set. Registrations made
/// while unset are parked on a lock-free intrusive stack; [`set`][Self::set]
/// transitions the event and resumes every parked registration on the
/// calling thread. Registrations made after the transition resume inline
/// without parking. The event stays set until an explicit
/// [`reset`][Self::reset].
///
/// The event delivers no payload; it is a pure signal, usable on its own for
/// producer/consumer rendezvous (publish the data first, then set the event).
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// use signals::ManualResetEvent;
///
/// let event = Arc::new(ManualResetEvent::new(false));
/// let observed = Arc::new(AtomicBool::new(false));
///
/// let flag = Arc::clone(&observed);
/// let suspended = event.register_waiter(move || {
///     flag.store(true, Ordering::Release);
/// });
/// assert!(suspended);
///
/// event.set();
/// assert!(observed.load(Ordering::Acquire));
/// ```
pub struct ManualResetEvent {
    /// One cell, three readings; see the module docs.
    state: AtomicPtr<Waiter>,
}

impl ManualResetEvent {
    /// Creates a new event, initially set or unset.
    #[must_use]
    pub fn new(initially_set: bool) -> Self {
        let initial = if initially_set {
            set_sentinel()
        } else {
            ptr::null_mut()
        };

        Self {
            state: AtomicPtr::new(initial),
        }
    }

    /// Whether the event is currently set. Never suspends.
    ///
    /// In the presence of concurrent [`set`][Self::set] or
    /// [`reset`][Self::reset] calls this is only ever a momentary
    /// observation.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.state.load(Ordering::Acquire) == set_sentinel()
    }

    /// Registers a continuation to be invoked when the event becomes set.
    ///
    /// This is the suspend decision point, in explicit continuation-passing
    /// style: `resume` stands for the remainder of the suspended computation.
    ///
    /// If the event already reads as set, no suspension is needed: the
    /// continuation is invoked inline on the calling thread and `false` is
    /// returned. Otherwise the registration is linked onto the waiter stack
    /// and `true` is returned; the continuation will then be invoked exactly
    /// once by whichever thread sets the event. A registration racing with
    /// `set` resolves deterministically to one of those two paths - a wake is
    /// never lost and a continuation never runs twice.
    pub fn register_waiter<F>(&self, resume: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        // Fast path: no node allocation when the event is already set.
        if self.is_set() {
            resume();
            return false;
        }

        let node = Box::into_raw(Box::new(Waiter {
            next: ptr::null_mut(),
            resume: Box::new(resume),
        }));

        let mut current = self.state.load(Ordering::Acquire);

        loop {
            if current == set_sentinel() {
                // Lost the race: the event became set after the fast-path
                // check. Reclaim the node and take the inline path.
                //
                // SAFETY: `node` came from `Box::into_raw` above and was
                // never published, so we still own it exclusively.
                let node = unsafe { Box::from_raw(node) };
                (node.resume)();
                return false;
            }

            // SAFETY: `node` is not yet published; we own it exclusively
            // until the compare-exchange below succeeds.
            unsafe {
                (*node).next = current;
            }

            match self.state.compare_exchange_weak(
                current,
                node,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Transitions the event to set and resumes every parked registration.
    ///
    /// Idempotent: calls after the first transition are no-ops. Continuations
    /// are invoked **inline on the calling thread**, in registration order
    /// (the raw stack is most-recent-first; it is reversed before the walk).
    /// A long continuation chain therefore executes on this call's stack -
    /// there is deliberately no executor behind this primitive.
    ///
    /// A continuation that panics does not rob later registrations of their
    /// wake: every remaining continuation still runs, then the first captured
    /// panic is re-raised on this thread (subsequent panic payloads from the
    /// same walk are discarded).
    #[cfg_attr(test, mutants::skip)] // Critical primitive - causes test timeouts if tampered.
    pub fn set(&self) {
        let previous = self.state.swap(set_sentinel(), Ordering::AcqRel);
        if previous == set_sentinel() {
            return;
        }

        // Reverse the captured stack so continuations run in the order the
        // registrations were made.
        let mut head: *mut Waiter = ptr::null_mut();
        let mut current = previous;
        while !current.is_null() {
            // SAFETY: the swap detached the whole stack, so we own every node
            // in it exclusively; each node stays valid until consumed below.
            let next = unsafe { (*current).next };

            // SAFETY: as above; we are relinking a node we own.
            unsafe {
                (*current).next = head;
            }

            head = current;
            current = next;
        }

        let mut first_panic: Option<Box<dyn Any + Send>> = None;

        while !head.is_null() {
            // SAFETY: every node was created by `Box::into_raw` in
            // `register_waiter` and is consumed exactly once, here.
            let node = unsafe { Box::from_raw(head) };
            head = node.next;

            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(node.resume)) {
                first_panic.get_or_insert(payload);
            }
        }

        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
    }

    /// Returns the event to the unset state.
    ///
    /// Only a quiescent set state is cleared: if the cell holds anything but
    /// the set sentinel, this is a no-op.
    ///
    /// Calling `reset` while registrations are racing with [`set`][Self::set]
    /// is unsupported: a registration may observe the set state moments
    /// before the reset fires and resolve inline against a signal its caller
    /// considered already consumed, instead of parking for the next one.
    /// Reset only from a quiescent set state, with no registration in
    /// flight.
    pub fn reset(&self) {
        drop(self.state.compare_exchange(
            set_sentinel(),
            ptr::null_mut(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ));
    }

    /// Returns a future that resolves once the event is set.
    ///
    /// Built on [`register_waiter`][Self::register_waiter] with a replaceable
    /// waker slot, so only the waker from the most recent poll is woken.
    pub fn wait_async(&self) -> SetFuture<'_> {
        SetFuture {
            event: self,
            waker_slot: None,
        }
    }
}

impl Default for ManualResetEvent {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for ManualResetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualResetEvent")
            .field("is_set", &self.is_set())
            .finish_non_exhaustive()
    }
}

impl Drop for ManualResetEvent {
    fn drop(&mut self) {
        let mut current = *self.state.get_mut();
        if current == set_sentinel() {
            return;
        }

        while !current.is_null() {
            // SAFETY: we have exclusive access during drop and each node is
            // consumed exactly once. The continuation is dropped without
            // running - the event can no longer be set.
            let node = unsafe { Box::from_raw(current) };
            current = node.next;
        }
    }
}

/// Future returned by [`ManualResetEvent::wait_async`].
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct SetFuture<'e> {
    event: &'e ManualResetEvent,
    waker_slot: Option<Arc<Mutex<Option<Waker>>>>,
}

impl Future for SetFuture<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();

        if this.event.is_set() {
            return Poll::Ready(());
        }

        match &this.waker_slot {
            Some(slot) => {
                *slot.lock().expect(ERR_POISONED_LOCK) = Some(cx.waker().clone());
            }
            None => {
                let slot = Arc::new(Mutex::new(Some(cx.waker().clone())));
                let registration_slot = Arc::clone(&slot);

                this.event.register_waiter(move || {
                    // Take the waker first so the wake happens with the
                    // slot lock already released.
                    let waker = registration_slot.lock().expect(ERR_POISONED_LOCK).take();
                    if let Some(waker) = waker {
                        waker.wake();
                    }
                });

                this.waker_slot = Some(slot);
            }
        }

        // The event may have become set while we were storing the waker, in
        // which case the wake continuation may already have consumed a stale
        // waker (or none). Re-checking here guarantees the stored waker is
        // never the only record of this poll.
        if this.event.is_set() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}
