// A poisoned lock means a thread panicked while holding the lock inside one of our
// primitives, so we can no longer vouch for the state it guards. We panic (we do
// not attempt to limp along with state of unknown integrity).
pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned lock - continued execution \
    is not safe because the state guarded by the lock may have been left inconsistent";
