// Consumer wake-up: a monotonic epoch counter plus a bounded idle wait
//
// Producers raise the epoch and notify without taking any lock; the
// consumer parks on the condvar only while the epoch is unchanged. Because
// the notify is lock-free, one can slip between the consumer's epoch check
// and its wait - the park interval bounds that window, and callers treat
// every return (signal, timeout, or spurious) as "re-check your work".

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Upper bound on one idle park
const PARK_INTERVAL: Duration = Duration::from_millis(50);

pub(crate) struct WakeSignal {
    epoch: AtomicU64,
    lock: Mutex<()>,
    waiters: Condvar,
}

impl WakeSignal {
    pub(crate) fn new() -> Self {
        Self {
            epoch: AtomicU64::new(0),
            lock: Mutex::new(()),
            waiters: Condvar::new(),
        }
    }

    /// Current epoch; pass to [`wait_beyond`](Self::wait_beyond)
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Advances the epoch and wakes the waiter, without taking the lock
    pub(crate) fn raise(&self) {
        self.epoch.fetch_add(1, Ordering::Release);
        self.waiters.notify_one();
    }

    /// Blocks while the epoch still equals `seen`, at most one park interval
    pub(crate) fn wait_beyond(&self, seen: u64) {
        let mut guard = self.lock.lock();
        if self.epoch.load(Ordering::Acquire) != seen {
            return;
        }
        let _ = self.waiters.wait_for(&mut guard, PARK_INTERVAL);
    }
}
