// The logging engine: ring, consumer thread, and shutdown protocol
//
// Producers stay on a lock-free path: build a record on the stack, try to
// place it in the ring, raise the wake signal. All formatting and sink I/O
// happens on the single consumer thread, which parks on the signal when the
// ring is empty and performs a terminal drain plus sink flush on shutdown.

use crate::format::Arguments;
use crate::level::Level;
use crate::record::Record;
use crate::ring::Ring;
use crate::signal::WakeSignal;
use crate::sink::Sink;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Ring size used by [`Engine::new`]
pub const DEFAULT_RING_CAPACITY: usize = 8192;

/// Producer behavior when the ring is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadPolicy {
    /// Discard the record and count it; `push` never blocks
    Drop,
    /// Yield and retry until the record is accepted
    SpinRetry,
}

/// Why a submission did not reach the ring
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushError {
    /// The ring was full and the Drop policy discarded the record
    #[error("ring buffer full, record dropped")]
    QueueFull,
    /// The consumer has already exited; the record will never be drained
    #[error("engine is shut down, record dropped")]
    ShutdownInProgress,
}

struct Shared {
    ring: Ring<Record>,
    signal: WakeSignal,
    done: AtomicBool,
    /// Set once the consumer thread has been joined
    terminated: AtomicBool,
    dropped: AtomicU64,
    policy: OverloadPolicy,
}

/// Handle to one logging pipeline: a ring, a consumer thread, and an
/// ordered list of sinks established at construction.
///
/// Submission is non-blocking (per the configured [`OverloadPolicy`]);
/// [`shutdown`](Engine::shutdown) drains everything still queued and
/// flushes every sink. Dropping the engine shuts it down if the caller has
/// not already done so.
pub struct Engine {
    shared: Arc<Shared>,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    /// Start an engine with the default ring capacity.
    ///
    /// Sinks are moved into the consumer thread; dispatch order is the
    /// order of the vector.
    pub fn new(sinks: Vec<Box<dyn Sink>>, policy: OverloadPolicy) -> Self {
        Self::with_capacity(sinks, policy, DEFAULT_RING_CAPACITY)
    }

    /// Start an engine with an explicit ring capacity (a power of two)
    pub fn with_capacity(
        sinks: Vec<Box<dyn Sink>>,
        policy: OverloadPolicy,
        capacity: usize,
    ) -> Self {
        let shared = Arc::new(Shared {
            ring: Ring::new(capacity),
            signal: WakeSignal::new(),
            done: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
            policy,
        });

        let consumer_shared = Arc::clone(&shared);
        let handle = thread::spawn(move || consumer_loop(consumer_shared, sinks));

        Self {
            shared,
            consumer: Mutex::new(Some(handle)),
        }
    }

    /// Submit one record under the engine's configured overload policy.
    ///
    /// This is the hot path: no allocation, no lock, at most one wake
    /// syscall after a successful enqueue.
    #[inline]
    pub fn push<A>(&self, level: Level, template: &'static str, args: A) -> Result<(), PushError>
    where
        A: Arguments + Send + 'static,
    {
        self.submit(Record::new(level, template, args), self.shared.policy)
    }

    /// Submit with guaranteed delivery: yields and retries until the ring
    /// accepts, regardless of the configured policy.
    ///
    /// Callers accept an unbounded wait while the consumer catches up.
    #[inline]
    pub fn push_retrying<A>(
        &self,
        level: Level,
        template: &'static str,
        args: A,
    ) -> Result<(), PushError>
    where
        A: Arguments + Send + 'static,
    {
        self.submit(
            Record::new(level, template, args),
            OverloadPolicy::SpinRetry,
        )
    }

    /// Submit at DEBUG level
    #[inline]
    pub fn push_debug<A>(&self, template: &'static str, args: A) -> Result<(), PushError>
    where
        A: Arguments + Send + 'static,
    {
        self.push(Level::Debug, template, args)
    }

    /// Submit at INFO level
    #[inline]
    pub fn push_info<A>(&self, template: &'static str, args: A) -> Result<(), PushError>
    where
        A: Arguments + Send + 'static,
    {
        self.push(Level::Info, template, args)
    }

    /// Submit at WARN level
    #[inline]
    pub fn push_warn<A>(&self, template: &'static str, args: A) -> Result<(), PushError>
    where
        A: Arguments + Send + 'static,
    {
        self.push(Level::Warn, template, args)
    }

    /// Submit at ERROR level
    #[inline]
    pub fn push_error<A>(&self, template: &'static str, args: A) -> Result<(), PushError>
    where
        A: Arguments + Send + 'static,
    {
        self.push(Level::Error, template, args)
    }

    fn submit(&self, mut record: Record, policy: OverloadPolicy) -> Result<(), PushError> {
        if self.shared.terminated.load(Ordering::Acquire) {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(PushError::ShutdownInProgress);
        }

        loop {
            match self.shared.ring.try_push(record) {
                Ok(()) => {
                    self.shared.signal.raise();
                    return Ok(());
                }
                Err(rejected) => match policy {
                    OverloadPolicy::Drop => {
                        self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                        return Err(PushError::QueueFull);
                    }
                    OverloadPolicy::SpinRetry => {
                        if self.shared.terminated.load(Ordering::Acquire) {
                            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                            return Err(PushError::ShutdownInProgress);
                        }
                        record = rejected;
                        thread::yield_now();
                    }
                },
            }
        }
    }

    /// Number of records discarded so far (full ring under the Drop policy,
    /// or submissions after shutdown)
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Stop the consumer after a full drain and flush every sink.
    ///
    /// Idempotent; concurrent callers block until the first caller's drain
    /// completes. Submissions racing with shutdown are drained if they land
    /// before the consumer's terminal sweep and counted as dropped after.
    pub fn shutdown(&self) {
        let mut consumer = self.consumer.lock();

        self.shared.done.store(true, Ordering::Release);
        self.shared.signal.raise();

        if let Some(handle) = consumer.take() {
            let _ = handle.join();
        }
        self.shared.terminated.store(true, Ordering::Release);
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn consumer_loop(shared: Arc<Shared>, mut sinks: Vec<Box<dyn Sink>>) {
    let mut line = String::new();

    while !shared.done.load(Ordering::Acquire) {
        match shared.ring.try_pop() {
            Some(record) => dispatch(&mut line, &record, &mut sinks),
            None => {
                let seen = shared.signal.epoch();
                if shared.done.load(Ordering::Acquire) {
                    break;
                }
                shared.signal.wait_beyond(seen);
            }
        }
    }

    // Terminal drain: everything enqueued before the consumer observed
    // shutdown still reaches the sinks
    while let Some(record) = shared.ring.try_pop() {
        dispatch(&mut line, &record, &mut sinks);
    }

    for sink in sinks.iter_mut() {
        sink.flush();
    }
}

fn dispatch(line: &mut String, record: &Record, sinks: &mut [Box<dyn Sink>]) {
    line.clear();
    line.push_str(record.level().as_str());
    line.push_str(": ");
    record.render_into(line);
    line.push('\n');

    for sink in sinks.iter_mut() {
        sink.write(line.as_bytes(), record.level());
    }
}

static DEFAULT_ENGINE: OnceLock<Engine> = OnceLock::new();

/// Install the process-wide default engine.
///
/// First caller wins; later calls get the engine back. The default lives in
/// a static and is never dropped, so the flush-on-shutdown guarantee only
/// holds if the application calls [`Engine::shutdown`] on it explicitly
/// before exiting.
pub fn init_default(engine: Engine) -> Result<(), Engine> {
    DEFAULT_ENGINE.set(engine)
}

/// The process-wide default engine, if one was installed. Lock-free read.
pub fn default_engine() -> Option<&'static Engine> {
    DEFAULT_ENGINE.get()
}
