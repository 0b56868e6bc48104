// SPDX-License-Identifier: Apache-2.0 OR MIT
// Low-latency asynchronous logging on a lock-free MPSC ring
//
// Producers capture level, template, and arguments into a fixed-size record
// on their own stack - no allocation, no formatting, no lock - and hand it
// to a bounded Vyukov-turnstile ring. A single consumer thread renders each
// record and dispatches the bytes to an ordered list of sinks.

pub mod engine;
pub mod format;
pub mod level;
#[macro_use]
mod macros;
pub mod record;
pub mod ring;
mod signal;
pub mod sink;

// Public exports
pub use engine::{
    default_engine, init_default, Engine, OverloadPolicy, PushError, DEFAULT_RING_CAPACITY,
};
pub use format::{Arguments, FormatSpec, Loggable, TypeHint};
pub use level::{statically_enabled, Level, LevelFilter, STATIC_LEVEL};
pub use record::{Record, ARG_CAP};
pub use ring::Ring;
pub use sink::{ConsoleSink, FileSink, MemorySink, NullSink, Sink};
