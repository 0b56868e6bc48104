// Output sinks - terminal consumers of rendered log lines

use crate::level::Level;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Stderr, Write};
use std::path::Path;
use std::sync::Arc;

/// Terminal consumer of rendered log bytes.
///
/// Both methods are invoked only from the engine's consumer thread, so
/// implementations need no internal synchronization. A sink that blocks in
/// `write` stalls the whole pipeline; that is acceptable for file I/O
/// because no producer ever waits on a sink.
pub trait Sink: Send {
    /// Receives one fully formatted record, trailing newline included
    fn write(&mut self, bytes: &[u8], level: Level);

    /// Called once when the consumer exits
    fn flush(&mut self);
}

/// Discards everything; for benchmarks and as a placeholder in tests
pub struct NullSink;

impl Sink for NullSink {
    fn write(&mut self, _bytes: &[u8], _level: Level) {}

    fn flush(&mut self) {}
}

/// Captures rendered lines in memory behind a shared handle.
///
/// The handle side can be inspected from any thread, which makes this the
/// sink of choice for tests asserting on delivered output.
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Create a sink plus the shared handle to its captured lines
    pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                lines: Arc::clone(&lines),
            },
            lines,
        )
    }
}

impl Sink for MemorySink {
    fn write(&mut self, bytes: &[u8], _level: Level) {
        self.lines
            .lock()
            .push(String::from_utf8_lossy(bytes).into_owned());
    }

    fn flush(&mut self) {}
}

/// Standard error sink (unbuffered pass-through)
pub struct ConsoleSink {
    stderr: Stderr,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            stderr: io::stderr(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, bytes: &[u8], _level: Level) {
        let _ = self.stderr.write_all(bytes);
    }

    fn flush(&mut self) {
        let _ = self.stderr.flush();
    }
}

/// Append-mode buffered file sink.
///
/// ERROR-level records are flushed and fsynced immediately so they reach
/// the disk even if the process dies before shutdown. I/O failures are
/// reported once on stderr and the sink keeps accepting writes.
pub struct FileSink {
    writer: BufWriter<File>,
    failed: bool,
}

impl FileSink {
    /// Open `path` for appending, creating it if needed
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            failed: false,
        })
    }

    fn report(&mut self, err: io::Error) {
        if !self.failed {
            self.failed = true;
            eprintln!("[hotlog] file sink error: {}", err);
        }
    }
}

impl Sink for FileSink {
    fn write(&mut self, bytes: &[u8], level: Level) {
        if let Err(err) = self.writer.write_all(bytes) {
            self.report(err);
            return;
        }
        if level == Level::Error {
            if let Err(err) = self.writer.flush() {
                self.report(err);
                return;
            }
            if let Err(err) = self.writer.get_ref().sync_all() {
                self.report(err);
            }
        }
    }

    fn flush(&mut self) {
        if let Err(err) = self.writer.flush() {
            self.report(err);
            return;
        }
        if let Err(err) = self.writer.get_ref().sync_all() {
            self.report(err);
        }
    }
}
