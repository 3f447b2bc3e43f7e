//! Shared helpers for unit tests.
//!
//! Provides consistent tracing-based logging initialization, phase/section
//! macros for readable test output, and small sink/source doubles used by
//! the writer, reader, and pool tests.

use crate::io::Source;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_target(true)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
    });
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}

/// Sink backed by a shared byte vector, cloneable for later inspection.
#[derive(Debug, Clone, Default)]
pub struct SharedSink {
    data: Arc<Mutex<Vec<u8>>>,
}

impl SharedSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().expect("sink lock poisoned").clone()
    }

    /// Discards everything written so far.
    pub fn clear(&self) {
        self.data.lock().expect("sink lock poisoned").clear();
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data
            .lock()
            .expect("sink lock poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that fails every write and flush with `BrokenPipe`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink failed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink failed"))
    }
}

/// Sink that accepts at most `max_per_write` bytes per call, exercising
/// partial-write handling.
#[derive(Debug, Clone)]
pub struct ShortWriteSink {
    data: Arc<Mutex<Vec<u8>>>,
    max_per_write: usize,
}

impl ShortWriteSink {
    /// Creates a sink that truncates every write to `max_per_write` bytes.
    pub fn new(max_per_write: usize) -> Self {
        Self {
            data: Arc::new(Mutex::new(Vec::new())),
            max_per_write,
        }
    }

    /// Handle to the accepted bytes.
    pub fn data(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.data)
    }
}

impl Write for ShortWriteSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = usize::min(buf.len(), self.max_per_write);
        self.data
            .lock()
            .expect("sink lock poisoned")
            .extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Source that delivers a fixed total in fixed-size chunks, then EOF.
#[derive(Debug)]
pub struct ChunkSource {
    chunk: usize,
    remaining: usize,
}

impl ChunkSource {
    /// Delivers `total` bytes in chunks of at most `chunk`.
    pub fn new(chunk: usize, total: usize) -> Self {
        Self {
            chunk,
            remaining: total,
        }
    }
}

impl Read for ChunkSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.remaining.min(self.chunk).min(buf.len());
        for b in &mut buf[..n] {
            *b = b'x';
        }
        self.remaining -= n;
        Ok(n)
    }
}

impl Source for ChunkSource {}

/// One scripted response from a [`ScriptedSource`].
#[derive(Debug, Clone)]
pub enum Step {
    /// Deliver these bytes (truncated to the destination size).
    Data(Vec<u8>),
    /// Fail the read with this kind.
    Error(io::ErrorKind),
}

/// Source that replays a fixed script and records every deadline change.
#[derive(Debug)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
    deadlines: Arc<Mutex<Vec<Option<Duration>>>>,
}

impl ScriptedSource {
    /// Creates a source that replays `steps` in order, then reports EOF.
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            deadlines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the recorded `set_read_deadline` calls.
    pub fn deadlines(&self) -> Arc<Mutex<Vec<Option<Duration>>>> {
        Arc::clone(&self.deadlines)
    }
}

impl Read for ScriptedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.steps.pop_front() {
            Some(Step::Data(data)) => {
                let n = usize::min(data.len(), buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            Some(Step::Error(kind)) => Err(io::Error::new(kind, "scripted failure")),
            None => Ok(0),
        }
    }
}

impl Source for ScriptedSource {
    fn set_read_deadline(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.deadlines
            .lock()
            .expect("deadline lock poisoned")
            .push(timeout);
        Ok(())
    }
}
