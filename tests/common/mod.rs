#![allow(dead_code)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```
//! #[macro_use]
//! mod common;
//! use common::*;
//! ```

use dynbufio::Source;
use proptest::prelude::ProptestConfig;
use proptest::test_runner::RngSeed;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, Once};
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Default seed for property tests when none is supplied via env.
pub const DEFAULT_PROPTEST_SEED: u64 = 0x5EED_5EED;

const PROPTEST_SEED_ENV: &str = "DYNBUFIO_PROPTEST_SEED";

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

/// Configuration for property tests with deterministic seed support.
#[derive(Debug, Clone)]
pub struct PropertyTestConfig {
    /// Fixed seed for reproducibility.
    pub seed: u64,
    /// Number of successful cases required.
    pub cases: u32,
}

impl PropertyTestConfig {
    /// Build a config with `cases` cases, honoring the seed env override.
    #[must_use]
    pub fn new(cases: u32) -> Self {
        let seed = std::env::var(PROPTEST_SEED_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PROPTEST_SEED);
        Self { seed, cases }
    }

    /// Convert into a `ProptestConfig` with a fixed RNG seed.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        let mut config = ProptestConfig::with_cases(self.cases);
        if matches!(config.rng_seed, RngSeed::Random) {
            config.rng_seed = RngSeed::Fixed(self.seed);
        }
        config
    }
}

/// Deterministic xorshift64 RNG for stress data.
#[derive(Debug, Clone)]
pub struct DetRng {
    state: u64,
}

impl DetRng {
    /// Creates a new RNG; a zero seed is replaced with 1.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Next pseudo-random u64.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Pseudo-random usize in `[0, bound)`; `bound` must be non-zero.
    pub fn next_usize(&mut self, bound: usize) -> usize {
        assert!(bound > 0, "bound must be non-zero");
        (self.next_u64() as usize) % bound
    }

    /// Fills `buf` with pseudo-random bytes.
    pub fn fill_bytes(&mut self, buf: &mut [u8]) {
        for b in buf {
            *b = (self.next_u64() >> 32) as u8;
        }
    }
}

/// Sink backed by a shared byte vector, cloneable for later inspection.
#[derive(Debug, Clone, Default)]
pub struct SharedSink {
    data: Arc<Mutex<Vec<u8>>>,
}

impl SharedSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().expect("sink lock poisoned").clone()
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

/// Source that delivers a byte vector in fixed-size chunks, then EOF.
#[derive(Debug)]
pub struct ChunkedSource {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl ChunkedSource {
    /// Delivers `data` in chunks of at most `chunk` bytes.
    #[must_use]
    pub fn new(data: Vec<u8>, chunk: usize) -> Self {
        assert!(chunk > 0, "chunk must be non-zero");
        Self {
            data,
            pos: 0,
            chunk,
        }
    }
}

impl Read for ChunkedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.data.len() - self.pos;
        let n = remaining.min(self.chunk).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Source for ChunkedSource {}

/// One scripted response from a [`ScriptedSource`].
#[derive(Debug, Clone)]
pub enum Step {
    /// Deliver these bytes (truncated to the destination size).
    Data(Vec<u8>),
    /// Fail the read with this kind.
    Error(io::ErrorKind),
}

/// Source that replays a fixed script, then reports EOF.
#[derive(Debug)]
pub struct ScriptedSource {
    steps: std::collections::VecDeque<Step>,
}

impl ScriptedSource {
    /// Creates a source that replays `steps` in order.
    #[must_use]
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
        }
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

impl Source for ScriptedSource {}
