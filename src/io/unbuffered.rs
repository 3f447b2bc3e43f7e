//! Pass-through buffered sink over a raw writer.

use super::BufferedSink;
use std::io::{self, Write};

/// Adapts a raw sink to the [`BufferedSink`] contract without buffering.
///
/// `buffered()` is always zero and `flush` is a no-op: bytes handed to
/// `write` go straight to the underlying sink. Useful when the consuming
/// layer wants a single interface regardless of whether buffering is
/// actually present.
#[derive(Debug, Clone)]
pub struct UnbufferedSink<W> {
    inner: W,
}

impl<W> UnbufferedSink<W> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns a reference to the underlying sink.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns a mutable reference to the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consumes the adapter and returns the underlying sink.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for UnbufferedSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        // Nothing is held back, so there is nothing to flush.
        Ok(())
    }
}

impl<W: Write> BufferedSink for UnbufferedSink<W> {
    fn buffered(&self) -> usize {
        0
    }
}
