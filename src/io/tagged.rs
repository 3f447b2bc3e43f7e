//! Error-tagging decorator for buffered sinks.

use super::BufferedSink;
use crate::error::tag_io_error;
use std::io::{self, Write};

/// Decorator that tags every `write`/`flush` error with an I/O-origin
/// marker.
///
/// Upper layers test a propagated error with
/// [`is_io_error`](crate::error::is_io_error) to decide whether the
/// connection itself is dead (transport failure) or only the current stream
/// misbehaved. The decorator is orthogonal to dynamic sizing: it wraps any
/// writer, buffered or not.
#[derive(Debug, Clone)]
pub struct IoTaggingWriter<W> {
    inner: W,
}

impl<W> IoTaggingWriter<W> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns a reference to the underlying writer.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consumes the decorator and returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for IoTaggingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).map_err(tag_io_error)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().map_err(tag_io_error)
    }
}

impl<W: BufferedSink> BufferedSink for IoTaggingWriter<W> {
    fn buffered(&self) -> usize {
        self.inner.buffered()
    }
}
