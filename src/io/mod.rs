//! I/O trait seams and endpoint adapters.
//!
//! This module defines the minimal contracts the buffering layer consumes
//! and exposes. The design mirrors `std::io` but is intentionally small:
//!
//! - [`Sink`]: the write half of a connection (`std::io::Write + Send`).
//! - [`Source`]: the read half, with an optional read-deadline hook used by
//!   the idle-shrink policy. Sources without deadline support inherit a
//!   no-op default and simply never see idle shrinks.
//! - [`BufferedSink`]: a sink that additionally reports how many bytes it
//!   is holding. Satisfied by [`DynamicBufWriter`](crate::writer::DynamicBufWriter),
//!   by the [`UnbufferedSink`] pass-through, and by the [`IoTaggingWriter`]
//!   decorator.
//!
//! Pooled buffers that are not checked out are bound to a failing stub
//! endpoint whose read and write always fail with a sentinel error. This turns
//! accidental use of a returned buffer into a loud, localized failure
//! instead of a silent write to a connection that no longer owns it.

mod tagged;
mod unbuffered;

pub use tagged::IoTaggingWriter;
pub use unbuffered::UnbufferedSink;

use crate::error::StubEndpointError;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// A byte sink: the write half of a connection.
///
/// Blanket-implemented for every `Write + Send` type, so plain writers
/// (`Vec<u8>`, [`TcpStream`], files) are sinks as-is.
pub trait Sink: Write + Send {}

impl<W: Write + Send> Sink for W {}

/// A byte source: the read half of a connection.
///
/// Sources may support read deadlines; [`Source::set_read_deadline`]
/// defaults to a no-op so deadline-less sources opt out implicitly.
/// Implementations are provided for [`TcpStream`] (backed by
/// [`TcpStream::set_read_timeout`]) and for the in-memory readers used in
/// tests and examples. Any other reader can be adapted with
/// [`PlainSource`].
pub trait Source: Read + Send {
    /// Arms (`Some`) or clears (`None`) the deadline applied to subsequent
    /// reads from this source.
    ///
    /// The default implementation ignores the deadline and returns `Ok(())`.
    fn set_read_deadline(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        let _ = timeout;
        Ok(())
    }
}

impl Source for TcpStream {
    fn set_read_deadline(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_read_timeout(timeout)
    }
}

impl Source for &[u8] {}

impl<T: AsRef<[u8]> + Send> Source for io::Cursor<T> {}

impl Source for io::Empty {}

/// Adapts any reader into a deadline-less [`Source`].
#[derive(Debug, Clone)]
pub struct PlainSource<R> {
    inner: R,
}

impl<R: Read + Send> PlainSource<R> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Consumes the adapter and returns the underlying reader.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Send> Read for PlainSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> Source for PlainSource<R> {}

/// A sink that also exposes its buffered byte count.
///
/// `flush` comes from the [`Write`] supertrait. Connection-owning code can
/// hold any `BufferedSink` and stay agnostic about whether buffering is
/// actually present.
pub trait BufferedSink: Write {
    /// Number of bytes accepted but not yet handed to the underlying sink.
    fn buffered(&self) -> usize;
}

/// Sentinel endpoint bound to pooled buffers while they sit in a free list.
///
/// Reads and writes fail with [`StubEndpointError`] so that a buffer used
/// after return cannot leak data to (or from) its previous partner.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FailingEndpoint;

impl Write for FailingEndpoint {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::NotConnected,
            StubEndpointError::Write,
        ))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for FailingEndpoint {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::NotConnected,
            StubEndpointError::Read,
        ))
    }
}

impl Source for FailingEndpoint {}
