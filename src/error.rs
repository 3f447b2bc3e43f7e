//! Error classification for the transport boundary.
//!
//! Two concerns live here:
//!
//! - Tagging errors that originate in the underlying byte sink, so upper
//!   layers can tell transport failures (the connection is dead) apart from
//!   stream-logic failures (framing, encoding). See [`IoError`] and
//!   [`is_io_error`].
//! - The sentinel error produced when a pooled buffer is used while it is
//!   still parked on the failing stub endpoint. See [`StubEndpointError`]
//!   and [`is_stub_error`]. This is a defensive check for a programming
//!   error, not an expected runtime condition.

use std::error::Error as StdError;
use std::io;

/// Marker wrapper for errors produced by the underlying byte sink.
///
/// [`IoTaggingWriter`](crate::io::IoTaggingWriter) wraps every `write` and
/// `flush` error in this type before returning it. The original error stays
/// reachable through [`std::error::Error::source`], so `?`-propagated chains
/// keep their full context.
#[derive(Debug, thiserror::Error)]
#[error("transport i/o: {source}")]
pub struct IoError {
    #[from]
    source: io::Error,
}

impl IoError {
    /// Consumes the tag and returns the underlying error.
    #[must_use]
    pub fn into_inner(self) -> io::Error {
        self.source
    }
}

/// Rewraps `err` so that [`is_io_error`] recognizes it, preserving the kind.
pub(crate) fn tag_io_error(err: io::Error) -> io::Error {
    let kind = err.kind();
    io::Error::new(kind, IoError::from(err))
}

/// Returns true if `err` originated in the sink behind an
/// [`IoTaggingWriter`](crate::io::IoTaggingWriter).
///
/// The check walks the error chain, so the tag survives further wrapping
/// by intermediate layers. `io::Error` nodes are descended through their
/// payload (`get_ref`), not `source()`: a custom `io::Error`'s `source()`
/// skips its own payload node, which is exactly where the tag lives.
#[must_use]
pub fn is_io_error(err: &io::Error) -> bool {
    let mut node: &(dyn StdError + 'static) = err;
    loop {
        if node.is::<IoError>() {
            return true;
        }
        if let Some(io_err) = node.downcast_ref::<io::Error>() {
            match io_err.get_ref() {
                Some(payload) => {
                    node = payload as &(dyn StdError + 'static);
                    continue;
                }
                None => return false,
            }
        }
        match node.source() {
            Some(next) => node = next,
            None => return false,
        }
    }
}

/// Error returned when reading from or writing to a buffer that is parked
/// on the pool's stub endpoint.
///
/// Pooled buffers are rebound to a failing stub when they are returned, so
/// accidental reuse fails loudly here instead of touching a connection that
/// no longer owns the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StubEndpointError {
    /// A write reached the stub endpoint.
    #[error("write on failing writer")]
    Write,
    /// A read reached the stub endpoint.
    #[error("read on failing writer")]
    Read,
}

/// Returns true if `err` is the stub-endpoint sentinel.
#[must_use]
pub fn is_stub_error(err: &io::Error) -> bool {
    err.get_ref().is_some_and(|e| e.is::<StubEndpointError>())
}
