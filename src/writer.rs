//! Buffered writer with pool-backed adaptive capacity.
//!
//! [`DynamicBufWriter`] wraps a byte sink with a fixed-capacity buffer
//! checked out of a [`BufferPool`](crate::pool::BufferPool), and swaps that
//! buffer for the adjacent pool slot as utilization changes:
//!
//! - a write larger than the free space steps the buffer up one slot before
//!   it is absorbed, carrying any buffered bytes along;
//! - a flush that found the buffer completely full steps up one slot;
//! - a flush that found the buffer less than half full steps down one slot.
//!
//! Growth happens before the bytes land and shrinking happens right after a
//! drain, so a migration never leaves data behind. Buffered bytes are lost
//! only if the writer is dropped while its final flush fails, the same
//! caveat `std::io::BufWriter` carries.

use crate::io::{BufferedSink, FailingEndpoint, Sink};
use crate::pool::BufferPool;
use std::fmt;
use std::io::{self, Write};
use std::mem;

/// Fixed-capacity buffered writer over a rebindable sink.
///
/// This is the unit the pool stores: while idle it is bound to the failing
/// stub endpoint with its cursor reset, and checkout rebinds it to a live
/// connection. The write path follows the usual buffered-writer shape:
/// drain first when the incoming bytes would overflow, send oversized
/// payloads straight to the sink, and otherwise copy into the buffer.
pub(crate) struct BufWriter {
    sink: Box<dyn Sink>,
    buf: Box<[u8]>,
    filled: usize,
}

impl BufWriter {
    /// Creates a stub-bound writer with the given capacity.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            sink: Box::new(FailingEndpoint),
            buf: vec![0u8; capacity].into_boxed_slice(),
            filled: 0,
        }
    }

    /// Zero-capacity placeholder used while a migration is in flight.
    pub(crate) fn detached() -> Self {
        Self {
            sink: Box::new(FailingEndpoint),
            buf: Box::default(),
            filled: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn buffered(&self) -> usize {
        self.filled
    }

    pub(crate) fn available(&self) -> usize {
        self.buf.len() - self.filled
    }

    /// Swaps the bound sink, returning the previous one. The cursor is left
    /// untouched so callers can still carry or flush buffered bytes.
    pub(crate) fn bind(&mut self, sink: Box<dyn Sink>) -> Box<dyn Sink> {
        mem::replace(&mut self.sink, sink)
    }

    /// Scrubs the writer for return to a free list: resets the cursor and
    /// parks it on the stub endpoint. Returns the previously bound sink.
    pub(crate) fn unbind(&mut self) -> Box<dyn Sink> {
        self.filled = 0;
        self.bind(Box::new(FailingEndpoint))
    }

    /// Moves the buffered prefix into `dst`, which must have room for it.
    pub(crate) fn carry_into(&mut self, dst: &mut Self) {
        debug_assert!(self.filled <= dst.available());
        dst.buf[dst.filled..dst.filled + self.filled].copy_from_slice(&self.buf[..self.filled]);
        dst.filled += self.filled;
        self.filled = 0;
    }

    pub(crate) fn write(&mut self, p: &[u8]) -> io::Result<usize> {
        if self.filled + p.len() > self.buf.len() {
            self.flush_buf()?;
        }
        if p.len() > self.buf.len() {
            // Too large to ever fit; hand it to the sink directly.
            self.sink.write(p)
        } else {
            self.buf[self.filled..self.filled + p.len()].copy_from_slice(p);
            self.filled += p.len();
            Ok(p.len())
        }
    }

    /// Drains the buffer into the sink, retrying partial writes. On error
    /// the unwritten remainder is compacted to the front of the buffer.
    pub(crate) fn flush_buf(&mut self) -> io::Result<()> {
        let mut written = 0;
        while written < self.filled {
            match self.sink.write(&self.buf[written..self.filled]) {
                Ok(0) => {
                    self.buf.copy_within(written..self.filled, 0);
                    self.filled -= written;
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "sink accepted no bytes",
                    ));
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.buf.copy_within(written..self.filled, 0);
                    self.filled -= written;
                    return Err(e);
                }
            }
        }
        self.filled = 0;
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.flush_buf()?;
        self.sink.flush()
    }
}

impl fmt::Debug for BufWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufWriter")
            .field("capacity", &self.buf.len())
            .field("filled", &self.filled)
            .finish_non_exhaustive()
    }
}

/// Buffered writer whose capacity follows the traffic it sees.
///
/// Created by [`BufferPool::acquire_writer`](crate::pool::BufferPool::acquire_writer),
/// starting at the pool's smallest slot. Writing and flushing go through
/// the [`Write`] impl; [`buffered`](Self::buffered) and
/// [`capacity`](Self::capacity) expose the inner buffer state. Each
/// operation moves the capacity by at most one ladder slot.
///
/// The wrapper is single-owner: one logical writer per connection, used
/// from one execution context at a time. Dropping it releases the current
/// buffer back to the pool after a best-effort flush.
pub struct DynamicBufWriter {
    pool: BufferPool,
    idx: usize,
    inner: BufWriter,
}

impl DynamicBufWriter {
    pub(crate) fn new(pool: BufferPool, inner: BufWriter) -> Self {
        Self {
            pool,
            idx: 0,
            inner,
        }
    }

    /// Number of bytes held in the buffer, not yet written to the sink.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.inner.buffered()
    }

    /// Current buffer capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn grow(&mut self) {
        if self.idx < self.pool.max_index() {
            self.migrate(self.idx + 1);
        }
    }

    fn shrink(&mut self) {
        if self.idx > 0 {
            self.migrate(self.idx - 1);
        }
    }

    /// Swaps the inner buffer for one from the adjacent slot. Buffered
    /// bytes move with it; the old buffer is scrubbed and returned.
    fn migrate(&mut self, new_idx: usize) {
        let mut old = mem::replace(&mut self.inner, BufWriter::detached());
        let sink = old.bind(Box::new(FailingEndpoint));
        let mut fresh = self.pool.checkout_writer(new_idx, sink);
        old.carry_into(&mut fresh);
        self.pool.checkin_writer(self.idx, old);
        tracing::trace!(
            from = self.idx,
            to = new_idx,
            capacity = fresh.capacity(),
            "write buffer migrated"
        );
        self.idx = new_idx;
        self.inner = fresh;
    }
}

impl Write for DynamicBufWriter {
    /// Writes `p` through the buffer, stepping the capacity up one slot
    /// first when `p` does not fit in the free space. Sink errors are
    /// reported verbatim; the returned count is whatever the buffered
    /// write accepted.
    fn write(&mut self, p: &[u8]) -> io::Result<usize> {
        if p.len() > self.inner.available() {
            self.grow();
        }
        self.inner.write(p)
    }

    /// Flushes buffered bytes to the sink, then adapts: a buffer that was
    /// completely full steps up one slot, one that was less than half full
    /// steps down one. A flush error suppresses any migration.
    fn flush(&mut self) -> io::Result<()> {
        let buffered = self.inner.buffered();
        let capacity = self.inner.capacity();
        self.inner.flush()?;
        if buffered == capacity && self.idx < self.pool.max_index() {
            self.grow();
        } else if buffered < capacity / 2 {
            self.shrink();
        }
        Ok(())
    }
}

impl BufferedSink for DynamicBufWriter {
    fn buffered(&self) -> usize {
        self.inner.buffered()
    }
}

impl fmt::Debug for DynamicBufWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicBufWriter")
            .field("slot", &self.idx)
            .field("capacity", &self.inner.capacity())
            .field("buffered", &self.inner.buffered())
            .finish_non_exhaustive()
    }
}

impl Drop for DynamicBufWriter {
    fn drop(&mut self) {
        // Best effort: an error here means the buffered tail is lost, but
        // the buffer itself must still go back to the pool.
        let _ = self.inner.flush();
        let inner = mem::replace(&mut self.inner, BufWriter::detached());
        self.pool.checkin_writer(self.idx, inner);
    }
}
