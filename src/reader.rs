//! Buffered reader with pool-backed adaptive capacity.
//!
//! [`DynamicBufReader`] wraps a byte source with a fixed-capacity buffer
//! checked out of a [`BufferPool`](crate::pool::BufferPool) and resizes it
//! by what each underlying fill actually delivers:
//!
//! - a fill that saturated the buffer steps up one slot;
//! - a fill that returned less than half the capacity steps down one slot;
//! - a read served entirely from already-buffered bytes carries no sizing
//!   information and leaves the capacity alone.
//!
//! When the source supports read deadlines, a short idle deadline is armed
//! while the reader sits above its smallest slot. A read that expires it is
//! taken to mean traffic has quieted: the buffer shrinks one slot and the
//! read retries, releasing memory instead of surfacing the timeout.

use crate::io::{FailingEndpoint, Source};
use crate::pool::BufferPool;
use std::fmt;
use std::io::{self, Read};
use std::mem;

/// Fixed-capacity buffered reader over a rebindable source.
///
/// The pooled counterpart of [`BufWriter`](crate::writer::BufWriter):
/// parked on the stub endpoint while idle, rebound at checkout. Reads are
/// served from `buf[pos..cap]`; an empty buffer triggers either a direct
/// read into the caller's slice (when it is at least as large as the
/// buffer) or a single fill of the whole buffer.
pub(crate) struct BufReader {
    source: Box<dyn Source>,
    buf: Box<[u8]>,
    pos: usize,
    cap: usize,
}

impl BufReader {
    /// Creates a stub-bound reader with the given capacity.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            source: Box::new(FailingEndpoint),
            buf: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
            cap: 0,
        }
    }

    /// Zero-capacity placeholder used while a migration is in flight.
    pub(crate) fn detached() -> Self {
        Self {
            source: Box::new(FailingEndpoint),
            buf: Box::default(),
            pos: 0,
            cap: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn buffered(&self) -> usize {
        self.cap - self.pos
    }

    /// Swaps the bound source, returning the previous one. Buffered bytes
    /// stay readable.
    pub(crate) fn bind(&mut self, source: Box<dyn Source>) -> Box<dyn Source> {
        mem::replace(&mut self.source, source)
    }

    /// Scrubs the reader for return to a free list: discards buffered
    /// bytes and parks it on the stub endpoint. Returns the previously
    /// bound source.
    pub(crate) fn unbind(&mut self) -> Box<dyn Source> {
        self.pos = 0;
        self.cap = 0;
        self.bind(Box::new(FailingEndpoint))
    }

    /// Moves the unread remainder into `dst`, which must have room for it.
    pub(crate) fn carry_into(&mut self, dst: &mut Self) {
        let len = self.cap - self.pos;
        debug_assert!(len <= dst.buf.len());
        dst.buf[..len].copy_from_slice(&self.buf[self.pos..self.cap]);
        dst.pos = 0;
        dst.cap = len;
        self.pos = 0;
        self.cap = 0;
    }

    pub(crate) fn set_read_deadline(&mut self, timeout: Option<std::time::Duration>) -> io::Result<()> {
        self.source.set_read_deadline(timeout)
    }

    pub(crate) fn read(&mut self, p: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.cap {
            let n = usize::min(self.cap - self.pos, p.len());
            p[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
            self.pos += n;
            return Ok(n);
        }
        if p.len() >= self.buf.len() {
            // Destination is at least buffer-sized; skip the extra copy.
            return self.source.read(p);
        }
        self.pos = 0;
        self.cap = 0;
        let filled = self.source.read(&mut self.buf)?;
        self.cap = filled;
        let n = usize::min(filled, p.len());
        p[..n].copy_from_slice(&self.buf[..n]);
        self.pos = n;
        Ok(n)
    }
}

impl fmt::Debug for BufReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufReader")
            .field("capacity", &self.buf.len())
            .field("buffered", &(self.cap - self.pos))
            .finish_non_exhaustive()
    }
}

/// Buffered reader whose capacity follows the traffic it sees.
///
/// Created by [`BufferPool::acquire_reader`](crate::pool::BufferPool::acquire_reader),
/// starting at the pool's smallest slot. Reads go through the [`Read`]
/// impl; [`buffered`](Self::buffered) and [`capacity`](Self::capacity)
/// expose the inner buffer state. Each read moves the capacity by at most
/// one ladder slot.
///
/// Single-owner, like its writer counterpart. Dropping the reader releases
/// its buffer back to the pool; any unread remainder is discarded with the
/// connection.
pub struct DynamicBufReader {
    pool: BufferPool,
    idx: usize,
    inner: BufReader,
}

impl DynamicBufReader {
    pub(crate) fn new(pool: BufferPool, inner: BufReader) -> Self {
        Self {
            pool,
            idx: 0,
            inner,
        }
    }

    /// Number of bytes already fetched from the source but not yet read.
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

    /// Swaps the inner buffer for one from the adjacent slot. Unread bytes
    /// move with it; the old buffer is scrubbed and returned.
    fn migrate(&mut self, new_idx: usize) {
        let mut old = mem::replace(&mut self.inner, BufReader::detached());
        let source = old.bind(Box::new(FailingEndpoint));
        let mut fresh = self.pool.checkout_reader(new_idx, source);
        old.carry_into(&mut fresh);
        self.pool.checkin_reader(self.idx, old);
        tracing::trace!(
            from = self.idx,
            to = new_idx,
            capacity = fresh.capacity(),
            "read buffer migrated"
        );
        self.idx = new_idx;
        self.inner = fresh;
    }
}

impl Read for DynamicBufReader {
    /// Reads up to `p.len()` bytes.
    ///
    /// Buffered bytes are served without touching the source and without
    /// adapting the capacity. Otherwise the idle deadline is armed (or
    /// cleared at the smallest slot) on deadline-capable sources, the
    /// buffer is filled once, and the total delivered by that fill decides
    /// whether the capacity steps up, down, or stays. A deadline expiry
    /// shrinks one slot and retries; at the smallest slot it propagates.
    fn read(&mut self, p: &mut [u8]) -> io::Result<usize> {
        if p.is_empty() {
            return Ok(0);
        }
        if self.inner.buffered() > 0 {
            return self.inner.read(p);
        }
        loop {
            if self.idx > 0 {
                self.inner
                    .set_read_deadline(Some(self.pool.idle_shrink_timeout()))?;
            } else {
                self.inner.set_read_deadline(None)?;
            }
            match self.inner.read(p) {
                Ok(0) => return Ok(0),
                Ok(n) => {
                    let total = n + self.inner.buffered();
                    if total >= self.inner.capacity() {
                        // The fill saturated the buffer. This also covers a
                        // direct read into an oversized destination.
                        self.grow();
                    } else if total < self.inner.capacity() / 2 {
                        self.shrink();
                    }
                    return Ok(n);
                }
                Err(e)
                    if self.idx > 0
                        && matches!(
                            e.kind(),
                            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                        ) =>
                {
                    tracing::debug!(
                        slot = self.idx,
                        capacity = self.inner.capacity(),
                        "idle deadline expired; shrinking read buffer"
                    );
                    self.shrink();
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl fmt::Debug for DynamicBufReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicBufReader")
            .field("slot", &self.idx)
            .field("capacity", &self.inner.capacity())
            .field("buffered", &self.inner.buffered())
            .finish_non_exhaustive()
    }
}

impl Drop for DynamicBufReader {
    fn drop(&mut self) {
        let inner = mem::replace(&mut self.inner, BufReader::detached());
        self.pool.checkin_reader(self.idx, inner);
    }
}
