//! Size-stratified pool of buffered readers and writers.
//!
//! A [`BufferPool`] owns one free list per entry of a power-of-two size
//! ladder. Connections check out a [`DynamicBufWriter`] and
//! [`DynamicBufReader`] pre-sized to the smallest slot; as their buffers
//! migrate up and down the ladder, intermediate buffers cycle through the
//! free lists instead of being reallocated per connection.
//!
//! Free lists are best-effort caches: an acquire allocates fresh when its
//! list is empty, and a return silently drops the buffer when its list is
//! full. Every buffer entering a list has its cursor reset and its
//! endpoint rebound to the failing stub, so a parked buffer can never leak
//! references to, or bytes from, its previous connection.

use crate::config::PoolOptions;
use crate::io::{Sink, Source};
use crate::reader::{BufReader, DynamicBufReader};
use crate::writer::{BufWriter, DynamicBufWriter};
use crossbeam_queue::ArrayQueue;
use std::sync::Arc;
use std::time::Duration;

/// Free-list depth per ladder slot. A full list drops returned buffers,
/// bounding how much idle memory a slot can hoard.
const FREE_LIST_DEPTH: usize = 64;

/// Builds the capacity ladder: doubling steps from `min` until `max` is
/// reached or passed.
fn ladder(min: usize, max: usize) -> Vec<usize> {
    let mut sizes = vec![min];
    let mut size = min;
    while size < max {
        size = size.saturating_mul(2);
        sizes.push(size);
    }
    sizes
}

/// Point-in-time free-list occupancy, mostly useful for tests and gauges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of ladder slots.
    pub slots: usize,
    /// Idle writers across all slots.
    pub idle_writers: usize,
    /// Idle readers across all slots.
    pub idle_readers: usize,
}

#[derive(Debug)]
struct PoolInner {
    writer_slots: Vec<ArrayQueue<BufWriter>>,
    reader_slots: Vec<ArrayQueue<BufReader>>,
    sizes: Vec<usize>,
    idle_shrink_timeout: Duration,
}

/// Shared pool of power-of-two-sized buffered readers and writers.
///
/// The pool is a cheap handle around shared state: clone it to hand it to
/// other connections or threads. The wrappers it hands out are
/// single-owner. Construction never fails: out-of-range options are
/// clamped by [`PoolOptions::normalize`].
#[derive(Debug, Clone)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

impl BufferPool {
    /// Creates a pool whose ladder doubles from `min_buffer_size` until it
    /// reaches or passes `max_buffer_size`. Remaining knobs take their
    /// defaults; see [`PoolOptions`].
    #[must_use]
    pub fn new(min_buffer_size: usize, max_buffer_size: usize) -> Self {
        Self::with_options(PoolOptions {
            min_buffer_size,
            max_buffer_size,
            ..PoolOptions::default()
        })
    }

    /// Creates a pool from explicit options, normalizing them first.
    #[must_use]
    pub fn with_options(mut options: PoolOptions) -> Self {
        options.normalize();
        let sizes = ladder(options.min_buffer_size, options.max_buffer_size);
        let writer_slots = sizes
            .iter()
            .map(|_| ArrayQueue::new(FREE_LIST_DEPTH))
            .collect();
        let reader_slots = sizes
            .iter()
            .map(|_| ArrayQueue::new(FREE_LIST_DEPTH))
            .collect();
        tracing::debug!(
            slots = sizes.len(),
            min = sizes[0],
            max = sizes[sizes.len() - 1],
            "buffer pool initialized"
        );
        Self {
            inner: Arc::new(PoolInner {
                writer_slots,
                reader_slots,
                sizes,
                idle_shrink_timeout: options.idle_shrink_timeout,
            }),
        }
    }

    /// Index of the largest ladder slot.
    #[must_use]
    pub fn max_index(&self) -> usize {
        self.inner.sizes.len() - 1
    }

    /// Capacity of slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is past the largest slot.
    #[must_use]
    pub fn slot_capacity(&self, idx: usize) -> usize {
        self.inner.sizes[idx]
    }

    /// Idle deadline used by readers above their smallest slot.
    #[must_use]
    pub fn idle_shrink_timeout(&self) -> Duration {
        self.inner.idle_shrink_timeout
    }

    /// Current free-list occupancy.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            slots: self.inner.sizes.len(),
            idle_writers: self.inner.writer_slots.iter().map(ArrayQueue::len).sum(),
            idle_readers: self.inner.reader_slots.iter().map(ArrayQueue::len).sum(),
        }
    }

    /// Checks out a writer at the smallest slot, bound to `sink`.
    #[must_use]
    pub fn acquire_writer(&self, sink: Box<dyn Sink>) -> DynamicBufWriter {
        let inner = self.checkout_writer(0, sink);
        DynamicBufWriter::new(self.clone(), inner)
    }

    /// Checks out a reader at the smallest slot, bound to `source`.
    #[must_use]
    pub fn acquire_reader(&self, source: Box<dyn Source>) -> DynamicBufReader {
        let inner = self.checkout_reader(0, source);
        DynamicBufReader::new(self.clone(), inner)
    }

    pub(crate) fn checkout_writer(&self, idx: usize, sink: Box<dyn Sink>) -> BufWriter {
        let mut writer = self.inner.writer_slots[idx]
            .pop()
            .unwrap_or_else(|| BufWriter::with_capacity(self.inner.sizes[idx]));
        drop(writer.bind(sink));
        writer
    }

    pub(crate) fn checkin_writer(&self, idx: usize, mut writer: BufWriter) {
        drop(writer.unbind());
        // A full free list drops the buffer instead of blocking.
        let _ = self.inner.writer_slots[idx].push(writer);
    }

    pub(crate) fn checkout_reader(&self, idx: usize, source: Box<dyn Source>) -> BufReader {
        let mut reader = self.inner.reader_slots[idx]
            .pop()
            .unwrap_or_else(|| BufReader::with_capacity(self.inner.sizes[idx]));
        drop(reader.bind(source));
        reader
    }

    pub(crate) fn checkin_reader(&self, idx: usize, mut reader: BufReader) {
        drop(reader.unbind());
        let _ = self.inner.reader_slots[idx].push(reader);
    }
}
