//! Dynbufio: adaptive buffered I/O over pooled, size-stratified buffers.
//!
//! # Overview
//!
//! Per-connection read and write buffers are a tax every server pays: size
//! them for the worst case and idle connections pin memory, size them small
//! and busy connections thrash the underlying transport. Dynbufio sizes
//! them at runtime instead. Each connection's buffer walks a power-of-two
//! capacity ladder, growing when traffic saturates it and shrinking when
//! traffic quiets, and the buffers themselves are recycled through a shared
//! pool so a burst does not translate into a permanent per-connection
//! allocation.
//!
//! # Core behaviors
//!
//! - **One step at a time**: every write, flush, or read moves the capacity
//!   by at most one ladder slot, so adaptation is smooth under jitter.
//! - **No data loss on resize**: buffered bytes travel with the buffer when
//!   it changes size; migrations are invisible in the byte stream.
//! - **Idle shrink**: readers on deadline-capable sources (e.g. TCP) arm a
//!   short idle deadline while sitting above the smallest slot, so quiet
//!   connections hand their memory back without waiting for traffic.
//! - **Loud reuse failures**: buffers parked in the pool are bound to a
//!   failing stub endpoint, turning accidental use-after-return into a
//!   sentinel error instead of a write to someone else's connection.
//!
//! # Module Structure
//!
//! - [`config`]: pool sizing and idle-deadline options
//! - [`error`]: transport-origin error tagging and sentinel predicates
//! - [`io`]: `Sink`/`Source`/`BufferedSink` seams and endpoint adapters
//! - [`pool`]: the shared size ladder and per-slot free lists
//! - [`writer`]: the adaptive buffered writer
//! - [`reader`]: the adaptive buffered reader
//!
//! # Example
//!
//! ```
//! use dynbufio::BufferPool;
//! use std::io::Write;
//!
//! let pool = BufferPool::new(1024, 64 * 1024);
//!
//! // One writer per connection; Vec<u8> stands in for the socket here.
//! let mut writer = pool.acquire_writer(Box::new(Vec::<u8>::new()));
//! writer.write_all(b"hello")?;
//! writer.flush()?;
//! # Ok::<(), std::io::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod io;
pub mod pool;
pub mod reader;
pub mod writer;

#[cfg(test)]
pub mod test_utils;

// Re-exports for convenient access to core types
pub use config::{
    PoolOptions, DEFAULT_IDLE_SHRINK_TIMEOUT, DEFAULT_MAX_BUFFER_SIZE, DEFAULT_MIN_BUFFER_SIZE,
};
pub use error::{is_io_error, is_stub_error, IoError, StubEndpointError};
pub use io::{BufferedSink, IoTaggingWriter, PlainSource, Sink, Source, UnbufferedSink};
pub use pool::{BufferPool, PoolStats};
pub use reader::DynamicBufReader;
pub use writer::DynamicBufWriter;
