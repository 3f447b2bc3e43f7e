//! Buffer pool configuration.
//!
//! [`PoolOptions`] holds the concrete values that drive pool construction
//! and the reader's idle-shrink policy. Invalid values are clamped by
//! [`PoolOptions::normalize`] rather than rejected, so a pool can always be
//! built.
//!
//! # Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `min_buffer_size` | 1024 bytes |
//! | `max_buffer_size` | 32 KiB |
//! | `idle_shrink_timeout` | 10 s |

use std::time::Duration;

/// Default smallest buffer capacity, used when `min_buffer_size` is zero.
pub const DEFAULT_MIN_BUFFER_SIZE: usize = 1024;

/// Default largest buffer capacity.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 32 * 1024;

/// Default idle deadline after which a quiet reader releases buffer memory.
pub const DEFAULT_IDLE_SHRINK_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`BufferPool`](crate::pool::BufferPool).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolOptions {
    /// Capacity of the smallest ladder slot. Zero means
    /// [`DEFAULT_MIN_BUFFER_SIZE`].
    pub min_buffer_size: usize,
    /// Lower bound for the largest ladder slot. The ladder doubles from
    /// `min_buffer_size` until it reaches or passes this value. A maximum
    /// below the minimum yields a single-slot ladder.
    pub max_buffer_size: usize,
    /// Idle deadline armed on deadline-capable sources while a reader sits
    /// above its smallest slot. A read that expires this deadline shrinks
    /// the buffer one slot and retries. Zero means
    /// [`DEFAULT_IDLE_SHRINK_TIMEOUT`].
    pub idle_shrink_timeout: Duration,
}

impl PoolOptions {
    /// Clamp configuration values to safe defaults.
    pub fn normalize(&mut self) {
        if self.min_buffer_size == 0 {
            self.min_buffer_size = DEFAULT_MIN_BUFFER_SIZE;
        }
        if self.max_buffer_size < self.min_buffer_size {
            self.max_buffer_size = self.min_buffer_size;
        }
        if self.idle_shrink_timeout.is_zero() {
            self.idle_shrink_timeout = DEFAULT_IDLE_SHRINK_TIMEOUT;
        }
    }
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            min_buffer_size: DEFAULT_MIN_BUFFER_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            idle_shrink_timeout: DEFAULT_IDLE_SHRINK_TIMEOUT,
        }
    }
}
