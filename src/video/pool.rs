//! Reusable frame-buffer pool.
//!
//! Frame analysis churns through short-lived pixel buffers. The pool keeps
//! a capped stack of returned buffers for reuse; overflow buffers are
//! dropped rather than retained. A buffer is owned by exactly one task
//! between `checkout` and `give_back`.

use std::sync::Mutex;

use crate::config::FRAME_POOL_CAPACITY;

pub struct FramePool {
    buffers: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
}

impl Default for FramePool {
    fn default() -> Self {
        Self::new(FRAME_POOL_CAPACITY)
    }
}

impl FramePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Takes a zeroed buffer of exactly `len` bytes, reusing a pooled
    /// allocation when one is available.
    pub fn checkout(&self, len: usize) -> Vec<u8> {
        let reused = match self.buffers.lock() {
            Ok(mut buffers) => buffers.pop(),
            Err(_) => None,
        };
        match reused {
            Some(mut buffer) => {
                buffer.clear();
                buffer.resize(len, 0);
                buffer
            }
            None => vec![0; len],
        }
    }

    /// Returns a buffer to the pool. Dropped silently once the pool is at
    /// capacity.
    pub fn give_back(&self, buffer: Vec<u8>) {
        if let Ok(mut buffers) = self.buffers.lock() {
            if buffers.len() < self.capacity {
                buffers.push(buffer);
            }
        }
    }

    /// Number of idle buffers currently held.
    pub fn idle_count(&self) -> usize {
        self.buffers.lock().map(|b| b.len()).unwrap_or(0)
    }
}
