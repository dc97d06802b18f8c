use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

/// A pool of reusable body-accumulation buffers shared across requests.
///
/// Each in-flight request checks out one buffer for the duration of response
/// buffering. Buffers are cleared when returned but keep their capacity, so
/// steady-state traffic stops allocating once the pool has warmed up.
#[derive(Debug, Default)]
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks a buffer out of the pool, allocating a fresh one if no idle
    /// buffer is available.
    ///
    /// The returned guard gives exclusive access to the buffer and returns it
    /// to the pool when dropped, on every exit path including panics and
    /// cancelled requests.
    pub fn checkout(self: &Arc<Self>) -> PooledBuffer {
        let buf = self
            .idle
            .lock()
            .ok()
            .and_then(|mut idle| idle.pop())
            .unwrap_or_default();
        debug_assert!(buf.is_empty());
        PooledBuffer {
            buf,
            pool: Arc::clone(self),
        }
    }

    #[cfg(test)]
    fn idle_len(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }
}

/// An exclusively-owned buffer checked out of a [`BufferPool`].
///
/// Dereferences to the underlying `Vec<u8>`. Dropping the guard resets the
/// buffer's length to zero and makes it available for the next checkout.
#[derive(Debug)]
pub struct PooledBuffer {
    buf: Vec<u8>,
    pool: Arc<BufferPool>,
}

impl Deref for PooledBuffer {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        // A poisoned pool just drops the buffer instead of recycling it.
        if let Ok(mut idle) = self.pool.idle.lock() {
            idle.push(buf);
        }
    }
}
