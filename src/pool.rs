//! Reusable-object pools for per-call scratch state
//!
//! Request builders, multipart writers, and codec scratch buffers are
//! acquired from a free-list pool for exactly one call and returned on
//! drop, so steady-state traffic does not allocate per request.

use std::sync::Mutex;

/// Objects above this many idle entries per pool are dropped instead of
/// being cached.
const MAX_IDLE: usize = 64;

/// A poolable object: constructible empty and resettable to that state.
pub trait Reuse: Default + Send {
    /// Clear per-call state, retaining any reusable capacity.
    fn reset(&mut self);
}

impl Reuse for Vec<u8> {
    fn reset(&mut self) {
        self.clear();
    }
}

/// A concurrent free-list pool of reusable objects.
///
/// Safe for acquire/release from any thread. Releasing resets the object
/// before it becomes visible to other acquirers.
pub struct Pool<T: Reuse> {
    idle: Mutex<Vec<T>>,
}

impl<T: Reuse> Pool<T> {
    pub const fn new() -> Self {
        Pool {
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Take an idle object, or construct a fresh one if the pool is empty.
    pub fn acquire(&self) -> T {
        let recycled = self.idle.lock().ok().and_then(|mut idle| idle.pop());
        match recycled {
            Some(item) => item,
            None => T::default(),
        }
    }

    /// Reset an object and return it to the pool.
    pub fn release(&self, mut item: T) {
        item.reset();
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < MAX_IDLE {
                idle.push(item);
            }
        }
    }

    #[cfg(test)]
    fn idle_len(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }
}

/// Shared scratch buffers for codec encode output.
pub(crate) static BUF_POOL: Pool<Vec<u8>> = Pool::new();
