use std::cell::Cell;
use std::mem;

use crate::config::PoolConfig;

thread_local! {
    static LOCAL_POOL: Cell<Option<BufferPool>> = const { Cell::new(None) };
}

/// Counters describing how a [`BufferPool`] has been used.
///
/// Every checkout is paired with exactly one checkin, so once no
/// [`ScratchBuffers`] is alive `checkouts == checkins` holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers handed out (byte and char buffers alike).
    pub checkouts: u64,
    /// Buffers handed back.
    pub checkins: u64,
    /// Checkouts satisfied from the cache.
    pub reused: u64,
    /// Checkouts that had to allocate.
    pub allocated: u64,
    /// Checked-in buffers dropped for exceeding `max_retained_capacity`.
    pub released: u64,
    /// Char buffer growths performed through [`ScratchBuffers::grow_chars`].
    pub grown: u64,
}

/// A cache of one byte buffer and one char buffer, reused across string
/// decodes.
///
/// A pool is not shared: it is either owned and passed explicitly, or
/// reached through [`BufferPool::with_local`], which gives each thread
/// its own. A buffer that is checked out has been moved out of the pool,
/// so it cannot be handed to a second caller until it comes back.
///
/// Caching is purely an optimization. A cache miss allocates, an
/// oversized buffer is released on check-in, and [`clear`](Self::clear)
/// drops everything; none of that changes what a decode returns.
#[derive(Debug, Default)]
pub struct BufferPool {
    config: PoolConfig,
    bytes: Option<Vec<u8>>,
    chars: Option<String>,
    stats: PoolStats,
}

impl BufferPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty pool with the given sizing policy.
    #[must_use]
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            config: config.normalized(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> PoolConfig {
        self.config
    }

    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Run `f` with the calling thread's pool.
    ///
    /// The pool is moved out of thread-local storage for the duration of
    /// `f` and put back afterwards. A nested call on the same thread (for
    /// instance a byte source that itself decodes strings) finds the slot
    /// empty and works with a fresh pool instead. If `f` panics the pool
    /// is simply lost and recreated on the next call.
    pub fn with_local<F, R>(f: F) -> R
    where
        F: FnOnce(&mut BufferPool) -> R,
    {
        let mut pool = LOCAL_POOL
            .try_with(Cell::take)
            .ok()
            .flatten()
            .unwrap_or_default();
        let result = f(&mut pool);
        // Fails only while the thread is tearing down its locals.
        let _ = LOCAL_POOL.try_with(|slot| slot.set(Some(pool)));
        result
    }

    /// Drop the calling thread's pool and every buffer it caches.
    pub fn clear_local() {
        let _ = LOCAL_POOL.try_with(Cell::take);
    }

    /// Drop the cached buffers.
    pub fn clear(&mut self) {
        self.bytes = None;
        self.chars = None;
    }

    /// Check out an empty byte buffer with capacity of at least
    /// `min_capacity`.
    pub fn checkout_bytes(&mut self, min_capacity: usize) -> Vec<u8> {
        self.stats.checkouts += 1;
        match self.bytes.take() {
            Some(mut buf) if buf.capacity() >= min_capacity => {
                self.stats.reused += 1;
                buf.clear();
                buf
            }
            _ => {
                self.stats.allocated += 1;
                Vec::with_capacity(min_capacity.max(self.config.min_capacity))
            }
        }
    }

    /// Check out an empty char buffer with capacity of at least
    /// `min_capacity` bytes.
    pub fn checkout_chars(&mut self, min_capacity: usize) -> String {
        self.stats.checkouts += 1;
        match self.chars.take() {
            Some(mut buf) if buf.capacity() >= min_capacity => {
                self.stats.reused += 1;
                buf.clear();
                buf
            }
            _ => {
                self.stats.allocated += 1;
                String::with_capacity(min_capacity.max(self.config.min_capacity))
            }
        }
    }

    /// Return a byte buffer. The larger of it and any cached byte buffer is
    /// kept, unless it exceeds `max_retained_capacity`.
    pub fn checkin_bytes(&mut self, buf: Vec<u8>) {
        self.stats.checkins += 1;
        if buf.capacity() > self.config.max_retained_capacity {
            self.stats.released += 1;
        } else if self.bytes.as_ref().is_none_or(|cached| cached.capacity() < buf.capacity()) {
            self.bytes = Some(buf);
        }
    }

    /// Return a char buffer. Same retention rule as
    /// [`checkin_bytes`](Self::checkin_bytes).
    pub fn checkin_chars(&mut self, buf: String) {
        self.stats.checkins += 1;
        if buf.capacity() > self.config.max_retained_capacity {
            self.stats.released += 1;
        } else if self.chars.as_ref().is_none_or(|cached| cached.capacity() < buf.capacity()) {
            self.chars = Some(buf);
        }
    }

    /// Capacity of the cached byte buffer, if any.
    #[must_use]
    pub fn cached_bytes_capacity(&self) -> Option<usize> {
        self.bytes.as_ref().map(Vec::capacity)
    }

    /// Capacity of the cached char buffer, if any.
    #[must_use]
    pub fn cached_chars_capacity(&self) -> Option<usize> {
        self.chars.as_ref().map(String::capacity)
    }
}

/// One byte buffer and one char buffer checked out of a [`BufferPool`]
/// for the length of a single decode.
///
/// Both buffers go back to the pool when this value is dropped, so an
/// early return through `?` cannot leak them.
#[derive(Debug)]
pub struct ScratchBuffers<'p> {
    pool: &'p mut BufferPool,
    bytes: Vec<u8>,
    chars: String,
}

impl<'p> ScratchBuffers<'p> {
    /// Check out both buffers at the pool's `min_capacity`.
    pub fn checkout(pool: &'p mut BufferPool) -> Self {
        let min = pool.config.min_capacity;
        let bytes = pool.checkout_bytes(min);
        let chars = pool.checkout_chars(min);
        Self { pool, bytes, chars }
    }

    #[must_use]
    pub fn min_capacity(&self) -> usize {
        self.pool.config.min_capacity
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut Vec<u8> {
        &mut self.bytes
    }

    #[must_use]
    pub fn chars(&self) -> &str {
        &self.chars
    }

    pub fn chars_mut(&mut self) -> &mut String {
        &mut self.chars
    }

    /// Both buffers at once, for a decode step that reads one and writes
    /// the other.
    pub fn split_mut(&mut self) -> (&mut Vec<u8>, &mut String) {
        (&mut self.bytes, &mut self.chars)
    }

    /// Replace the char buffer with one `additional` bytes larger, carrying
    /// the decoded prefix over unchanged. The old buffer is checked in.
    pub fn grow_chars(&mut self, additional: usize) {
        let wanted = self.chars.capacity() + additional;
        let mut grown = self.pool.checkout_chars(wanted);
        grown.push_str(&self.chars);
        let old = mem::replace(&mut self.chars, grown);
        self.pool.checkin_chars(old);
        self.pool.stats.grown += 1;
    }
}

impl Drop for ScratchBuffers<'_> {
    fn drop(&mut self) {
        self.pool.checkin_bytes(mem::take(&mut self.bytes));
        self.pool.checkin_chars(mem::take(&mut self.chars));
    }
}
