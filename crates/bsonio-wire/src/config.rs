/// Default scratch buffer size, in bytes.
pub const DEFAULT_MIN_CAPACITY: usize = 1024;

/// Default ceiling above which a returned buffer is released rather than
/// cached, in bytes.
pub const DEFAULT_MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Smallest `min_capacity` a pool accepts. A split UTF-8 character carries
/// at most 3 bytes into the next fill, so this always leaves room for new
/// input.
pub const MIN_CAPACITY_FLOOR: usize = 8;

/// Sizing policy for a [`BufferPool`](crate::BufferPool).
///
/// ```text
/// ┌───────────────────────┬────────────────────────────────────────────────┐
/// │ Field                 │ Purpose                                        │
/// ├───────────────────────┼────────────────────────────────────────────────┤
/// │ min_capacity          │ Initial scratch size; cap on each char growth  │
/// │ max_retained_capacity │ Larger buffers are dropped on check-in         │
/// └───────────────────────┴────────────────────────────────────────────────┘
/// ```
///
/// A buffer that grew past `max_retained_capacity` while decoding a very
/// long string is handed back to the allocator on check-in. The next
/// checkout then allocates a fresh `min_capacity` buffer, which callers
/// cannot observe except as a cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Capacity of freshly checked-out scratch buffers, and the largest
    /// step by which the character buffer grows at once.
    pub min_capacity: usize,

    /// Buffers whose capacity exceeds this are not cached on check-in.
    pub max_retained_capacity: usize,
}

impl PoolConfig {
    /// Return a copy with `min_capacity` raised to [`MIN_CAPACITY_FLOOR`]
    /// and `max_retained_capacity` raised to at least `min_capacity`.
    #[must_use]
    pub fn normalized(self) -> Self {
        let min_capacity = self.min_capacity.max(MIN_CAPACITY_FLOOR);
        Self {
            min_capacity,
            max_retained_capacity: self.max_retained_capacity.max(min_capacity),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_capacity: DEFAULT_MIN_CAPACITY,
            max_retained_capacity: DEFAULT_MAX_RETAINED_CAPACITY,
        }
    }
}
