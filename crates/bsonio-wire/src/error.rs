/// Errors that can occur while reading BSON wire primitives and strings.
///
/// ```text
///   ReadError
///   ├── EndOfStream            ← source exhausted mid-read
///   ├── InvalidEncoding        ← string bytes are not valid UTF-8
///   ├── UnsupportedOperation   ← line-oriented read requested
///   └── Io(std::io::Error)     ← any other failure of the byte source
/// ```
///
/// Offsets are positions in the reader's byte count, i.e. the value
/// [`PrimitiveReader::total_bytes_read`](crate::PrimitiveReader::total_bytes_read)
/// had when the failing read started.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The byte source ran dry before the required bytes were produced.
    ///
    /// A primitive read that fails this way does not advance the byte
    /// counter: a 4-byte integer that finds only 2 bytes is an error, never
    /// a truncated value.
    #[error("unexpected end of stream at offset {offset}")]
    EndOfStream { offset: u64 },

    /// The bytes of a string are not well-formed UTF-8.
    ///
    /// `offset` is where the string started; `valid_up_to` is the number
    /// of bytes of the failing decode region that were valid before the
    /// malformed (or truncated) sequence.
    #[error("invalid UTF-8 in string at offset {offset} (valid up to {valid_up_to} bytes)")]
    InvalidEncoding { offset: u64, valid_up_to: usize },

    /// The requested operation has no meaning for BSON.
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation { operation: &'static str },

    /// I/O error from the underlying byte source.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// Returns `true` if this error means the source was exhausted.
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream { .. })
    }
}
