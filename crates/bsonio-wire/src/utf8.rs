use crate::error::ReadError;
use crate::pool::{BufferPool, ScratchBuffers};
use crate::reader::PrimitiveReader;
use crate::source::ByteSource;

/// How many bytes make up a string on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringLength {
    /// Exactly this many bytes of UTF-8 (a length-prefixed BSON string,
    /// with the prefix already read by the caller).
    Exact(usize),
    /// Everything up to the next zero byte, which is consumed but not part
    /// of the string (a BSON `cstring`).
    NulTerminated,
}

impl From<i32> for StringLength {
    /// Negative wire lengths mean "unknown, read to the terminator".
    fn from(len: i32) -> Self {
        usize::try_from(len).map_or(Self::NulTerminated, Self::Exact)
    }
}

/// Source bytes the session still has to pull.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Bytes(usize),
    UntilNul,
    Nothing,
}

/// Outcome of one decode step over the filled byte region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Step {
    /// Leading bytes turned into chars. Whatever follows is carry-over.
    consumed: usize,
    /// The char buffer ran out of room before the valid input did.
    overflow: bool,
}

/// State of one string decode: scratch buffers checked out of a pool plus
/// how much input is still expected.
///
/// The byte buffer holds carry-over (the leading bytes of a character
/// split across fills) at its start, followed by freshly read bytes. The
/// char buffer accumulates the decoded text and is replaced by a larger
/// one whenever it fills up. Dropping the session returns both buffers to
/// the pool, whichever way the decode ended.
///
/// ```text
///   loop until nothing pending and no carry-over:
///     fill         ← read from the source into the byte buffer
///     decode_step  ← bytes → chars; compact carry-over; grow on overflow
///   finish         ← copy the chars out
/// ```
#[derive(Debug)]
pub struct DecodeSession<'p> {
    scratch: ScratchBuffers<'p>,
    pending: Pending,
    offset: u64,
}

impl<'p> DecodeSession<'p> {
    /// Start a session for a string beginning at stream `offset`.
    pub fn new(pool: &'p mut BufferPool, length: StringLength, offset: u64) -> Self {
        let pending = match length {
            StringLength::Exact(0) => Pending::Nothing,
            StringLength::Exact(n) => Pending::Bytes(n),
            StringLength::NulTerminated => Pending::UntilNul,
        };
        Self {
            scratch: ScratchBuffers::checkout(pool),
            pending,
            offset,
        }
    }

    /// `true` once all input has been read and decoded.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.pending == Pending::Nothing && self.scratch.bytes().is_empty()
    }

    /// Pull the next run of bytes from `reader` into the byte buffer, after
    /// any carry-over.
    ///
    /// For a known length this reads `min(remaining, byte space, char
    /// space)` bytes in one exact read. For a zero-terminated string it
    /// reads byte by byte until the buffer is full or the terminator shows
    /// up.
    ///
    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if the source runs out first.
    pub fn fill<S: ByteSource>(&mut self, reader: &mut PrimitiveReader<S>) -> Result<(), ReadError> {
        let (bytes, chars) = self.scratch.split_mut();
        match self.pending {
            Pending::UntilNul => {
                while bytes.len() < bytes.capacity() {
                    let b = reader.read_u8()?;
                    if b == 0 {
                        self.pending = Pending::Nothing;
                        break;
                    }
                    bytes.push(b);
                }
            }
            Pending::Bytes(remaining) => {
                let amount = remaining
                    .min(bytes.capacity() - bytes.len())
                    .min(chars.capacity() - chars.len());
                let start = bytes.len();
                bytes.resize(start + amount, 0);
                reader.read_exact(&mut bytes[start..])?;
                self.pending = match remaining - amount {
                    0 => Pending::Nothing,
                    left => Pending::Bytes(left),
                };
            }
            Pending::Nothing => {}
        }
        Ok(())
    }

    /// Decode the filled byte region into the char buffer.
    ///
    /// Bytes of an incomplete trailing character stay in the byte buffer
    /// and are shifted to its start. When the char buffer overflows, or is
    /// full while input remains, it is replaced by one larger by
    /// `min(remaining input, min_capacity)`.
    ///
    /// # Errors
    ///
    /// [`ReadError::InvalidEncoding`] on a malformed sequence, or on a
    /// character still incomplete once the input is exhausted.
    pub fn decode_step(&mut self) -> Result<(), ReadError> {
        let end_of_input = self.pending == Pending::Nothing;
        let (bytes, chars) = self.scratch.split_mut();
        let step = decode_into(bytes, chars, end_of_input).map_err(|valid_up_to| {
            ReadError::InvalidEncoding {
                offset: self.offset,
                valid_up_to,
            }
        })?;
        bytes.drain(..step.consumed);

        let input_left = !end_of_input || !bytes.is_empty();
        let chars_full = chars.len() == chars.capacity();
        if step.overflow || (input_left && chars_full) {
            let increment = self.remaining_hint().min(self.scratch.min_capacity());
            self.scratch.grow_chars(increment.max(1));
        }
        Ok(())
    }

    /// Input not yet decoded: buffered carry-over plus what is still to be
    /// read. Unknown for a zero-terminated string, where a full increment
    /// is assumed.
    fn remaining_hint(&self) -> usize {
        let buffered = self.scratch.bytes().len();
        match self.pending {
            Pending::Bytes(n) => n + buffered,
            Pending::UntilNul => self.scratch.min_capacity(),
            Pending::Nothing => buffered,
        }
    }

    /// Copy out the decoded text. The scratch buffers go back to the pool.
    #[must_use]
    pub fn finish(self) -> String {
        self.scratch.chars().to_owned()
    }
}

/// Decode a UTF-8 string of `length` bytes from `reader`, using scratch
/// buffers from `pool`.
///
/// An `Exact(0)` length returns an empty string without touching the
/// source. A character split across two fills is completed on the next
/// fill, never dropped. The decoded text is identical to
/// `String::from_utf8` over the same bytes.
///
/// # Errors
///
/// [`ReadError::EndOfStream`] if the source runs out before the string
/// (or its terminator) is complete, and [`ReadError::InvalidEncoding`] if
/// the bytes are not UTF-8. No partial string is returned, and the
/// reader's count is rolled back to the string's first byte, which is also
/// the offset both errors report.
pub fn decode_utf8<S: ByteSource>(
    reader: &mut PrimitiveReader<S>,
    pool: &mut BufferPool,
    length: StringLength,
) -> Result<String, ReadError> {
    let start = reader.total_bytes_read();
    let mut session = DecodeSession::new(pool, length, start);
    match drive(&mut session, reader) {
        Ok(()) => Ok(session.finish()),
        Err(err) => {
            reader.rewind_count(start);
            Err(match err {
                ReadError::EndOfStream { .. } => ReadError::EndOfStream { offset: start },
                other => other,
            })
        }
    }
}

fn drive<S: ByteSource>(
    session: &mut DecodeSession<'_>,
    reader: &mut PrimitiveReader<S>,
) -> Result<(), ReadError> {
    while !session.is_finished() {
        session.fill(reader)?;
        session.decode_step()?;
    }
    Ok(())
}

/// Append the longest valid prefix of `input` that fits into `out`'s spare
/// capacity. `Err` carries the length of the valid prefix before a
/// malformed sequence.
fn decode_into(input: &[u8], out: &mut String, end_of_input: bool) -> Result<Step, usize> {
    let Some(chunk) = input.utf8_chunks().next() else {
        return Ok(Step {
            consumed: 0,
            overflow: false,
        });
    };
    let text = chunk.valid();
    let invalid = chunk.invalid();

    let take = floor_char_boundary(text, out.capacity() - out.len());
    out.push_str(&text[..take]);
    if take < text.len() {
        return Ok(Step {
            consumed: take,
            overflow: true,
        });
    }
    if invalid.is_empty() {
        return Ok(Step {
            consumed: take,
            overflow: false,
        });
    }

    // A sequence cut short by the end of the region is only an error when
    // no more input is coming.
    let truncated = text.len() + invalid.len() == input.len()
        && std::str::from_utf8(invalid).is_err_and(|e| e.error_len().is_none());
    if truncated && !end_of_input {
        Ok(Step {
            consumed: take,
            overflow: false,
        })
    } else {
        Err(text.len())
    }
}

fn floor_char_boundary(text: &str, max: usize) -> usize {
    if max >= text.len() {
        return text.len();
    }
    (0..=max).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0)
}
